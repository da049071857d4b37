use glam::DVec2;

use super::growth::GrowthClock;

/// Index of a node inside its own graph's arena.
pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	/// Canonical position in tree-local coordinates; never moves after generation.
	pub position: DVec2,
	pub parent: Option<NodeId>,
	pub depth: u32,
}

/// A `(parent, child)` link recorded when the child was generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	pub parent: NodeId,
	pub child: NodeId,
}

/// Idle sinusoidal drift along a fixed direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WobbleParams {
	pub direction: DVec2,
	pub amplitude: f64,
	pub frequency: f64,
	pub phase: f64,
}

impl WobbleParams {
	/// Offset at `time_s` seconds.
	pub fn offset(&self, time_s: f64) -> DVec2 {
		self.direction * ((time_s * self.frequency + self.phase).sin() * self.amplitude)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RepulsionState {
	pub offset: DVec2,
	pub velocity: DVec2,
}

/// A generated tree plus its per-node animation state, stored as parallel arenas.
#[derive(Clone, Debug)]
pub struct Graph {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub wobble: Vec<WobbleParams>,
	pub repel: Vec<RepulsionState>,
	pub growth: GrowthClock,
	/// World position of the tree-local origin (the `root` anchor).
	pub origin: DVec2,
}

impl Graph {
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}
}
