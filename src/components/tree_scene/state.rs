use glam::DVec2;
use log::{info, trace};
use rand::rngs::SmallRng;

use super::generator::{self, TreeParams};
use super::growth::edge_visible;
use super::physics::{self, BrushParams, SpringParams};
use super::registry::{NodeCount, SceneRegistry};
use super::scale::ViewScale;
use super::types::Graph;
use crate::components::glass_panel::{PanelMode, PanelState};

pub const NODE_RADIUS: f64 = 0.2;
/// Coordinate written into an edge buffer that has nothing to show.
pub const DEGENERATE_COORD: f32 = 9999.0;

/// What the scene renderer needs for one node this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeInstance {
	pub position: DVec2,
	pub scale: f64,
	pub visible: bool,
}

/// Flat `x0, y0, x1, y1` line-segment buffer of the currently visible edges.
#[derive(Clone, Debug, Default)]
pub struct EdgeBuffer {
	data: Vec<f32>,
	segments: usize,
}

impl EdgeBuffer {
	pub fn segments(&self) -> usize {
		self.segments
	}

	pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
		self.data.chunks_exact(4).take(self.segments)
	}

	/// Write `count` segments. The storage holds `max(1, count)` segments and
	/// is reallocated only when that length changes; an empty frame keeps one
	/// degenerate segment. Returns whether it was reallocated.
	pub fn write(&mut self, count: usize, segments: impl Iterator<Item = (DVec2, DVec2)>) -> bool {
		let need = count.max(1) * 4;
		let rebuilt = self.data.len() != need;
		if rebuilt {
			self.data = vec![0.0; need];
		}
		self.segments = count;
		if count == 0 {
			self.data.fill(DEGENERATE_COORD);
			return rebuilt;
		}
		for (chunk, (a, b)) in self.data.chunks_exact_mut(4).zip(segments) {
			chunk.copy_from_slice(&[a.x as f32, a.y as f32, b.x as f32, b.y as f32]);
		}
		rebuilt
	}
}

/// A graph admitted to the scene, with the buffers it hands to the renderer.
pub struct LiveTree {
	pub graph: Graph,
	pub instances: Vec<NodeInstance>,
	pub edges: EdgeBuffer,
}

impl NodeCount for LiveTree {
	fn node_count(&self) -> usize {
		self.graph.node_count()
	}
}

impl LiveTree {
	pub fn new(graph: Graph) -> Self {
		Self {
			instances: Vec::with_capacity(graph.node_count()),
			edges: EdgeBuffer::default(),
			graph,
		}
	}

	/// Step growth and springs, then rebuild this frame's node and edge buffers.
	pub fn update(&mut self, now_ms: f64, dt: f64, springs: &SpringParams) {
		let growth = self.graph.growth;
		let time_s = now_ms / 1000.0;
		physics::step_graph(&mut self.graph, dt, springs);

		self.instances.clear();
		for (i, node) in self.graph.nodes.iter().enumerate() {
			self.instances.push(NodeInstance {
				position: physics::rendered_position(&self.graph, i, time_s),
				scale: growth.node_scale(node.depth, now_ms),
				visible: growth.node_visible(node.depth, now_ms),
			});
		}

		let visible_depth = growth.visible_depth(now_ms);
		let nodes = &self.graph.nodes;
		let shown = self
			.graph
			.edges
			.iter()
			.filter(|e| edge_visible(nodes[e.parent].depth, nodes[e.child].depth, visible_depth));
		let count = shown.clone().count();
		let instances = &self.instances;
		let rebuilt = self.edges.write(
			count,
			shown.map(|e| (instances[e.parent].position, instances[e.child].position)),
		);
		if rebuilt {
			trace!("Edge buffer resized for {count} segments");
		}
	}
}

/// Everything the steady-state loop mutates each frame.
pub struct TreeSceneState {
	pub registry: SceneRegistry<LiveTree>,
	pub scale: ViewScale,
	pub panel: PanelState,
	pub brush: BrushParams,
	pub springs: SpringParams,
	pub dpr: f64,
	rng: SmallRng,
	last_frame_ms: Option<f64>,
}

impl TreeSceneState {
	pub fn new(
		width: f64,
		height: f64,
		dpr: f64,
		max_total_nodes: usize,
		panel_mode: PanelMode,
		rng: SmallRng,
	) -> Self {
		Self {
			registry: SceneRegistry::new(max_total_nodes),
			scale: ViewScale::new(width, height),
			panel: PanelState::new(panel_mode),
			brush: BrushParams::default(),
			springs: SpringParams::default(),
			dpr,
			rng,
			last_frame_ms: None,
		}
	}

	/// Plant the two trees the scene opens with.
	pub fn seed(&mut self, now_ms: f64) {
		let left = TreeParams {
			spine_segments: 14,
			segment_length: 2.1,
			turn_std_deg: 14.0,
			cluster_chance: 0.85,
			cluster_length: 0.9,
			..TreeParams::default()
		};
		let right = TreeParams {
			spine_segments: 11,
			segment_length: 1.9,
			turn_std_deg: 18.0,
			cluster_chance: 0.8,
			cluster_length: 1.0,
			..TreeParams::default()
		};
		self.spawn(&left, DVec2::new(-6.0, -1.0), now_ms);
		self.spawn(&right, DVec2::new(6.0, 3.0), now_ms);
		info!(
			"Seeded scene with {} trees, {} nodes",
			self.registry.len(),
			self.registry.total_nodes()
		);
	}

	/// Generate and admit a tree rooted at `origin`; returns how many trees were evicted for it.
	pub fn spawn(&mut self, params: &TreeParams, origin: DVec2, now_ms: f64) -> usize {
		let graph = generator::generate(params, origin, generator::growth_from(now_ms), &mut self.rng);
		self.registry.admit(LiveTree::new(graph)).len()
	}

	/// A click: a randomly shaped tree at a world position.
	pub fn spawn_random_at(&mut self, world: DVec2, now_ms: f64) -> usize {
		let params = TreeParams::random(&mut self.rng);
		self.spawn(&params, world, now_ms)
	}

	/// Pointer moved to canvas css position `(sx, sy)`.
	pub fn pointer_moved(&mut self, sx: f64, sy: f64) {
		let world = self.scale.screen_to_world(sx, sy);
		for tree in self.registry.iter_mut() {
			physics::apply_pointer(&mut tree.graph, world, &self.brush);
		}
		self.panel.set_pointer(sx, sy);
	}

	/// Advance every live tree to `now_ms`.
	pub fn tick(&mut self, now_ms: f64) {
		let dt = match self.last_frame_ms {
			Some(last) => (now_ms - last) / 1000.0,
			None => 0.0,
		};
		self.last_frame_ms = Some(now_ms);
		for tree in self.registry.iter_mut() {
			tree.update(now_ms, dt, &self.springs);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
		self.scale = ViewScale::new(width, height);
		self.dpr = dpr;
	}
}
