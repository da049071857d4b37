use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use super::growth::{GrowthClock, GrowthTiming};
use super::types::{Edge, Graph, Node, NodeId, RepulsionState, WobbleParams};

/// Arena index of the anchor below the origin.
pub const BASE: NodeId = 0;
/// Arena index of the anchor at the origin; the spine starts here.
pub const ROOT: NodeId = 1;

/// Chance that a cluster leaf grows one nested sub-leaf.
const NESTED_LEAF_CHANCE: f64 = 0.45;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeParams {
	pub spine_segments: usize,
	pub segment_length: f64,
	/// Maximum heading change per spine step, in degrees.
	pub turn_std_deg: f64,
	pub cluster_chance: f64,
	pub cluster_min: usize,
	pub cluster_max: usize,
	pub cluster_length: f64,
	/// `1` for flat clusters, anything larger allows one nested leaf.
	pub cluster_depth: u32,
}

impl Default for TreeParams {
	fn default() -> Self {
		Self {
			spine_segments: 12,
			segment_length: 2.0,
			turn_std_deg: 15.0,
			cluster_chance: 0.85,
			cluster_min: 2,
			cluster_max: 5,
			cluster_length: 0.9,
			cluster_depth: 2,
		}
	}
}

impl TreeParams {
	/// The varied shapes spawned by a click.
	pub fn random(rng: &mut impl Rng) -> Self {
		Self {
			spine_segments: rng.random_range(10..18),
			segment_length: rng.random_range(1.6..2.6),
			turn_std_deg: rng.random_range(8.0..22.0),
			cluster_chance: rng.random_range(0.7..0.92),
			cluster_min: 2,
			cluster_max: rng.random_range(3..6),
			cluster_length: rng.random_range(0.7..1.1),
			cluster_depth: if rng.random_bool(0.65) { 2 } else { 1 },
		}
	}

	/// Upper bound on the nodes `generate` can produce with these params.
	pub fn max_nodes(&self) -> usize {
		let (_, hi) = self.cluster_range();
		let per_leaf = if self.cluster_depth > 1 { 2 } else { 1 };
		2 + self.spine_segments * (1 + hi * per_leaf)
	}

	fn cluster_range(&self) -> (usize, usize) {
		(
			self.cluster_min.min(self.cluster_max),
			self.cluster_min.max(self.cluster_max),
		)
	}
}

fn uniform(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
	if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// A probability usable by `random_bool`; NaN counts as never.
fn probability(p: f64) -> f64 {
	if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

struct Arena {
	nodes: Vec<Node>,
}

impl Arena {
	fn add(&mut self, position: DVec2, parent: Option<NodeId>) -> NodeId {
		let id = self.nodes.len();
		// Parents always precede their children, so depth is known on insertion.
		let depth = parent.map_or(0, |p| self.nodes[p].depth + 1);
		self.nodes.push(Node {
			id,
			position,
			parent,
			depth,
		});
		id
	}

	/// The anchor link followed by one edge per generated parent link.
	fn edges(&self) -> Vec<Edge> {
		let links = self.nodes.iter().filter_map(|n| {
			n.parent.map(|parent| Edge {
				parent,
				child: n.id,
			})
		});
		std::iter::once(Edge {
			parent: ROOT,
			child: BASE,
		})
		.chain(links)
		.collect()
	}
}

/// Grow a tree: a correlated random-walk spine from `ROOT` with leaf clusters
/// hung off its joints, plus the `BASE` anchor tied to the root.
pub fn generate(
	params: &TreeParams,
	origin: DVec2,
	growth: GrowthClock,
	rng: &mut impl Rng,
) -> Graph {
	let mut arena = Arena {
		nodes: Vec::with_capacity(params.max_nodes()),
	};
	arena.add(DVec2::new(0.0, -params.segment_length * 1.2), None);
	arena.add(DVec2::ZERO, None);

	let (cluster_lo, cluster_hi) = params.cluster_range();
	let mut heading = uniform(rng, -8.0, 8.0).to_radians();
	let (mut prev, mut cur) = (ROOT, DVec2::ZERO);

	for _ in 0..params.spine_segments {
		heading += uniform(rng, -params.turn_std_deg, params.turn_std_deg).to_radians();
		let len = params.segment_length * uniform(rng, 0.85, 1.15);
		cur += DVec2::from_angle(heading) * len;
		let joint = arena.add(cur, Some(prev));
		prev = joint;

		if !rng.random_bool(probability(params.cluster_chance)) {
			continue;
		}
		let leaves = rng.random_range(cluster_lo..=cluster_hi);
		for _ in 0..leaves {
			let angle = uniform(rng, 0.0, TAU);
			let radius = params.cluster_length * uniform(rng, 0.45, 1.05);
			let leaf_pos = cur + DVec2::from_angle(angle) * radius;
			let leaf = arena.add(leaf_pos, Some(joint));

			if params.cluster_depth > 1 && rng.random_bool(NESTED_LEAF_CHANCE) {
				let nested_angle = angle + uniform(rng, -40.0, 40.0).to_radians();
				let nested_radius = radius * uniform(rng, 0.45, 0.8);
				arena.add(leaf_pos + DVec2::from_angle(nested_angle) * nested_radius, Some(leaf));
			}
		}
	}

	let wobble = (0..arena.nodes.len()).map(|_| random_wobble(rng)).collect();
	let repel = vec![RepulsionState::default(); arena.nodes.len()];
	let max_depth = arena.nodes.iter().map(|n| n.depth).max().unwrap_or(0);

	Graph {
		edges: arena.edges(),
		nodes: arena.nodes,
		wobble,
		repel,
		growth: GrowthClock { max_depth, ..growth },
		origin,
	}
}

/// Schedule a growth clock starting at `now` for a graph about to be generated.
pub fn growth_from(now: f64) -> GrowthClock {
	GrowthClock::new(now, GrowthTiming::default(), 0)
}

fn random_wobble(rng: &mut impl Rng) -> WobbleParams {
	let raw = DVec2::new(uniform(rng, -1.0, 1.0), uniform(rng, -1.0, 1.0));
	WobbleParams {
		direction: raw.normalize_or(DVec2::X),
		amplitude: uniform(rng, 0.05, 0.11),
		frequency: uniform(rng, 0.7, 1.15),
		phase: uniform(rng, 0.0, TAU),
	}
}
