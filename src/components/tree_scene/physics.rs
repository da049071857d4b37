use glam::DVec2;

use super::types::{Graph, RepulsionState};

/// Longest frame step fed to the springs, in seconds.
pub const MAX_FRAME_DT: f64 = 0.033;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushParams {
	pub radius: f64,
	pub impulse: f64,
}

impl Default for BrushParams {
	fn default() -> Self {
		Self {
			radius: 2.0,
			impulse: 2.6,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringParams {
	pub spring: f64,
	/// Per-frame velocity multiplier.
	pub damping: f64,
	pub max_offset: f64,
}

impl Default for SpringParams {
	fn default() -> Self {
		Self {
			spring: 6.0,
			damping: 0.88,
			max_offset: 0.9,
		}
	}
}

/// Velocity kick for a node at `away` (node minus pointer); falls off linearly to
/// zero at the brush edge. A pointer dead on the node pushes along `fallback`.
pub fn impulse(away: DVec2, fallback: DVec2, brush: &BrushParams) -> DVec2 {
	let distance = away.length();
	if distance >= brush.radius {
		return DVec2::ZERO;
	}
	let strength = (1.0 - distance / brush.radius) * brush.impulse;
	let direction = if distance > 1e-4 {
		away * (1.0 / distance)
	} else {
		fallback
	};
	direction * strength
}

impl RepulsionState {
	/// One damped spring step pulling the offset back to rest.
	pub fn step(&mut self, dt: f64, params: &SpringParams) {
		self.velocity += -self.offset * params.spring * dt;
		self.velocity *= params.damping;
		self.offset += self.velocity * dt;
		self.offset = self.offset.clamp_length_max(params.max_offset);
	}
}

/// Kick every node of `graph` within the brush around a world-space pointer.
pub fn apply_pointer(graph: &mut Graph, pointer_world: DVec2, brush: &BrushParams) {
	let local = pointer_world - graph.origin;
	for ((node, wobble), repel) in graph
		.nodes
		.iter()
		.zip(&graph.wobble)
		.zip(graph.repel.iter_mut())
	{
		repel.velocity += impulse(node.position - local, wobble.direction, brush);
	}
}

/// Advance every node's spring by `dt` seconds.
pub fn step_graph(graph: &mut Graph, dt: f64, params: &SpringParams) {
	let dt = dt.clamp(0.0, MAX_FRAME_DT);
	for repel in &mut graph.repel {
		repel.step(dt, params);
	}
}

/// Where a node is drawn: canonical position plus idle wobble plus repulsion, in world space.
pub fn rendered_position(graph: &Graph, index: usize, time_s: f64) -> DVec2 {
	graph.origin
		+ graph.nodes[index].position
		+ graph.wobble[index].offset(time_s)
		+ graph.repel[index].offset
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::tree_scene::generator::{TreeParams, generate, growth_from};

	const UP: DVec2 = DVec2::new(0.0, 1.0);

	#[test]
	fn impulse_is_full_strength_at_centre_and_zero_at_edge() {
		let brush = BrushParams::default();
		let at_centre = impulse(DVec2::ZERO, UP, &brush);
		assert!((at_centre.length() - 2.6).abs() < 1e-12);
		assert_eq!(at_centre, DVec2::new(0.0, 2.6));

		assert_eq!(impulse(DVec2::new(2.0, 0.0), UP, &brush), DVec2::ZERO);
		assert_eq!(impulse(DVec2::new(0.0, -3.5), UP, &brush), DVec2::ZERO);

		let half = impulse(DVec2::new(-1.0, 0.0), UP, &brush);
		assert!((half.x + 1.3).abs() < 1e-12);
		assert_eq!(half.y, 0.0);
	}

	#[test]
	fn spring_settles_back_to_rest() {
		let params = SpringParams::default();
		let mut state = RepulsionState {
			offset: DVec2::ZERO,
			velocity: DVec2::new(2.6, 0.0),
		};
		let mut peak: f64 = 0.0;
		for _ in 0..600 {
			state.step(1.0 / 60.0, &params);
			peak = peak.max(state.offset.length());
			assert!(state.offset.length() <= params.max_offset + 1e-12);
		}
		assert!(peak > 0.01);
		assert!(state.offset.length() < 1e-3);
		assert!(state.velocity.length() < 1e-3);
	}

	#[test]
	fn offset_is_clamped_without_losing_direction() {
		let params = SpringParams::default();
		let mut state = RepulsionState {
			offset: DVec2::ZERO,
			velocity: DVec2::new(0.0, -500.0),
		};
		state.step(MAX_FRAME_DT, &params);
		assert!((state.offset.length() - params.max_offset).abs() < 1e-12);
		assert!(state.offset.y < 0.0 && state.offset.x == 0.0);
	}

	#[test]
	fn pointer_only_pushes_nearby_nodes_away() {
		let mut rng = SmallRng::seed_from_u64(12);
		let origin = DVec2::new(5.0, -3.0);
		let mut graph = generate(&TreeParams::default(), origin, growth_from(0.0), &mut rng);
		let pointer = origin + DVec2::new(0.3, -0.2);
		apply_pointer(&mut graph, pointer, &BrushParams::default());

		for (node, repel) in graph.nodes.iter().zip(&graph.repel) {
			let away = node.position - (pointer - origin);
			if away.length() >= 2.0 {
				assert_eq!(repel.velocity, DVec2::ZERO);
			} else if away.length() > 1e-4 {
				let dot = repel.velocity.x * away.x + repel.velocity.y * away.y;
				assert!(dot > 0.0);
			}
		}
		assert!(graph.repel.iter().any(|r| r.velocity != DVec2::ZERO));
	}

	#[test]
	fn rendered_position_composes_offsets_additively() {
		let mut rng = SmallRng::seed_from_u64(3);
		let origin = DVec2::new(-6.0, -1.0);
		let mut graph = generate(&TreeParams::default(), origin, growth_from(0.0), &mut rng);
		let base = graph.nodes[4].position;
		graph.repel[4].offset = DVec2::new(0.25, 0.0);
		let t = 1.7;
		let expected = origin + base + graph.wobble[4].offset(t) + DVec2::new(0.25, 0.0);
		assert_eq!(rendered_position(&graph, 4, t), expected);
		assert_eq!(graph.nodes[4].position, base);
	}
}
