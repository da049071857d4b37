use crate::util::smoothstep;

/// Scale used for nodes that have not popped in yet, so they are never exactly degenerate.
pub const HIDDEN_SCALE: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthTiming {
	/// Delay between successive depth levels.
	pub per_level_ms: f64,
	/// Pop-in duration of a single node.
	pub scale_ms: f64,
}

impl Default for GrowthTiming {
	fn default() -> Self {
		Self {
			per_level_ms: 160.0,
			scale_ms: 170.0,
		}
	}
}

/// Reveals a graph one depth level at a time, starting from its anchors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthClock {
	pub start: f64,
	pub timing: GrowthTiming,
	pub max_depth: u32,
}

impl GrowthClock {
	pub fn new(start: f64, timing: GrowthTiming, max_depth: u32) -> Self {
		Self {
			start,
			timing,
			max_depth,
		}
	}

	pub fn elapsed(&self, now: f64) -> f64 {
		now - self.start
	}

	/// Deepest level whose edges may be drawn, `None` before the clock starts.
	pub fn visible_depth(&self, now: f64) -> Option<u32> {
		let elapsed = self.elapsed(now);
		if elapsed < 0.0 {
			return None;
		}
		let level = (elapsed / self.timing.per_level_ms).floor();
		Some((level.min(self.max_depth as f64)) as u32)
	}

	/// Eased pop-in progress of a node at `depth`, in `[0, 1]`.
	pub fn born_fraction(&self, depth: u32, now: f64) -> f64 {
		let born = (self.elapsed(now) - depth as f64 * self.timing.per_level_ms) / self.timing.scale_ms;
		smoothstep(born.clamp(0.0, 1.0))
	}

	pub fn node_scale(&self, depth: u32, now: f64) -> f64 {
		self.born_fraction(depth, now).max(HIDDEN_SCALE)
	}

	pub fn node_visible(&self, depth: u32, now: f64) -> bool {
		self.born_fraction(depth, now) > 0.0
	}
}

pub fn edge_visible(parent_depth: u32, child_depth: u32, visible_depth: Option<u32>) -> bool {
	visible_depth.is_some_and(|d| parent_depth <= d && child_depth <= d)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn clock() -> GrowthClock {
		GrowthClock::new(1000.0, GrowthTiming::default(), 6)
	}

	#[test]
	fn visible_depth_steps_per_level_and_saturates() {
		let c = clock();
		assert_eq!(c.visible_depth(999.0), None);
		assert_eq!(c.visible_depth(1000.0), Some(0));
		assert_eq!(c.visible_depth(1159.0), Some(0));
		assert_eq!(c.visible_depth(1160.0), Some(1));
		assert_eq!(c.visible_depth(1000.0 + 160.0 * 4.5), Some(4));
		assert_eq!(c.visible_depth(1_000_000.0), Some(6));
	}

	#[test]
	fn nodes_pop_in_after_their_level_starts() {
		let c = clock();
		assert_eq!(c.born_fraction(2, 1320.0), 0.0);
		assert!(!c.node_visible(2, 1320.0));
		assert_eq!(c.node_scale(2, 1320.0), HIDDEN_SCALE);
		assert_eq!(c.born_fraction(2, 1320.0 + 85.0), 0.5);
		assert_eq!(c.born_fraction(2, 1320.0 + 170.0), 1.0);
		assert_eq!(c.node_scale(2, 5000.0), 1.0);
	}

	#[test]
	fn visibility_only_within_revealed_depth_and_never_retracts() {
		let c = clock();
		let mut seen_nodes = [false; 7];
		let mut seen_edges = [false; 7];
		let mut t = 900.0;
		while t < 2500.0 {
			let vd = c.visible_depth(t);
			let cutoff = ((t - c.start) / c.timing.per_level_ms).floor();
			for depth in 0..=6u32 {
				let node = c.node_visible(depth, t);
				let edge = edge_visible(depth.saturating_sub(1), depth, vd);
				if node || edge {
					assert!(depth as f64 <= cutoff);
				}
				assert!(!seen_nodes[depth as usize] || node, "node at {depth} flickered off");
				assert!(!seen_edges[depth as usize] || edge, "edge at {depth} flickered off");
				seen_nodes[depth as usize] |= node;
				seen_edges[depth as usize] |= edge;
			}
			t += 7.0;
		}
		assert!(seen_nodes.iter().all(|&s| s));
		assert!(seen_edges.iter().all(|&s| s));
		assert_eq!(c.node_scale(6, 2500.0), 1.0);
	}

	#[test]
	fn anchor_edge_shows_immediately() {
		let c = clock();
		assert!(edge_visible(0, 0, c.visible_depth(1000.0)));
		assert!(!edge_visible(0, 1, c.visible_depth(1000.0)));
		assert!(!edge_visible(0, 0, None));
	}
}
