use crate::util::smoothstep;

use super::plan::{RevealPlan, RevealTile};

/// Upper bound on the whole intro, measured from page load.
pub const HARD_TIMEOUT_MS: f64 = 8000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishReason {
	AllRetired,
	HorizonPassed,
	HardTimeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
	Running,
	Finished(FinishReason),
}

/// Opacity of a tile `dt` ms after its reveal time, or `None` once it has faded out.
pub fn tile_alpha(dt: f64, fade_ms: f64) -> Option<f64> {
	if dt <= 0.0 {
		Some(1.0)
	} else if dt < fade_ms {
		Some(1.0 - smoothstep(dt / fade_ms))
	} else {
		None
	}
}

/// Fades the white tiles out layer by layer according to a `RevealPlan`.
pub struct GridRevealAnimator {
	tiles: Vec<Option<RevealTile>>,
	remaining: usize,
	fade_ms: f64,
	horizon: f64,
	hard_deadline: f64,
	finished: Option<FinishReason>,
}

impl GridRevealAnimator {
	pub fn new(plan: RevealPlan, fade_ms: f64, hard_deadline: f64) -> Self {
		let remaining = plan.tiles.len();
		Self {
			tiles: plan.tiles.into_iter().map(Some).collect(),
			remaining,
			fade_ms,
			horizon: plan.horizon,
			hard_deadline,
			finished: None,
		}
	}

	/// Advance to `now`, handing every still-visible tile and its alpha to `draw`.
	pub fn frame(&mut self, now: f64, mut draw: impl FnMut(&RevealTile, f64)) -> FrameStatus {
		if let Some(reason) = self.finished {
			return FrameStatus::Finished(reason);
		}
		if now >= self.hard_deadline {
			return self.finish(FinishReason::HardTimeout);
		}

		for slot in &mut self.tiles {
			let Some(tile) = *slot else {
				continue;
			};
			match tile_alpha(now - tile.reveal_at, self.fade_ms) {
				Some(alpha) => draw(&tile, alpha),
				None => {
					*slot = None;
					self.remaining -= 1;
				}
			}
		}

		if self.remaining == 0 {
			self.finish(FinishReason::AllRetired)
		} else if now >= self.horizon {
			self.finish(FinishReason::HorizonPassed)
		} else {
			FrameStatus::Running
		}
	}

	fn finish(&mut self, reason: FinishReason) -> FrameStatus {
		self.finished = Some(reason);
		FrameStatus::Finished(reason)
	}
}

/// Runs its callback the first time the intro completes, whichever path gets there first.
pub struct CompletionGate {
	callback: Option<Box<dyn FnOnce(FinishReason)>>,
}

impl CompletionGate {
	pub fn new(callback: impl FnOnce(FinishReason) + 'static) -> Self {
		Self {
			callback: Some(Box::new(callback)),
		}
	}

	pub fn is_done(&self) -> bool {
		self.callback.is_none()
	}

	/// Returns `true` only for the call that actually fired the callback.
	pub fn complete(&mut self, reason: FinishReason) -> bool {
		match self.callback.take() {
			Some(callback) => {
				callback(reason);
				true
			}
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::mosaic_intro::mask::AlphaMask;
	use crate::components::mosaic_intro::plan::{GridDims, RevealTiming, plan_reveal};

	const FADE: f64 = 220.0;

	fn plan(cols: usize, rows: usize, now: f64) -> RevealPlan {
		let mut rng = SmallRng::seed_from_u64(5);
		let dims = GridDims::for_viewport(cols as f64 * 40.0, rows as f64 * 40.0, 1.0, 40.0);
		let mask = AlphaMask::empty(dims.width_px as usize, dims.height_px as usize);
		plan_reveal(&dims, &mask, &RevealTiming::default(), now, &mut rng)
	}

	#[test]
	fn alpha_is_opaque_then_fades_to_retired() {
		assert_eq!(tile_alpha(-5.0, FADE), Some(1.0));
		assert_eq!(tile_alpha(0.0, FADE), Some(1.0));
		assert_eq!(tile_alpha(FADE, FADE), None);
		assert_eq!(tile_alpha(FADE + 1.0, FADE), None);

		let mut prev = 1.0;
		for i in 1..220 {
			let a = tile_alpha(i as f64, FADE).unwrap();
			assert!(a <= prev && a >= 0.0);
			prev = a;
		}
	}

	#[test]
	fn finishes_when_all_tiles_retire() {
		let plan = plan(8, 6, 0.0);
		let horizon = plan.horizon;
		let mut animator = GridRevealAnimator::new(plan, FADE, 1.0e9);

		let mut now = 0.0;
		let mut drawn_first = 0;
		assert_eq!(
			animator.frame(now, |_, a| {
				assert_eq!(a, 1.0);
				drawn_first += 1;
			}),
			FrameStatus::Running
		);
		assert_eq!(drawn_first, 48);

		let status = loop {
			now += 16.0;
			match animator.frame(now, |_, _| {}) {
				FrameStatus::Running => assert!(now < horizon),
				done => break done,
			}
		};
		assert_eq!(status, FrameStatus::Finished(FinishReason::AllRetired));
		assert_eq!(animator.remaining, 0);
		assert!(now >= horizon - FADE);
	}

	#[test]
	fn horizon_ends_a_stalled_animation() {
		let plan = plan(4, 4, 0.0);
		let horizon = plan.horizon;
		let mut animator = GridRevealAnimator::new(plan, FADE, 1.0e9);
		// Every tile retires in the same late frame, which is past the horizon as well.
		let status = animator.frame(horizon + 500.0, |_, _| {});
		assert_eq!(status, FrameStatus::Finished(FinishReason::AllRetired));

		let mut plan = plan_with_straggler();
		plan.horizon = 100.0;
		let mut animator = GridRevealAnimator::new(plan, FADE, 1.0e9);
		let status = animator.frame(150.0, |_, _| {});
		assert_eq!(status, FrameStatus::Finished(FinishReason::HorizonPassed));
	}

	fn plan_with_straggler() -> RevealPlan {
		let mut plan = plan(2, 2, 0.0);
		plan.tiles[3].reveal_at = 10_000.0;
		plan
	}

	#[test]
	fn hard_deadline_forces_completion() {
		let mut plan = plan_with_straggler();
		plan.horizon = f64::INFINITY;
		let mut animator = GridRevealAnimator::new(plan, FADE, 8000.0);
		let mut now = 0.0;
		let status = loop {
			now += 700.0;
			if let FrameStatus::Finished(reason) = animator.frame(now, |_, _| {}) {
				break reason;
			}
		};
		assert_eq!(now, 8400.0);
		assert_eq!(status, FinishReason::HardTimeout);
		assert_eq!(animator.finished, Some(FinishReason::HardTimeout));
		assert_eq!(
			animator.frame(now + 1.0, |_, _| panic!("drew after finishing")),
			FrameStatus::Finished(status)
		);
	}

	#[test]
	fn empty_plan_finishes_immediately() {
		let plan = plan(0, 0, 0.0);
		let mut animator = GridRevealAnimator::new(plan, FADE, HARD_TIMEOUT_MS);
		assert_eq!(
			animator.frame(0.0, |_, _| {}),
			FrameStatus::Finished(FinishReason::AllRetired)
		);
	}

	#[test]
	fn gate_fires_exactly_once() {
		let calls = Rc::new(RefCell::new(Vec::new()));
		let sink = calls.clone();
		let mut gate = CompletionGate::new(move |reason| sink.borrow_mut().push(reason));
		assert!(!gate.is_done());
		assert!(gate.complete(FinishReason::AllRetired));
		assert!(!gate.complete(FinishReason::HardTimeout));
		assert!(!gate.complete(FinishReason::HorizonPassed));
		assert!(gate.is_done());
		assert_eq!(*calls.borrow(), vec![FinishReason::AllRetired]);
	}
}
