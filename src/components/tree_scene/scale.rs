//! Orthographic mapping between css pixels and world units.

use glam::DVec2;

/// World units spanned by the viewport's height.
pub const VIEW_SIZE: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewScale {
	pub width: f64,
	pub height: f64,
	pub view_size: f64,
}

impl ViewScale {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width: width.max(1.0),
			height: height.max(1.0),
			view_size: VIEW_SIZE,
		}
	}

	pub fn aspect(&self) -> f64 {
		self.width / self.height
	}

	/// Css pixels per world unit; identical on both axes.
	pub fn px_per_unit(&self) -> f64 {
		self.height / self.view_size
	}

	/// World position under a css pixel, with the origin at the viewport centre and +y up.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> DVec2 {
		let ndc_x = (sx / self.width) * 2.0 - 1.0;
		let ndc_y = -(sy / self.height) * 2.0 + 1.0;
		DVec2::new(
			ndc_x * self.view_size * self.aspect() / 2.0,
			ndc_y * self.view_size / 2.0,
		)
	}

	pub fn world_to_screen(&self, p: DVec2) -> (f64, f64) {
		let k = self.px_per_unit();
		(self.width / 2.0 + p.x * k, self.height / 2.0 - p.y * k)
	}
}
