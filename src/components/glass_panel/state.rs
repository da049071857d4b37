use super::shader::{PanelMode, PanelUniforms, shade};
use glam::DVec2;

/// Widest the shading buffer gets, in buffer pixels; it is scaled up when drawn.
pub const PANEL_RESOLUTION: usize = 128;

/// How much larger than the anchor element the panel is drawn.
pub fn panel_scale(viewport_width: f64) -> f64 {
	if viewport_width >= 900.0 { 1.9 } else { 1.55 }
}

/// An axis-aligned rectangle in canvas css pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelRect {
	pub left: f64,
	pub top: f64,
	pub width: f64,
	pub height: f64,
}

impl PanelRect {
	/// `self` grown by `scale` about its own centre.
	pub fn scaled(&self, scale: f64) -> Self {
		let (cx, cy) = (self.left + self.width / 2.0, self.top + self.height / 2.0);
		let (width, height) = (self.width * scale, self.height * scale);
		Self {
			left: cx - width / 2.0,
			top: cy - height / 2.0,
			width,
			height,
		}
	}

	/// Position relative to this rectangle, clamped to `[0, 1]` on both axes.
	pub fn normalize(&self, x: f64, y: f64) -> (f64, f64) {
		(
			((x - self.left) / self.width.max(1.0)).clamp(0.0, 1.0),
			((y - self.top) / self.height.max(1.0)).clamp(0.0, 1.0),
		)
	}
}

/// Placement, uniforms and the RGBA buffer of the translucent panel.
pub struct PanelState {
	pub mode: PanelMode,
	pub uniforms: PanelUniforms,
	rect: Option<PanelRect>,
	buffer: Vec<u8>,
	buffer_width: usize,
	buffer_height: usize,
}

impl PanelState {
	pub fn new(mode: PanelMode) -> Self {
		Self {
			mode,
			uniforms: PanelUniforms::default(),
			rect: None,
			buffer: Vec::new(),
			buffer_width: 0,
			buffer_height: 0,
		}
	}

	pub fn rect(&self) -> Option<PanelRect> {
		self.rect
	}

	/// Track an anchor element: `anchor` is its rect, `corner_radius` its css border radius.
	pub fn place(&mut self, anchor: Option<PanelRect>, corner_radius: f64, scale: f64) {
		self.rect = anchor
			.filter(|r| r.width >= 1.0 && r.height >= 1.0)
			.map(|r| r.scaled(scale));
		let Some(rect) = self.rect else {
			self.buffer.clear();
			self.buffer_width = 0;
			self.buffer_height = 0;
			return;
		};
		self.uniforms.size = (rect.width, rect.height);
		let radius_uv = corner_radius.max(0.0) * scale / rect.width.min(rect.height);
		self.uniforms.radius = radius_uv.clamp(0.0, 0.5 - 0.001);

		self.buffer_width = PANEL_RESOLUTION.min(rect.width.ceil() as usize).max(1);
		self.buffer_height = ((self.buffer_width as f64 * rect.height / rect.width).round() as usize).max(1);
		self.buffer = vec![0; self.buffer_width * self.buffer_height * 4];
	}

	/// Feed a pointer position in canvas css pixels.
	pub fn set_pointer(&mut self, x: f64, y: f64) {
		if let Some(rect) = self.rect {
			self.uniforms.pointer = rect.normalize(x, y);
		}
	}

	pub fn buffer(&self) -> &[u8] {
		&self.buffer
	}

	pub fn buffer_size(&self) -> (usize, usize) {
		(self.buffer_width, self.buffer_height)
	}

	/// Re-shade the whole buffer for `time_s`.
	pub fn shade(&mut self, time_s: f64) {
		self.uniforms.time = time_s;
		let (w, h) = (self.buffer_width, self.buffer_height);
		for row in 0..h {
			// Buffer rows run top-down, uv.y runs bottom-up.
			let v = 1.0 - (row as f64 + 0.5) / h as f64;
			for col in 0..w {
				let uv = DVec2::new((col as f64 + 0.5) / w as f64, v);
				let rgba = shade(self.mode, &self.uniforms, uv);
				let i = (row * w + col) * 4;
				for (dst, c) in self.buffer[i..i + 4].iter_mut().zip(rgba) {
					*dst = (c * 255.0).round() as u8;
				}
			}
		}
	}
}
