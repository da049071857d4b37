use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement};

use crate::util::context_2d;

pub const DEFAULT_PHRASE: &str = "CONNECT THE DOTS";

/// Per-pixel opacity of the rasterised phrase, row-major.
#[derive(Clone, Debug, Default)]
pub struct AlphaMask {
	width: usize,
	height: usize,
	alpha: Vec<u8>,
}

impl AlphaMask {
	pub fn empty(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			alpha: vec![0; width * height],
		}
	}

	/// Keep only the alpha channel of an RGBA buffer.
	pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Self {
		let mut alpha: Vec<u8> = rgba.chunks_exact(4).map(|px| px[3]).collect();
		alpha.resize(width * height, 0);
		Self {
			width,
			height,
			alpha,
		}
	}

	/// Opacity under a pixel position; anything off the canvas is transparent.
	pub fn alpha_at(&self, x: f64, y: f64) -> u8 {
		if x < 0.0 || y < 0.0 {
			return 0;
		}
		let (px, py) = (x as usize, y as usize);
		if px >= self.width || py >= self.height {
			return 0;
		}
		self.alpha[py * self.width + px]
	}
}

#[cfg(test)]
impl AlphaMask {
	pub(crate) fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, value: u8) {
		for row in y..(y + h).min(self.height) {
			for col in x..(x + w).min(self.width) {
				self.alpha[row * self.width + col] = value;
			}
		}
	}
}

/// Where copies of the phrase are stamped so the lettering tiles the canvas.
#[derive(Clone, Debug)]
pub struct MaskLayout {
	pub width: f64,
	pub height: f64,
	pub font_px: f64,
	pub x_step: f64,
	pub y_step: f64,
}

impl MaskLayout {
	pub fn font_px(width: f64, height: f64) -> f64 {
		(width.max(height) * 0.12).round()
	}

	pub fn new(width: f64, height: f64, text_width: f64) -> Self {
		let base = width.max(height);
		let font_px = Self::font_px(width, height).max(1.0);
		Self {
			width,
			height,
			font_px,
			x_step: (text_width + base * 0.04).max(1.0),
			y_step: font_px * 1.25,
		}
	}

	/// Top-left corners of every stamp; odd rows are pulled left by 40% of a stride.
	pub fn stamp_origins(&self) -> Vec<(f64, f64)> {
		let mut origins = Vec::new();
		let mut row = 0usize;
		loop {
			let y = -self.y_step * 0.5 + row as f64 * self.y_step;
			if y >= self.height + self.y_step {
				break;
			}
			let x_offset = if row % 2 == 1 { -self.x_step * 0.4 } else { 0.0 };
			let mut x = -self.x_step;
			while x < self.width + self.x_step {
				origins.push((x + x_offset, y));
				x += self.x_step;
			}
			row += 1;
		}
		origins
	}
}

/// Draw the tiled phrase on a transparent offscreen canvas and read back its alpha.
pub fn rasterize(
	document: &Document,
	phrase: &str,
	width: u32,
	height: u32,
) -> Result<AlphaMask, JsValue> {
	if width == 0 || height == 0 {
		return Ok(AlphaMask::empty(width as usize, height as usize));
	}
	let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
	canvas.set_width(width);
	canvas.set_height(height);
	let ctx = context_2d(&canvas)?;
	let (w, h) = (width as f64, height as f64);

	// Left transparent so alpha is lettering coverage alone.
	ctx.set_fill_style_str("#fff");
	ctx.set_font(&format!(
		"900 {}px Inter, Arial, system-ui, sans-serif",
		MaskLayout::font_px(w, h)
	));
	ctx.set_text_baseline("top");
	ctx.set_text_align("left");

	let text_width = ctx.measure_text(phrase)?.width();
	let layout = MaskLayout::new(w, h, text_width);
	for (x, y) in layout.stamp_origins() {
		ctx.fill_text(phrase, x, y)?;
	}

	let data = ctx.get_image_data(0.0, 0.0, w, h)?.data();
	Ok(AlphaMask::from_rgba(width as usize, height as usize, &data))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alpha_outside_canvas_is_zero() {
		let mut mask = AlphaMask::empty(4, 4);
		mask.fill_rect(0, 0, 4, 4, 255);
		assert_eq!(mask.alpha_at(1.5, 2.5), 255);
		assert_eq!(mask.alpha_at(-0.5, 1.0), 0);
		assert_eq!(mask.alpha_at(4.0, 1.0), 0);
		assert_eq!(mask.alpha_at(1.0, 9.0), 0);
	}

	#[test]
	fn from_rgba_reads_alpha_channel() {
		let rgba = [0, 0, 0, 10, 255, 255, 255, 200];
		let mask = AlphaMask::from_rgba(2, 1, &rgba);
		assert_eq!(mask.alpha_at(0.0, 0.0), 10);
		assert_eq!(mask.alpha_at(1.0, 0.0), 200);
	}

	#[test]
	fn stamps_cover_every_row_and_offset_odd_rows() {
		let layout = MaskLayout::new(800.0, 600.0, 300.0);
		let origins = layout.stamp_origins();
		assert!(!origins.is_empty());

		let mut rows: Vec<f64> = origins.iter().map(|&(_, y)| y).collect();
		rows.dedup();
		assert!(rows[0] < 0.0);
		assert!(*rows.last().unwrap() + layout.y_step >= layout.height);

		for (i, &row_y) in rows.iter().enumerate() {
			let xs: Vec<f64> = origins
				.iter()
				.filter(|&&(_, y)| y == row_y)
				.map(|&(x, _)| x)
				.collect();
			assert!(xs[0] <= 0.0);
			assert!(*xs.last().unwrap() + layout.x_step >= layout.width);
			let expected_first = if i % 2 == 1 {
				-layout.x_step * 1.4
			} else {
				-layout.x_step
			};
			assert!((xs[0] - expected_first).abs() < 1e-9);
		}
	}
}
