use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData};

use super::state::PanelState;
use crate::util::context_2d;

/// Offscreen canvas the low-resolution panel buffer is uploaded to before scaling.
pub struct PanelSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

impl PanelSurface {
	pub fn new(document: &Document) -> Result<Self, JsValue> {
		let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
		let ctx = context_2d(&canvas)?;
		Ok(Self { canvas, ctx })
	}

	/// Shade the panel for `time_s` and draw it over whatever `target` already holds.
	pub fn draw(
		&self,
		target: &CanvasRenderingContext2d,
		panel: &mut PanelState,
		time_s: f64,
	) -> Result<(), JsValue> {
		let Some(rect) = panel.rect() else {
			return Ok(());
		};
		panel.shade(time_s);
		let (w, h) = panel.buffer_size();
		if self.canvas.width() != w as u32 || self.canvas.height() != h as u32 {
			self.canvas.set_width(w as u32);
			self.canvas.set_height(h as u32);
		}
		let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(panel.buffer()), w as u32, h as u32)?;
		self.ctx.put_image_data(&image, 0.0, 0.0)?;

		target.set_image_smoothing_enabled(true);
		target.draw_image_with_html_canvas_element_and_dw_and_dh(
			&self.canvas,
			rect.left,
			rect.top,
			rect.width,
			rect.height,
		)
	}
}
