use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use super::animator::{FrameStatus, GridRevealAnimator};
use super::plan::GridDims;
use crate::util::context_2d;

/// A white square with a faint border, blitted once per visible tile.
pub fn tile_sprite(document: &Document, tile_px: f64, dpr: f64) -> Result<HtmlCanvasElement, JsValue> {
	let sprite: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
	sprite.set_width(tile_px as u32);
	sprite.set_height(tile_px as u32);
	let sg = context_2d(&sprite)?;
	sg.set_fill_style_str("#fff");
	sg.fill_rect(0.0, 0.0, tile_px, tile_px);
	let line = dpr.round().max(1.0);
	sg.set_stroke_style_str("rgba(0,0,0,0.06)");
	sg.set_line_width(line);
	sg.stroke_rect(0.5 * line, 0.5 * line, tile_px - line, tile_px - line);
	Ok(sprite)
}

pub fn draw_frame(
	ctx: &CanvasRenderingContext2d,
	sprite: &HtmlCanvasElement,
	dims: &GridDims,
	animator: &mut GridRevealAnimator,
	now: f64,
) -> FrameStatus {
	ctx.clear_rect(0.0, 0.0, dims.width_px as f64, dims.height_px as f64);
	let status = animator.frame(now, |tile, alpha| {
		ctx.set_global_alpha(alpha);
		let _ = ctx.draw_image_with_html_canvas_element(
			sprite,
			tile.cell.x as f64 * dims.tile_px,
			tile.cell.y as f64 * dims.tile_px,
		);
	});
	ctx.set_global_alpha(1.0);
	status
}
