use std::f64::consts::PI;

use glam::DVec2;
use log::warn;
use web_sys::CanvasRenderingContext2d;

use super::state::{NODE_RADIUS, TreeSceneState};
use crate::components::glass_panel::PanelSurface;

const EDGE_COLOR: &str = "rgba(111, 143, 183, 0.6)";
const NODE_COLOR: &str = "#e81a51";

/// Draw every live tree, then the panel over them.
pub fn render(
	state: &mut TreeSceneState,
	ctx: &CanvasRenderingContext2d,
	panel: &PanelSurface,
	time_s: f64,
) {
	let (w, h) = (state.scale.width, state.scale.height);
	let _ = ctx.set_transform(state.dpr, 0.0, 0.0, state.dpr, 0.0, 0.0);
	ctx.clear_rect(0.0, 0.0, w, h);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	if let Err(err) = panel.draw(ctx, &mut state.panel, time_s) {
		warn!("Panel draw failed: {:?}", err);
	}
}

fn draw_edges(state: &TreeSceneState, ctx: &CanvasRenderingContext2d) {
	let scale = &state.scale;
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width((scale.px_per_unit() * 0.05).max(1.0));
	ctx.begin_path();
	for tree in state.registry.iter().filter(|t| t.edges.segments() > 0) {
		for seg in tree.edges.iter() {
			let (x0, y0) = scale.world_to_screen(DVec2::new(seg[0] as f64, seg[1] as f64));
			let (x1, y1) = scale.world_to_screen(DVec2::new(seg[2] as f64, seg[3] as f64));
			ctx.move_to(x0, y0);
			ctx.line_to(x1, y1);
		}
	}
	ctx.stroke();
}

fn draw_nodes(state: &TreeSceneState, ctx: &CanvasRenderingContext2d) {
	let scale = &state.scale;
	let radius_px = NODE_RADIUS * scale.px_per_unit();
	ctx.set_fill_style_str(NODE_COLOR);
	for tree in state.registry.iter() {
		for node in tree.instances.iter().filter(|n| n.visible) {
			let (x, y) = scale.world_to_screen(node.position);
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius_px * node.scale, 0.0, 2.0 * PI);
			ctx.fill();
		}
	}
}
