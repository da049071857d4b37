use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, MouseEvent, PointerEvent, Window};

use super::registry::MAX_TOTAL_NODES;
use super::render;
use super::state::TreeSceneState;
use crate::components::glass_panel::{PanelMode, PanelRect, PanelState, PanelSurface, panel_scale};
use crate::util::{context_2d, now_ms, seeded_rng, viewport_size, window};

const MAX_DPR: f64 = 2.0;

/// Full-viewport canvas of growing trees with the glass panel composited on top.
///
/// Nothing is seeded, drawn or clickable until `ready` turns true.
#[component]
pub fn TreeScene(
	#[prop(into)] ready: Signal<bool>,
	#[prop(default = MAX_TOTAL_NODES)] max_total_nodes: usize,
	#[prop(default = PanelMode::Lava)] panel_mode: PanelMode,
	#[prop(default = ".stamp")] panel_anchor: &'static str,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<TreeSceneState>>> = Rc::new(RefCell::new(None));
	let started = Rc::new(Cell::new(false));
	let state_init = state.clone();

	Effect::new(move |_| {
		if !ready.get() || started.get() {
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		started.set(true);
		let canvas: HtmlCanvasElement = canvas.into();
		if let Err(err) = start(canvas, state_init.clone(), max_total_nodes, panel_mode, panel_anchor) {
			error!("Tree scene failed to start: {:?}", err);
		}
	});

	let state_click = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_xy(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_click.borrow_mut() {
			let world = s.scale.screen_to_world(x, y);
			let evicted = s.spawn_random_at(world, now_ms());
			debug!(
				"Click at ({:.2}, {:.2}) evicted {evicted} trees, {} live nodes",
				world.x,
				world.y,
				s.registry.total_nodes()
			);
		}
	};

	let state_move = state.clone();
	let on_pointermove = move |ev: PointerEvent| {
		let Some((x, y)) = canvas_xy(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_move.borrow_mut() {
			s.pointer_moved(x, y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="tree-scene"
			on:click=on_click
			on:pointermove=on_pointermove
			style="display: block; position: fixed; inset: 0; width: 100vw; height: 100vh;"
		/>
	}
}

/// Pointer position in canvas css pixels.
fn canvas_xy(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn fit_canvas(canvas: &HtmlCanvasElement, window: &Window) -> Result<(f64, f64, f64), JsValue> {
	let (w, h) = viewport_size(window)?;
	let dpr = window.device_pixel_ratio().clamp(1.0, MAX_DPR);
	canvas.set_width((w * dpr).round() as u32);
	canvas.set_height((h * dpr).round() as u32);
	Ok((w, h, dpr))
}

/// Place the panel over the anchor element, or hide it when the anchor is missing.
fn sync_panel(
	panel: &mut PanelState,
	document: &Document,
	window: &Window,
	canvas: &HtmlCanvasElement,
	anchor: &str,
) -> Result<(), JsValue> {
	let Some(element) = document.query_selector(anchor)? else {
		panel.place(None, 0.0, 1.0);
		return Ok(());
	};
	let origin = canvas.get_bounding_client_rect();
	let r = element.get_bounding_client_rect();
	let rect = PanelRect {
		left: r.left() - origin.left(),
		top: r.top() - origin.top(),
		width: r.width(),
		height: r.height(),
	};
	let radius = window
		.get_computed_style(&element)?
		.and_then(|style| style.get_property_value("border-top-left-radius").ok())
		.and_then(|v| v.trim_end_matches("px").trim().parse::<f64>().ok())
		.unwrap_or(0.0);
	let (vw, _) = viewport_size(window)?;
	panel.place(Some(rect), radius, panel_scale(vw));
	Ok(())
}

fn start(
	canvas: HtmlCanvasElement,
	state: Rc<RefCell<Option<TreeSceneState>>>,
	max_total_nodes: usize,
	panel_mode: PanelMode,
	panel_anchor: &'static str,
) -> Result<(), JsValue> {
	let window = window()?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let (w, h, dpr) = fit_canvas(&canvas, &window)?;
	let ctx = context_2d(&canvas)?;
	let surface = PanelSurface::new(&document)?;

	let mut scene = TreeSceneState::new(w, h, dpr, max_total_nodes, panel_mode, seeded_rng());
	scene.seed(now_ms());
	sync_panel(&mut scene.panel, &document, &window, &canvas, panel_anchor)?;
	*state.borrow_mut() = Some(scene);
	info!("Tree scene started at {w}x{h} css px, dpr {dpr}");

	let (state_resize, canvas_resize, document_resize) = (state.clone(), canvas.clone(), document.clone());
	let on_resize = Closure::<dyn FnMut()>::new(move || {
		let Ok(win) = crate::util::window() else {
			return;
		};
		let resized = fit_canvas(&canvas_resize, &win);
		let Ok((nw, nh, ndpr)) = resized else {
			return;
		};
		if let Some(ref mut s) = *state_resize.borrow_mut() {
			s.resize(nw, nh, ndpr);
			if let Err(err) = sync_panel(&mut s.panel, &document_resize, &win, &canvas_resize, panel_anchor) {
				error!("Panel placement failed: {:?}", err);
			}
		}
	});
	window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
	// Lives as long as the page.
	on_resize.forget();

	let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let (state_frame, frame_inner) = (state.clone(), frame.clone());
	*frame.borrow_mut() = Some(Closure::new(move |now: f64| {
		if let Some(ref mut s) = *state_frame.borrow_mut() {
			s.tick(now);
			render::render(s, &ctx, &surface, now / 1000.0);
		}
		if let Some(ref cb) = *frame_inner.borrow() {
			let _ = web_sys::window().map(|w| w.request_animation_frame(cb.as_ref().unchecked_ref()));
		}
	}));
	if let Some(ref cb) = *frame.borrow() {
		window.request_animation_frame(cb.as_ref().unchecked_ref())?;
	}
	Ok(())
}
