use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use super::animator::{CompletionGate, FinishReason, FrameStatus, GridRevealAnimator, HARD_TIMEOUT_MS};
use super::mask::{self, DEFAULT_PHRASE};
use super::plan::{CELL_PX, GridDims, RevealTiming, plan_reveal};
use super::render;
use crate::util::{context_2d, now_ms, seeded_rng, viewport_size, window};

/// Delay between page load and the start of the flood fill.
const INTRO_STAGE2_DELAY_MS: u64 = 600;
/// How long the overlay's css fade-out runs before it is unmounted.
const INTRO_FADE_MS: u64 = 550;

/// Full-screen white mosaic that dissolves outward from a tiled phrase.
///
/// `on_done` runs exactly once, when the tiles have cleared or the hard
/// timeout fires, whichever happens first.
#[component]
pub fn MosaicIntro(
	#[prop(into)] on_done: Callback<()>,
	#[prop(default = DEFAULT_PHRASE)] phrase: &'static str,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let (stage2, set_stage2) = signal(false);
	let (done, set_done) = signal(false);
	let (mounted, set_mounted) = signal(true);
	let loaded_at = now_ms();

	let gate = Rc::new(RefCell::new(CompletionGate::new(move |reason: FinishReason| {
		info!("Intro finished: {:?}", reason);
		set_done.set(true);
		on_done.run(());
		set_timeout(
			move || set_mounted.set(false),
			Duration::from_millis(INTRO_FADE_MS),
		);
	})));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let gate_timeout = gate.clone();
		set_timeout(
			move || {
				if gate_timeout.borrow_mut().complete(FinishReason::HardTimeout) {
					warn!("Intro forced to finish after {HARD_TIMEOUT_MS} ms");
				}
			},
			Duration::from_millis(HARD_TIMEOUT_MS as u64),
		);

		let gate_stage2 = gate.clone();
		set_timeout(
			move || {
				set_stage2.set(true);
				let hard_deadline = loaded_at + HARD_TIMEOUT_MS;
				if let Err(err) = run_mosaic(canvas, phrase, hard_deadline, gate_stage2) {
					// The hard timeout still completes the intro.
					error!("Mosaic intro unavailable: {:?}", err);
				}
			},
			Duration::from_millis(INTRO_STAGE2_DELAY_MS),
		);
	});

	let class = move || {
		let mut class = String::from("intro");
		if stage2.get() {
			class.push_str(" intro--stage2");
		}
		if done.get() {
			class.push_str(" is-done");
		}
		class
	};

	view! {
		<Show when=move || mounted.get()>
			<div class=class>
				<div class="intro__mosaic">
					<canvas
						node_ref=canvas_ref
						style="display: block; width: 100%; height: 100%;"
					/>
				</div>
			</div>
		</Show>
	}
}

fn run_mosaic(
	canvas: HtmlCanvasElement,
	phrase: &str,
	hard_deadline: f64,
	gate: Rc<RefCell<CompletionGate>>,
) -> Result<(), JsValue> {
	let window = window()?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let (css_w, css_h) = viewport_size(&window)?;
	let dpr = window.device_pixel_ratio();
	let dims = GridDims::for_viewport(css_w, css_h, dpr, CELL_PX);
	canvas.set_width(dims.width_px);
	canvas.set_height(dims.height_px);
	let ctx = context_2d(&canvas)?;

	let mask = mask::rasterize(&document, phrase, dims.width_px, dims.height_px)?;
	let timing = RevealTiming::default();
	let plan = plan_reveal(&dims, &mask, &timing, now_ms(), &mut seeded_rng());
	let depth = plan.tiles.iter().map(|t| t.layer).max().unwrap_or(0);
	debug!(
		"Mosaic {}x{} cells, {} seeds, {} layers, horizon in {:.0} ms",
		dims.cols,
		dims.rows,
		plan.seed_count,
		depth + 1,
		plan.horizon - now_ms()
	);

	let sprite = render::tile_sprite(&document, dims.tile_px, dpr.min(2.0))?;
	let mut animator = GridRevealAnimator::new(plan, timing.fade_ms, hard_deadline);

	let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let frame_inner = frame.clone();
	*frame.borrow_mut() = Some(Closure::new(move |now: f64| {
		if gate.borrow().is_done() {
			return;
		}
		match render::draw_frame(&ctx, &sprite, &dims, &mut animator, now) {
			FrameStatus::Running => {
				if let Some(ref cb) = *frame_inner.borrow() {
					let _ = web_sys::window()
						.map(|w| w.request_animation_frame(cb.as_ref().unchecked_ref()));
				}
			}
			FrameStatus::Finished(reason) => {
				gate.borrow_mut().complete(reason);
			}
		}
	}));
	if let Some(ref cb) = *frame.borrow() {
		window.request_animation_frame(cb.as_ref().unchecked_ref())?;
	}
	Ok(())
}
