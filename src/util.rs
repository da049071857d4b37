//! Small helpers shared by the intro and the tree scene.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

/// Cubic ease `x²(3 − 2x)`, clamped to `[0, 1]` outside the unit interval.
pub fn smoothstep(x: f64) -> f64 {
	if x <= 0.0 {
		0.0
	} else if x >= 1.0 {
		1.0
	} else {
		x * x * (3.0 - 2.0 * x)
	}
}

/// Milliseconds on the page's monotonic clock, or 0 outside a browser window.
pub fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

/// A random source seeded from the browser's entropy and wall clock.
pub fn seeded_rng() -> SmallRng {
	let noise = (js_sys::Math::random() * u32::MAX as f64) as u64;
	let clock = js_sys::Date::now() as u64;
	SmallRng::seed_from_u64((noise << 32) ^ clock)
}

/// The global `window`, or an error when running outside a browser.
pub fn window() -> Result<Window, JsValue> {
	web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

/// Viewport size in css pixels.
pub fn viewport_size(window: &Window) -> Result<(f64, f64), JsValue> {
	let width = window.inner_width()?.as_f64().unwrap_or(0.0);
	let height = window.inner_height()?.as_f64().unwrap_or(0.0);
	Ok((width, height))
}

/// Fetch the 2d context of a canvas.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
	canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("2d context unavailable"))?
		.dyn_into()
		.map_err(JsValue::from)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn smoothstep_hits_endpoints_and_midpoint() {
		assert_eq!(smoothstep(-1.0), 0.0);
		assert_eq!(smoothstep(0.0), 0.0);
		assert_eq!(smoothstep(0.5), 0.5);
		assert_eq!(smoothstep(1.0), 1.0);
		assert_eq!(smoothstep(3.0), 1.0);
	}

	#[test]
	fn smoothstep_is_monotonic() {
		let mut prev = 0.0;
		for i in 0..=100 {
			let v = smoothstep(i as f64 / 100.0);
			assert!(v >= prev);
			prev = v;
		}
	}
}
