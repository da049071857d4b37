//! CPU port of the iridescent panel's fragment shading.
//!
//! Every function here works on one pixel at a time; `shade` is the entry
//! point and returns straight RGBA in `[0, 1]`.

use glam::{DVec2, DVec3};

/// Which shading algorithm fills the panel. Picked when the panel is configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelMode {
	#[default]
	Lava,
	Iridescent,
	Caustics,
	NeonGrid,
	Metaballs,
	Ripples,
}

const fn hex(rgb: u32) -> DVec3 {
	DVec3::new(
		((rgb >> 16) & 0xff) as f64 / 255.0,
		((rgb >> 8) & 0xff) as f64 / 255.0,
		(rgb & 0xff) as f64 / 255.0,
	)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelPalette {
	pub cream: DVec3,
	pub orange: DVec3,
	pub pink: DVec3,
	pub white_hi: DVec3,
	pub edge: DVec3,
}

impl Default for PanelPalette {
	fn default() -> Self {
		Self {
			cream: hex(0xf7efe7),
			orange: hex(0xde1818),
			pink: hex(0x5aa9cb),
			white_hi: hex(0xfffaf3),
			edge: hex(0xb4fad8),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelUniforms {
	/// Seconds since page load.
	pub time: f64,
	/// Panel size; only the aspect ratio matters.
	pub size: (f64, f64),
	/// Pointer over the panel, normalised to `[0, 1]²`.
	pub pointer: (f64, f64),
	pub alpha: f64,
	/// Corner radius in uv units, `0..0.5`.
	pub radius: f64,
	pub speed: f64,
	pub flow_warp: f64,
	pub parallax: f64,
	pub wave_amp: f64,
	pub wave_amp2: f64,
	pub wave_freq: f64,
	pub wave_width: f64,
	pub width_var: f64,
	pub edge_soft: f64,
	pub edge_strength: f64,
	pub grain: f64,
	pub saturation: f64,
	pub contrast: f64,
	pub aberration: f64,
	pub iridescence: f64,
	pub refract: f64,
	pub palette: PanelPalette,
}

impl Default for PanelUniforms {
	fn default() -> Self {
		Self {
			time: 0.0,
			size: (1.0, 1.0),
			pointer: (0.5, 0.5),
			alpha: 0.98,
			radius: 0.0,
			speed: 1.05,
			flow_warp: 0.08,
			parallax: 0.0035,
			wave_amp: 1.45,
			wave_amp2: 0.08,
			wave_freq: 1.08,
			wave_width: 1.05,
			width_var: 3.10,
			edge_soft: 0.55,
			edge_strength: 0.024,
			grain: 0.018,
			saturation: 2.0,
			contrast: 1.02,
			aberration: 0.0025,
			iridescence: 1.0,
			refract: 0.035,
			palette: PanelPalette::default(),
		}
	}
}

fn fract(x: f64) -> f64 {
	x - x.floor()
}

fn mix(a: f64, b: f64, t: f64) -> f64 {
	a + (b - a) * t
}

/// Hermite step between two edges; edges may be given in either order.
fn glsl_smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
	let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

fn hash(p: DVec2) -> f64 {
	let q = DVec2::new(p.dot(DVec2::new(127.1, 311.7)), p.dot(DVec2::new(269.5, 183.3)));
	fract((q.x + q.y).sin() * 43758.5453123)
}

fn noise(p: DVec2) -> f64 {
	let i = p.floor();
	let f = p - i;
	let u = f * f * (3.0 - 2.0 * f);
	let a = hash(i);
	let b = hash(i + DVec2::new(1.0, 0.0));
	let c = hash(i + DVec2::new(0.0, 1.0));
	let d = hash(i + DVec2::new(1.0, 1.0));
	mix(mix(a, b, u.x), mix(c, d, u.x), u.y)
}

fn fbm(mut p: DVec2) -> f64 {
	let (mut amp, mut v) = (0.5, 0.0);
	for _ in 0..5 {
		v += amp * noise(p);
		p = DVec2::new(0.8 * p.x - 0.6 * p.y, 0.6 * p.x + 0.8 * p.y) * 1.85;
		amp *= 0.56;
	}
	v
}

/// Divergence-free drift field: the curl of a time-scrolled fbm.
fn flow(p: DVec2, t: f64) -> DVec2 {
	let e = 0.04;
	let drift_a = DVec2::new(t * 0.10, -t * 0.07);
	let drift_b = DVec2::new(-t * 0.08, t * 0.09);
	let n1 = fbm(p + DVec2::new(e, 0.0) + drift_a);
	let n2 = fbm(p + DVec2::new(-e, 0.0) + drift_a);
	let n3 = fbm(p + DVec2::new(0.0, e) + drift_b);
	let n4 = fbm(p + DVec2::new(0.0, -e) + drift_b);
	let g = DVec2::new(n1 - n2, n3 - n4) * (1.0 / (2.0 * e));
	DVec2::new(-g.y, g.x)
}

fn saturate_color(c: DVec3, s: f64) -> DVec3 {
	let l = c.dot(DVec3::new(0.2126, 0.7152, 0.0722));
	DVec3::splat(l).lerp(c, s)
}

fn aces(c: DVec3) -> DVec3 {
	let f = |x: f64| ((x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14)).clamp(0.0, 1.0);
	DVec3::new(f(c.x), f(c.y), f(c.z))
}

/// Rotate a colour about the grey axis by an amount that grows at grazing angles.
fn iridescence(base: DVec3, ndv: f64, strength: f64) -> DVec3 {
	let shift = (1.0 - ndv).powi(2) * 2.2 * strength;
	let axis = DVec3::splat(1.0 / 3f64.sqrt());
	let (s, c) = shift.sin_cos();
	base * c + axis.cross(base) * s + axis * axis.dot(base) * (1.0 - c)
}

/// Coverage of a rounded rectangle filling the unit square.
pub fn rounded_rect_mask(uv: DVec2, radius: f64) -> f64 {
	let half = 0.5 - radius;
	let dx = ((uv.x - 0.5).abs() - half).max(0.0);
	let dy = ((uv.y - 0.5).abs() - half).max(0.0);
	let dist = (dx * dx + dy * dy).sqrt() - radius;
	glsl_smoothstep(0.006, 0.0, dist)
}

fn mode_lava(p: DVec2, t: f64, u: &PanelUniforms) -> DVec3 {
	let pal = &u.palette;
	let aspect = u.size.0 / u.size.1.max(1e-4);
	let m = DVec2::new((u.pointer.0 - 0.5) * aspect, u.pointer.1 - 0.5);
	let mut q = p + m * -u.parallax;
	q += flow(q * 1.2, t) * u.flow_warp;

	let x_phase = q.x * u.wave_freq * std::f64::consts::PI;
	let y_wave = u.wave_amp * (x_phase + t * 0.9).sin() + u.wave_amp2 * (x_phase * 2.0 - t * 0.7).sin();
	let width_mod = 1.0
		+ u.width_var * (0.5 * (x_phase * 0.9 + t * 0.5).sin() + 0.5 * (x_phase * 1.7 - t * 0.3).sin());
	let wth = (u.wave_width * width_mod).max(0.001);
	let d = (q.y - y_wave).abs();

	let wiggle = (fbm(q * 2.2 + DVec2::new(t * 0.35, -t * 0.22)) - 0.5) * 0.22;
	let soft = (u.edge_soft * (1.0 + wiggle)).max(0.0005);

	let k = 1.0 - glsl_smoothstep(wth, wth + soft, d);
	let core = 1.0 - glsl_smoothstep(0.0, wth * 0.55, d);
	let hi = (-((q.y - y_wave + wth * 0.33) / (wth * 0.55)).powi(2)).exp() * 0.85;
	let edge = glsl_smoothstep(wth * 0.85, wth * 1.04, d).powf(1.4) * u.edge_strength;

	let mut col = pal.cream;
	col = col.lerp(pal.pink, glsl_smoothstep(0.02, 0.85, k));
	col = col.lerp(pal.orange, glsl_smoothstep(0.35, 0.98, core));
	col = col.lerp(pal.white_hi, (hi * 0.8).clamp(0.0, 1.0));
	col = col.lerp(pal.edge, edge.clamp(0.0, 1.0));
	let vignette = glsl_smoothstep(0.98, 0.40, (p * 1.04).length());
	pal.cream.lerp(col, vignette)
}

fn mode_iridescent(p: DVec2, t: f64, u: &PanelUniforms) -> DVec3 {
	let pal = &u.palette;
	let mut uv = p * 1.2;
	uv += flow(uv, t) * 0.15;
	let mut base = pal.pink.lerp(pal.orange, 0.5 + 0.5 * (t * 0.6 + fbm(uv * 2.0)).sin());
	// Orthographic view: the surface always faces the camera.
	base = iridescence(base, 1.0, u.iridescence);
	let phase = fbm(uv * 3.0 + DVec2::new(t * 0.5, t * 0.5));
	let tau = std::f64::consts::TAU;
	base += DVec3::new(
		(tau * phase).sin(),
		(tau * (phase + 0.33)).sin(),
		(tau * (phase + 0.66)).sin(),
	) * 0.25;
	let gx = (fract(uv.x * 8.0 - 0.5) - 0.5).abs();
	let gy = (fract(uv.y * 8.0 - 0.5) - 0.5).abs();
	let grid = (-30.0 * gx.min(gy)).exp();
	base + pal.white_hi * (grid * 0.08)
}

fn mode_caustics(p: DVec2, t: f64, u: &PanelUniforms) -> DVec3 {
	let pal = &u.palette;
	let uv = p + flow(p * 1.3, t) * u.refract;
	let bands = ((uv.x + uv.y * 0.6) * 12.0 + fbm(uv * 2.4 + DVec2::new(t * 0.6, t * 0.6)) * 6.0).sin();
	let mask = glsl_smoothstep(0.2, 0.95, bands * 0.5 + 0.5);
	let channel = |offset: f64, strength: f64, speed: f64| {
		let d = flow(uv + DVec2::new(offset, offset), t) * (u.aberration * strength);
		glsl_smoothstep(0.65, 0.95, ((uv.x + d.x) * 16.0 + t * speed).sin() * 0.5 + 0.5)
	};
	let ca = DVec3::new(
		channel(0.01, 55.0, 1.0),
		channel(0.02, 35.0, 1.02),
		channel(0.03, 15.0, 0.98),
	) * 0.9 + mask * 0.1;
	pal.cream.lerp(pal.pink.lerp(pal.orange, mask), 0.25) + ca * 0.85
}

fn mode_neon_grid(p: DVec2, t: f64, u: &PanelUniforms) -> DVec3 {
	let pal = &u.palette;
	let mut uv = p * 1.1;
	uv += flow(uv, t) * 0.12;
	let gx = (uv.x * 9.0 + t * 0.7).sin();
	let gy = (uv.y * 9.0 - t * 0.6).sin();
	let lines = (-24.0 * gx.abs().min(gy.abs())).exp();
	let glow = iridescence(pal.pink.lerp(pal.orange, 0.5 + 0.5 * t.sin()), 0.6, u.iridescence);
	pal.cream.lerp(glow, (lines * 1.8).clamp(0.0, 1.0))
}

fn mode_metaballs(p: DVec2, t: f64, u: &PanelUniforms) -> DVec3 {
	let pal = &u.palette;
	let uv = p * 1.3;
	let centres = [
		DVec2::new(0.3 * (t * 0.7).sin(), 0.3 * (t * 0.6).cos()),
		DVec2::new(0.25 * (t * 0.9 + 1.2).sin(), -0.28 * (t * 0.8).cos()),
		DVec2::new(-0.32 * (t * 0.4).cos(), 0.27 * (t * 0.5).sin()),
	];
	let field: f64 = centres
		.iter()
		.map(|&c| 0.23 / (uv - c).length().max(1e-6))
		.sum();
	let cell = glsl_smoothstep(1.1, 1.35, field);
	let rim = glsl_smoothstep(1.35, 1.42, field) - glsl_smoothstep(1.42, 1.55, field);
	let col = pal.cream.lerp(pal.pink.lerp(pal.orange, cell), cell);
	col + pal.white_hi * (rim * 0.5)
}

fn mode_ripples(p: DVec2, t: f64, u: &PanelUniforms) -> DVec3 {
	let pal = &u.palette;
	let uv = p + flow(p * 1.1, t) * u.refract;
	let r = uv.length();
	let ring = 0.5 + 0.5 * (18.0 * r - t * 4.0 + fbm(uv * 3.0) * 2.5).sin();
	let ring = glsl_smoothstep(0.55, 0.85, ring);
	pal.cream.lerp(pal.pink.lerp(pal.orange, ring), 0.85)
}

/// Shade one pixel. `uv` has its origin at the panel's bottom-left corner.
pub fn shade(mode: PanelMode, u: &PanelUniforms, uv: DVec2) -> [f64; 4] {
	let t = u.time * u.speed;
	let aspect = u.size.0 / u.size.1.max(1e-4);
	let p = DVec2::new((uv.x - 0.5) * aspect, uv.y - 0.5);

	let col = match mode {
		PanelMode::Lava => mode_lava(p, t, u),
		PanelMode::Iridescent => mode_iridescent(p, t, u),
		PanelMode::Caustics => mode_caustics(p, t, u),
		PanelMode::NeonGrid => mode_neon_grid(p, t, u),
		PanelMode::Metaballs => mode_metaballs(p, t, u),
		PanelMode::Ripples => mode_ripples(p, t, u),
	};

	let grain = (hash(p * 1400.0 + DVec2::new(t * 11.0, t * 11.0)) * 2.0 - 1.0) * u.grain;
	let col = saturate_color(col + grain, u.saturation);
	let rgb = aces((col - 0.5) * u.contrast + 0.5);

	let alpha = u.alpha * rounded_rect_mask(uv, u.radius);
	rgb.extend(alpha).to_array()
}

#[cfg(test)]
mod tests {
	use super::*;

	const ALL_MODES: [PanelMode; 6] = [
		PanelMode::Lava,
		PanelMode::Iridescent,
		PanelMode::Caustics,
		PanelMode::NeonGrid,
		PanelMode::Metaballs,
		PanelMode::Ripples,
	];

	#[test]
	fn every_mode_stays_in_gamut() {
		let mut u = PanelUniforms {
			size: (3.2, 1.4),
			radius: 0.12,
			..PanelUniforms::default()
		};
		for mode in ALL_MODES {
			for step in 0..4 {
				u.time = step as f64 * 3.7;
				u.pointer = (step as f64 / 3.0, 1.0 - step as f64 / 3.0);
				for iy in 0..9 {
					for ix in 0..9 {
						let uv = DVec2::new(ix as f64 / 8.0, iy as f64 / 8.0);
						let px = shade(mode, &u, uv);
						for c in px {
							assert!(c.is_finite() && (0.0..=1.0).contains(&c), "{mode:?} {uv:?} {px:?}");
						}
					}
				}
			}
		}
	}

	#[test]
	fn rounded_corners_are_transparent() {
		assert_eq!(rounded_rect_mask(DVec2::new(0.5, 0.5), 0.2), 1.0);
		assert_eq!(rounded_rect_mask(DVec2::new(0.0, 0.0), 0.2), 0.0);
		assert!(rounded_rect_mask(DVec2::new(0.0, 0.5), 0.2) > 0.999);
		assert_eq!(rounded_rect_mask(DVec2::new(0.0, 0.0), 0.0), 1.0);
	}

	#[test]
	fn colour_helpers_keep_grey_and_brightness() {
		let c = hex(0xff8000);
		assert_eq!(c, DVec3::new(1.0, 128.0 / 255.0, 0.0));

		let grey = saturate_color(c, 0.0);
		assert!((grey.x - grey.y).abs() < 1e-12 && (grey.y - grey.z).abs() < 1e-12);
		assert!((saturate_color(c, 1.0) - c).length() < 1e-12);

		// Rotating about the grey axis leaves greys alone and keeps the length.
		let g = DVec3::splat(0.4);
		assert!((iridescence(g, 0.1, 1.0) - g).length() < 1e-12);
		let shifted = iridescence(c, 0.2, 1.0);
		assert!((shifted.length() - c.length()).abs() < 1e-12);
		assert!((shifted - c).length() > 1e-3);
	}

	#[test]
	fn noise_is_bounded_and_deterministic() {
		for i in 0..100 {
			let p = DVec2::new(i as f64 * 0.37 - 10.0, i as f64 * -0.21 + 3.0);
			let n = noise(p);
			assert!((0.0..=1.0).contains(&n));
			assert_eq!(n, noise(p));
			assert!((0.0..1.1).contains(&fbm(p)));
		}
	}
}
