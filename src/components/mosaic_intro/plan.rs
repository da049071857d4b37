use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use super::mask::AlphaMask;

/// Cell edge in css pixels.
pub const CELL_PX: f64 = 40.0;
pub const MAX_DPR: f64 = 2.0;
/// Mask opacity (0..=255) above which a cell centre counts as lettering.
pub const SEED_ALPHA_THRESHOLD: u8 = 32;

const NEIGHBORS: [(isize, isize); 8] = [
	(1, 0),
	(-1, 0),
	(0, 1),
	(0, -1),
	(1, 1),
	(-1, 1),
	(1, -1),
	(-1, -1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
	pub x: usize,
	pub y: usize,
}

/// The reveal grid in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridDims {
	pub cols: usize,
	pub rows: usize,
	pub tile_px: f64,
	pub width_px: u32,
	pub height_px: u32,
}

impl GridDims {
	pub fn for_viewport(css_width: f64, css_height: f64, dpr: f64, cell_css: f64) -> Self {
		let dpr = if dpr > 0.0 { dpr.min(MAX_DPR) } else { 1.0 };
		let width_px = (css_width.max(0.0) * dpr).floor() as u32;
		let height_px = (css_height.max(0.0) * dpr).floor() as u32;
		let tile_px = (cell_css * dpr).round().max(1.0);
		Self {
			cols: (width_px as f64 / tile_px).ceil() as usize,
			rows: (height_px as f64 / tile_px).ceil() as usize,
			tile_px,
			width_px,
			height_px,
		}
	}

	pub fn len(&self) -> usize {
		self.cols * self.rows
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn index(&self, cell: Cell) -> usize {
		cell.y * self.cols + cell.x
	}

	pub fn center_cell(&self) -> Cell {
		Cell {
			x: self.cols / 2,
			y: self.rows / 2,
		}
	}

	/// Pixel centre of a cell, where the mask is sampled.
	pub fn cell_center(&self, cell: Cell) -> (f64, f64) {
		(
			cell.x as f64 * self.tile_px + self.tile_px / 2.0,
			cell.y as f64 * self.tile_px + self.tile_px / 2.0,
		)
	}

	fn neighbor(&self, cell: Cell, (dx, dy): (isize, isize)) -> Option<Cell> {
		let x = cell.x.checked_add_signed(dx)?;
		let y = cell.y.checked_add_signed(dy)?;
		(x < self.cols && y < self.rows).then_some(Cell { x, y })
	}

	fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
		(0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Cell { x, y }))
	}
}

#[derive(Clone, Copy, Debug)]
pub struct RevealTiming {
	pub per_layer_ms: f64,
	pub jitter_max_ms: f64,
	pub fade_ms: f64,
	/// Head start so the first frame can be set up before anything fades.
	pub start_offset_ms: f64,
}

impl Default for RevealTiming {
	fn default() -> Self {
		Self {
			per_layer_ms: 18.0,
			jitter_max_ms: 22.0,
			fade_ms: 220.0,
			start_offset_ms: 40.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealTile {
	pub cell: Cell,
	pub layer: u32,
	pub reveal_at: f64,
}

#[derive(Clone, Debug)]
pub struct RevealPlan {
	/// One tile per cell, indexed by `GridDims::index`.
	pub tiles: Vec<RevealTile>,
	pub seed_count: usize,
	/// Latest `reveal_at + fade` over all tiles.
	pub horizon: f64,
}

/// Cells whose centre lies on the lettering, or the centre cell when none do.
pub fn seed_cells(dims: &GridDims, mask: &AlphaMask) -> Vec<Cell> {
	let mut seeds: Vec<Cell> = dims
		.cells()
		.filter(|&cell| {
			let (cx, cy) = dims.cell_center(cell);
			mask.alpha_at(cx, cy) > SEED_ALPHA_THRESHOLD
		})
		.collect();
	if seeds.is_empty() && !dims.is_empty() {
		seeds.push(dims.center_cell());
	}
	seeds
}

/// Multi-source BFS over the 8-connected grid; neighbours are visited in a
/// fresh random order at every expansion so the frontier grows unevenly.
pub fn bfs_layers(dims: &GridDims, seeds: &[Cell], rng: &mut impl Rng) -> Vec<u32> {
	let mut layers: Vec<Option<u32>> = vec![None; dims.len()];
	let mut queue = VecDeque::with_capacity(dims.len());
	for &seed in seeds {
		let slot = &mut layers[dims.index(seed)];
		if slot.is_none() {
			*slot = Some(0);
			queue.push_back((seed, 0));
		}
	}

	let mut order = NEIGHBORS;
	while let Some((cell, layer)) = queue.pop_front() {
		order.shuffle(rng);
		for &step in &order {
			let Some(next) = dims.neighbor(cell, step) else {
				continue;
			};
			let slot = &mut layers[dims.index(next)];
			if slot.is_none() {
				*slot = Some(layer + 1);
				queue.push_back((next, layer + 1));
			}
		}
	}

	// A non-empty seed set reaches every cell of a full grid.
	layers.into_iter().map(|l| l.unwrap_or(0)).collect()
}

pub fn plan_reveal(
	dims: &GridDims,
	mask: &AlphaMask,
	timing: &RevealTiming,
	now: f64,
	rng: &mut impl Rng,
) -> RevealPlan {
	let seeds = seed_cells(dims, mask);
	let layers = bfs_layers(dims, &seeds, rng);
	let start = now + timing.start_offset_ms;

	let mut horizon = start;
	let tiles = dims
		.cells()
		.zip(layers)
		.map(|(cell, layer)| {
			let jitter = if timing.jitter_max_ms > 0.0 {
				rng.random_range(0.0..timing.jitter_max_ms)
			} else {
				0.0
			};
			let reveal_at = start + layer as f64 * timing.per_layer_ms + jitter;
			horizon = horizon.max(reveal_at + timing.fade_ms);
			RevealTile {
				cell,
				layer,
				reveal_at,
			}
		})
		.collect();

	RevealPlan {
		tiles,
		seed_count: seeds.len(),
		horizon,
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	fn dims(cols: usize, rows: usize) -> GridDims {
		GridDims::for_viewport(cols as f64 * 10.0, rows as f64 * 10.0, 1.0, 10.0)
	}

	fn chebyshev(a: Cell, b: Cell) -> u32 {
		a.x.abs_diff(b.x).max(a.y.abs_diff(b.y)) as u32
	}

	#[test]
	fn viewport_dims_round_up_partial_cells() {
		let d = GridDims::for_viewport(1000.0, 610.0, 1.0, 40.0);
		assert_eq!((d.cols, d.rows), (25, 16));
		let hi = GridDims::for_viewport(1000.0, 610.0, 3.0, 40.0);
		assert_eq!(hi.tile_px, 80.0);
		assert_eq!((hi.width_px, hi.height_px), (2000, 1220));
	}

	#[test]
	fn seeds_follow_mask() {
		let d = dims(6, 4);
		let mut mask = AlphaMask::empty(60, 40);
		mask.fill_rect(10, 10, 10, 10, 255);
		mask.fill_rect(40, 30, 10, 10, 20);
		let seeds = seed_cells(&d, &mask);
		assert_eq!(seeds, vec![Cell { x: 1, y: 1 }]);
	}

	#[test]
	fn empty_mask_seeds_centre() {
		let d = dims(7, 5);
		let seeds = seed_cells(&d, &AlphaMask::empty(70, 50));
		assert_eq!(seeds, vec![Cell { x: 3, y: 2 }]);
	}

	#[test]
	fn layers_are_hop_distance_to_nearest_seed() {
		let mut rng = SmallRng::seed_from_u64(7);
		let d = dims(23, 17);
		let seeds = [Cell { x: 2, y: 3 }, Cell { x: 18, y: 12 }, Cell { x: 9, y: 16 }];
		for _ in 0..5 {
			let layers = bfs_layers(&d, &seeds, &mut rng);
			for cell in d.cells() {
				let expected = seeds.iter().map(|&s| chebyshev(s, cell)).min().unwrap();
				assert_eq!(layers[d.index(cell)], expected, "{cell:?}");
			}
		}
	}

	#[test]
	fn adjacent_layers_differ_by_at_most_one() {
		let mut rng = SmallRng::seed_from_u64(11);
		let d = dims(30, 20);
		let mut mask = AlphaMask::empty(300, 200);
		mask.fill_rect(40, 60, 120, 30, 255);
		let plan = plan_reveal(&d, &mask, &RevealTiming::default(), 0.0, &mut rng);
		for cell in d.cells() {
			let here = plan.tiles[d.index(cell)].layer;
			for step in NEIGHBORS {
				if let Some(n) = d.neighbor(cell, step) {
					assert!(here.abs_diff(plan.tiles[d.index(n)].layer) <= 1);
				}
			}
		}
	}

	#[test]
	fn plan_covers_grid_with_bounded_reveal_times() {
		let mut rng = SmallRng::seed_from_u64(3);
		let d = dims(12, 9);
		let timing = RevealTiming::default();
		let plan = plan_reveal(&d, &AlphaMask::empty(120, 90), &timing, 1000.0, &mut rng);
		assert_eq!(plan.tiles.len(), d.len());
		assert_eq!(plan.seed_count, 1);

		let mut latest: f64 = 0.0;
		for (i, tile) in plan.tiles.iter().enumerate() {
			assert_eq!(d.index(tile.cell), i);
			let base = 1040.0 + tile.layer as f64 * timing.per_layer_ms;
			assert!(tile.reveal_at >= base);
			assert!(tile.reveal_at < base + timing.jitter_max_ms);
			latest = latest.max(tile.reveal_at + timing.fade_ms);
		}
		assert_eq!(plan.horizon, latest);
	}

	#[test]
	fn zero_sized_viewport_yields_empty_plan() {
		let mut rng = SmallRng::seed_from_u64(1);
		let d = GridDims::for_viewport(0.0, 0.0, 1.0, CELL_PX);
		let plan = plan_reveal(&d, &AlphaMask::empty(0, 0), &RevealTiming::default(), 5.0, &mut rng);
		assert!(plan.tiles.is_empty());
		assert_eq!(plan.horizon, 45.0);
	}
}
