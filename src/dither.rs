//! Dithering strategies applied to the working color before the palette
//! search: error diffusion kernels, Bayer threshold matrices, and noise.

use {
	clap::ValueEnum,
	core::fmt,
	glam::Vec3,
	rand::{rngs::StdRng, Rng, SeedableRng},
	serde::Deserialize,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DitherMode {
	#[default]
	None,
	FloydSteinberg,
	SierraLite,
	Bayer4x4,
	Bayer8x8,
	Noise,
	Atkinson,
}

impl DitherMode {
	pub const ALL: [DitherMode; 7] = [
		DitherMode::None,
		DitherMode::FloydSteinberg,
		DitherMode::SierraLite,
		DitherMode::Bayer4x4,
		DitherMode::Bayer8x8,
		DitherMode::Noise,
		DitherMode::Atkinson,
	];

	pub fn kernel(self) -> Option<&'static Kernel> {
		match self {
			DitherMode::FloydSteinberg => Some(&FLOYD_STEINBERG),
			DitherMode::SierraLite => Some(&SIERRA_LITE),
			DitherMode::Atkinson => Some(&ATKINSON),
			_ => None,
		}
	}

	/// Ordered-dither offset for pixel `(x, y)`, centered on the matrix midpoint.
	pub fn orderedOffset(self, x: usize, y: usize) -> Option<i32> {
		match self {
			DitherMode::Bayer4x4 => Some(i32::from(BAYER4[y % 4][x % 4]) - 8),
			DitherMode::Bayer8x8 => Some(i32::from(BAYER8[y % 8][x % 8]) - 32),
			_ => None,
		}
	}
}

impl fmt::Display for DitherMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			DitherMode::None => "no",
			DitherMode::FloydSteinberg => "Floyd-Steinberg",
			DitherMode::SierraLite => "Sierra Lite",
			DitherMode::Bayer4x4 => "Bayer 4x4",
			DitherMode::Bayer8x8 => "Bayer 8x8",
			DitherMode::Noise => "noise",
			DitherMode::Atkinson => "Atkinson",
		})
	}
}

#[rustfmt::skip]
pub const BAYER4: [[u8; 4]; 4] = [
	[ 0,  8,  2, 10],
	[12,  4, 14,  6],
	[ 3, 11,  1,  9],
	[15,  7, 13,  5],
];

#[rustfmt::skip]
pub const BAYER8: [[u8; 8]; 8] = [
	[ 0, 32,  8, 40,  2, 34, 10, 42],
	[48, 16, 56, 24, 50, 18, 58, 26],
	[12, 44,  4, 36, 14, 46,  6, 38],
	[60, 28, 52, 20, 62, 30, 54, 22],
	[ 3, 35, 11, 43,  1, 33,  9, 41],
	[51, 19, 59, 27, 49, 17, 57, 25],
	[15, 47,  7, 39, 13, 45,  5, 37],
	[63, 31, 55, 23, 61, 29, 53, 21],
];

/// One share of the residual, sent `dx` columns across and `dy` rows down.
#[derive(Clone, Copy, Debug)]
pub struct Tap {
	pub dx: isize,
	pub dy: usize,
	pub weight: f32,
}

#[derive(Debug)]
pub struct Kernel {
	pub taps: &'static [Tap],
}

impl Kernel {
	/// How many rows below the current one the kernel reaches.
	pub fn depth(&self) -> usize {
		self.taps.iter().map(|tap| tap.dy).max().unwrap_or(0)
	}

	pub fn totalWeight(&self) -> f32 {
		self.taps.iter().map(|tap| tap.weight).sum()
	}
}

pub static FLOYD_STEINBERG: Kernel = Kernel {
	taps: &[
		Tap { dx: 1, dy: 0, weight: 7.0 / 16.0 },
		Tap { dx: -1, dy: 1, weight: 3.0 / 16.0 },
		Tap { dx: 0, dy: 1, weight: 5.0 / 16.0 },
		Tap { dx: 1, dy: 1, weight: 1.0 / 16.0 },
	],
};

pub static SIERRA_LITE: Kernel = Kernel {
	taps: &[
		Tap { dx: 1, dy: 0, weight: 2.0 / 4.0 },
		Tap { dx: -1, dy: 1, weight: 1.0 / 4.0 },
		Tap { dx: 0, dy: 1, weight: 1.0 / 4.0 },
	],
};

// 6/8 of the error moves on, the other 2/8 is dropped.
pub static ATKINSON: Kernel = Kernel {
	taps: &[
		Tap { dx: 1, dy: 0, weight: 1.0 / 8.0 },
		Tap { dx: 2, dy: 0, weight: 1.0 / 8.0 },
		Tap { dx: -1, dy: 1, weight: 1.0 / 8.0 },
		Tap { dx: 0, dy: 1, weight: 1.0 / 8.0 },
		Tap { dx: 1, dy: 1, weight: 1.0 / 8.0 },
		Tap { dx: 0, dy: 2, weight: 1.0 / 8.0 },
	],
};

/// Columns of slack on either side of a row so edge taps land somewhere harmless.
const PAD: usize = 2;

/// Carried error for the current row and the rows a kernel reaches into.
/// Rows rotate (pointer moves only) after each scanline and the recycled row
/// is zeroed before it starts collecting again.
pub(crate) struct ErrorRows {
	rows: Vec<Box<[Vec3]>>,
}

impl ErrorRows {
	pub fn new(width: usize, kernel: &Kernel) -> Self {
		ErrorRows { rows: (0..=kernel.depth()).map(|_| vec![Vec3::ZERO; width + 2 * PAD].into_boxed_slice()).collect() }
	}

	#[inline]
	pub fn carried(&self, x: usize) -> Vec3 {
		self.rows[0][x + PAD]
	}

	#[inline]
	pub fn diffuse(&mut self, x: usize, error: Vec3, kernel: &Kernel) {
		for &Tap { dx, dy, weight } in kernel.taps {
			let column = ((x + PAD) as isize + dx) as usize;
			self.rows[dy][column] += error * weight;
		}
	}

	pub fn nextRow(&mut self) {
		self.rows.rotate_left(1);
		if let Some(recycled) = self.rows.last_mut() {
			recycled.fill(Vec3::ZERO);
		}
	}
}

/// Per-pixel uniform offset in `[-amplitude, amplitude]`, one draw shared by all channels.
pub(crate) struct Noise {
	rng: StdRng,
	amplitude: i32,
}

impl Noise {
	pub fn new(amplitude: u8, seed: Option<u64>) -> Self {
		let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
		Noise { rng, amplitude: i32::from(amplitude) }
	}

	#[inline]
	pub fn offset(&mut self) -> i32 {
		self.rng.gen_range(-self.amplitude..=self.amplitude)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kernelsNeverAmplifyError() {
		for mode in DitherMode::ALL {
			if let Some(kernel) = mode.kernel() {
				assert!(kernel.totalWeight() <= 1.0 + f32::EPSILON, "{mode}");
				assert!(kernel.taps.iter().all(|tap| tap.weight > 0.0));
				// nothing may flow back into already visited pixels
				assert!(kernel.taps.iter().all(|tap| tap.dy > 0 || tap.dx > 0));
			}
		}
		assert!((FLOYD_STEINBERG.totalWeight() - 1.0).abs() < 1e-6);
		assert!((SIERRA_LITE.totalWeight() - 1.0).abs() < 1e-6);
		assert!((ATKINSON.totalWeight() - 0.75).abs() < 1e-6);
		assert_eq!(ATKINSON.depth(), 2);
	}

	#[test]
	fn bayerMatricesArePermutations() {
		let mut seen4 = BAYER4.iter().flatten().copied().collect::<Vec<_>>();
		seen4.sort_unstable();
		assert_eq!(seen4, (0..16).collect::<Vec<_>>());
		let mut seen8 = BAYER8.iter().flatten().copied().collect::<Vec<_>>();
		seen8.sort_unstable();
		assert_eq!(seen8, (0..64).collect::<Vec<_>>());
	}

	#[test]
	fn orderedOffsetsAreCentered() {
		assert_eq!(DitherMode::Bayer4x4.orderedOffset(0, 0), Some(-8));
		assert_eq!(DitherMode::Bayer4x4.orderedOffset(4, 3), Some(7));
		assert_eq!(DitherMode::Bayer8x8.orderedOffset(7, 7), Some(-11));
		assert_eq!(DitherMode::FloydSteinberg.orderedOffset(0, 0), None);
	}

	#[test]
	fn errorRowsDropEdgeTapsAndRecycleRows() {
		let mut rows = ErrorRows::new(2, &FLOYD_STEINBERG);
		rows.diffuse(1, Vec3::splat(16.0), &FLOYD_STEINBERG);
		assert_eq!(rows.carried(0), Vec3::ZERO);
		rows.nextRow();
		assert_eq!(rows.carried(0), Vec3::splat(3.0));
		assert_eq!(rows.carried(1), Vec3::splat(5.0));
		rows.nextRow();
		assert_eq!(rows.carried(0), Vec3::ZERO);
		assert_eq!(rows.carried(1), Vec3::ZERO);
	}

	#[test]
	fn seededNoiseRepeatsAndStaysInRange() {
		let draws = |seed| {
			let mut noise = Noise::new(8, Some(seed));
			(0..64).map(|_| noise.offset()).collect::<Vec<_>>()
		};
		assert_eq!(draws(7), draws(7));
		assert!(draws(7).iter().all(|offset| (-8..=8).contains(offset)));
	}

	#[test]
	fn namesReadInLogLines() {
		assert_eq!(format!("{} dithering", DitherMode::None), "no dithering");
		assert_eq!(format!("{} dithering", DitherMode::SierraLite), "Sierra Lite dithering");
	}

	#[test]
	fn parsesKebabCaseNames() {
		assert_eq!(DitherMode::from_str("floyd-steinberg", false), Ok(DitherMode::FloydSteinberg));
		assert_eq!(DitherMode::from_str("bayer4x4", false), Ok(DitherMode::Bayer4x4));
	}
}
