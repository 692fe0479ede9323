//! The fixed 256-entry color table every Chasm asset indexes into, and the
//! nearest-color search the quantizer runs against it.

mod load;
mod save;

pub use load::Format;

use {
	crate::{NUM_PAL_ENTRIES, PAL_LEN, RGB_SIZE},
	glam::Vec3,
};

pub type Rgb = [u8; RGB_SIZE];

/// Pink marker color the pal2all exports put at index 255.
pub const PINK: Rgb = [0xFC, 0x00, 0xC8];
pub const PINK_INDEX: u8 = u8::MAX;

const SIX_BIT_MAX: u8 = 63;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Palette(pub [Rgb; NUM_PAL_ENTRIES]);

impl Default for Palette {
	fn default() -> Self {
		Palette([[0; RGB_SIZE]; NUM_PAL_ENTRIES])
	}
}

impl Palette {
	/// 768 bytes of packed RGB; a palette whose channels all fit in 6 bits is
	/// widened to 8 bits. Returns whether that happened.
	pub fn fromRawBytes(bytes: &[u8; PAL_LEN]) -> (Palette, bool) {
		let mut palette = Palette::default();
		for (entry, rgb) in palette.0.iter_mut().zip(bytes.chunks_exact(RGB_SIZE)) {
			entry.copy_from_slice(rgb);
		}
		let widened = palette.is6Bit();
		if widened {
			for channel in palette.0.iter_mut().flatten() {
				*channel <<= 2;
			}
		}
		(palette, widened)
	}

	pub fn is6Bit(&self) -> bool {
		self.0.iter().flatten().all(|&channel| channel <= SIX_BIT_MAX)
	}

	#[inline]
	pub fn color(&self, index: u8) -> Rgb {
		self.0[index as usize]
	}

	pub fn toBytes(&self) -> Vec<u8> {
		self.0.iter().flatten().copied().collect()
	}

	/// Copy with index 255 overridden by [`PINK`].
	#[must_use]
	pub fn withPink(&self) -> Palette {
		let mut palette = self.clone();
		palette.0[PINK_INDEX as usize] = PINK;
		palette
	}

	/// Linear scan for the entry with the smallest squared RGB distance; the
	/// lowest index wins ties and an exact hit ends the scan.
	pub fn nearest(&self, color: Vec3) -> u8 {
		let (mut nearestSquaredDist, mut nearestIndex) = (f32::MAX, 0);
		for (i, &entry) in self.0.iter().enumerate() {
			let squaredDist = (color - rgbToVec3(entry)).length_squared();
			if squaredDist < nearestSquaredDist {
				(nearestSquaredDist, nearestIndex) = (squaredDist, i);
				if squaredDist == 0.0 {
					break;
				}
			}
		}
		nearestIndex as _
	}

	#[inline]
	pub fn nearestRgb(&self, rgb: Rgb) -> u8 {
		self.nearest(rgbToVec3(rgb))
	}
}

#[inline(always)]
pub fn rgbToVec3(rgb: Rgb) -> Vec3 {
	Vec3::from_array(rgb.map(f32::from))
}
