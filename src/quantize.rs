use {
	crate::{
		dither::{DitherMode, ErrorRows, Noise},
		error::{Error, Result},
		image::{IndexImage, RgbaImage},
		palette::{rgbToVec3, Palette, Rgb, PINK},
	},
	glam::Vec3,
	serde::Deserialize,
};

const CHANNEL_MAX: f32 = u8::MAX as f32;

/// Which palette slot stands for "transparent".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Reserved {
	Index(u8),
	/// Whatever entry lies nearest to this color in the palette in use.
	Nearest(Rgb),
}

/// Pixels with `alpha < alphaBelow` skip the search and become the reserved
/// index; `alphaBelow == 0` means nothing is transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct TransparencyPolicy {
	pub alphaBelow: u8,
	pub reserved: Reserved,
}

impl TransparencyPolicy {
	pub const OPAQUE: Self = TransparencyPolicy { alphaBelow: 0, reserved: Reserved::Index(0) };

	/// The asset formats disagree on both the alpha test and the slot, so each gets its own preset.
	pub const PRESETS: [(&'static str, Self); 5] = [
		("cel", TransparencyPolicy { alphaBelow: 1, reserved: Reserved::Index(u8::MAX) }),
		("car", TransparencyPolicy { alphaBelow: u8::MAX, reserved: Reserved::Nearest([4, 4, 4]) }),
		("sprite", TransparencyPolicy { alphaBelow: 1, reserved: Reserved::Index(0) }),
		("pink", TransparencyPolicy { alphaBelow: 1, reserved: Reserved::Nearest(PINK) }),
		("floor", TransparencyPolicy::OPAQUE),
	];

	pub fn forFormat(name: &str) -> Result<Self> {
		TransparencyPolicy::PRESETS
			.iter()
			.find(|(preset, _)| *preset == name)
			.map(|&(_, policy)| policy)
			.ok_or_else(|| Error::UnknownFormat(name.into()))
	}

	#[inline]
	pub fn isTransparent(&self, alpha: u8) -> bool {
		alpha < self.alphaBelow
	}

	pub fn reservedIndex(&self, palette: &Palette) -> u8 {
		match self.reserved {
			Reserved::Index(index) => index,
			Reserved::Nearest(rgb) => palette.nearestRgb(rgb),
		}
	}

	/// `None` when the policy never produces transparent pixels.
	pub fn transparentIndex(&self, palette: &Palette) -> Option<u8> {
		(self.alphaBelow > 0).then(|| self.reservedIndex(palette))
	}
}

impl Default for TransparencyPolicy {
	fn default() -> Self {
		TransparencyPolicy::OPAQUE
	}
}

pub struct Quantizer<'a> {
	palette: &'a Palette,
	mode: DitherMode,
	transparency: TransparencyPolicy,
	noiseAmplitude: u8,
	noiseSeed: Option<u64>,
}

impl<'a> Quantizer<'a> {
	pub const DEFAULT_NOISE_AMPLITUDE: u8 = 8;

	pub fn new(palette: &'a Palette, mode: DitherMode, transparency: TransparencyPolicy) -> Self {
		Quantizer { palette, mode, transparency, noiseAmplitude: Self::DEFAULT_NOISE_AMPLITUDE, noiseSeed: None }
	}

	#[must_use]
	pub fn noiseAmplitude(mut self, amplitude: u8) -> Self {
		self.noiseAmplitude = amplitude;
		self
	}

	/// Fixes the noise sequence; without a seed every run draws fresh entropy.
	#[must_use]
	pub fn noiseSeed(mut self, seed: Option<u64>) -> Self {
		self.noiseSeed = seed;
		self
	}

	pub fn run(&self, image: &RgbaImage) -> IndexImage {
		let (width, height, palette) = (image.width, image.height, self.palette);
		log::debug!("quantizing {width}x{height} with {} dithering", self.mode);
		let reservedIndex = self.transparency.reservedIndex(palette);
		let kernel = self.mode.kernel();
		let mut errorRows = kernel.map(|kernel| ErrorRows::new(width, kernel));
		let mut noise =
			(self.mode == DitherMode::Noise).then(|| Noise::new(self.noiseAmplitude, self.noiseSeed));
		let mut data = Vec::with_capacity(width * height);
		for y in 0..height {
			for x in 0..width {
				let [r, g, b, alpha] = image.pixel(x, y);
				if self.transparency.isTransparent(alpha) {
					data.push(reservedIndex);
					continue;
				}
				let mut color = rgbToVec3([r, g, b]);
				if let Some(offset) = self.mode.orderedOffset(x, y) {
					color += offset as f32;
				}
				if let Some(noise) = &mut noise {
					color += noise.offset() as f32;
				}
				if let Some(errorRows) = &errorRows {
					color += errorRows.carried(x);
				}
				let color = color.clamp(Vec3::ZERO, Vec3::splat(CHANNEL_MAX));
				let index = palette.nearest(color);
				if let (Some(errorRows), Some(kernel)) = (&mut errorRows, kernel) {
					errorRows.diffuse(x, color - rgbToVec3(palette.color(index)), kernel);
				}
				data.push(index);
			}
			if let Some(errorRows) = &mut errorRows {
				errorRows.nextRow();
			}
		}
		IndexImage { width, height, data }
	}
}

/// One-shot form of [`Quantizer::run`] with the default noise settings.
pub fn quantize(
	image: &RgbaImage,
	palette: &Palette,
	mode: DitherMode,
	transparency: TransparencyPolicy,
) -> IndexImage {
	Quantizer::new(palette, mode, transparency).run(image)
}
