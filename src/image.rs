use {
	crate::{
		error::{Error, Result},
		palette::Palette,
		RGBA_SIZE,
	},
	png::{BitDepth, ColorType, Transformations},
	std::io::{Read, Write},
};

/// Decoder that hands back 8-bit samples whatever the file stores.
pub fn pngDecoder<R: Read>(r: R) -> png::Decoder<R> {
	let mut decoder = png::Decoder::new(r);
	decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
	decoder
}

/// Row-major RGBA8, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
	pub width: usize,
	pub height: usize,
	data: Vec<u8>,
}

impl RgbaImage {
	pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<RgbaImage> {
		if width == 0 || height == 0 {
			return Err(Error::BadImage(format!("{width}x{height} has no pixels")));
		}
		if data.len() != width * height * RGBA_SIZE {
			return Err(Error::BadImage(format!("{width}x{height} RGBA needs {} bytes, got {}", width * height * RGBA_SIZE, data.len())));
		}
		Ok(RgbaImage { width, height, data })
	}

	pub fn fromPNG(r: impl Read) -> Result<RgbaImage> {
		RgbaImage::fromPNGReader(pngDecoder(r).read_info()?)
	}

	/// `png` must come from [`pngDecoder`] so only 8-bit gray/RGB layouts remain.
	pub fn fromPNGReader<R: Read>(mut png: png::Reader<R>) -> Result<RgbaImage> {
		let mut buffer = vec![0; png.output_buffer_size()];
		let frame = png.next_frame(&mut buffer)?;
		buffer.truncate(frame.buffer_size());
		if frame.bit_depth != BitDepth::Eight {
			return Err(Error::BadImage(format!("unexpected {:?} output depth", frame.bit_depth)));
		}
		let data = match frame.color_type {
			ColorType::Rgba => buffer,
			ColorType::Rgb => buffer.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], u8::MAX]).collect(),
			ColorType::GrayscaleAlpha => buffer.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], p[1]]).collect(),
			ColorType::Grayscale => buffer.iter().flat_map(|&v| [v, v, v, u8::MAX]).collect(),
			ColorType::Indexed => return Err(Error::BadImage("indexed PNG was not expanded".into())),
		};
		RgbaImage::new(frame.width as _, frame.height as _, data)
	}

	#[inline]
	pub fn pixel(&self, x: usize, y: usize) -> [u8; RGBA_SIZE] {
		let i = (y * self.width + x) * RGBA_SIZE;
		[self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
	}

	pub fn pixels(&self) -> impl Iterator<Item = [u8; RGBA_SIZE]> + '_ {
		self.data.chunks_exact(RGBA_SIZE).map(|p| [p[0], p[1], p[2], p[3]])
	}

	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Next mip level: each 2x2 block averaged (truncating). Color is weighted
	/// by alpha so transparent pixels do not bleed into their neighbours, and
	/// alpha itself is the block mean; a fully opaque block reduces to the plain
	/// per-channel mean. An odd trailing row or column is dropped; `None` once a
	/// dimension would reach zero.
	pub fn halfSize(&self) -> Option<RgbaImage> {
		let (width, height) = (self.width / 2, self.height / 2);
		if width == 0 || height == 0 {
			return None;
		}
		let mut data = Vec::with_capacity(width * height * RGBA_SIZE);
		for y in 0..height {
			for x in 0..width {
				let block = [(0, 0), (1, 0), (0, 1), (1, 1)].map(|(Δx, Δy)| self.pixel(2 * x + Δx, 2 * y + Δy));
				let alphaSum: u32 = block.iter().map(|p| u32::from(p[3])).sum();
				for c in 0..3 {
					let channel = if alphaSum == 0 {
						block.iter().map(|p| u32::from(p[c])).sum::<u32>() / 4
					} else {
						block.iter().map(|p| u32::from(p[c]) * u32::from(p[3])).sum::<u32>() / alphaSum
					};
					data.push(channel as u8);
				}
				data.push((alphaSum / 4) as u8);
			}
		}
		Some(RgbaImage { width, height, data })
	}

	pub fn writePNG(&self, mut w: impl Write) -> Result<()> {
		let mut png = png::Encoder::new(&mut w, self.width as _, self.height as _);
		png.set_color(ColorType::Rgba);
		png.set_depth(BitDepth::Eight);
		let mut png = png.write_header()?;
		png.write_image_data(&self.data)?;
		png.finish()?;
		Ok(w.flush()?)
	}
}

/// Row-major palette indices; what the quantizer hands back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexImage {
	pub width: usize,
	pub height: usize,
	pub data: Vec<u8>,
}

impl IndexImage {
	#[inline]
	pub fn index(&self, x: usize, y: usize) -> u8 {
		self.data[y * self.width + x]
	}

	/// Direct palette lookup; `transparentIndex` pixels get alpha 0.
	pub fn toRgba(&self, palette: &Palette, transparentIndex: Option<u8>) -> RgbaImage {
		let data = self
			.data
			.iter()
			.flat_map(|&index| {
				let [r, g, b] = palette.color(index);
				[r, g, b, if Some(index) == transparentIndex { 0 } else { u8::MAX }]
			})
			.collect();
		RgbaImage { width: self.width, height: self.height, data }
	}

	/// Indexed PNG; a tRNS chunk makes `transparentIndex` see-through.
	/// `w` is flushed before returning.
	pub fn writePNG(&self, mut w: impl Write, palette: &Palette, transparentIndex: Option<u8>) -> Result<()> {
		let mut png = png::Encoder::new(&mut w, self.width as _, self.height as _);
		png.set_color(ColorType::Indexed);
		png.set_depth(BitDepth::Eight);
		png.set_palette(palette.toBytes());
		if let Some(index) = transparentIndex {
			let mut trns = vec![u8::MAX; index as usize + 1];
			trns[index as usize] = 0;
			png.set_trns(trns);
		}
		let mut png = png.write_header()?;
		png.write_image_data(&self.data)?;
		png.finish()?;
		Ok(w.flush()?)
	}
}
