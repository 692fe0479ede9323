use {
	super::{Palette, Rgb},
	crate::{
		error::{Error, IoResultExt, Result},
		image::{pngDecoder, RgbaImage},
		NUM_PAL_ENTRIES, PAL_LEN, RGB_SIZE,
	},
	byteorder::{ReadBytesExt, BE},
	core::fmt,
	memchr::memchr,
	png::ColorType,
	std::{fs, io, path::Path, str},
};

pub(super) const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
pub(super) const JASC_MAGIC: &str = "JASC-PAL";
pub(super) const JASC_VERSION: &str = "0100";
pub(super) const GIMP_MAGIC: &str = "GIMP Palette";
pub(super) const C_ARRAY_DECLARATOR: &str = "[256][3]";

const ACO_RGB_SPACE: u16 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
	Raw { widened: bool },
	Jasc,
	Gimp,
	Aco,
	Png,
	CHeader,
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Format::Raw { widened: false } => "raw RGB",
			Format::Raw { widened: true } => "raw 6-bit RGB",
			Format::Jasc => "JASC-PAL",
			Format::Gimp => "GIMP palette",
			Format::Aco => "Adobe ACO",
			Format::Png => "PNG",
			Format::CHeader => "C header",
		})
	}
}

impl Palette {
	pub fn load(path: impl AsRef<Path>) -> Result<(Palette, Format)> {
		let path = path.as_ref();
		let loaded = Palette::fromBytes(&fs::read(path).atPath(path)?)?;
		log::debug!("{path:?}: {} palette", loaded.1);
		Ok(loaded)
	}

	/// Sniffs the interchange format from the content, not the file name.
	pub fn fromBytes(bytes: &[u8]) -> Result<(Palette, Format)> {
		if bytes.starts_with(&PNG_SIGNATURE) {
			return Ok((fromPNG(bytes)?, Format::Png));
		}
		match firstLine(bytes) {
			JASC_MAGIC => return Ok((fromJasc(asText(bytes)?)?, Format::Jasc)),
			GIMP_MAGIC => return Ok((fromGimp(asText(bytes)?)?, Format::Gimp)),
			_ => {}
		}
		if let Ok(raw) = <&[u8; PAL_LEN]>::try_from(bytes) {
			let (palette, widened) = Palette::fromRawBytes(raw);
			return Ok((palette, Format::Raw { widened }));
		}
		if let Some(text) = str::from_utf8(bytes).ok().filter(|text| text.contains(C_ARRAY_DECLARATOR)) {
			return Ok((fromCHeader(text)?, Format::CHeader));
		}
		if matches!(bytes, [0, 1 | 2, ..]) {
			return Ok((fromAco(bytes)?, Format::Aco));
		}
		Err(Error::UnknownPaletteFormat { len: bytes.len() })
	}
}

fn firstLine(bytes: &[u8]) -> &str {
	let line = &bytes[..memchr(b'\n', bytes).unwrap_or(bytes.len())];
	str::from_utf8(line).map_or("", |line| line.trim_end_matches('\r'))
}

fn asText(bytes: &[u8]) -> Result<&str> {
	str::from_utf8(bytes).map_err(|err| Error::BadPalette(err.to_string()))
}

/// Text formats may list fewer than 256 colors; the tail stays black.
fn fromEntries(entries: &[Rgb], what: &str) -> Result<Palette> {
	if entries.len() > NUM_PAL_ENTRIES {
		return Err(Error::BadPalette(format!("{what}: {} entries, at most {NUM_PAL_ENTRIES} allowed", entries.len())));
	}
	if entries.len() < NUM_PAL_ENTRIES {
		log::warn!("{what}: only {} entries, padding with black", entries.len());
	}
	let mut palette = Palette::default();
	palette.0[..entries.len()].copy_from_slice(entries);
	Ok(palette)
}

fn parseTriple(line: &str) -> Result<Rgb> {
	let mut fields = line.split_whitespace();
	let mut rgb = [0; RGB_SIZE];
	for channel in &mut rgb {
		*channel = fields
			.next()
			.and_then(|field| field.parse().ok())
			.ok_or_else(|| Error::BadPalette(format!("bad color line {line:?}")))?;
	}
	Ok(rgb)
}

fn fromJasc(text: &str) -> Result<Palette> {
	let mut lines = text.lines().map(str::trim).skip(1);
	match lines.next() {
		Some(JASC_VERSION) => {}
		version => return Err(Error::BadPalette(format!("{JASC_MAGIC}: unsupported version {version:?}"))),
	}
	let count: usize = lines
		.next()
		.and_then(|line| line.parse().ok())
		.ok_or_else(|| Error::BadPalette(format!("{JASC_MAGIC}: missing entry count")))?;
	let entries =
		lines.filter(|line| !line.is_empty()).take(count).map(parseTriple).collect::<Result<Vec<_>>>()?;
	if entries.len() < count {
		return Err(Error::BadPalette(format!("{JASC_MAGIC}: {count} entries declared, {} found", entries.len())));
	}
	fromEntries(&entries, JASC_MAGIC)
}

fn fromGimp(text: &str) -> Result<Palette> {
	let entries = text
		.lines()
		.skip(1)
		.map(str::trim)
		.filter(|line| {
			!(line.is_empty() || line.starts_with('#') || line.starts_with("Name:") || line.starts_with("Columns:"))
		})
		.map(parseTriple)
		.collect::<Result<Vec<_>>>()?;
	fromEntries(&entries, GIMP_MAGIC)
}

/// Big-endian; only the RGB color space is accepted. Version 2 files carry a
/// UTF-16 name after every color, which is skipped.
fn fromAco(bytes: &[u8]) -> Result<Palette> {
	let cursor = &mut io::Cursor::new(bytes);
	let version = cursor.read_u16::<BE>()?;
	let count = cursor.read_u16::<BE>()? as usize;
	let mut entries = Vec::with_capacity(count);
	for i in 0..count {
		let space = cursor.read_u16::<BE>()?;
		let mut channels = [0_u16; 4];
		cursor.read_u16_into::<BE>(&mut channels)?;
		if space != ACO_RGB_SPACE {
			return Err(Error::BadPalette(format!("ACO entry {i}: color space {space} is not RGB")));
		}
		entries.push([0, 1, 2].map(|c| (channels[c] / 257) as u8));
		if version == 2 {
			let nameLen = cursor.read_u32::<BE>()?;
			cursor.set_position(cursor.position() + u64::from(nameLen) * 2);
		}
	}
	fromEntries(&entries, "ACO")
}

fn fromPNG(bytes: &[u8]) -> Result<Palette> {
	let png = pngDecoder(bytes).read_info()?;
	let info = png.info();
	if info.color_type == ColorType::Indexed {
		let plte = info.palette.as_ref().ok_or_else(|| Error::BadPalette("indexed PNG without PLTE".into()))?;
		let entries = plte.chunks_exact(RGB_SIZE).map(|rgb| [rgb[0], rgb[1], rgb[2]]).collect::<Vec<_>>();
		return fromEntries(&entries, "PNG PLTE");
	}
	let image = RgbaImage::fromPNGReader(png)?;
	if image.width * image.height != NUM_PAL_ENTRIES {
		return Err(Error::BadPalette(format!(
			"truecolor PNG palette must hold {NUM_PAL_ENTRIES} pixels, got {}x{}",
			image.width, image.height
		)));
	}
	let entries = image.pixels().map(|[r, g, b, _]| [r, g, b]).collect::<Vec<_>>();
	fromEntries(&entries, "PNG")
}

fn fromCHeader(text: &str) -> Result<Palette> {
	let body = &text[text.find(C_ARRAY_DECLARATOR).unwrap_or(0)..];
	let body = match (body.find('{'), body.rfind('}')) {
		(Some(start), Some(end)) if start < end => &body[start..end],
		_ => return Err(Error::BadPalette("C header: no array initializer".into())),
	};
	let numbers = body
		.split(|c: char| !c.is_ascii_digit())
		.filter(|s| !s.is_empty())
		.map(|s| s.parse::<u8>().map_err(|err| Error::BadPalette(format!("C header: {s:?}: {err}"))))
		.collect::<Result<Vec<_>>>()?;
	if numbers.len() % RGB_SIZE != 0 {
		return Err(Error::BadPalette(format!("C header: {} values is not a whole number of colors", numbers.len())));
	}
	let entries = numbers.chunks_exact(RGB_SIZE).map(|rgb| [rgb[0], rgb[1], rgb[2]]).collect::<Vec<_>>();
	fromEntries(&entries, "C header")
}
