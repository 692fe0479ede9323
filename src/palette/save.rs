use {
	super::{
		load::{C_ARRAY_DECLARATOR, GIMP_MAGIC, JASC_MAGIC, JASC_VERSION},
		Palette,
	},
	crate::{error::Result, NUM_PAL_ENTRIES},
	array_macro::array,
	byteorder::{WriteBytesExt, BE},
	const_format::concatcp,
	glam::Vec3,
	png::{BitDepth, ColorType},
	std::io::{self, Write},
};

const PREVIEW_SIZE: u32 = 16;
pub const CUBE_LUT_SIZE: usize = 16;

const JASC_HEADER: &str = concatcp!(JASC_MAGIC, "\n", JASC_VERSION, "\n", NUM_PAL_ENTRIES, "\n");
const TEXT_GRID_HEADER: &str = concatcp!(
	"ROWS ",
	PREVIEW_SIZE,
	"\nCOLS ",
	PREVIEW_SIZE,
	"\nWIDTH 16\nHEIGHT 16\nTEXTHEIGHT 0\nSPACING 1\n"
);

const ASE_MAGIC: &[u8; 4] = b"ASEF";
const ASE_COLOR_ENTRY: u16 = 1;
const ASE_GLOBAL_COLOR: u16 = 0;
const ACO_VERSION: u16 = 1;
const ACO_RGB_SPACE: u16 = 0;

impl Palette {
	/// `.act`, `.lmp` and binary `.pal` share this layout.
	pub fn writeRaw(&self, w: &mut impl Write) -> io::Result<()> {
		w.write_all(&self.toBytes())
	}

	pub fn writeJasc(&self, w: &mut impl Write) -> io::Result<()> {
		w.write_all(JASC_HEADER.as_bytes())?;
		for [r, g, b] in self.0 {
			writeln!(w, "{r} {g} {b}")?;
		}
		Ok(())
	}

	pub fn writeGimp(&self, w: &mut impl Write, name: &str) -> io::Result<()> {
		writeln!(w, "{GIMP_MAGIC}\nName: {name}\nColumns: {PREVIEW_SIZE}\n#")?;
		for (i, [r, g, b]) in self.0.iter().enumerate() {
			writeln!(w, "{r:3} {g:3} {b:3}\tColor{i:03}")?;
		}
		Ok(())
	}

	/// 16x16 indexed image whose pixel `i` is palette entry `i`.
	pub fn writePNG(&self, mut w: impl Write) -> Result<()> {
		let mut png = png::Encoder::new(&mut w, PREVIEW_SIZE, PREVIEW_SIZE);
		png.set_color(ColorType::Indexed);
		png.set_depth(BitDepth::Eight);
		png.set_palette(self.toBytes());
		let indices: [u8; NUM_PAL_ENTRIES] = array![i => i as u8; NUM_PAL_ENTRIES];
		let mut png = png.write_header()?;
		png.write_image_data(&indices)?;
		png.finish()?;
		Ok(w.flush()?)
	}

	pub fn writeTextGrid(&self, w: &mut impl Write) -> io::Result<()> {
		w.write_all(TEXT_GRID_HEADER.as_bytes())?;
		for [r, g, b] in self.0 {
			writeln!(w, "R: {r:03}, G: {g:03}, B: {b:03}")?;
		}
		Ok(())
	}

	/// One `0xRRGGBB` (or `0xRRGGBBFF`) literal per line.
	pub fn writeHex(&self, w: &mut impl Write, withAlpha: bool) -> io::Result<()> {
		for [r, g, b] in self.0 {
			if withAlpha {
				writeln!(w, "0x{r:02X}{g:02X}{b:02X}{:02X}", u8::MAX)?;
			} else {
				writeln!(w, "0x{r:02X}{g:02X}{b:02X}")?;
			}
		}
		Ok(())
	}

	/// Adobe Swatch Exchange, one global RGB swatch named `ColorNNN` per entry.
	pub fn writeAse(&self, w: &mut impl Write) -> io::Result<()> {
		w.write_all(ASE_MAGIC)?;
		w.write_u16::<BE>(1)?;
		w.write_u16::<BE>(0)?;
		w.write_u32::<BE>(NUM_PAL_ENTRIES as _)?;
		for (i, rgb) in self.0.iter().enumerate() {
			let name = format!("Color{i:03}");
			let nameLen = name.len() + 1;
			w.write_u16::<BE>(ASE_COLOR_ENTRY)?;
			w.write_u32::<BE>((2 + nameLen * 2 + 4 + 3 * 4 + 2) as _)?;
			w.write_u16::<BE>(nameLen as _)?;
			for unit in name.encode_utf16().chain([0]) {
				w.write_u16::<BE>(unit)?;
			}
			w.write_all(b"RGB ")?;
			for &channel in rgb {
				w.write_f32::<BE>(f32::from(channel) / 255.0)?;
			}
			w.write_u16::<BE>(ASE_GLOBAL_COLOR)?;
		}
		Ok(())
	}

	/// Adobe Color Swatch, version 1 section only.
	pub fn writeAco(&self, w: &mut impl Write) -> io::Result<()> {
		w.write_u16::<BE>(ACO_VERSION)?;
		w.write_u16::<BE>(NUM_PAL_ENTRIES as _)?;
		for rgb in self.0 {
			w.write_u16::<BE>(ACO_RGB_SPACE)?;
			for channel in rgb {
				w.write_u16::<BE>(u16::from(channel) * 257)?;
			}
			w.write_u16::<BE>(0)?;
		}
		Ok(())
	}

	pub fn writeCHeader(&self, w: &mut impl Write, baseName: &str) -> io::Result<()> {
		let guard = format!("{baseName}_PALETTE_H")
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
			.collect::<String>();
		let ident = baseName.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect::<String>();
		writeln!(w, "#ifndef {guard}\n#define {guard}\n\n#include <stdint.h>\n")?;
		writeln!(w, "static const uint8_t {ident}_palette{C_ARRAY_DECLARATOR} = {{")?;
		for (i, [r, g, b]) in self.0.iter().enumerate() {
			let separator = if i + 1 < NUM_PAL_ENTRIES { "," } else { "" };
			writeln!(w, "    {{ {r:3}, {g:3}, {b:3} }}{separator}")?;
		}
		writeln!(w, "}};\n\n#endif /* {guard} */")
	}

	/// `.cube` 3D LUT sending every lattice point to its nearest palette color.
	/// Red varies fastest, as the format requires.
	pub fn writeCubeLUT(&self, w: &mut impl Write, title: &str) -> io::Result<()> {
		writeln!(w, "TITLE \"{title}\"\nLUT_3D_SIZE {CUBE_LUT_SIZE}")?;
		writeln!(w, "DOMAIN_MIN 0.0 0.0 0.0\nDOMAIN_MAX 1.0 1.0 1.0")?;
		let step = 255.0 / (CUBE_LUT_SIZE - 1) as f32;
		for b in 0..CUBE_LUT_SIZE {
			for g in 0..CUBE_LUT_SIZE {
				for r in 0..CUBE_LUT_SIZE {
					let lattice = Vec3::new(r as _, g as _, b as _) * step;
					let [r, g, b] = self.color(self.nearest(lattice)).map(|channel| f32::from(channel) / 255.0);
					writeln!(w, "{r:.6} {g:.6} {b:.6}")?;
				}
			}
		}
		Ok(())
	}
}
