#![allow(non_snake_case)]

use {
	chasm_palette_tools::{
		palette::{Format, PINK, PINK_INDEX},
		Error, Palette, PAL_LEN,
	},
	std::{
		fs::{self, File},
		io::{BufWriter, Write},
		path::Path,
	},
};

fn ramp() -> Palette {
	let mut palette = Palette::default();
	for (i, entry) in palette.0.iter_mut().enumerate() {
		*entry = [i as u8, (i / 2) as u8, (255 - i) as u8];
	}
	palette
}

fn save(path: &Path, write: impl FnOnce(&mut BufWriter<File>)) {
	let mut w = BufWriter::new(File::create(path).unwrap());
	write(&mut w);
	w.flush().unwrap();
}

#[test]
fn everyLoadableExportReadsBack() {
	let dir = tempfile::tempdir().unwrap();
	let palette = ramp().withPink();
	let exports: [(&str, Format, fn(&Palette, &mut BufWriter<File>)); 6] = [
		("pink.act", Format::Raw { widened: false }, |p, w| p.writeRaw(w).unwrap()),
		("pink.pal", Format::Jasc, |p, w| p.writeJasc(w).unwrap()),
		("pink.gpl", Format::Gimp, |p, w| p.writeGimp(w, "pink").unwrap()),
		("pink.aco", Format::Aco, |p, w| p.writeAco(w).unwrap()),
		("pink.png", Format::Png, |p, w| p.writePNG(w).unwrap()),
		("pink.h", Format::CHeader, |p, w| p.writeCHeader(w, "pink").unwrap()),
	];
	for (name, format, write) in exports {
		let path = dir.path().join(name);
		save(&path, |w| write(&palette, w));
		let (loaded, loadedFormat) = Palette::load(&path).unwrap();
		assert_eq!(loadedFormat, format, "{name}");
		assert_eq!(loaded, palette, "{name}");
		assert_eq!(loaded.color(PINK_INDEX), PINK, "{name}");
	}
}

#[test]
fn sixBitRawPaletteIsWidened() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("CHASM.PAL");
	let bytes = (0..PAL_LEN).map(|i| (i % 64) as u8).collect::<Vec<_>>();
	fs::write(&path, &bytes).unwrap();
	let (palette, format) = Palette::load(&path).unwrap();
	assert_eq!(format, Format::Raw { widened: true });
	assert_eq!(palette.color(0), [0, 4, 8]);
	assert_eq!(palette.color(21), [252, 0, 4]);
}

#[test]
fn missingAndUnknownFilesAreErrors() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("missing.act");
	assert!(matches!(Palette::load(&missing), Err(Error::Io { path, .. }) if path == missing));

	let junk = dir.path().join("junk.bin");
	fs::write(&junk, b"definitely not a palette").unwrap();
	assert!(matches!(Palette::load(&junk), Err(Error::UnknownPaletteFormat { len: 24 })));
}

#[test]
fn writeOnlyExportsHaveExpectedShape() {
	let palette = ramp();
	let mut text = Vec::new();
	palette.writeHex(&mut text, true).unwrap();
	let text = String::from_utf8(text).unwrap();
	assert_eq!(text.lines().count(), 256);
	assert_eq!(text.lines().nth(1), Some("0x0100FEFF"));

	let mut grid = Vec::new();
	palette.writeTextGrid(&mut grid).unwrap();
	let grid = String::from_utf8(grid).unwrap();
	assert!(grid.starts_with("ROWS 16\nCOLS 16\n"));
	assert!(grid.contains("R: 255, G: 127, B: 000"));
}
