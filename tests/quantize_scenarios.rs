#![allow(non_snake_case)]

use chasm_palette_tools::{quantize, DitherMode, Palette, Quantizer, Reserved, RgbaImage, TransparencyPolicy};

const OPAQUE: u8 = u8::MAX;

fn blackWhite() -> Palette {
	let mut palette = Palette::default();
	// entries past 1 duplicate white, so ties always resolve to 1
	palette.0[1..].fill([u8::MAX; 3]);
	palette
}

/// 3-3-2 bit color cube; every entry distinct.
fn rgb332() -> Palette {
	let mut palette = Palette::default();
	for (i, entry) in palette.0.iter_mut().enumerate() {
		*entry = [(i & 0xE0) as u8, ((i << 3) & 0xE0) as u8, ((i << 6) & 0xC0) as u8];
	}
	palette
}

fn gradient(width: usize, height: usize) -> RgbaImage {
	let data = (0..width * height)
		.flat_map(|i| {
			let (x, y) = (i % width, i / width);
			[(x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) * 7 % 256) as u8, OPAQUE]
		})
		.collect();
	RgbaImage::new(width, height, data).unwrap()
}

#[test]
fn exactColorMapsToItsIndex() {
	let mut palette = Palette::default();
	palette.0[42] = [10, 20, 30];
	let image = RgbaImage::new(1, 1, vec![10, 20, 30, OPAQUE]).unwrap();
	for mode in [DitherMode::None, DitherMode::FloydSteinberg, DitherMode::SierraLite, DitherMode::Atkinson] {
		assert_eq!(quantize(&image, &palette, mode, TransparencyPolicy::OPAQUE).data, [42], "{mode}");
	}
}

#[test]
fn transparentPixelTakesReservedIndex() {
	let mut palette = rgb332();
	palette.0[7] = [0, 0, 0];
	let image = RgbaImage::new(2, 1, vec![90, 180, 45, 0, 0, 0, 0, OPAQUE]).unwrap();
	let policy = TransparencyPolicy { alphaBelow: 1, reserved: Reserved::Index(255) };
	let out = quantize(&image, &palette, DitherMode::None, policy);
	assert_eq!(out.data, [255, palette.nearestRgb([0, 0, 0])]);
	assert_eq!(out.data[1], 0);
}

#[test]
fn transparencyShortCircuitsEveryMode() {
	let image = gradient(8, 8);
	let hidden = RgbaImage::new(8, 8, image.pixels().flat_map(|[r, g, b, _]| [r, g, b, 0]).collect()).unwrap();
	let policy = TransparencyPolicy { alphaBelow: 1, reserved: Reserved::Index(200) };
	for mode in DitherMode::ALL {
		let out = Quantizer::new(&rgb332(), mode, policy).noiseSeed(Some(1)).run(&hidden);
		assert!(out.data.iter().all(|&index| index == 200), "{mode}");
	}
}

#[test]
fn floydSteinbergSplitsMidGray() {
	let image = RgbaImage::new(2, 2, [128, 128, 128, OPAQUE].repeat(4)).unwrap();
	let out = quantize(&image, &blackWhite(), DitherMode::FloydSteinberg, TransparencyPolicy::OPAQUE);
	let whites = out.data.iter().filter(|&&index| index == 1).count();
	let blacks = out.data.iter().filter(|&&index| index == 0).count();
	assert_eq!((whites, blacks), (2, 2));
	// error flows diagonally, giving a checkerboard
	assert_eq!(out.data, [1, 0, 0, 1]);
}

#[test]
fn noDitherMapsMidGrayUniformly() {
	let image = RgbaImage::new(2, 2, [128, 128, 128, OPAQUE].repeat(4)).unwrap();
	let out = quantize(&image, &blackWhite(), DitherMode::None, TransparencyPolicy::OPAQUE);
	assert_eq!(out.data, [1; 4]);
}

#[test]
fn orderedDitherIsRepeatable() {
	let image = gradient(4, 4);
	let palette = rgb332();
	for mode in [DitherMode::Bayer4x4, DitherMode::Bayer8x8] {
		let first = quantize(&image, &palette, mode, TransparencyPolicy::OPAQUE);
		let second = quantize(&image, &palette, mode, TransparencyPolicy::OPAQUE);
		assert_eq!(first, second, "{mode}");
		assert_eq!((first.width, first.height), (4, 4));
	}
}

#[test]
fn unditheredOutputIsPureAndFaithful() {
	let palette = rgb332();
	let data = palette.0.iter().flat_map(|&[r, g, b]| [r, g, b, OPAQUE]).collect();
	let image = RgbaImage::new(16, 16, data).unwrap();
	let first = quantize(&image, &palette, DitherMode::None, TransparencyPolicy::OPAQUE);
	assert_eq!(first, quantize(&image, &palette, DitherMode::None, TransparencyPolicy::OPAQUE));
	assert!(first.data.iter().enumerate().all(|(i, &index)| usize::from(index) == i));
}

#[test]
fn duplicateEntriesResolveToLowestIndex() {
	let mut palette = rgb332();
	palette.0[100] = palette.0[37];
	let [r, g, b] = palette.0[37];
	let image = RgbaImage::new(1, 1, vec![r, g, b, OPAQUE]).unwrap();
	assert_eq!(quantize(&image, &palette, DitherMode::None, TransparencyPolicy::OPAQUE).data, [37]);
}

#[test]
fn everyModeKeepsShapeAndIndexesIntoPalette() {
	let image = gradient(13, 7);
	let mut palette = rgb332();
	// only the first 16 entries are reachable colors; the rest repeat entry 0
	let first = palette.0[0];
	palette.0[16..].fill(first);
	for mode in DitherMode::ALL {
		let out = Quantizer::new(&palette, mode, TransparencyPolicy::OPAQUE).noiseSeed(Some(9)).run(&image);
		assert_eq!(out.data.len(), 13 * 7, "{mode}");
		assert!(out.data.iter().all(|&index| index < 16), "{mode}");
	}
}

#[test]
fn noiseDependsOnSeed() {
	let image = RgbaImage::new(16, 16, [100, 100, 100, OPAQUE].repeat(256)).unwrap();
	let mut palette = Palette::default();
	for (i, entry) in palette.0.iter_mut().enumerate() {
		*entry = [i as u8; 3];
	}
	let run = |seed| {
		Quantizer::new(&palette, DitherMode::Noise, TransparencyPolicy::OPAQUE).noiseSeed(Some(seed)).run(&image)
	};
	assert_eq!(run(5), run(5));
	assert_ne!(run(5), run(6));
	// a gray ramp palette keeps every pick within the default amplitude
	assert!(run(5).data.iter().all(|&index| (92..=108).contains(&index)));
}

#[test]
fn atkinsonReachesTwoRowsDown() {
	let column = RgbaImage::new(1, 3, [128, 128, 128, OPAQUE].repeat(3)).unwrap();
	// 128 -> white; 128 - 127/8 -> black; the third pixel gets -127/8 from two rows up
	// as well as +112.125/8 from the one above, landing just under the midpoint
	let out = quantize(&column, &blackWhite(), DitherMode::Atkinson, TransparencyPolicy::OPAQUE);
	assert_eq!(out.data, [1, 0, 0]);

	let block = RgbaImage::new(2, 3, [128, 128, 128, OPAQUE].repeat(6)).unwrap();
	let out = quantize(&block, &blackWhite(), DitherMode::Atkinson, TransparencyPolicy::OPAQUE);
	assert_eq!(out.data, [1, 0, 0, 1, 0, 1]);
}

#[test]
fn atkinsonDiscardsPartOfTheError() {
	let row = RgbaImage::new(4, 1, [96, 96, 96, OPAQUE].repeat(4)).unwrap();
	// Floyd-Steinberg pushes 7/16 of the first residual right and flips the second pixel;
	// Atkinson's 1/8 shares never get there
	let fs = quantize(&row, &blackWhite(), DitherMode::FloydSteinberg, TransparencyPolicy::OPAQUE);
	assert_eq!(fs.data, [0, 1, 0, 0]);
	let atkinson = quantize(&row, &blackWhite(), DitherMode::Atkinson, TransparencyPolicy::OPAQUE);
	assert_eq!(atkinson.data, [0; 4]);
}

#[test]
fn sierraLiteSpreadsIntoNextRow() {
	let gray = RgbaImage::new(2, 2, [128, 128, 128, OPAQUE].repeat(4)).unwrap();
	let out = quantize(&gray, &blackWhite(), DitherMode::SierraLite, TransparencyPolicy::OPAQUE);
	// the bottom-right pixel collects 1/4 from above and 2/4 from its left neighbour
	assert_eq!(out.data, [1, 0, 0, 1]);

	let dark = RgbaImage::new(2, 2, [100, 100, 100, OPAQUE].repeat(4)).unwrap();
	let out = quantize(&dark, &blackWhite(), DitherMode::SierraLite, TransparencyPolicy::OPAQUE);
	assert_eq!(out.data, [0, 1, 0, 0]);
}

#[test]
fn mipLevelsKeepTransparency() {
	let cel = TransparencyPolicy::forFormat("cel").unwrap();
	let palette = blackWhite();
	let transparentIndex = cel.transparentIndex(&palette);
	assert_eq!(transparentIndex, Some(255));

	let clear = RgbaImage::new(4, 4, [10, 20, 30, 0].repeat(16)).unwrap();
	let indexed = quantize(&clear, &palette, DitherMode::None, cel);
	let mip = indexed.toRgba(&palette, transparentIndex).halfSize().unwrap();
	assert_eq!(quantize(&mip, &palette, DitherMode::None, cel).data, [255; 4]);

	// left half opaque white, right half transparent
	let data = (0..8).flat_map(|i| if i % 4 < 2 { [255, 255, 255, OPAQUE] } else { [0, 0, 0, 0] }).collect();
	let indexed = quantize(&RgbaImage::new(4, 2, data).unwrap(), &palette, DitherMode::None, cel);
	assert_eq!(indexed.data, [1, 1, 255, 255, 1, 1, 255, 255]);
	let mip = indexed.toRgba(&palette, transparentIndex).halfSize().unwrap();
	assert_eq!(quantize(&mip, &palette, DitherMode::None, cel).data, [1, 255]);
}
