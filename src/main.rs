#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	chasm_palette_tools::{
		config::Config, error::IoResultExt, initLogging, stdoutRaw, DitherMode, Error, IndexImage, Palette, Quantizer,
		Result, RgbaImage,
	},
	clap::Parser,
	std::{
		fs::{self, File},
		io::{self, BufReader, BufWriter},
		path::{Path, PathBuf},
		process::ExitCode,
	},
};

/// Converts an RGBA PNG into an indexed PNG under a fixed 256-color palette.
#[derive(Parser, Debug)]
struct Args {
	/// TOML settings file; flags below override it
	#[clap(long)]
	config: Option<PathBuf>,
	/// .act/.lmp/.pal, JASC, GIMP, ACO, PNG or C-header palette
	#[clap(long)]
	palette: Option<PathBuf>,
	#[clap(long, value_enum)]
	dither: Option<DitherMode>,
	/// Transparency preset (cel, car, sprite, pink, floor) or a [transparency.*] table from the config
	#[clap(long, default_value = "cel")]
	format: String,
	#[clap(long)]
	noiseAmplitude: Option<u8>,
	#[clap(long)]
	seed: Option<u64>,
	/// Also write this many box-filtered mip levels next to the output
	#[clap(long, default_value_t = 0)]
	mips: usize,
	/// "-" reads stdin
	input: PathBuf,
	/// Defaults to stdout
	output: Option<PathBuf>,
}

fn main() -> ExitCode {
	initLogging();
	match run(Args::parse()) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			log::error!("{err}");
			ExitCode::FAILURE
		}
	}
}

fn run(args: Args) -> Result<()> {
	let config = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};
	let palettePath = args
		.palette
		.as_ref()
		.or(config.palette.as_ref())
		.ok_or_else(|| Error::BadPalette("no palette given (--palette or `palette` in the config)".into()))?;
	let (palette, paletteFormat) = Palette::load(palettePath)?;
	log::info!("{palettePath:?}: {paletteFormat} palette");
	let transparency = config.transparencyFor(&args.format)?;
	let mode = args.dither.unwrap_or(config.dither.mode);

	let image = if args.input == Path::new("-") {
		RgbaImage::fromPNG(io::stdin().lock())?
	} else {
		RgbaImage::fromPNG(BufReader::new(File::open(&args.input).atPath(&args.input)?))?
	};
	let quantizer = Quantizer::new(&palette, mode, transparency)
		.noiseAmplitude(args.noiseAmplitude.unwrap_or(config.dither.noiseAmplitude))
		.noiseSeed(args.seed.or(config.dither.seed));
	let indexed = quantizer.run(&image);
	let transparentIndex = transparency.transparentIndex(&palette);

	match &args.output {
		None => {
			if args.mips > 0 {
				return Err(Error::BadImage("mip levels need an output path".into()));
			}
			indexed.writePNG(BufWriter::new(stdoutRaw()), &palette, transparentIndex)?;
		}
		Some(output) => {
			writeIndexed(output, &indexed, &palette, transparentIndex)?;
			log::info!("{output:?}: {}x{} ({mode} dithering)", indexed.width, indexed.height);
			// transparent pixels come back with alpha 0, which the box filter carries down
			let mut level = indexed.toRgba(&palette, transparentIndex);
			for i in 1..=args.mips {
				level = match level.halfSize() {
					Some(half) => half,
					None => {
						log::warn!("stopping after {} mip levels, image is too small", i - 1);
						break;
					}
				};
				let path = mipPath(output, i);
				let mip = Quantizer::new(&palette, DitherMode::None, transparency).run(&level);
				writeIndexed(&path, &mip, &palette, transparentIndex)?;
				log::info!("{path:?}: {}x{}", mip.width, mip.height);
			}
		}
	}
	Ok(())
}

/// Encodes in memory first so any write failure is reported against `path`.
fn writeIndexed(path: &Path, image: &IndexImage, palette: &Palette, transparentIndex: Option<u8>) -> Result<()> {
	let mut png = Vec::new();
	image.writePNG(&mut png, palette, transparentIndex)?;
	fs::write(path, png).atPath(path)
}

/// `tile.png` -> `tile_mip1.png`, `tile_mip2.png`, ...
fn mipPath(output: &Path, level: usize) -> PathBuf {
	let stem = output.file_stem().map_or_else(String::new, |stem| stem.to_string_lossy().into_owned());
	output.with_file_name(format!("{stem}_mip{level}.png"))
}
