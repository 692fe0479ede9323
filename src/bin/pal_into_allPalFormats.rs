#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	chasm_palette_tools::{error::IoResultExt, initLogging, palette::Format, Palette, Result},
	clap::Parser,
	std::{
		fs::{self, File},
		io::{BufWriter, Write},
		path::{Path, PathBuf},
		process::ExitCode,
	},
};

/// Writes one palette out in every interchange format the toolkit knows.
#[derive(Parser, Debug)]
struct Args {
	/// Any palette `Palette::load` understands
	input: PathBuf,
	#[clap(long, default_value = "ChasmPalette")]
	outDir: PathBuf,
}

fn main() -> ExitCode {
	initLogging();
	match run(&Args::parse()) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			log::error!("{err}");
			ExitCode::FAILURE
		}
	}
}

fn run(args: &Args) -> Result<()> {
	let (palette, format) = Palette::load(&args.input)?;
	log::info!("{:?}: {format} palette", args.input);
	if format == (Format::Raw { widened: true }) {
		log::info!("6-bit channels widened to 8 bits");
	}
	let baseName = args.input.file_stem().map_or_else(|| "palette".into(), |stem| stem.to_string_lossy().into_owned());
	fs::create_dir_all(&args.outDir).atPath(&args.outDir)?;
	let pink = palette.withPink();
	let out = |name: &str| args.outDir.join(name);

	emit(&out(&format!("Photoshop_{baseName}_transparent.act")), |w| Ok(palette.writeRaw(w)?))?;
	emit(&out(&format!("Photoshop_{baseName}_pink.act")), |w| Ok(pink.writeRaw(w)?))?;
	emit(&out(&format!("Quake_{baseName}.lmp")), |w| Ok(pink.writeRaw(w)?))?;
	emit(&out(&format!("Jasc_{baseName}.pal")), |w| Ok(pink.writeJasc(w)?))?;
	emit(&out(&format!("Gimp_{baseName}.gpl")), |w| Ok(pink.writeGimp(w, &baseName)?))?;
	emit(&out(&format!("PNG_{baseName}.png")), |w| pink.writePNG(w))?;
	emit(&out(&format!("Txt_{baseName}.txt")), |w| Ok(pink.writeTextGrid(w)?))?;
	emit(&out(&format!("Raw3_{baseName}.txt")), |w| Ok(pink.writeHex(w, false)?))?;
	emit(&out(&format!("Raw4_{baseName}.txt")), |w| Ok(pink.writeHex(w, true)?))?;
	emit(&out(&format!("ASE_{baseName}.ase")), |w| Ok(pink.writeAse(w)?))?;
	emit(&out(&format!("ACO_{baseName}.aco")), |w| Ok(pink.writeAco(w)?))?;
	emit(&out(&format!("Code_{baseName}.h")), |w| Ok(pink.writeCHeader(w, &baseName)?))?;
	// the LUT maps onto real colors, so the pink marker stays out of it
	emit(&out(&format!("Cube_{baseName}.cube")), |w| Ok(palette.writeCubeLUT(w, &baseName)?))?;
	Ok(())
}

fn emit(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
	let mut w = BufWriter::new(File::create(path).atPath(path)?);
	write(&mut w)?;
	w.flush().atPath(path)?;
	log::info!("{path:?}");
	Ok(())
}
