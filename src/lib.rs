#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case, confusable_idents, mixed_script_confusables, uncommon_codepoints)]

pub mod config;
pub mod dither;
pub mod error;
pub mod image;
pub mod palette;
pub mod quantize;

pub use {
	dither::DitherMode,
	error::{Error, Result},
	image::{IndexImage, RgbaImage},
	palette::Palette,
	quantize::{quantize, Quantizer, Reserved, TransparencyPolicy},
};

pub const NUM_PAL_ENTRIES: usize = u8::MAX as usize + 1;
pub const RGB_SIZE: usize = 3;
pub const RGBA_SIZE: usize = 4;
pub const PAL_LEN: usize = NUM_PAL_ENTRIES * RGB_SIZE;

use std::fs::File;

#[cfg(unix)]
pub fn stdoutRaw() -> File {
	use std::os::unix::io::FromRawFd;
	unsafe { File::from_raw_fd(1) }
}

#[cfg(windows)]
pub fn stdoutRaw() -> File {
	use std::{
		io,
		os::windows::io::{AsRawHandle, FromRawHandle},
	};
	unsafe { File::from_raw_handle(io::stdout().as_raw_handle()) }
}

/// `RUST_LOG` still wins; otherwise everything at `info` and above reaches stderr.
pub fn initLogging() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
		.format_timestamp(None)
		.init();
}
