//! Optional TOML settings shared by the tools. Every key has a default and
//! command-line flags take precedence over whatever the file says.
//!
//! ```toml
//! palette = "CHASM2.PAL"
//!
//! [dither]
//! mode = "bayer4x4"
//! noiseAmplitude = 16
//!
//! [transparency.cel]
//! alphaBelow = 1
//! reserved = 255
//!
//! [transparency.skin]
//! alphaBelow = 255
//! reserved = [4, 4, 4]
//! ```

use {
	crate::{
		dither::DitherMode,
		error::{IoResultExt, Result},
		quantize::{Quantizer, TransparencyPolicy},
	},
	serde::Deserialize,
	std::{collections::HashMap, fs, path::Path, path::PathBuf},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub palette: Option<PathBuf>,
	pub dither: DitherConfig,
	pub transparency: HashMap<String, TransparencyPolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DitherConfig {
	pub mode: DitherMode,
	pub noiseAmplitude: u8,
	pub seed: Option<u64>,
}

impl Default for DitherConfig {
	fn default() -> Self {
		DitherConfig { mode: DitherMode::None, noiseAmplitude: Quantizer::DEFAULT_NOISE_AMPLITUDE, seed: None }
	}
}

impl Config {
	pub fn load(path: impl AsRef<Path>) -> Result<Config> {
		let path = path.as_ref();
		let config = Config::fromStr(&fs::read_to_string(path).atPath(path)?)?;
		log::debug!("{path:?}: {config:?}");
		Ok(config)
	}

	pub fn fromStr(toml: &str) -> Result<Config> {
		Ok(toml::from_str(toml)?)
	}

	/// A `[transparency.<format>]` table wins over the built-in preset of the same name.
	pub fn transparencyFor(&self, format: &str) -> Result<TransparencyPolicy> {
		match self.transparency.get(format) {
			Some(&policy) => Ok(policy),
			None => TransparencyPolicy::forFormat(format),
		}
	}
}
