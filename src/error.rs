use {std::io, std::path::PathBuf, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
	#[error("{path:?}: {source}")]
	Io { path: PathBuf, source: io::Error },

	#[error(transparent)]
	Stream(#[from] io::Error),

	#[error("PNG decode: {0}")]
	PngDecode(#[from] png::DecodingError),

	#[error("PNG encode: {0}")]
	PngEncode(#[from] png::EncodingError),

	#[error("unrecognized palette format ({len} bytes)")]
	UnknownPaletteFormat { len: usize },

	#[error("bad palette: {0}")]
	BadPalette(String),

	#[error("bad image: {0}")]
	BadImage(String),

	#[error("config: {0}")]
	Config(#[from] toml::de::Error),

	#[error("unknown format preset {0:?}")]
	UnknownFormat(String),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Attaches the offending path to an I/O failure.
pub trait IoResultExt<T> {
	fn atPath(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
	fn atPath(self, path: impl Into<PathBuf>) -> Result<T> {
		self.map_err(|source| Error::Io { path: path.into(), source })
	}
}
