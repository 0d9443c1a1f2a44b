use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::paths::user_config_dir;

pub const RC_FILE: &str = "roverc";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("read config file failed: {path}")]
	Read {
		path:   PathBuf,
		#[source]
		source: std::io::Error,
	},
}

pub fn default_rc_path() -> PathBuf {
	user_config_dir().join(RC_FILE)
}

/// Reads the rc file. A missing file is not an error.
pub fn load_rc(path: &Path) -> Result<Option<String>, ConfigError> {
	match std::fs::read_to_string(path) {
		Ok(text) => {
			info!("config loaded: {}", path.display());
			Ok(Some(text))
		}
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
	}
}

/// One rc line split into tokens, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
	pub line: usize,
	pub name: &'a str,
	pub args: Vec<&'a str>,
}

/// Non-blank, non-comment lines of an rc file.
pub fn directives(text: &str) -> impl Iterator<Item = Directive<'_>> {
	text.lines().enumerate().filter_map(|(index, line)| {
		let mut tokens = line.split_whitespace();
		let name = tokens.next()?;
		if name.starts_with('#') {
			return None;
		}
		Some(Directive { line: index + 1, name, args: tokens.collect() })
	})
}
