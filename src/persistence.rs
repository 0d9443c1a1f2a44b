use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::ports::PersistenceSink;

pub const HISTORY_FILE: &str = "history.json";
pub const BOOKMARKS_FILE: &str = "bookmarks.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
	#[error("create data directory failed: {path}")]
	CreateDir {
		path:   PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("read file failed: {path}")]
	Read {
		path:   PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("write file failed: {path}")]
	Write {
		path:   PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("decode file failed: {path}")]
	Decode {
		path:   PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("encode entries failed")]
	Encode {
		#[source]
		source: serde_json::Error,
	},
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Entries {
	#[serde(default)]
	entries: Vec<String>,
}

/// Stores history and bookmarks as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct FilePersistence {
	dir: PathBuf,
}

impl FilePersistence {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn load_history(&self) -> Result<Vec<String>, PersistenceError> {
		self.load(HISTORY_FILE)
	}

	pub fn load_bookmarks(&self) -> Result<Vec<String>, PersistenceError> {
		self.load(BOOKMARKS_FILE)
	}

	/// A missing file is an empty list.
	fn load(&self, file: &str) -> Result<Vec<String>, PersistenceError> {
		let path = self.dir.join(file);
		let text = match std::fs::read_to_string(&path) {
			Ok(text) => text,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(source) => return Err(PersistenceError::Read { path, source }),
		};
		let decoded: Entries =
			serde_json::from_str(&text).map_err(|source| PersistenceError::Decode { path: path.clone(), source })?;
		debug!("loaded {} entries from {}", decoded.entries.len(), path.display());
		Ok(decoded.entries)
	}

	fn store(&self, file: &str, entries: &[String]) -> Result<(), PersistenceError> {
		std::fs::create_dir_all(&self.dir)
			.map_err(|source| PersistenceError::CreateDir { path: self.dir.clone(), source })?;
		let path = self.dir.join(file);
		let encoded = serde_json::to_string_pretty(&Entries { entries: entries.to_vec() })
			.map_err(|source| PersistenceError::Encode { source })?;
		std::fs::write(&path, encoded).map_err(|source| PersistenceError::Write { path: path.clone(), source })?;
		info!("saved {} entries to {}", entries.len(), path.display());
		Ok(())
	}
}

impl PersistenceSink for FilePersistence {
	fn save_history(&mut self, entries: &[String]) -> Result<(), PersistenceError> {
		self.store(HISTORY_FILE, entries)
	}

	fn save_bookmarks(&mut self, entries: &[String]) -> Result<(), PersistenceError> {
		self.store(BOOKMARKS_FILE, entries)
	}
}
