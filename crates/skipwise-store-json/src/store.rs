//! [`JsonStore`] — a whole-collection JSON snapshot on disk.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use skipwise_core::store::{Collection, SubjectStore};

use crate::{Error, Result};

/// A subject store backed by a single JSON file.
///
/// `load` reads and parses the whole file; a missing file is an empty
/// collection. `save` rewrites the file through a sibling temp file and a
/// rename, so a crash mid-write never leaves a torn snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonStore {
  path: PathBuf,
}

impl JsonStore {
  /// Use the file at `path`; it does not need to exist yet.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path { &self.path }

  fn temp_path(&self) -> PathBuf { self.path.with_extension("json.tmp") }
}

impl SubjectStore for JsonStore {
  type Error = Error;

  fn load(&self) -> Result<Collection> {
    match fs::read(&self.path) {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Collection::new()),
      Err(e) => Err(Error::Io(e)),
    }
  }

  fn save(&self, subjects: &Collection) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(subjects)?;
    let tmp = self.temp_path();
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}
