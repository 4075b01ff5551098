use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` when missing and checks that files can be written into it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |err: io::Error| PersistError::OutputDir(format!("{}: {err}", dir.display()));
    fs::create_dir_all(dir).map_err(unusable)?;
    tempfile::tempfile_in(dir).map(drop).map_err(unusable)
}

/// A file being received in chunks. Nothing appears under its final name
/// until [`StagedFile::commit`]; dropping it uncommitted removes the partial data.
pub struct StagedFile {
    dir: PathBuf,
    tmp: NamedTempFile,
    written: u64,
}

impl StagedFile {
    pub fn create_in(dir: &Path) -> Result<Self, PersistError> {
        ensure_output_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            tmp: NamedTempFile::new_in(dir)?,
            written: 0,
        })
    }

    pub fn append(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.tmp.write_all(chunk)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Renames the data to `{dir}/{file_name}` in one step. An existing file
    /// of that name is replaced; if the rename fails it is left untouched and
    /// the staged data is discarded.
    pub fn commit(mut self, file_name: &str) -> Result<PathBuf, PersistError> {
        self.tmp.as_file_mut().sync_all()?;
        let target = self.dir.join(file_name);
        self.tmp.persist(&target).map_err(|err| err.error)?;
        Ok(target)
    }
}
