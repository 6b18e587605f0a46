use crate::storage::Storage;
use crate::twoface::{externalerror::STORAGE_FAILED, DescribeErr, Fallible};
use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates `dir` if it doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_owned();
        fs::create_dir_all(&dir)
            .with_context(|| format!("couldn't create storage dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).describe_err(STORAGE_FAILED),
        }
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        // Write then rename, so a crash mid-write never leaves half a session behind.
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).describe_err(STORAGE_FAILED)?;
        fs::rename(&tmp, self.path(key)).describe_err(STORAGE_FAILED)
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e).describe_err(STORAGE_FAILED),
            _ => Ok(()),
        }
    }
}
