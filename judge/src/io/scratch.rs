//! Per-run scratch directories.
//!
//! A scratch directory lives exactly as long as its [`ScratchDir`] value:
//! dropping it on any exit path removes the directory and its contents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::{Builder, TempDir};

const SCRATCH_PREFIX: &str = "judge-run-";

#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory under `root`, or the system temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root)
                    .with_context(|| format!("create scratch root {}", root.display()))?;
                builder
                    .tempdir_in(root)
                    .with_context(|| format!("create scratch dir in {}", root.display()))?
            }
            None => builder.tempdir().context("create scratch dir")?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file directly inside the scratch directory.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            bail!("scratch file name must be a plain file name: {name:?}");
        }
        let path = self.dir.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("remove scratch dir {}", path.display()))
    }
}
