//! Documentation branch staging.
//!
//! The documentation checkout keeps development copies of the published directories under a
//! staging subdirectory. Preparing a release replaces each published directory wholesale with
//! its staged counterpart.

use crate::error::Result;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Replace `docs_root/<dir>` with `docs_root/<staging_dir>/<dir>` for every mirrored directory.
///
/// The published directory is deleted first, then the staged tree is copied; files present only
/// in the published copy do not survive.
pub async fn mirror_staged_dirs(docs_root: &Path, staging_dir: &Path, dirs: &[String]) -> Result<()> {
    let docs_root = docs_root.to_path_buf();
    let staging_root = docs_root.join(staging_dir);
    let dirs = dirs.to_vec();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        for dir in &dirs {
            let published = docs_root.join(dir);
            let staged = staging_root.join(dir);

            if published.exists() {
                std::fs::remove_dir_all(&published)?;
            }
            copy_dir_recursive(&staged, &published)?;
            log::info!("Mirrored {} -> {}", staged.display(), published.display());
        }
        Ok(())
    })
    .await
    .map_err(io::Error::other)??;

    Ok(())
}

/// Copy a directory tree, creating `destination`
pub fn copy_dir_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    if !source.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("staged directory not found: {}", source.display()),
        ));
    }

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target: PathBuf = destination.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
