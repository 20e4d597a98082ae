//! Writes fetched bodies into the mirror tree

use crate::url::mirror_path;
use crate::{MirrorError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Writes a body to the mirror path of `url`, creating parent directories
///
/// An existing file at the same path is overwritten.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The file that was written
/// * `Err(MirrorError::Persist)` - Directory creation or write failed
pub async fn persist_body(url: &Url, output_root: &Path, body: &[u8]) -> Result<PathBuf> {
    let path = mirror_path(url, output_root);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| MirrorError::Persist {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(&path, body)
        .await
        .map_err(|source| MirrorError::Persist {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}
