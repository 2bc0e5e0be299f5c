//! Asset file persistence

use std::path::{Path, PathBuf};

/// Writes a downloaded asset to `dir/file_name`, creating `dir` if needed
///
/// An existing file with the same name is overwritten, so repeating a
/// download with identical input leaves the same file behind.
///
/// # Returns
///
/// The path of the written file
pub async fn write_asset(dir: &Path, file_name: &str, content: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, content).await?;

    tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(path)
}
