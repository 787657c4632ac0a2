use std::path::PathBuf;

use super::{join_logical, validate_filename, FsError, PathResolver};

/// Creates the directory `dirname` inside `parent_logical`.
///
/// The name follows the same rules as uploaded file names. The parent has to
/// exist already; nothing is created recursively.
pub async fn make_directory(resolver: &PathResolver, parent_logical: &str, dirname: &str) -> Result<PathBuf, FsError> {
    validate_filename(dirname)?;
    let target = resolver.resolve(&join_logical(parent_logical, dirname))?;

    tokio::fs::create_dir(&target).await.map_err(|e| FsError::from_io(e, dirname))?;
    tracing::info!("Directory created: {}", target.display());
    Ok(target)
}
