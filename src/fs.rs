use std::io;
use std::path::Path;

/// Creates `path` and any missing parent directories with mode 0755.
///
/// Succeeds with no effect when the path already exists. Note that an
/// existing path of any kind counts as success; this does not verify
/// that it is actually a directory.
pub async fn ensure_dir(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();

    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    builder.create(path).await
}
