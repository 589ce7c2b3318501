//! Write-to-temp then rename, so readers only ever see a whole file.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const TEMP_SUFFIX: &str = "tmp";

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn file_name(path: &Path) -> io::Result<OsString> {
    path.file_name().map(OsString::from).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })
}

/// Sibling temp path, `<name>.<random>.tmp`.
fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let mut name = file_name(path)?;
    name.push(format!(".{}.{TEMP_SUFFIX}", Uuid::new_v4().simple()));
    Ok(parent_dir(path).join(name))
}

/// Glob matching every temp file [`write_atomic`] may leave for `path`.
pub(crate) fn temp_glob(path: &Path) -> io::Result<String> {
    let name = file_name(path)?;
    let dir = parent_dir(path);
    Ok(format!(
        "{}/{}.*.{TEMP_SUFFIX}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(&name.to_string_lossy()),
    ))
}

/// Replaces `path` with `bytes`.
///
/// The parent directory is created when missing. The temp file is flushed
/// before the rename and removed again if any step fails, leaving the
/// previous content in place.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path);
    if fs::metadata(dir).await.is_err() {
        fs::create_dir_all(dir).await?;
    }

    let tmp = temp_path(path)?;
    let written = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }

    #[cfg(unix)]
    if let Ok(handle) = fs::File::open(dir).await {
        let _ = handle.sync_all().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_files_are_siblings_with_random_suffix() {
        let target = Path::new("/srv/data/site.json");
        let first = temp_path(target).unwrap();
        let second = temp_path(target).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.parent(), target.parent());
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("site.json."));
        assert!(name.ends_with(".tmp"));
        assert!(glob::Pattern::new(&temp_glob(target).unwrap())
            .unwrap()
            .matches_path(&first));
    }

    #[test]
    fn bare_file_names_use_current_dir() {
        let tmp = temp_path(Path::new("site.json")).unwrap();
        assert_eq!(tmp.parent(), Some(Path::new(".")));
    }

    #[tokio::test]
    async fn creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("data").join("site.json");
        write_atomic(&target, b"{}").await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"{}");
    }
}
