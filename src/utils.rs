//! Small filesystem helpers that attach the path to every error.

use crate::error::Res;
use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Create a directory, and its parents, if it does not already exist.
pub(crate) fn make_dir(path: impl AsRef<Path>) -> Res<()> {
    let path = path.as_ref();
    fs::create_dir_all(path)
        .with_context(|| format!("Unable to create directory at {}", path.display()))
}

pub(crate) fn canonicalize(path: impl AsRef<Path>) -> Res<PathBuf> {
    let path = path.as_ref();
    fs::canonicalize(path)
        .with_context(|| format!("Unable to canonicalize the path {}", path.display()))
}

/// Read a file to a `String`, returning `None` if the file does not exist.
pub(crate) fn read_optional(path: &Path) -> Res<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read file at {}", path.display())),
    }
}

/// Read a file to a `String`.
pub(crate) fn read(path: &Path) -> Res<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Replace the contents of `path` so that a reader sees either the old file or the new one.
///
/// The data goes to a sibling temporary file first, which is flushed and synced before being
/// renamed over `path`. The temporary file is removed if anything fails before the rename.
pub(crate) fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Res<()> {
    let tmp = tmp_path(path);
    let result = write_synced(&tmp, contents.as_ref()).and_then(|_| {
        fs::rename(&tmp, path).with_context(|| {
            format!(
                "Unable to move '{}' into place at '{}'",
                tmp.display(),
                path.display()
            )
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_synced(path: &Path, contents: &[u8]) -> Res<()> {
    let file =
        File::create(path).with_context(|| format!("Unable to create file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .with_context(|| format!("Unable to write data to {}", path.display()))?;
    let file = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("Unable to flush data to {}", path.display()))?;
    file.sync_all()
        .with_context(|| format!("Unable to sync {} to disk", path.display()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

pub(crate) fn copy(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Res<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    fs::copy(from, to).map(|_| ()).with_context(|| {
        format!(
            "Unable to copy file from '{}' to '{}'",
            from.display(),
            to.display()
        )
    })
}

/// Basically move a file. Renames `from` -> `to`.
pub(crate) fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Res<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    fs::rename(from, to).with_context(|| {
        format!(
            "Unable to move file from '{}' to '{}'",
            from.display(),
            to.display()
        )
    })
}

pub(crate) fn remove(path: &Path) -> Res<()> {
    fs::remove_file(path).with_context(|| format!("Unable to remove {}", path.display()))
}

/// Lists the file names in `dir`.
pub(crate) fn file_names(dir: &Path) -> Res<Vec<(PathBuf, String)>> {
    let mut names = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Unable to read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        names.push((
            entry.path(),
            entry.file_name().to_string_lossy().to_string(),
        ));
    }
    Ok(names)
}
