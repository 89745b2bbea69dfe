// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Moves a successfully-sent file into its configured processed folder.
//!
//! Prefers an atomic `rename`; falls back to copy-then-delete (with an fsync of
//! the destination) when the processed folder lives on a different volume. On a
//! filename collision, appends a monotonic numeric suffix rather than
//! overwriting.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create processed folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Moves `source` into `<source's directory>/<processed_folder>/<filename>`,
/// creating the processed folder if needed and disambiguating collisions with a
/// `-N` suffix before the extension. Returns the final destination path.
pub fn move_to_processed(source: &Path, processed_folder: &str) -> Result<PathBuf, ArchiveError> {
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    let dest_dir = parent.join(processed_folder);
    std::fs::create_dir_all(&dest_dir).map_err(|source_err| ArchiveError::CreateDir {
        path: dest_dir.clone(),
        source: source_err,
    })?;

    let file_name = source
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("file"));
    let dest = unique_destination(&dest_dir, &file_name);

    move_file(source, &dest)?;
    Ok(dest)
}

fn unique_destination(dest_dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dest_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = file_name.extension().map(|e| e.to_string_lossy().into_owned());

    for suffix in 1_u64.. {
        let candidate_name = match &ext {
            Some(ext) => format!("{stem}-{suffix}.{ext}"),
            None => format!("{stem}-{suffix}"),
        };
        let candidate = dest_dir.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("u64 suffix space is never exhausted")
}

fn move_file(from: &Path, to: &Path) -> Result<(), ArchiveError> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            // Cross-volume rename fails on some platforms; fall back to
            // copy-then-delete with an explicit fsync of the destination.
            copy_then_delete(from, to)
        }
    }
}

fn copy_then_delete(from: &Path, to: &Path) -> Result<(), ArchiveError> {
    std::fs::copy(from, to).map_err(|source| ArchiveError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    let file = std::fs::File::open(to).map_err(|source| ArchiveError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(|source| ArchiveError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    std::fs::remove_file(from).map_err(|source| ArchiveError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
