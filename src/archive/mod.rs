//! Archive packaging
//!
//! Packs every regular file under a job's document root into one zip file,
//! keyed by its path relative to the root with `/` separators.

use crate::ScribeError;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name of a job's archive
pub const ARCHIVE_FILE_NAME: &str = "output.zip";

const MAX_COMPRESSION: i64 = 9;

/// Packs `root` into a zip at `archive_path`
///
/// The archive is first written next to its destination and only renamed
/// into place once complete, so a failed run never leaves a readable but
/// truncated archive behind.
pub fn pack(root: &Path, archive_path: &Path) -> Result<PathBuf, ScribeError> {
    let files = collect_files(root)?;

    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let partial = archive_path.with_extension("zip.partial");

    match write_archive(root, &files, &partial) {
        Ok(()) => {
            fs::rename(&partial, archive_path)?;
            tracing::info!(
                "Packed {} files into {}",
                files.len(),
                archive_path.display()
            );
            Ok(archive_path.to_path_buf())
        }
        Err(e) => {
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

fn write_archive(root: &Path, files: &[PathBuf], destination: &Path) -> Result<(), ScribeError> {
    let mut zip = ZipWriter::new(File::create(destination)?);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(MAX_COMPRESSION));

    for file in files {
        zip.start_file(entry_name(root, file)?, options)?;
        let mut source = File::open(file)?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

/// Relative path of `file` under `root`, joined with forward slashes
fn entry_name(root: &Path, file: &Path) -> Result<String, ScribeError> {
    let relative = file.strip_prefix(root).map_err(|_| {
        ScribeError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is outside {}", file.display(), root.display()),
        ))
    })?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Regular files under `root`, depth-first in name order
pub fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, &mut files)?;
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}
