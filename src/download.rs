use log::info;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::DownloadError;
use crate::response::{DownloadFile, FALLBACK_FILE_NAME};

/// Directory downloads go to when the config does not name one.
pub fn default_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(dirs::home_dir)
}

/// Write `file` into `dir` without replacing anything already there:
/// `report.csv`, then `report (1).csv`, `report (2).csv`, ...
pub fn save_download(dir: &Path, file: &DownloadFile) -> Result<PathBuf, DownloadError> {
    fs::create_dir_all(dir).map_err(|source| DownloadError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let name = safe_file_name(&file.file_name);
    let (stem, ext) = split_extension(&name);

    for attempt in 0u32.. {
        let candidate = match (attempt, ext) {
            (0, _) => name.clone(),
            (n, Some(ext)) => format!("{stem} ({n}).{ext}"),
            (n, None) => format!("{stem} ({n})"),
        };
        let path = dir.join(candidate);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut out) => {
                out.write_all(&file.bytes)
                    .map_err(|source| DownloadError::Write {
                        path: path.clone(),
                        source,
                    })?;
                info!("Saved {} bytes to {}", file.bytes.len(), path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(DownloadError::Write { path, source }),
        }
    }

    unreachable!("u32 range exhausted while naming a download")
}

/// Keep only the last path component of a server supplied name.
fn safe_file_name(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty() && *part != "." && *part != "..");
    last.unwrap_or(FALLBACK_FILE_NAME).to_string()
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}
