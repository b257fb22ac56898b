//! Reading and writing `.apkg` deck packages.
//!
//! A deck package is a plain zip file. It holds the collection database, a
//! JSON media manifest and the media payloads, which are stored under
//! numeric names. [`unpack`] extracts one into a scratch directory and
//! [`pack`] zips that directory back up once it has been filtered.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Marker file that identifies a working directory this tool created.
/// A directory carrying it may be emptied; it is never packed.
pub const WORKDIR_MARKER: &str = ".apkg-filter";

/// Failure to read an input deck package.
#[derive(Debug)]
pub enum ArchiveError {
    NotFound(PathBuf),
    Corrupt(String),
    /// The working directory holds files this tool did not put there.
    WorkDirInUse(PathBuf),
    Io(std::io::Error),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::NotFound(path) => write!(f, "apkg file not found: {}", path.display()),
            ArchiveError::Corrupt(e) => {
                write!(f, "failed to extract, the apkg file may be corrupted: {}", e)
            }
            ArchiveError::WorkDirInUse(path) => write!(
                f,
                "working directory {} is not empty and was not created by apkg-filter; \
                 choose an empty or new directory",
                path.display()
            ),
            ArchiveError::Io(e) => write!(f, "unexpected error while extracting the apkg: {}", e),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => ArchiveError::Io(io),
            other => ArchiveError::Corrupt(other.to_string()),
        }
    }
}

/// Extract `archive` into `work_dir`, returning the number of entries.
///
/// `work_dir` is created when missing. A directory left by a previous run
/// (it carries [`WORKDIR_MARKER`]) is emptied first. Any other non-empty
/// directory is refused and left untouched.
pub fn unpack(archive: &Path, work_dir: &Path) -> Result<usize, ArchiveError> {
    if !archive.is_file() {
        return Err(ArchiveError::NotFound(archive.to_path_buf()));
    }

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;

    prepare_work_dir(work_dir)?;

    zip.extract(work_dir)?;
    log::debug!(
        "extracted {} entries from {} into {}",
        zip.len(),
        archive.display(),
        work_dir.display()
    );
    Ok(zip.len())
}

fn prepare_work_dir(work_dir: &Path) -> Result<(), ArchiveError> {
    if !work_dir.exists() {
        std::fs::create_dir_all(work_dir)?;
    } else if work_dir.join(WORKDIR_MARKER).is_file() {
        for entry in std::fs::read_dir(work_dir)? {
            let path = entry?.path();
            if path.is_dir() && !path.is_symlink() {
                std::fs::remove_dir_all(&path)?;
            } else {
                std::fs::remove_file(&path)?;
            }
        }
    } else if std::fs::read_dir(work_dir)?.next().is_some() {
        return Err(ArchiveError::WorkDirInUse(work_dir.to_path_buf()));
    }

    std::fs::write(work_dir.join(WORKDIR_MARKER), b"")?;
    Ok(())
}

/// Find the extracted collection database, trying `candidates` in order.
pub fn locate_collection(work_dir: &Path, candidates: &[String]) -> Result<PathBuf> {
    candidates
        .iter()
        .map(|name| work_dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no collection database ({}) found in the apkg",
                candidates.join(", ")
            )
        })
}

/// Zip every file under `work_dir` into a deflate-compressed archive at
/// `output`, replacing any existing file. Returns the number of entries.
///
/// The top-level [`WORKDIR_MARKER`] is left out.
pub fn pack(work_dir: &Path, output: &Path) -> Result<usize> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create archive: {}", output.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut written = 0usize;
    for entry in WalkDir::new(work_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(work_dir).unwrap_or(path);
        if relative == Path::new(WORKDIR_MARKER) {
            continue;
        }
        let name = entry_name(relative);

        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        let mut source =
            File::open(path).with_context(|| format!("Failed to read {}", path.display()))?;
        std::io::copy(&mut source, &mut writer)
            .with_context(|| format!("Failed to write {} to archive", name))?;
        written += 1;
    }

    writer
        .finish()
        .with_context(|| format!("Failed to finalize archive: {}", output.display()))?;
    Ok(written)
}

/// Archive entry name: path components joined with `/` on every platform.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
