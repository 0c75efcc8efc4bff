use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundle name shared by the staging directory and the final archive.
pub fn bundle_name(release: &str) -> String {
    format!("{release}-{}", Local::now().format("%Y-%m-%d-%H%M%S"))
}

/// Ephemeral directory collecting artifacts before archiving.
/// Removal happens on drop, so every exit path cleans it up.
pub struct Staging {
    path: PathBuf,
}

impl Staging {
    pub fn create(output_dir: &Path, name: &str) -> Result<Self> {
        let path = output_dir.join(name);
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create staging directory {}", path.display()))?;
        info!(path = %path.display(), "created staging directory");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        // Leftover staging directories are the only persistent side effect
        // of a failed run, so removal is unconditional.
        if let Err(err) = fs::remove_dir_all(&self.path) {
            warn!(path = %self.path.display(), error = %err, "failed to remove staging directory");
        }
    }
}

/// Zips every file in the staging directory into `dest` (flat layout).
/// An empty staging directory still produces a valid, empty archive.
pub fn zip_dir(staging: &Path, dest: &Path) -> Result<()> {
    let file = File::create(dest)
        .with_context(|| format!("failed to create archive {}", dest.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries: Vec<_> = fs::read_dir(staging)
        .with_context(|| format!("failed to read staging directory {}", staging.display()))?
        .collect::<io::Result<_>>()?;
    // Stable ordering keeps archives reproducible across runs.
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        zip.start_file(name.clone(), options)
            .with_context(|| format!("failed to add {name} to archive"))?;
        let mut src = File::open(entry.path())?;
        io::copy(&mut src, &mut zip)?;
    }

    zip.finish().context("failed to finish archive")?;
    info!(archive = %dest.display(), "wrote archive");
    Ok(())
}
