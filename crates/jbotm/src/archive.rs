use crate::error::{OtmError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundle generated dictionaries into a single deflate-compressed zip at
/// `archive`. Each file is stored under its own file name, in the order given.
pub fn archive_outputs(files: &[PathBuf], archive: impl AsRef<Path>) -> Result<PathBuf> {
    let archive = archive.as_ref();
    let zip_err = |source| OtmError::Archive {
        source,
        path: archive.to_path_buf(),
    };

    if let Some(parent) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                OtmError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", file.display()),
                ))
            })?;

        writer.start_file(name, options).map_err(zip_err)?;
        io::copy(&mut File::open(file)?, &mut writer)?;
    }

    writer.finish().map_err(zip_err)?;
    tracing::info!(files = files.len(), "Archived to {}", archive.display());
    Ok(archive.to_path_buf())
}
