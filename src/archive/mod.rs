// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Archive detection, verification and extraction for downloaded artifacts.
//!
//! Downloads land under random names, so the type is detected from the
//! extension when there is one and from the magic bytes otherwise.

use crate::error::{Result, UpkeepError};
use crate::platform::file_ops;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive as TarArchive;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    TarGz,
    Zip,
}

/// Verify `archive_path` and extract it over `destination`.
///
/// Nothing is written when verification fails.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<usize> {
    let archive_type = verify_archive(archive_path)?;

    fs::create_dir_all(destination)?;

    match archive_type {
        ArchiveType::TarGz => extract_tar_gz(archive_path, destination),
        ArchiveType::Zip => extract_zip(archive_path, destination),
    }
}

/// Check that `archive_path` is a complete, readable archive whose entries
/// all stay inside the destination.
///
/// Every entry is decompressed and its path validated, so truncated
/// downloads and traversal entries are caught here rather than half way
/// through an install.
pub fn verify_archive(archive_path: &Path) -> Result<ArchiveType> {
    let archive_type = detect_archive_type(archive_path)?;
    verify_integrity(archive_path, archive_type).map_err(|error| match error {
        UpkeepError::CorruptArchive(_) | UpkeepError::SecurityError(_) => error,
        other => UpkeepError::CorruptArchive(format!("{}: {other}", archive_path.display())),
    })?;
    Ok(archive_type)
}

pub fn detect_archive_type(path: &Path) -> Result<ArchiveType> {
    let path_str = path.to_string_lossy().to_lowercase();
    if path_str.ends_with(".tar.gz") || path_str.ends_with(".tgz") {
        return Ok(ArchiveType::TarGz);
    }
    if path_str.ends_with(".zip") || path_str.ends_with(".jar") {
        return Ok(ArchiveType::Zip);
    }

    detect_by_content(path)
}

fn detect_by_content(path: &Path) -> Result<ArchiveType> {
    let mut file = File::open(path)?;
    let mut magic_bytes = [0u8; 4];
    file.read_exact(&mut magic_bytes).map_err(|_| {
        UpkeepError::CorruptArchive(format!(
            "Cannot read file to determine archive type: {path:?}"
        ))
    })?;

    // gzip: 1f 8b
    if magic_bytes[0] == 0x1f && magic_bytes[1] == 0x8b {
        return Ok(ArchiveType::TarGz);
    }

    // zip: 50 4b 03 04, 50 4b 05 06 or 50 4b 07 08
    if magic_bytes[0] == 0x50
        && magic_bytes[1] == 0x4b
        && (magic_bytes[2] == 0x03 || magic_bytes[2] == 0x05 || magic_bytes[2] == 0x07)
    {
        return Ok(ArchiveType::Zip);
    }

    Err(UpkeepError::CorruptArchive(format!(
        "File does not appear to be tar.gz or zip: {path:?}"
    )))
}

fn verify_integrity(archive_path: &Path, archive_type: ArchiveType) -> Result<()> {
    match archive_type {
        ArchiveType::TarGz => {
            let file = File::open(archive_path)?;
            let gz = flate2::read::GzDecoder::new(file);
            let mut archive = TarArchive::new(gz);

            let mut count = 0usize;
            for entry in archive.entries()? {
                let mut entry = entry?;
                validate_entry_path(&entry.path()?)?;
                io::copy(&mut entry, &mut io::sink())?;
                count += 1;
            }
            if count == 0 {
                return Err(UpkeepError::CorruptArchive(
                    "tar.gz archive is empty".to_string(),
                ));
            }
            Ok(())
        }
        ArchiveType::Zip => {
            let file = File::open(archive_path)?;
            let mut archive = ZipArchive::new(file)?;

            if archive.is_empty() {
                return Err(UpkeepError::CorruptArchive(
                    "Zip archive is empty".to_string(),
                ));
            }

            // Reading to the end checks each entry's CRC.
            for i in 0..archive.len() {
                let mut entry = archive.by_index(i)?;
                enclosed_zip_path(entry.name(), entry.enclosed_name())?;
                io::copy(&mut entry, &mut io::sink())?;
            }
            Ok(())
        }
    }
}

fn extract_tar_gz(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let gz = flate2::read::GzDecoder::new(file);
    let mut archive = TarArchive::new(gz);

    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    let mut extracted_count = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        validate_entry_path(&path)?;

        let dest_path = destination.join(&path);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        entry.unpack(&dest_path).map_err(|e| {
            UpkeepError::Extract(format!("Failed to extract {}: {e}", path.display()))
        })?;
        extracted_count += 1;

        if extracted_count % 100 == 0 {
            log::debug!("Extracted {extracted_count} files...");
        }
    }

    log::info!(
        "Extracted {extracted_count} entries from {} into {}",
        archive_path.display(),
        destination.display()
    );
    Ok(extracted_count)
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let total_files = archive.len();

    for i in 0..total_files {
        let mut file = archive.by_index(i)?;
        let outpath = destination.join(enclosed_zip_path(file.name(), file.enclosed_name())?);

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }

        if file.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            let mut outfile = File::create(&outpath).map_err(|e| {
                UpkeepError::Extract(format!("Failed to create {}: {e}", outpath.display()))
            })?;
            io::copy(&mut file, &mut outfile)?;
        }

        if let Some(mode) = file.unix_mode() {
            file_ops::set_permissions_from_mode(&outpath, mode)?;
        }
    }

    log::info!(
        "Extracted {total_files} entries from {} into {}",
        archive_path.display(),
        destination.display()
    );
    Ok(total_files)
}

fn enclosed_zip_path(name: &str, enclosed: Option<PathBuf>) -> Result<PathBuf> {
    let raw_name = PathBuf::from(name);
    validate_entry_path(&raw_name)?;
    enclosed.ok_or_else(|| {
        UpkeepError::SecurityError(format!(
            "Archive entry would extract outside destination: {raw_name:?}"
        ))
    })
}

fn validate_entry_path(entry_path: &Path) -> Result<()> {
    for component in entry_path.components() {
        match component {
            Component::ParentDir => {
                return Err(UpkeepError::SecurityError(format!(
                    "Archive contains path traversal: {entry_path:?}"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(UpkeepError::SecurityError(format!(
                    "Archive contains absolute path: {entry_path:?}"
                )));
            }
            _ => {}
        }
    }

    let as_text = entry_path.to_string_lossy();
    if as_text.starts_with('/') || as_text.starts_with('\\') {
        return Err(UpkeepError::SecurityError(format!(
            "Archive entry would extract outside destination: {entry_path:?}"
        )));
    }

    Ok(())
}
