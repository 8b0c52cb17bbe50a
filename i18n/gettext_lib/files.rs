//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Catalog file helpers shared by the command line tools

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use log::debug;

use crate::gettext_lib::catalog::Catalog;
use crate::gettext_lib::error::{FormatError, Result};
use crate::gettext_lib::mo_file::MoFile;
use crate::gettext_lib::po_file::PoFile;

/// On-disk catalog format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Po,
    Mo,
    Lang,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("po") | Some("pot") => Ok(CatalogFormat::Po),
            Some("mo") | Some("gmo") => Ok(CatalogFormat::Mo),
            Some("lang") => Ok(CatalogFormat::Lang),
            _ => Err(FormatError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CatalogFormat::Po => "po",
            CatalogFormat::Mo => "mo",
            CatalogFormat::Lang => "lang",
        }
    }
}

/// Open a file for reading; "-" means standard input
pub fn input_stream(path: &Path) -> io::Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(File::open(path)?))
    }
}

/// Read a whole file, or standard input for "-"
pub fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    input_stream(path)?.read_to_end(&mut data)?;
    Ok(data)
}

/// Language code named by a file: `de.po`, `pt_BR.lang`
pub fn language_code(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FormatError::UnknownFormat(path.display().to_string()))
}

/// Load a .po or .mo file into a catalog.
///
/// Fuzzy .po entries are left out unless `include_fuzzy` is set.
pub fn read_catalog_file(path: &Path, include_fuzzy: bool) -> Result<Catalog> {
    let format = CatalogFormat::from_path(path)?;
    debug!("reading {} as {:?}", path.display(), format);
    match format {
        CatalogFormat::Po => PoFile::parse_from(input_stream(path)?)?.to_catalog(include_fuzzy),
        CatalogFormat::Mo => Ok(MoFile::read(&fs::read(path)?)?.catalog),
        CatalogFormat::Lang => Err(FormatError::UnknownFormat(format!(
            "{}: .lang files need their base file",
            path.display()
        ))),
    }
}
