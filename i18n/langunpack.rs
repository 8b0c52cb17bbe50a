//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! langunpack - convert .lang delta files back to gettext catalogs
//!
//! The base language file supplies the keys; every other input is read
//! against it. One .po (or, with `--mo`, .mo) file is written per language,
//! carrying a default header entry.

use clap::Parser;
use i18n_codec::gettext_lib::files::{self, CatalogFormat};
use i18n_codec::gettext_lib::mo_file::{self, Endianness};
use i18n_codec::gettext_lib::{lang_file, po_file};
use i18n_codec::gettext_lib::{Catalog, FormatError, MsgStr, Result, DEFAULT_HEADER};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

/// langunpack - convert .lang delta files back to gettext catalogs
#[derive(Parser)]
#[command(version, about = "langunpack - convert .lang delta files back to gettext catalogs")]
struct Args {
    #[arg(short = 'b', long = "base", default_value = "en", help = "Language of the base file")]
    base_language: String,

    #[arg(short = 'd', long = "directory", default_value = ".", help = "Directory for the output catalogs")]
    directory: PathBuf,

    #[arg(long, help = "Write binary .mo files instead of .po files")]
    mo: bool,

    #[arg(required = true, help = "Input .lang files, named <lang>.lang")]
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut exit_code = 0;
    let mut base: Option<Vec<u8>> = None;
    let mut translations: Vec<(String, Vec<u8>)> = Vec::new();

    for path in &args.files {
        match read_lang_input(path) {
            Ok((language, data)) if language == args.base_language => base = Some(data),
            Ok((language, data)) => translations.push((language, data)),
            Err(e) => {
                eprintln!("langunpack: {}: {}", path.display(), e);
                exit_code = 1;
            }
        }
    }

    if exit_code != 0 {
        exit(exit_code);
    }

    let Some(base) = base else {
        eprintln!(
            "langunpack: no base file {}.lang among the inputs",
            args.base_language
        );
        exit(1);
    };

    let catalogs = match lang_file::read_all(
        &args.base_language,
        &base,
        translations
            .iter()
            .map(|(language, data)| (language.as_str(), data.as_slice())),
    ) {
        Ok(catalogs) => catalogs,
        Err(e) => {
            eprintln!("langunpack: {}", e);
            exit(1);
        }
    };

    let format = if args.mo {
        CatalogFormat::Mo
    } else {
        CatalogFormat::Po
    };

    for (language, mut catalog) in catalogs {
        info!("{}: {} messages", language, catalog.len());
        catalog.set_header(MsgStr::new(DEFAULT_HEADER));

        let path = args
            .directory
            .join(format!("{}.{}", language, format.extension()));
        if let Err(e) = write_catalog(&path, &catalog, format) {
            eprintln!("langunpack: {}: {}", path.display(), e);
            exit_code = 1;
        }
    }

    exit(exit_code);
}

fn read_lang_input(path: &Path) -> Result<(String, Vec<u8>)> {
    if CatalogFormat::from_path(path)? != CatalogFormat::Lang {
        return Err(FormatError::UnknownFormat(format!(
            "{}: not a .lang file",
            path.display()
        )));
    }
    let language = files::language_code(path)?;
    let data = fs::read(path)?;
    Ok((language, data))
}

fn write_catalog(path: &Path, catalog: &Catalog, format: CatalogFormat) -> Result<()> {
    let data = match format {
        CatalogFormat::Mo => mo_file::write(catalog, Endianness::Little)?,
        _ => po_file::encode(catalog)?.into_bytes(),
    };
    fs::write(path, data)?;
    Ok(())
}
