//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! langpack - convert gettext catalogs to .lang delta files
//!
//! Each input (.po or .mo) names its language by file stem. One
//! `<lang>.lang` file is written per input, plus the base file holding the
//! original strings that every translation file is aligned to.

use clap::Parser;
use i18n_codec::gettext_lib::lang_file;
use i18n_codec::gettext_lib::{files, Catalog, MsgId, Result};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

/// langpack - convert gettext catalogs to .lang delta files
#[derive(Parser)]
#[command(version, about = "langpack - convert gettext catalogs to .lang delta files")]
struct Args {
    #[arg(short = 'b', long = "base", default_value = "en", help = "Language of the original strings")]
    base_language: String,

    #[arg(short = 'd', long = "directory", default_value = ".", help = "Directory for the .lang files")]
    directory: PathBuf,

    #[arg(short = 'f', long = "use-fuzzy", help = "Include fuzzy .po entries")]
    include_fuzzy: bool,

    #[arg(required = true, help = "Input .po or .mo files, named <lang>.po or <lang>.mo")]
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut exit_code = 0;
    let mut catalogs: BTreeMap<String, Catalog> = BTreeMap::new();

    for path in &args.files {
        match load_language(path, args.include_fuzzy) {
            Ok((language, _)) if catalogs.contains_key(&language) => {
                eprintln!("langpack: {}: language {} given twice", path.display(), language);
                exit_code = 1;
            }
            Ok((language, catalog)) => {
                catalogs.insert(language, catalog);
            }
            Err(e) => {
                eprintln!("langpack: {}: {}", path.display(), e);
                exit_code = 1;
            }
        }
    }

    if exit_code != 0 {
        exit(exit_code);
    }

    let keys = base_keys(&args.base_language, &catalogs);
    info!("{} base messages", keys.len());

    let known: HashSet<&MsgId> = keys.iter().collect();
    for (language, catalog) in &catalogs {
        let unknown = catalog.keys().filter(|k| !known.contains(k)).count();
        if unknown > 0 {
            warn!("{}: {} messages are not in the base language", language, unknown);
        }
    }

    let base_path = lang_path(&args.directory, &args.base_language);
    if let Err(e) = write_lang(&base_path, |w| lang_file::write_base(w, &keys)) {
        eprintln!("langpack: {}: {}", base_path.display(), e);
        exit(1);
    }

    for (language, catalog) in &catalogs {
        if *language == args.base_language {
            continue;
        }
        let path = lang_path(&args.directory, language);
        if let Err(e) = write_lang(&path, |w| lang_file::write_translation(w, &keys, catalog)) {
            eprintln!("langpack: {}: {}", path.display(), e);
            exit_code = 1;
        }
    }

    exit(exit_code);
}

/// Language code and header-less catalog of one input file
fn load_language(path: &Path, include_fuzzy: bool) -> Result<(String, Catalog)> {
    let language = files::language_code(path)?;
    let mut catalog = files::read_catalog_file(path, include_fuzzy)?;
    if catalog.take_header().is_some() {
        debug!("{}: header entry not carried into .lang", path.display());
    }
    Ok((language, catalog))
}

/// Keys of the base language catalog, or of every catalog when the base
/// language is not among the inputs
fn base_keys(base_language: &str, catalogs: &BTreeMap<String, Catalog>) -> Vec<MsgId> {
    if let Some(base) = catalogs.get(base_language) {
        return base.canonical_keys();
    }
    debug!("no {} input, using the union of all messages", base_language);
    let union: Catalog = catalogs
        .values()
        .flat_map(|c| c.iter())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    union.canonical_keys()
}

fn lang_path(directory: &Path, language: &str) -> PathBuf {
    directory.join(format!("{}.lang", language))
}

/// Encode with `write` and store the result at `path`; nothing is created
/// if encoding fails
fn write_lang<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut out = Vec::new();
    write(&mut out)?;
    fs::write(path, out)?;
    Ok(())
}
