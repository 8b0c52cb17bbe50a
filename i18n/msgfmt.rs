//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! msgfmt - compile message catalog to binary format
//!
//! The msgfmt utility compiles portable message object (.po) files
//! into machine object (.mo) files for use by gettext functions.

use clap::{Parser, ValueEnum};
use i18n_codec::gettext_lib::files;
use i18n_codec::gettext_lib::mo_file::{self, Endianness};
use i18n_codec::gettext_lib::po_file::PoFile;
use i18n_codec::gettext_lib::{Catalog, MsgId, MsgStr, DEFAULT_HEADER};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ByteOrderArg {
    Little,
    Big,
}

impl From<ByteOrderArg> for Endianness {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Little => Endianness::Little,
            ByteOrderArg::Big => Endianness::Big,
        }
    }
}

/// msgfmt - compile message catalog to binary format
#[derive(Parser)]
#[command(version, about = "msgfmt - compile message catalog to binary format")]
struct Args {
    #[arg(short = 'c', long, help = "Check plural form counts and newline consistency")]
    check: bool,

    #[arg(short = 'f', long = "use-fuzzy", help = "Include fuzzy entries in the output")]
    include_fuzzy: bool,

    #[arg(short = 'v', long, help = "Print statistics and warnings")]
    verbose: bool,

    #[arg(short = 'D', long = "directory", action = clap::ArgAction::Append, help = "Add directory to search path for input files")]
    directories: Vec<PathBuf>,

    #[arg(short = 'o', long = "output-file", help = "Output file name")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "little", help = "Byte order of the output file")]
    endianness: ByteOrderArg,

    #[arg(required = true, help = "Input .po files")]
    files: Vec<PathBuf>,
}

/// Warning or error from processing
#[derive(Debug)]
struct Diagnostic {
    key: String,
    message: String,
    is_error: bool,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "msgfmt: {}: {:?}: {}",
            if self.is_error { "error" } else { "warning" },
            self.key,
            self.message
        )
    }
}

#[derive(Debug, Default)]
struct Statistics {
    translated: usize,
    fuzzy: usize,
    untranslated: usize,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut exit_code = 0;
    let mut catalog = Catalog::new();
    let mut stats = Statistics::default();

    for input_path in &args.files {
        let path = find_input_file(input_path, &args.directories);

        let po = match files::input_stream(&path)
            .map_err(Into::into)
            .and_then(PoFile::parse_from)
        {
            Ok(po) => po,
            Err(e) => {
                eprintln!("msgfmt: {}: {}", path.display(), e);
                exit_code = 1;
                continue;
            }
        };

        if !args.include_fuzzy {
            stats.fuzzy += po
                .entries
                .iter()
                .filter(|e| e.is_fuzzy() && !e.is_header())
                .count();
        }

        match po.to_catalog(args.include_fuzzy) {
            Ok(file_catalog) => {
                debug!("{}: {} entries", path.display(), file_catalog.len());
                catalog.extend(file_catalog);
            }
            Err(e) => {
                eprintln!("msgfmt: {}: {}", path.display(), e);
                exit_code = 1;
            }
        }
    }

    if catalog.header().is_none() {
        warn!("no header entry, using default");
        catalog.set_header(MsgStr::new(DEFAULT_HEADER));
    }

    let catalog = drop_untranslated(catalog, &mut stats);

    if args.check {
        let diagnostics = validate(&catalog);
        for diag in &diagnostics {
            if diag.is_error || args.verbose {
                eprintln!("{}", diag);
            }
        }
        if diagnostics.iter().any(|d| d.is_error) {
            exit_code = 1;
        }
    }

    if exit_code == 0 {
        let output_path = get_output_path(&args);
        if let Err(e) = write_mo_file(&output_path, &catalog, args.endianness.into()) {
            eprintln!("msgfmt: {}: {}", output_path.display(), e);
            exit_code = 1;
        }
    }

    if args.verbose {
        eprintln!(
            "{} translated messages, {} fuzzy translations, {} untranslated messages.",
            stats.translated, stats.fuzzy, stats.untranslated
        );
    }

    exit(exit_code);
}

/// Find an input file, searching directories if needed
fn find_input_file(path: &Path, directories: &[PathBuf]) -> PathBuf {
    if path.exists() || path.as_os_str() == "-" {
        return path.to_path_buf();
    }

    for dir in directories {
        let full_path = dir.join(path);
        if full_path.exists() {
            return full_path;
        }
    }

    path.to_path_buf()
}

/// Get the output file path
fn get_output_path(args: &Args) -> PathBuf {
    if let Some(ref output) = args.output {
        return output.clone();
    }
    PathBuf::from("messages.mo")
}

/// Leave out entries whose every form is empty; a runtime lookup would
/// otherwise return the empty string instead of the original.
fn drop_untranslated(catalog: Catalog, stats: &mut Statistics) -> Catalog {
    catalog
        .into_iter()
        .filter(|(key, value)| {
            if key.is_header() {
                return true;
            }
            if value.forms().iter().all(|f| f.is_empty()) {
                debug!("dropping untranslated {:?}", key.singular());
                stats.untranslated += 1;
                false
            } else {
                stats.translated += 1;
                true
            }
        })
        .collect()
}

/// Check form counts against the header and newline consistency
fn validate(catalog: &Catalog) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let info = catalog.header_info();

    if let Some(ref charset) = info.charset {
        if !charset.eq_ignore_ascii_case("utf-8") {
            diagnostics.push(Diagnostic {
                key: String::new(),
                message: format!("charset {} is not UTF-8", charset),
                is_error: false,
            });
        }
    }

    let has_plurals = catalog.keys().any(MsgId::is_plural);
    if has_plurals && info.plural_forms.is_none() {
        diagnostics.push(Diagnostic {
            key: String::new(),
            message: "header entry lacks a valid Plural-Forms line".to_string(),
            is_error: false,
        });
    }

    for (key, value) in catalog.iter() {
        if key.is_header() {
            continue;
        }

        if let (true, Some(plural)) = (key.is_plural(), info.plural_forms.as_ref()) {
            if value.len() != plural.nplurals {
                diagnostics.push(Diagnostic {
                    key: key.to_string(),
                    message: format!(
                        "expected {} plural forms, found {}",
                        plural.nplurals,
                        value.len()
                    ),
                    is_error: true,
                });
            }
        }

        let msgid = key.singular();
        for (i, form) in value.forms().iter().enumerate() {
            if form.is_empty() {
                continue;
            }
            if msgid.starts_with('\n') != form.starts_with('\n') {
                diagnostics.push(Diagnostic {
                    key: key.to_string(),
                    message: format!("msgid and msgstr[{}] differ in a leading newline", i),
                    is_error: true,
                });
            }
            if msgid.ends_with('\n') != form.ends_with('\n') {
                diagnostics.push(Diagnostic {
                    key: key.to_string(),
                    message: format!("msgid and msgstr[{}] differ in a trailing newline", i),
                    is_error: true,
                });
            }
        }
    }

    diagnostics
}

/// Write the .mo file
fn write_mo_file(
    path: &Path,
    catalog: &Catalog,
    endianness: Endianness,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = BufWriter::new(File::create(path)?);
    mo_file::write_to(&mut file, catalog, endianness)?;
    file.flush()?;
    Ok(())
}
