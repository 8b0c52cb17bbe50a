//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! msgunfmt - decompile binary message catalog to text
//!
//! Reads one or more .mo files, in either byte order, and writes the
//! merged catalog as a .po file.

use clap::Parser;
use i18n_codec::gettext_lib::files;
use i18n_codec::gettext_lib::mo_file::MoFile;
use i18n_codec::gettext_lib::po_file::{PoFile, DEFAULT_WRAP_WIDTH};
use i18n_codec::gettext_lib::Catalog;
use log::debug;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

/// msgunfmt - decompile binary message catalog to text
#[derive(Parser)]
#[command(version, about = "msgunfmt - decompile binary message catalog to text")]
struct Args {
    #[arg(short = 'o', long = "output-file", help = "Output file name (default: standard output)")]
    output: Option<PathBuf>,

    #[arg(short = 'w', long, default_value_t = DEFAULT_WRAP_WIDTH, help = "Wrap strings at this column")]
    width: usize,

    #[arg(default_value = "-", help = "Input .mo files (\"-\" for standard input)")]
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut exit_code = 0;
    let mut catalog = Catalog::new();

    for path in &args.files {
        let mo = match files::read_input(path)
            .map_err(Into::into)
            .and_then(|data| MoFile::read(&data))
        {
            Ok(mo) => mo,
            Err(e) => {
                eprintln!("msgunfmt: {}: {}", path.display(), e);
                exit_code = 1;
                continue;
            }
        };
        debug!(
            "{}: {} strings, {:?} byte order",
            path.display(),
            mo.header.nstrings,
            mo.endianness
        );
        catalog.extend(mo.catalog);
    }

    if exit_code != 0 {
        exit(exit_code);
    }

    let text = PoFile::from_catalog(&catalog).write_with_width(args.width);

    let result = match args.output {
        Some(ref path) => File::create(path).and_then(|mut f| f.write_all(text.as_bytes())),
        None => io::stdout().write_all(text.as_bytes()),
    };
    if let Err(e) = result {
        let name = args
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());
        eprintln!("msgunfmt: {}: {}", name, e);
        exit_code = 1;
    }

    exit(exit_code);
}
