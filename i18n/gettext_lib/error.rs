//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Error type shared by the catalog codecs

use std::io;
use std::str::Utf8Error;

/// Everything that can go wrong while encoding or decoding a catalog.
///
/// Every variant aborts the current call; no partial catalog is returned.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("unexpected end of data while reading {0}")]
    Truncated(&'static str),

    #[error("invalid magic number: 0x{0:08x}")]
    InvalidMagic(u32),

    #[error("unsupported file format revision: {0}")]
    UnsupportedRevision(u32),

    #[error("{what} out of bounds (offset {offset}, length {length}, data size {size})")]
    OutOfBounds {
        what: &'static str,
        offset: usize,
        length: usize,
        size: usize,
    },

    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    #[error("invalid message key: {0}")]
    InvalidKey(String),

    #[error("invalid translation for {key:?}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("catalog has no header entry (msgid \"\")")]
    MissingHeader,

    #[error("duplicate message definition: {0:?}")]
    DuplicateEntry(String),

    #[error("line {0}: {1}")]
    Parse(usize, String),

    #[error("line {0}: invalid escape sequence \\{1}")]
    InvalidEscape(usize, char),

    #[error("line {0}: unterminated string")]
    UnterminatedString(usize),

    #[error("line {line}: expected msgstr[{expected}], found msgstr[{found}]")]
    PluralIndex {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {0}: msgid_plural without msgstr[N] entries")]
    MissingPluralForms(usize),

    #[error("{0} forms exceed the maximum of {1}")]
    TooManyForms(usize, usize),

    #[error("string of {0} bytes does not fit the record length field")]
    StringTooLong(usize),

    #[error("language {language:?}: {reason}")]
    Misaligned { language: String, reason: String },

    #[error("unrecognized catalog file name: {0}")]
    UnknownFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;
