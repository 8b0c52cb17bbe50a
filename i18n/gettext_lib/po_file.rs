//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! .po (Portable Object) file reader and writer
//!
//! The .po file format is a human-readable format for translated message catalogs.
//!
//! PO file format:
//! - Comments: lines starting with #
//!   - #  - translator comments
//!   - #. - extracted comments
//!   - #: - reference (file:line)
//!   - #, - flags (fuzzy, c-format, etc.)
//!   - #| - previous msgid
//!   - #~ - obsolete entry
//! - msgctxt "context" - message context (optional)
//! - msgid "original" - original string
//! - msgid_plural "plural" - plural original (optional)
//! - msgstr "translation" - translation (for singular)
//! - msgstr[N] "translation" - plural translations
//!
//! Adjacent string literals belonging to one keyword are concatenated.

use std::fmt;
use std::io::Read;

use log::{debug, warn};

use crate::gettext_lib::catalog::{Catalog, MsgId, MsgStr};
use crate::gettext_lib::error::{FormatError, Result};

/// Line width the writer wraps long strings at
pub const DEFAULT_WRAP_WIDTH: usize = 79;

/// A single message entry from a .po file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    /// Comment lines preceding the entry, without the leading '#'
    pub comments: Vec<String>,
    /// Message context
    pub msgctxt: Option<String>,
    /// Original string (msgid)
    pub msgid: String,
    /// Plural original (msgid_plural)
    pub msgid_plural: Option<String>,
    /// Translations, one per plural form
    pub msgstr: Vec<String>,
}

impl PoEntry {
    /// Build an entry from a catalog pair
    pub fn from_pair(key: &MsgId, value: &MsgStr) -> Self {
        PoEntry {
            comments: Vec::new(),
            msgctxt: key.context().map(str::to_string),
            msgid: key.singular().to_string(),
            msgid_plural: key.plural_form().map(str::to_string),
            msgstr: value.forms().to_vec(),
        }
    }

    /// Check if this is the header entry (empty msgid)
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none() && self.msgid_plural.is_none()
    }

    /// Check if this is a plural entry
    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// Flags from `#,` comment lines
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.comments
            .iter()
            .filter_map(|c| c.strip_prefix(','))
            .flat_map(|c| c.split(','))
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags().any(|f| f == "fuzzy")
    }

    pub fn key(&self) -> Result<MsgId> {
        let mut forms = vec![self.msgid.clone()];
        forms.extend(self.msgid_plural.iter().cloned());
        // msgid is always present, so there is at least one form
        let id = MsgStr::from_forms(forms).unwrap_or_else(|| MsgStr::new(""));
        MsgId::from_parts(id, self.msgctxt.clone())
    }

    pub fn value(&self) -> Result<MsgStr> {
        MsgStr::from_forms(self.msgstr.iter().cloned()).ok_or_else(|| {
            FormatError::InvalidValue {
                key: self.msgid.clone(),
                reason: "no msgstr".to_string(),
            }
        })
    }

    /// `msgstr[N]` is used for plural entries and multi-form values
    fn has_indexed_msgstr(&self) -> bool {
        self.is_plural() || self.msgstr.len() != 1
    }

    fn write(&self, out: &mut String, width: usize) {
        for comment in &self.comments {
            out.push('#');
            out.push_str(comment);
            out.push('\n');
        }
        if let Some(ref ctx) = self.msgctxt {
            write_field(out, "msgctxt", ctx, width);
        }
        write_field(out, "msgid", &self.msgid, width);
        if let Some(ref plural) = self.msgid_plural {
            write_field(out, "msgid_plural", plural, width);
        }
        if self.has_indexed_msgstr() {
            for (i, form) in self.msgstr.iter().enumerate() {
                write_field(out, &format!("msgstr[{}]", i), form, width);
            }
        } else {
            write_field(out, "msgstr", &self.msgstr[0], width);
        }
    }
}

/// Parsed .po file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoFile {
    /// Message entries, in file order
    pub entries: Vec<PoEntry>,
    /// Comment lines after the last entry (typically obsolete entries)
    pub trailing_comments: Vec<String>,
}

impl PoFile {
    /// Parse a .po file from a string
    pub fn parse(s: &str) -> Result<Self> {
        PoParser::new(s).parse()
    }

    /// Parse a .po file from a reader
    pub fn parse_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let text = std::str::from_utf8(&data)?;
        Self::parse(text)
    }

    /// One entry per catalog pair, in canonical order (header first)
    pub fn from_catalog(catalog: &Catalog) -> Self {
        PoFile {
            entries: catalog
                .canonical_entries()
                .into_iter()
                .map(|(_, key, value)| PoEntry::from_pair(key, value))
                .collect(),
            trailing_comments: Vec::new(),
        }
    }

    /// Collect the entries into a catalog, optionally leaving out fuzzy ones.
    ///
    /// The header entry is always kept.
    pub fn to_catalog(&self, include_fuzzy: bool) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        for entry in &self.entries {
            if entry.is_fuzzy() && !include_fuzzy && !entry.is_header() {
                debug!("skipping fuzzy entry {:?}", entry.msgid);
                continue;
            }
            let key = entry.key()?;
            if catalog.contains_key(&key) {
                return Err(FormatError::DuplicateEntry(key.to_string()));
            }
            catalog.insert(key, entry.value()?);
        }
        Ok(catalog)
    }

    /// The header entry, if present
    pub fn header(&self) -> Option<&PoEntry> {
        self.entries.iter().find(|e| e.is_header())
    }

    /// Render the file, wrapping strings at `width` columns
    pub fn write_with_width(&self, width: usize) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            entry.write(&mut out, width);
        }
        if !self.trailing_comments.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            for comment in &self.trailing_comments {
                out.push('#');
                out.push_str(comment);
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for PoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.write_with_width(DEFAULT_WRAP_WIDTH))
    }
}

/// Encode a catalog as .po text; the header entry must be present
pub fn encode(catalog: &Catalog) -> Result<String> {
    catalog.require_header()?;
    Ok(PoFile::from_catalog(catalog).to_string())
}

/// Decode .po text into a catalog, keeping fuzzy entries
pub fn decode(text: &str) -> Result<Catalog> {
    PoFile::parse(text)?.to_catalog(true)
}

/// Which string a continuation line appends to
#[derive(Debug, Clone, Copy)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str(usize),
}

/// Entry being assembled by the parser
#[derive(Default)]
struct PartialEntry {
    entry: PoEntry,
    has_msgid: bool,
    plain_msgstr: bool,
    plural_line: usize,
    last: Option<Field>,
}

impl PartialEntry {
    fn is_started(&self) -> bool {
        self.has_msgid || self.entry.msgctxt.is_some()
    }

    fn is_complete(&self) -> bool {
        !self.entry.msgstr.is_empty()
    }
}

/// Line-oriented parser for .po text
struct PoParser<'a> {
    lines: std::str::Lines<'a>,
    line_number: usize,
}

impl<'a> PoParser<'a> {
    fn new(text: &'a str) -> Self {
        PoParser {
            lines: text.lines(),
            line_number: 0,
        }
    }

    fn parse(&mut self) -> Result<PoFile> {
        let mut po_file = PoFile::default();
        let mut current = PartialEntry::default();
        let mut pending_comments = Vec::new();

        while let Some(raw) = self.lines.next() {
            self.line_number += 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                if current.is_complete() {
                    po_file.entries.push(self.finish(std::mem::take(&mut current))?);
                }
                if current.is_started() {
                    current.entry.comments.push(comment.to_string());
                } else {
                    pending_comments.push(comment.to_string());
                }
                continue;
            }

            if line.starts_with('"') {
                let value = self.parse_literals(line)?;
                self.append(&mut current, &value)?;
                continue;
            }

            let (keyword, rest) = split_keyword(line);
            match keyword {
                "msgctxt" | "msgid" => {
                    if current.is_complete() {
                        po_file.entries.push(self.finish(std::mem::take(&mut current))?);
                    }
                    if current.has_msgid || (keyword == "msgctxt" && current.is_started()) {
                        return Err(self.error(format!("unexpected {}: missing msgstr", keyword)));
                    }
                    if !current.is_started() {
                        current.entry.comments = std::mem::take(&mut pending_comments);
                    }

                    let value = self.parse_literals(rest)?;
                    if keyword == "msgctxt" {
                        current.entry.msgctxt = Some(value);
                        current.last = Some(Field::Context);
                    } else {
                        current.entry.msgid = value;
                        current.has_msgid = true;
                        current.last = Some(Field::Id);
                    }
                }
                "msgid_plural" => {
                    if !current.has_msgid
                        || current.entry.msgid_plural.is_some()
                        || current.is_complete()
                    {
                        return Err(self.error("unexpected msgid_plural".to_string()));
                    }
                    current.entry.msgid_plural = Some(self.parse_literals(rest)?);
                    current.plural_line = self.line_number;
                    current.last = Some(Field::IdPlural);
                }
                "msgstr" => {
                    if !current.has_msgid || current.is_complete() {
                        return Err(self.error("unexpected msgstr".to_string()));
                    }
                    current.entry.msgstr.push(self.parse_literals(rest)?);
                    current.plain_msgstr = true;
                    current.last = Some(Field::Str(0));
                }
                _ if keyword.starts_with("msgstr[") => {
                    let index = self.parse_index(keyword)?;
                    if !current.has_msgid || current.plain_msgstr {
                        return Err(self.error(format!("unexpected {}", keyword)));
                    }
                    let expected = current.entry.msgstr.len();
                    if index != expected {
                        return Err(FormatError::PluralIndex {
                            line: self.line_number,
                            expected,
                            found: index,
                        });
                    }
                    current.entry.msgstr.push(self.parse_literals(rest)?);
                    current.last = Some(Field::Str(index));
                }
                "domain" => {
                    warn!("line {}: ignoring domain directive", self.line_number);
                }
                _ => {
                    return Err(self.error(format!("unknown keyword {:?}", keyword)));
                }
            }
        }

        if current.is_started() {
            po_file.entries.push(self.finish(current)?);
        }
        po_file.trailing_comments = pending_comments;

        debug!("parsed {} entries", po_file.entries.len());
        Ok(po_file)
    }

    fn finish(&self, partial: PartialEntry) -> Result<PoEntry> {
        if !partial.has_msgid {
            return Err(self.error("msgctxt without msgid".to_string()));
        }
        if partial.entry.msgid_plural.is_some() && partial.plain_msgstr {
            return Err(FormatError::MissingPluralForms(partial.plural_line));
        }
        if partial.entry.msgstr.is_empty() {
            if partial.entry.msgid_plural.is_some() {
                return Err(FormatError::MissingPluralForms(partial.plural_line));
            }
            return Err(self.error(format!("missing msgstr for {:?}", partial.entry.msgid)));
        }
        Ok(partial.entry)
    }

    fn append(&self, current: &mut PartialEntry, value: &str) -> Result<()> {
        let entry = &mut current.entry;
        let target = match current.last {
            Some(Field::Context) => entry.msgctxt.as_mut(),
            Some(Field::Id) => Some(&mut entry.msgid),
            Some(Field::IdPlural) => entry.msgid_plural.as_mut(),
            Some(Field::Str(i)) => entry.msgstr.get_mut(i),
            None => None,
        };
        match target {
            Some(s) => {
                s.push_str(value);
                Ok(())
            }
            None => Err(self.error("string without keyword".to_string())),
        }
    }

    fn parse_index(&self, keyword: &str) -> Result<usize> {
        keyword
            .strip_prefix("msgstr[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(|| self.error(format!("invalid msgstr index in {:?}", keyword)))
    }

    /// Parse one or more adjacent quoted literals, concatenated
    fn parse_literals(&self, s: &str) -> Result<String> {
        let mut bytes = Vec::new();
        let mut rest = s.trim_start();

        if !rest.starts_with('"') {
            return Err(self.error("expected quoted string".to_string()));
        }

        while let Some(body) = rest.strip_prefix('"') {
            rest = self.unescape_literal(body, &mut bytes)?.trim_start();
        }
        if !rest.is_empty() {
            return Err(self.error(format!("unexpected text after string: {:?}", rest)));
        }

        String::from_utf8(bytes).map_err(|e| FormatError::InvalidUtf8(e.utf8_error()))
    }

    /// Decode the literal body up to its closing quote; returns the remainder
    fn unescape_literal<'s>(&self, body: &'s str, out: &mut Vec<u8>) -> Result<&'s str> {
        let mut chars = body.char_indices().peekable();
        let mut buf = [0u8; 4];

        while let Some((pos, c)) = chars.next() {
            match c {
                '"' => return Ok(&body[pos + 1..]),
                '\\' => {
                    let (_, esc) = chars
                        .next()
                        .ok_or(FormatError::UnterminatedString(self.line_number))?;
                    let byte = match esc {
                        'n' => b'\n',
                        't' => b'\t',
                        'r' => b'\r',
                        'a' => 0x07,
                        'b' => 0x08,
                        'f' => 0x0c,
                        'v' => 0x0b,
                        '\\' => b'\\',
                        '"' => b'"',
                        '\'' => b'\'',
                        '?' => b'?',
                        '0'..='7' => {
                            let mut value = esc as u32 - '0' as u32;
                            for _ in 0..2 {
                                match chars.peek() {
                                    Some(&(_, d @ '0'..='7')) => {
                                        value = value * 8 + (d as u32 - '0' as u32);
                                        chars.next();
                                    }
                                    _ => break,
                                }
                            }
                            u8::try_from(value)
                                .map_err(|_| FormatError::InvalidEscape(self.line_number, esc))?
                        }
                        'x' => {
                            let mut value = 0u32;
                            let mut digits = 0;
                            while digits < 2 {
                                match chars.peek().and_then(|&(_, d)| d.to_digit(16)) {
                                    Some(d) => {
                                        value = value * 16 + d;
                                        digits += 1;
                                        chars.next();
                                    }
                                    None => break,
                                }
                            }
                            if digits == 0 {
                                return Err(FormatError::InvalidEscape(self.line_number, 'x'));
                            }
                            value as u8
                        }
                        other => return Err(FormatError::InvalidEscape(self.line_number, other)),
                    };
                    out.push(byte);
                }
                _ => out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes()),
            }
        }

        Err(FormatError::UnterminatedString(self.line_number))
    }

    fn error(&self, message: String) -> FormatError {
        FormatError::Parse(self.line_number, message)
    }
}

/// Split `msgstr[1] "x"` into `("msgstr[1]", " \"x\"")`
fn split_keyword(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '"')
        .unwrap_or(line.len());
    line.split_at(end)
}

/// Escape one character for a quoted literal
fn escape_char(c: char, out: &mut String) {
    match c {
        '\\' => out.push_str("\\\\"),
        '"' => out.push_str("\\\""),
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\u{07}' => out.push_str("\\a"),
        '\u{08}' => out.push_str("\\b"),
        '\u{0c}' => out.push_str("\\f"),
        '\u{0b}' => out.push_str("\\v"),
        c if (c as u32) < 0x20 || c == '\u{7f}' => {
            out.push_str(&format!("\\{:03o}", c as u32));
        }
        c => out.push(c),
    }
}

/// Escape a whole string for a quoted literal
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        escape_char(c, &mut out);
    }
    out
}

/// Escaped pieces of `value`, split after each newline and before `width`
fn wrap(value: &str, width: usize) -> Vec<String> {
    let max = width.saturating_sub(2).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut token = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        token.clear();
        escape_char(c, &mut token);

        // escapes never contain a space, so any space is a safe break point
        while !current.is_empty() && columns(&current) + columns(&token) > max {
            let cut = current
                .rfind(' ')
                .map(|p| p + 1)
                .filter(|p| *p < current.len())
                .unwrap_or(current.len());
            let rest = current.split_off(cut);
            lines.push(std::mem::replace(&mut current, rest));
        }

        current.push_str(&token);
        if c == '\n' && chars.peek().is_some() {
            lines.push(std::mem::take(&mut current));
        }
    }

    lines.push(current);
    lines
}

fn columns(s: &str) -> usize {
    s.chars().count()
}

fn write_field(out: &mut String, keyword: &str, value: &str, width: usize) {
    let lines = wrap(value, width);
    if lines.len() == 1 && columns(keyword) + columns(&lines[0]) + 3 <= width {
        out.push_str(&format!("{} \"{}\"\n", keyword, lines[0]));
    } else {
        out.push_str(&format!("{} \"\"\n", keyword));
        for line in &lines {
            out.push_str(&format!("\"{}\"\n", line));
        }
    }
}
