//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! In-memory message catalog shared by every codec
//!
//! A catalog maps a [`MsgId`] (optional context plus one or two original
//! strings) to a [`MsgStr`] (one translated string per plural form). The
//! entry whose key is the empty string holds the catalog metadata.

use std::fmt;

use indexmap::IndexMap;

use crate::gettext_lib::error::{FormatError, Result};

/// Separates a message context from the msgid in binary keys
pub const CONTEXT_SEPARATOR: u8 = 0x04;

/// Separates plural forms in binary keys and values
pub const FORM_SEPARATOR: u8 = 0x00;

/// Metadata written when a catalog is created without one
pub const DEFAULT_HEADER: &str = "Content-Type: text/plain; charset=UTF-8\n";

/// Ordered, non-empty list of strings, one per grammatical number form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MsgStr {
    forms: Vec<String>,
}

impl MsgStr {
    /// A value with a single form
    pub fn new(s: impl Into<String>) -> Self {
        MsgStr {
            forms: vec![s.into()],
        }
    }

    /// A value with the given forms, or `None` if there are none
    pub fn from_forms<I, S>(forms: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let forms: Vec<String> = forms.into_iter().map(Into::into).collect();
        if forms.is_empty() {
            None
        } else {
            Some(MsgStr { forms })
        }
    }

    pub fn forms(&self) -> &[String] {
        &self.forms
    }

    pub fn first(&self) -> &str {
        &self.forms[0]
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Always false; present for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Forms joined with NUL, as stored in a .mo file
    pub fn to_bytes(&self) -> Vec<u8> {
        self.forms.join("\0").into_bytes()
    }

    /// Split a NUL-joined buffer back into forms
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let forms = bytes
            .split(|b| *b == FORM_SEPARATOR)
            .map(|part| std::str::from_utf8(part).map(str::to_string))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        // split() on a slice always yields at least one part
        Ok(MsgStr { forms })
    }
}

impl From<&str> for MsgStr {
    fn from(s: &str) -> Self {
        MsgStr::new(s)
    }
}

impl From<String> for MsgStr {
    fn from(s: String) -> Self {
        MsgStr::new(s)
    }
}

/// Translation key: optional context plus singular and optional plural.
///
/// Ordering compares the context first, then the forms, byte by byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MsgId {
    context: Option<String>,
    id: MsgStr,
}

impl MsgId {
    /// Maximum number of original forms (singular and plural)
    pub const MAX_FORMS: usize = 2;

    /// Key for a message without plural forms
    pub fn new(singular: impl Into<String>) -> Self {
        MsgId {
            context: None,
            id: MsgStr::new(singular),
        }
    }

    /// Key for a message with a plural form
    pub fn plural(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        MsgId {
            context: None,
            id: MsgStr {
                forms: vec![singular.into(), plural.into()],
            },
        }
    }

    /// The reserved metadata key
    pub fn header() -> Self {
        MsgId::new("")
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Build a key from parts, rejecting more than two original forms
    pub fn from_parts(id: MsgStr, context: Option<String>) -> Result<Self> {
        if id.len() > Self::MAX_FORMS {
            return Err(FormatError::InvalidKey(format!(
                "{} original forms, at most {} allowed",
                id.len(),
                Self::MAX_FORMS
            )));
        }
        Ok(MsgId { context, id })
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn id(&self) -> &MsgStr {
        &self.id
    }

    pub fn singular(&self) -> &str {
        self.id.first()
    }

    pub fn plural_form(&self) -> Option<&str> {
        self.id.forms.get(1).map(String::as_str)
    }

    pub fn is_plural(&self) -> bool {
        self.id.len() > 1
    }

    /// True for the key that holds catalog metadata
    pub fn is_header(&self) -> bool {
        self.context.is_none() && !self.is_plural() && self.singular().is_empty()
    }

    /// Binary key: `context 0x04 singular [0x00 plural]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        if let Some(ref ctx) = self.context {
            bytes.extend_from_slice(ctx.as_bytes());
            bytes.push(CONTEXT_SEPARATOR);
        }
        bytes.extend_from_slice(&self.id.to_bytes());
        bytes
    }

    /// Inverse of [`MsgId::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (context, rest) = match bytes.iter().position(|b| *b == CONTEXT_SEPARATOR) {
            Some(pos) => (
                Some(std::str::from_utf8(&bytes[..pos])?.to_string()),
                &bytes[pos + 1..],
            ),
            None => (None, bytes),
        };
        MsgId::from_parts(MsgStr::from_bytes(rest)?, context)
    }
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref ctx) = self.context {
            write!(f, "[{}] ", ctx)?;
        }
        write!(f, "{}", self.singular())
    }
}

/// Plural form information from the header entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralForms {
    pub nplurals: usize,
    pub plural_expr: String,
}

/// Parsed view of the metadata entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderInfo {
    pub charset: Option<String>,
    pub plural_forms: Option<PluralForms>,
}

impl HeaderInfo {
    /// Parse `Content-Type` and `Plural-Forms` lines from a header value
    pub fn parse(header: &str) -> Self {
        let mut info = HeaderInfo::default();

        for line in header.lines() {
            let line = line.trim();

            if let Some(rest) = line.strip_prefix("Plural-Forms:") {
                let mut nplurals = None;
                let mut plural_expr = None;
                for part in rest.split(';') {
                    let part = part.trim();
                    if let Some(val) = part.strip_prefix("nplurals=") {
                        nplurals = val.trim().parse().ok();
                    } else if let Some(val) = part.strip_prefix("plural=") {
                        plural_expr = Some(val.trim().to_string());
                    }
                }
                if let (Some(nplurals), Some(plural_expr)) = (nplurals, plural_expr) {
                    info.plural_forms = Some(PluralForms {
                        nplurals,
                        plural_expr,
                    });
                }
            } else if let Some(rest) = line.strip_prefix("Content-Type:") {
                for part in rest.split(';') {
                    if let Some(val) = part.trim().strip_prefix("charset=") {
                        info.charset = Some(val.trim().to_string());
                    }
                }
            }
        }

        info
    }
}

/// Mapping from [`MsgId`] to [`MsgStr`] for one language.
///
/// Insertion order is kept (the delta codec derives positions from it) but
/// equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: IndexMap<MsgId, MsgStr>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// An empty catalog holding only [`DEFAULT_HEADER`]
    pub fn with_default_header() -> Self {
        let mut catalog = Catalog::new();
        catalog.set_header(MsgStr::new(DEFAULT_HEADER));
        catalog
    }

    /// Insert an entry, returning the value it replaced
    pub fn insert(&mut self, key: MsgId, value: MsgStr) -> Option<MsgStr> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &MsgId) -> Option<&MsgStr> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &MsgId) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry, keeping the order of the others
    pub fn remove(&mut self, key: &MsgId) -> Option<MsgStr> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, MsgId, MsgStr> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, MsgId, MsgStr> {
        self.entries.keys()
    }

    /// The metadata value, if present
    pub fn header(&self) -> Option<&MsgStr> {
        self.entries.get(&MsgId::header())
    }

    pub fn set_header(&mut self, value: MsgStr) -> Option<MsgStr> {
        self.entries.insert(MsgId::header(), value)
    }

    /// Remove and return the metadata value
    pub fn take_header(&mut self) -> Option<MsgStr> {
        self.remove(&MsgId::header())
    }

    /// Fails with [`FormatError::MissingHeader`] if there is no metadata entry
    pub fn require_header(&self) -> Result<&MsgStr> {
        self.header().ok_or(FormatError::MissingHeader)
    }

    pub fn header_info(&self) -> HeaderInfo {
        self.header()
            .map(|h| HeaderInfo::parse(h.first()))
            .unwrap_or_default()
    }

    /// Entries sorted by their binary key, the order .mo and .po output use
    pub fn canonical_entries(&self) -> Vec<(Vec<u8>, &MsgId, &MsgStr)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.to_bytes(), k, v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Keys other than the metadata key, in canonical order
    pub fn canonical_keys(&self) -> Vec<MsgId> {
        self.canonical_entries()
            .into_iter()
            .filter(|(_, k, _)| !k.is_header())
            .map(|(_, k, _)| k.clone())
            .collect()
    }
}

impl FromIterator<(MsgId, MsgStr)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (MsgId, MsgStr)>>(iter: I) -> Self {
        Catalog {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(MsgId, MsgStr)> for Catalog {
    fn extend<I: IntoIterator<Item = (MsgId, MsgStr)>>(&mut self, iter: I) {
        self.entries.extend(iter)
    }
}

impl IntoIterator for Catalog {
    type Item = (MsgId, MsgStr);
    type IntoIter = indexmap::map::IntoIter<MsgId, MsgStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a MsgId, &'a MsgStr);
    type IntoIter = indexmap::map::Iter<'a, MsgId, MsgStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
