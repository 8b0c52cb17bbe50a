//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! JOSM .lang delta format reader and writer
//!
//! A set of .lang files shares one ordered list of original keys. The base
//! file stores the originals; every translation file stores only the
//! translated text, positionally aligned with the base. There are no keys in
//! a translation file, so the key list passed to the writer must be passed
//! unchanged (same order, no dedup) for every language.
//!
//! Each file has two sections. Keys without a plural form come first, in the
//! order given, then keys with a plural form:
//!
//! - singular record: big-endian u16 length + UTF-8 bytes. In translation
//!   files a length of `0x0000` means "not translated" and `0xFFFE` means
//!   "same as the original".
//! - section separator: u16 `0xFFFF`
//! - plural record: u8 form count, then that many length-prefixed strings.
//!   In translation files a count of `0x00` means "not translated" and
//!   `0xFE` means "same as the original".
//!
//! Message contexts are folded into the first original string as
//! `_:context\n` + text. The header entry (empty msgid) has no encoding and
//! must be carried separately by the caller.

use std::collections::BTreeMap;
use std::io::Write;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use log::{debug, trace};

use crate::gettext_lib::catalog::{Catalog, MsgId, MsgStr};
use crate::gettext_lib::error::{FormatError, Result};

/// Largest number of plural forms one record can hold
pub const MAX_FORMS: usize = 253;

const ABSENT_SINGULAR: u16 = 0x0000;
const IDENTICAL_SINGULAR: u16 = 0xFFFE;
const SECTION_END: u16 = 0xFFFF;

const ABSENT_PLURAL: u8 = 0x00;
const IDENTICAL_PLURAL: u8 = 0xFE;

/// Singular lengths 0xFFFE and 0xFFFF are markers
const MAX_SINGULAR_LEN: usize = 0xFFFD;
const MAX_PLURAL_LEN: usize = 0xFFFF;

const CONTEXT_PREFIX: &str = "_:";

/// Write the base file: the original strings of `keys`
pub fn write_base<W: Write>(writer: &mut W, keys: &[MsgId]) -> Result<()> {
    write_lang_stream(writer, keys, &Catalog::new(), true)
}

/// Write a translation file: the value of each of `keys` in `catalog`.
///
/// A key without a plural whose translation is the empty string is written
/// as untranslated, the way gettext treats an empty msgstr, so [`read_all`]
/// returns no entry for it. Keys missing from `catalog` are untranslated too.
pub fn write_translation<W: Write>(
    writer: &mut W,
    keys: &[MsgId],
    catalog: &Catalog,
) -> Result<()> {
    write_lang_stream(writer, keys, catalog, false)
}

/// Write a base (`is_base`) or translation file for `keys`.
///
/// `catalog` is ignored for base files. The whole file is assembled in
/// memory first, so nothing reaches `writer` if a key or value is rejected.
pub fn write_lang_stream<W: Write>(
    writer: &mut W,
    keys: &[MsgId],
    catalog: &Catalog,
    is_base: bool,
) -> Result<()> {
    for key in keys {
        validate_key(key)?;
    }
    let (singular, plural): (Vec<&MsgId>, Vec<&MsgId>) =
        keys.iter().partition(|k| !k.is_plural());

    let mut out = Vec::new();

    for key in &singular {
        if is_base {
            write_string(&mut out, &prefixed_singular(key), MAX_SINGULAR_LEN)?;
            continue;
        }
        match catalog.get(key) {
            None => out.write_u16::<BigEndian>(ABSENT_SINGULAR)?,
            Some(value) if value.len() != 1 => {
                return Err(FormatError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("{} forms for a message without plural", value.len()),
                });
            }
            Some(value) if value.first() == key.singular() => {
                out.write_u16::<BigEndian>(IDENTICAL_SINGULAR)?
            }
            Some(value) if value.first().is_empty() => {
                trace!("empty translation of {:?} written as untranslated", key);
                out.write_u16::<BigEndian>(ABSENT_SINGULAR)?
            }
            Some(value) => write_string(&mut out, value.first(), MAX_SINGULAR_LEN)?,
        }
    }

    out.write_u16::<BigEndian>(SECTION_END)?;

    for key in &plural {
        if is_base {
            let forms = key.id().forms();
            out.write_u8(forms.len() as u8)?;
            write_string(&mut out, &prefixed_singular(key), MAX_PLURAL_LEN)?;
            for form in &forms[1..] {
                write_string(&mut out, form, MAX_PLURAL_LEN)?;
            }
            continue;
        }
        match catalog.get(key) {
            None => out.write_u8(ABSENT_PLURAL)?,
            Some(value) if value.len() > MAX_FORMS => {
                return Err(FormatError::TooManyForms(value.len(), MAX_FORMS));
            }
            Some(value) if value.forms() == key.id().forms() => out.write_u8(IDENTICAL_PLURAL)?,
            Some(value) => {
                out.write_u8(value.len() as u8)?;
                for form in value.forms() {
                    write_string(&mut out, form, MAX_PLURAL_LEN)?;
                }
            }
        }
    }

    debug!(
        "wrote {} .lang stream: {} singular and {} plural records, {} bytes",
        if is_base { "base" } else { "translation" },
        singular.len(),
        plural.len(),
        out.len()
    );

    writer.write_all(&out)?;
    Ok(())
}

fn validate_key(key: &MsgId) -> Result<()> {
    if key.is_header() {
        return Err(FormatError::InvalidKey(
            "the header entry cannot be stored in a .lang file".to_string(),
        ));
    }
    match key.context() {
        Some(ctx) if ctx.contains('\n') => Err(FormatError::InvalidKey(format!(
            "context {:?} contains a newline",
            ctx
        ))),
        None if split_context(key.singular()).is_some() => Err(FormatError::InvalidKey(format!(
            "{:?} would be read back as a context prefix",
            key.singular()
        ))),
        _ => Ok(()),
    }
}

fn prefixed_singular(key: &MsgId) -> String {
    match key.context() {
        Some(ctx) => format!("{}{}\n{}", CONTEXT_PREFIX, ctx, key.singular()),
        None => key.singular().to_string(),
    }
}

/// `_:context\ntext` -> `(context, text)`
fn split_context(s: &str) -> Option<(&str, &str)> {
    s.strip_prefix(CONTEXT_PREFIX)?.split_once('\n')
}

fn write_string(out: &mut Vec<u8>, s: &str, max_len: usize) -> Result<()> {
    if s.len() > max_len {
        return Err(FormatError::StringTooLong(s.len()));
    }
    out.write_u16::<BigEndian>(s.len() as u16)?;
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Bounds-checked reader over an in-memory .lang file
struct LangCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LangCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        LangCursor { data, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
        if self.data.len() - self.pos < n {
            return Err(FormatError::Truncated(what));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &'static str) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2, what)?))
    }

    fn string(&mut self, len: usize) -> Result<String> {
        Ok(std::str::from_utf8(self.take(len, "string")?)?.to_string())
    }

    /// A length-prefixed string as found in plural records
    fn prefixed_string(&mut self) -> Result<String> {
        let len = self.u16("string length")? as usize;
        self.string(len)
    }
}

/// Keys recovered from a base file, split by section
#[derive(Debug, Default)]
struct BaseKeys {
    singular: Vec<MsgId>,
    plural: Vec<MsgId>,
}

impl BaseKeys {
    fn len(&self) -> usize {
        self.singular.len() + self.plural.len()
    }

    fn iter(&self) -> impl Iterator<Item = &MsgId> {
        self.singular.iter().chain(self.plural.iter())
    }
}

fn unprefix(first: String, rest: Vec<String>) -> Result<MsgId> {
    let (context, singular) = match split_context(&first) {
        Some((ctx, text)) => (Some(ctx.to_string()), text.to_string()),
        None => (None, first),
    };
    let mut forms = vec![singular];
    forms.extend(rest);
    // forms holds at least the singular
    let id = MsgStr::from_forms(forms).unwrap_or_else(|| MsgStr::new(""));
    MsgId::from_parts(id, context)
}

fn read_base(data: &[u8]) -> Result<BaseKeys> {
    let mut cursor = LangCursor::new(data);
    let mut keys = BaseKeys::default();

    loop {
        if cursor.at_end() {
            return Err(FormatError::Truncated("section separator"));
        }
        let len = cursor.u16("record length")?;
        match len {
            SECTION_END => break,
            ABSENT_SINGULAR | IDENTICAL_SINGULAR => {
                return Err(FormatError::InvalidKey(format!(
                    "base record {} holds translation marker 0x{:04x}",
                    keys.singular.len(),
                    len
                )));
            }
            len => {
                let first = cursor.string(len as usize)?;
                keys.singular.push(unprefix(first, Vec::new())?);
            }
        }
    }

    while !cursor.at_end() {
        let count = cursor.u8("form count")? as usize;
        if count == 0 || count > MsgId::MAX_FORMS {
            return Err(FormatError::InvalidKey(format!(
                "base record with {} original forms",
                count
            )));
        }
        let first = cursor.prefixed_string()?;
        let rest = (1..count)
            .map(|_| cursor.prefixed_string())
            .collect::<Result<Vec<_>>>()?;
        keys.plural.push(unprefix(first, rest)?);
    }

    debug!(
        "base .lang stream holds {} singular and {} plural keys",
        keys.singular.len(),
        keys.plural.len()
    );
    Ok(keys)
}

fn read_translation(language: &str, data: &[u8], keys: &BaseKeys) -> Result<Catalog> {
    let misaligned = |reason: String| FormatError::Misaligned {
        language: language.to_string(),
        reason,
    };
    let mut cursor = LangCursor::new(data);
    let mut catalog = Catalog::new();

    for (i, key) in keys.singular.iter().enumerate() {
        if cursor.at_end() {
            return Err(misaligned(format!(
                "stream ends after {} of {} singular records",
                i,
                keys.singular.len()
            )));
        }
        match cursor.u16("record length")? {
            ABSENT_SINGULAR => {}
            IDENTICAL_SINGULAR => {
                catalog.insert(key.clone(), key.id().clone());
            }
            SECTION_END => {
                return Err(misaligned(format!(
                    "section ends after {} of {} singular records",
                    i,
                    keys.singular.len()
                )));
            }
            len => {
                catalog.insert(key.clone(), MsgStr::new(cursor.string(len as usize)?));
            }
        }
    }

    if cursor.u16("section separator")? != SECTION_END {
        return Err(misaligned(format!(
            "more than {} singular records",
            keys.singular.len()
        )));
    }

    for (i, key) in keys.plural.iter().enumerate() {
        if cursor.at_end() {
            return Err(misaligned(format!(
                "stream ends after {} of {} plural records",
                i,
                keys.plural.len()
            )));
        }
        match cursor.u8("form count")? {
            ABSENT_PLURAL => {}
            IDENTICAL_PLURAL => {
                catalog.insert(key.clone(), key.id().clone());
            }
            count if count as usize > MAX_FORMS => {
                return Err(FormatError::TooManyForms(count as usize, MAX_FORMS));
            }
            count => {
                let forms = (0..count)
                    .map(|_| cursor.prefixed_string())
                    .collect::<Result<Vec<_>>>()?;
                // count is non-zero here
                if let Some(value) = MsgStr::from_forms(forms) {
                    catalog.insert(key.clone(), value);
                }
            }
        }
    }

    if !cursor.at_end() {
        return Err(misaligned(format!(
            "more than {} plural records",
            keys.plural.len()
        )));
    }

    debug!(
        "{}: {} of {} messages translated",
        language,
        catalog.len(),
        keys.len()
    );
    Ok(catalog)
}

/// Read a base file and any number of translation files.
///
/// Returns one catalog per language. The base language maps every key to
/// its own original strings; translation catalogs hold only the translated
/// keys. The header entry is never present and must be reinjected by the
/// caller.
pub fn read_all<'a, I>(
    base_language: &str,
    base: &[u8],
    translations: I,
) -> Result<BTreeMap<String, Catalog>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let keys = read_base(base)?;

    let mut result = BTreeMap::new();
    result.insert(
        base_language.to_string(),
        keys.iter().map(|k| (k.clone(), k.id().clone())).collect(),
    );

    for (language, data) in translations {
        if result.contains_key(language) {
            return Err(FormatError::Misaligned {
                language: language.to_string(),
                reason: "language supplied more than once".to_string(),
            });
        }
        let catalog = read_translation(language, data, &keys)?;
        result.insert(language.to_string(), catalog);
    }

    Ok(result)
}
