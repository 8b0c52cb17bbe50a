//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! GNU .mo file format reader and writer
//!
//! The .mo (Machine Object) file format is the binary format used by GNU gettext
//! for storing translated message catalogs. The writer reproduces the output
//! of GNU msgfmt byte for byte, including the lookup hash table, in either
//! byte order.
//!
//! Layout:
//! - 28 byte header
//! - table of (length, offset) descriptors for the original strings
//! - table of (length, offset) descriptors for the translated strings
//! - hash table of `hash_tab_size` 32-bit slots
//! - original strings, then translated strings, each NUL-terminated

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, trace};

use crate::gettext_lib::catalog::{Catalog, MsgId, MsgStr, CONTEXT_SEPARATOR, FORM_SEPARATOR};
use crate::gettext_lib::error::{FormatError, Result};

/// Magic number for little-endian .mo files
pub const MO_MAGIC_LE: u32 = 0x950412de;

/// Magic number for big-endian .mo files, as seen by a little-endian read
pub const MO_MAGIC_BE: u32 = 0xde120495;

/// Byte order of a .mo file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Header of a .mo file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoHeader {
    /// Magic number (determines endianness)
    pub magic: u32,
    /// File format revision
    pub revision: u32,
    /// Number of strings
    pub nstrings: u32,
    /// Offset of table with original strings
    pub orig_tab_offset: u32,
    /// Offset of table with translation strings
    pub trans_tab_offset: u32,
    /// Size of hashing table
    pub hash_tab_size: u32,
    /// Offset of hashing table
    pub hash_tab_offset: u32,
}

impl MoHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 28;

    fn read<B: ByteOrder>(data: &[u8]) -> Self {
        MoHeader {
            magic: B::read_u32(&data[0..]),
            revision: B::read_u32(&data[4..]),
            nstrings: B::read_u32(&data[8..]),
            orig_tab_offset: B::read_u32(&data[12..]),
            trans_tab_offset: B::read_u32(&data[16..]),
            hash_tab_size: B::read_u32(&data[20..]),
            hash_tab_offset: B::read_u32(&data[24..]),
        }
    }

    fn write<B: ByteOrder>(&self, out: &mut Vec<u8>) -> Result<()> {
        out.write_u32::<B>(self.magic)?;
        out.write_u32::<B>(self.revision)?;
        out.write_u32::<B>(self.nstrings)?;
        out.write_u32::<B>(self.orig_tab_offset)?;
        out.write_u32::<B>(self.trans_tab_offset)?;
        out.write_u32::<B>(self.hash_tab_size)?;
        out.write_u32::<B>(self.hash_tab_offset)?;
        Ok(())
    }
}

/// A string descriptor (length + offset pair) in the .mo file
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDescriptor {
    /// Length of the string (excluding null terminator)
    pub length: u32,
    /// Offset of the string from the start of the file
    pub offset: u32,
}

impl StringDescriptor {
    /// Size of a string descriptor in bytes
    pub const SIZE: usize = 8;
}

/// Parsed .mo file
#[derive(Debug, Clone)]
pub struct MoFile {
    pub header: MoHeader,
    pub endianness: Endianness,
    pub catalog: Catalog,
}

impl MoFile {
    /// Read a .mo file from bytes
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < MoHeader::SIZE {
            return Err(FormatError::Truncated("header"));
        }

        match LittleEndian::read_u32(data) {
            MO_MAGIC_LE => Self::read_with::<LittleEndian>(data, Endianness::Little),
            MO_MAGIC_BE => Self::read_with::<BigEndian>(data, Endianness::Big),
            magic => Err(FormatError::InvalidMagic(magic)),
        }
    }

    /// Read a .mo file from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::read(&data)
    }

    fn read_with<B: ByteOrder>(data: &[u8], endianness: Endianness) -> Result<Self> {
        let header = MoHeader::read::<B>(data);

        // the major revision lives in the upper 16 bits
        if header.revision >> 16 != 0 {
            return Err(FormatError::UnsupportedRevision(header.revision));
        }

        let nstrings = header.nstrings as usize;
        let table_len = nstrings
            .checked_mul(StringDescriptor::SIZE)
            .ok_or(FormatError::OutOfBounds {
                what: "string descriptor table",
                offset: header.orig_tab_offset as usize,
                length: usize::MAX,
                size: data.len(),
            })?;
        check_bounds(
            data,
            "original string table",
            header.orig_tab_offset as usize,
            table_len,
        )?;
        check_bounds(
            data,
            "translation string table",
            header.trans_tab_offset as usize,
            table_len,
        )?;
        if header.hash_tab_size > 0 {
            check_bounds(
                data,
                "hash table",
                header.hash_tab_offset as usize,
                header.hash_tab_size as usize * 4,
            )?;
        }

        let mut catalog = Catalog::new();
        for i in 0..nstrings {
            let orig = read_descriptor::<B>(data, header.orig_tab_offset as usize, i);
            let trans = read_descriptor::<B>(data, header.trans_tab_offset as usize, i);

            let key = MsgId::from_bytes(read_string(data, "original string", &orig)?)?;
            let value = MsgStr::from_bytes(read_string(data, "translated string", &trans)?)?;
            trace!("entry {}: {:?} -> {} forms", i, key, value.len());

            if catalog.contains_key(&key) {
                return Err(FormatError::DuplicateEntry(key.to_string()));
            }
            catalog.insert(key, value);
        }

        debug!(
            "read {} messages from {:?} .mo file (hash table size {})",
            nstrings, endianness, header.hash_tab_size
        );

        Ok(MoFile {
            header,
            endianness,
            catalog,
        })
    }
}

fn check_bounds(data: &[u8], what: &'static str, offset: usize, length: usize) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(FormatError::OutOfBounds {
            what,
            offset,
            length,
            size: data.len(),
        }),
    }
}

/// Caller has already checked the whole table against the buffer
fn read_descriptor<B: ByteOrder>(data: &[u8], table: usize, index: usize) -> StringDescriptor {
    let at = table + index * StringDescriptor::SIZE;
    StringDescriptor {
        length: B::read_u32(&data[at..]),
        offset: B::read_u32(&data[at + 4..]),
    }
}

fn read_string<'a>(
    data: &'a [u8],
    what: &'static str,
    desc: &StringDescriptor,
) -> Result<&'a [u8]> {
    let start = desc.offset as usize;
    let length = desc.length as usize;
    check_bounds(data, what, start, length)?;
    Ok(&data[start..start + length])
}

/// Read a .mo buffer straight into a catalog
pub fn read_catalog(data: &[u8]) -> Result<Catalog> {
    MoFile::read(data).map(|mo| mo.catalog)
}

/// Serialize a catalog into .mo bytes
///
/// The catalog must contain the header entry. Output does not depend on the
/// catalog's iteration order.
pub fn write(catalog: &Catalog, endianness: Endianness) -> Result<Vec<u8>> {
    match endianness {
        Endianness::Little => write_with::<LittleEndian>(catalog),
        Endianness::Big => write_with::<BigEndian>(catalog),
    }
}

/// Serialize a catalog into a writer
pub fn write_to<W: Write>(writer: &mut W, catalog: &Catalog, endianness: Endianness) -> Result<()> {
    let data = write(catalog, endianness)?;
    writer.write_all(&data)?;
    Ok(())
}

fn write_with<B: ByteOrder>(catalog: &Catalog) -> Result<Vec<u8>> {
    catalog.require_header()?;

    let entries = catalog.canonical_entries();
    for (_, key, value) in &entries {
        validate_entry(key, value)?;
    }

    let keys: Vec<&[u8]> = entries.iter().map(|(bytes, _, _)| bytes.as_slice()).collect();
    let values: Vec<Vec<u8>> = entries.iter().map(|(_, _, value)| value.to_bytes()).collect();

    let nstrings = entries.len();
    let hash_tab = build_hash_table(&keys);

    let orig_tab_offset = MoHeader::SIZE;
    let trans_tab_offset = orig_tab_offset + nstrings * StringDescriptor::SIZE;
    let hash_tab_offset = trans_tab_offset + nstrings * StringDescriptor::SIZE;
    let strings_offset = hash_tab_offset + hash_tab.len() * 4;

    let total = strings_offset
        + keys.iter().map(|k| k.len() + 1).sum::<usize>()
        + values.iter().map(|v| v.len() + 1).sum::<usize>();
    if total > u32::MAX as usize {
        return Err(FormatError::StringTooLong(total));
    }

    let mut data = Vec::with_capacity(total);
    MoHeader {
        magic: MO_MAGIC_LE,
        revision: 0,
        nstrings: nstrings as u32,
        orig_tab_offset: orig_tab_offset as u32,
        trans_tab_offset: trans_tab_offset as u32,
        hash_tab_size: hash_tab.len() as u32,
        hash_tab_offset: hash_tab_offset as u32,
    }
    .write::<B>(&mut data)?;

    let mut offset = strings_offset;
    for key in &keys {
        data.write_u32::<B>(key.len() as u32)?;
        data.write_u32::<B>(offset as u32)?;
        offset += key.len() + 1;
    }
    for value in &values {
        data.write_u32::<B>(value.len() as u32)?;
        data.write_u32::<B>(offset as u32)?;
        offset += value.len() + 1;
    }

    for slot in &hash_tab {
        data.write_u32::<B>(*slot)?;
    }

    for key in &keys {
        data.extend_from_slice(key);
        data.push(0);
    }
    for value in &values {
        data.extend_from_slice(value);
        data.push(0);
    }

    debug!(
        "wrote {} messages, hash table size {}, {} bytes",
        nstrings,
        hash_tab.len(),
        data.len()
    );

    Ok(data)
}

/// Reject strings whose separators would split differently when read back
fn validate_entry(key: &MsgId, value: &MsgStr) -> Result<()> {
    let nul = FORM_SEPARATOR as char;
    let eot = CONTEXT_SEPARATOR as char;

    if let Some(ctx) = key.context() {
        if ctx.contains(nul) || ctx.contains(eot) {
            return Err(FormatError::InvalidKey(format!(
                "context {:?} contains a separator byte",
                ctx
            )));
        }
    }
    for form in key.id().forms() {
        if form.contains(nul) || (key.context().is_none() && form.contains(eot)) {
            return Err(FormatError::InvalidKey(format!(
                "{:?} contains a separator byte",
                form
            )));
        }
    }
    if value.forms().iter().any(|form| form.contains(nul)) {
        return Err(FormatError::InvalidValue {
            key: key.to_string(),
            reason: "translation contains a NUL byte".to_string(),
        });
    }
    Ok(())
}

/// GNU's `hashpjw` from gettext's `hash-string.c`, evaluated up to the
/// first NUL of the key.
///
/// libintl probes the table with this function, so the writer must use it
/// bit for bit.
pub fn hash_string(key: &[u8]) -> u32 {
    let mut hval: u32 = 0;
    for &b in key.iter().take_while(|b| **b != 0) {
        hval = (hval << 4).wrapping_add(b as u32);
        let g = hval & (0xf << 28);
        if g != 0 {
            hval ^= g >> 24;
            hval ^= g;
        }
    }
    hval
}

// Trial division exactly as GNU msgfmt does it; note that 3 is reported
// as composite.
fn is_prime(candidate: u64) -> bool {
    let mut divn: u64 = 3;
    let mut sq = divn * divn;

    while sq < candidate && candidate % divn != 0 {
        divn += 1;
        sq += 4 * divn;
        divn += 1;
    }

    candidate % divn != 0
}

fn next_prime(seed: u64) -> u64 {
    let mut seed = seed | 1;
    while !is_prime(seed) {
        seed += 2;
    }
    seed
}

/// Number of hash table slots GNU msgfmt uses for `nstrings` entries
pub fn hash_table_size(nstrings: usize) -> u32 {
    next_prime(nstrings as u64 * 4 / 3).max(3) as u32
}

/// Open addressing with double hashing; a slot holds the entry index + 1
fn build_hash_table(keys: &[&[u8]]) -> Vec<u32> {
    let size = hash_table_size(keys.len());
    let mut table = vec![0u32; size as usize];

    for (i, key) in keys.iter().enumerate() {
        let hash = hash_string(key);
        let mut idx = hash % size;

        if table[idx as usize] != 0 {
            let incr = 1 + hash % (size - 2);
            loop {
                if idx >= size - incr {
                    idx -= size - incr;
                } else {
                    idx += incr;
                }
                if table[idx as usize] == 0 {
                    break;
                }
            }
        }

        table[idx as usize] = i as u32 + 1;
    }

    table
}
