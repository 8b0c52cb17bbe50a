//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Translation catalog codecs
//!
//! This module converts a [`catalog::Catalog`] to and from GNU .mo files,
//! GNU .po files and JOSM .lang files. The three codecs only share the
//! catalog model; none of them calls another.

pub mod catalog;
pub mod error;
pub mod files;
pub mod lang_file;
pub mod mo_file;
pub mod po_file;

pub use catalog::{Catalog, HeaderInfo, MsgId, MsgStr, DEFAULT_HEADER};
pub use error::{FormatError, Result};
