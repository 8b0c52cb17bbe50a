//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! i18n-codec library
//!
//! Conversion of translation catalogs between:
//! - GNU gettext binary tables (.mo), either byte order
//! - GNU gettext text tables (.po)
//! - JOSM delta tables (.lang): one base file of original strings plus
//!   positionally aligned translation files

pub mod gettext_lib;
