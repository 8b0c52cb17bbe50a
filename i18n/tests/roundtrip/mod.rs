//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use i18n_codec::gettext_lib::mo_file::{self, Endianness};
use i18n_codec::gettext_lib::{lang_file, po_file};
use i18n_codec::gettext_lib::{Catalog, MsgId, MsgStr, DEFAULT_HEADER};
use proptest::prelude::*;
use proptest::test_runner::TestRunner;

fn get_test_runner(cases: u32) -> TestRunner {
    TestRunner::new(proptest::test_runner::Config {
        cases,
        failure_persistence: None,

        ..proptest::test_runner::Config::default()
    })
}

/// Any text that can appear in a binary key or value
fn text() -> impl Strategy<Value = String> {
    "[^\\x00\\x04]{0,40}"
}

fn msg_id() -> impl Strategy<Value = MsgId> {
    (
        proptest::option::of("[^\\x00\\x04\\n]{0,8}"),
        "[^\\x00\\x04]{1,20}".prop_filter("reads back as a context prefix", |s| {
            !s.starts_with("_:")
        }),
        proptest::option::of(text()),
    )
        .prop_map(|(context, singular, plural)| {
            let key = match plural {
                Some(plural) => MsgId::plural(singular, plural),
                None => MsgId::new(singular),
            };
            match context {
                Some(context) => key.with_context(context),
                None => key,
            }
        })
}

fn msg_str(min_forms: usize, max_forms: usize) -> impl Strategy<Value = MsgStr> {
    proptest::collection::vec(text(), min_forms..=max_forms)
        .prop_map(|forms| MsgStr::from_forms(forms).unwrap())
}

/// A value of the shape the .lang format can carry for `key`
fn lang_value(key: &MsgId) -> BoxedStrategy<MsgStr> {
    if key.is_plural() {
        msg_str(1, 5).boxed()
    } else {
        "[^\\x00\\x04]{1,40}".prop_map(MsgStr::new).boxed()
    }
}

/// Like [`lang_value`], but a singular translation may be empty
fn lang_translation(key: &MsgId) -> BoxedStrategy<MsgStr> {
    if key.is_plural() {
        msg_str(1, 5).boxed()
    } else {
        "[^\\x00\\x04]{0,40}".prop_map(MsgStr::new).boxed()
    }
}

/// What reading `catalog` back from a .lang file yields: empty singular
/// translations are stored as untranslated
fn without_empty_singulars(catalog: &Catalog) -> Catalog {
    catalog
        .iter()
        .filter(|(key, value)| key.is_plural() || !value.first().is_empty())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn entry() -> impl Strategy<Value = (MsgId, MsgStr)> {
    msg_id().prop_flat_map(|key| {
        let value = lang_value(&key);
        (Just(key), value)
    })
}

/// Catalog holding the metadata entry plus up to `max` messages
fn catalog(max: usize) -> impl Strategy<Value = Catalog> {
    proptest::collection::vec(entry(), 0..=max).prop_map(|entries| {
        let mut catalog: Catalog = entries.into_iter().collect();
        catalog.set_header(MsgStr::new(DEFAULT_HEADER));
        catalog
    })
}

/// Base keys plus two partial translations of them
fn languages() -> impl Strategy<Value = (Vec<MsgId>, Catalog, Catalog)> {
    proptest::collection::vec(msg_id(), 0..10).prop_flat_map(|keys| {
        let translations = keys
            .iter()
            .map(|key| {
                (
                    proptest::option::of(lang_translation(key)),
                    proptest::option::of(lang_translation(key)),
                )
            })
            .collect::<Vec<_>>();
        (Just(keys), translations).prop_map(|(keys, translations)| {
            let mut base = Catalog::new();
            let mut de = Catalog::new();
            let mut fr = Catalog::new();
            for (key, (de_value, fr_value)) in keys.into_iter().zip(translations) {
                base.insert(key.clone(), key.id().clone());
                if let Some(value) = de_value {
                    de.insert(key.clone(), value);
                }
                if let Some(value) = fr_value {
                    fr.insert(key, value);
                }
            }
            (base.canonical_keys(), de, fr)
        })
    })
}

#[test]
fn test_mo_roundtrip_property() {
    get_test_runner(128)
        .run(&(catalog(12), any::<bool>()), |(catalog, big)| {
            let endianness = if big {
                Endianness::Big
            } else {
                Endianness::Little
            };
            let first = mo_file::write(&catalog, endianness).unwrap();
            let decoded = mo_file::read_catalog(&first).unwrap();
            prop_assert_eq!(&decoded, &catalog);

            let second = mo_file::write(&decoded, endianness).unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_po_roundtrip_property() {
    get_test_runner(128)
        .run(&catalog(12), |catalog| {
            let text = po_file::encode(&catalog).unwrap();
            prop_assert_eq!(po_file::decode(&text).unwrap(), catalog);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_lang_roundtrip_property() {
    get_test_runner(128)
        .run(&languages(), |(keys, de, fr)| {
            let mut base = Vec::new();
            lang_file::write_base(&mut base, &keys).unwrap();
            let mut de_data = Vec::new();
            lang_file::write_translation(&mut de_data, &keys, &de).unwrap();
            let mut fr_data = Vec::new();
            lang_file::write_translation(&mut fr_data, &keys, &fr).unwrap();

            let catalogs = lang_file::read_all(
                "en",
                &base,
                [("de", de_data.as_slice()), ("fr", fr_data.as_slice())],
            )
            .unwrap();

            prop_assert_eq!(catalogs.len(), 3);
            let en: Catalog = keys.iter().map(|k| (k.clone(), k.id().clone())).collect();
            prop_assert_eq!(&catalogs["en"], &en);
            prop_assert_eq!(&catalogs["de"], &without_empty_singulars(&de));
            prop_assert_eq!(&catalogs["fr"], &without_empty_singulars(&fr));
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_mo_through_lang_property() {
    get_test_runner(64)
        .run(&catalog(12), |catalog| {
            let mo = mo_file::write(&catalog, Endianness::Little).unwrap();
            let mut stripped = mo_file::read_catalog(&mo).unwrap();
            let header = stripped.take_header().unwrap();

            let keys = stripped.canonical_keys();
            let mut base = Vec::new();
            lang_file::write_base(&mut base, &keys).unwrap();
            let mut data = Vec::new();
            lang_file::write_translation(&mut data, &keys, &stripped).unwrap();

            let mut catalogs = lang_file::read_all("en", &base, [("xx", data.as_slice())]).unwrap();
            let mut restored = catalogs.remove("xx").unwrap();
            prop_assert!(restored.header().is_none());
            restored.set_header(header);

            let rewritten = mo_file::write(&restored, Endianness::Little).unwrap();
            prop_assert_eq!(mo_file::read_catalog(&rewritten).unwrap(), catalog);
            prop_assert_eq!(rewritten, mo);
            Ok(())
        })
        .unwrap();
}

fn max_forms_value() -> MsgStr {
    MsgStr::from_forms((0..lang_file::MAX_FORMS).map(|i| format!("form {}", i))).unwrap()
}

#[test]
fn test_max_forms_roundtrip() {
    let key = MsgId::plural("%d day", "%d days");
    let value = max_forms_value();
    assert_eq!(value.len(), 253);

    let mut catalog = Catalog::with_default_header();
    catalog.insert(key.clone(), value.clone());
    for endianness in [Endianness::Little, Endianness::Big] {
        let data = mo_file::write(&catalog, endianness).unwrap();
        assert_eq!(mo_file::read_catalog(&data).unwrap(), catalog);
    }

    let keys = vec![key.clone()];
    let mut translation = Catalog::new();
    translation.insert(key.clone(), value.clone());
    let mut base = Vec::new();
    lang_file::write_base(&mut base, &keys).unwrap();
    let mut data = Vec::new();
    lang_file::write_translation(&mut data, &keys, &translation).unwrap();
    let catalogs = lang_file::read_all("en", &base, [("xx", data.as_slice())]).unwrap();
    assert_eq!(catalogs["xx"].get(&key), Some(&value));
}

#[test]
fn test_special_characters_roundtrip() {
    let tricky = [
        "tab\there",
        "bell\u{07} escape\u{1b} del\u{7f}",
        "quote \" backslash \\ newline\n",
        "\r\n\u{0b}\u{0c}\u{08}",
        "\u{e9}t\u{e9} \u{4e2d}\u{6587} \u{1f600} \u{1d11e}",
    ];

    let mut catalog = Catalog::with_default_header();
    for (i, s) in tricky.iter().enumerate() {
        catalog.insert(MsgId::new(*s).with_context(format!("c{}", i)), MsgStr::new(*s));
        catalog.insert(MsgId::new(format!("key {}", i)), MsgStr::new(*s));
    }

    let text = po_file::encode(&catalog).unwrap();
    assert_eq!(po_file::decode(&text).unwrap(), catalog);

    let data = mo_file::write(&catalog, Endianness::Big).unwrap();
    assert_eq!(mo_file::read_catalog(&data).unwrap(), catalog);

    let mut stripped = catalog.clone();
    stripped.take_header();
    let keys = stripped.canonical_keys();
    let mut base = Vec::new();
    lang_file::write_base(&mut base, &keys).unwrap();
    let mut translation = Vec::new();
    lang_file::write_translation(&mut translation, &keys, &stripped).unwrap();
    let catalogs = lang_file::read_all("en", &base, [("xx", translation.as_slice())]).unwrap();
    assert_eq!(catalogs["xx"], stripped);
}

#[test]
fn test_plural_key_singular_value_scenario() {
    let mut catalog = Catalog::with_default_header();
    catalog.insert(MsgId::plural("Sing", "Sing2"), MsgStr::new("Sing"));

    let data = mo_file::write(&catalog, Endianness::Little).unwrap();
    let decoded = mo_file::read_catalog(&data).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded, catalog);

    let text = po_file::encode(&catalog).unwrap();
    let blocks: Vec<&str> = text.trim_end().split("\n\n").collect();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].starts_with("msgid \"\"\nmsgstr "));
    assert_eq!(
        blocks[1],
        "msgid \"Sing\"\nmsgid_plural \"Sing2\"\nmsgstr[0] \"Sing\""
    );
}

#[test]
fn test_context_distinct_scenario() {
    let with_context = MsgId::plural("1", "2").with_context("context");
    let without_context = MsgId::plural("1", "2");

    let mut catalog = Catalog::with_default_header();
    catalog.insert(
        with_context.clone(),
        MsgStr::from_forms(["ctx one", "ctx many"]).unwrap(),
    );
    catalog.insert(
        without_context.clone(),
        MsgStr::from_forms(["one", "many"]).unwrap(),
    );

    let mo = mo_file::read_catalog(&mo_file::write(&catalog, Endianness::Little).unwrap()).unwrap();
    assert_eq!(mo, catalog);

    let po = po_file::decode(&po_file::encode(&catalog).unwrap()).unwrap();
    assert_eq!(po, catalog);

    let mut stripped = catalog.clone();
    stripped.take_header();
    let keys = stripped.canonical_keys();
    assert_eq!(keys, vec![without_context.clone(), with_context.clone()]);
    let mut base = Vec::new();
    lang_file::write_base(&mut base, &keys).unwrap();
    let mut translation = Vec::new();
    lang_file::write_translation(&mut translation, &keys, &stripped).unwrap();
    let catalogs = lang_file::read_all("en", &base, [("xx", translation.as_slice())]).unwrap();

    assert_eq!(catalogs["en"].get(&with_context), Some(with_context.id()));
    assert_eq!(catalogs["xx"], stripped);
    assert_ne!(
        catalogs["xx"].get(&with_context),
        catalogs["xx"].get(&without_context)
    );
}
