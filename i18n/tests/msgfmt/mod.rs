//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use crate::common::{arg, run_test, run_test_with_checker, TestPlan};
use i18n_codec::gettext_lib::mo_file::{self, Endianness, MoFile};
use i18n_codec::gettext_lib::{Catalog, MsgId, MsgStr, DEFAULT_HEADER};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary .po file for testing
fn create_temp_po_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let po_path = temp_dir.path().join("test.po");
    let mut file = File::create(&po_path).unwrap();
    write!(file, "{}", content).unwrap();
    (temp_dir, po_path)
}

/// Compile `po_content` with extra `flags`, expecting silent success
fn compile(po_content: &str, flags: &[&str]) -> (TempDir, Catalog) {
    let (temp_dir, po_path) = create_temp_po_file(po_content);
    let mo_path = temp_dir.path().join("out.mo");

    let mut args: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
    args.extend(["-o".to_string(), arg(&mo_path), arg(&po_path)]);
    run_test(TestPlan {
        args,
        ..TestPlan::new("msgfmt", &[])
    });

    let catalog = mo_file::read_catalog(&fs::read(&mo_path).unwrap()).unwrap();
    (temp_dir, catalog)
}

/// Test msgfmt with simple .po file
#[test]
fn test_msgfmt_simple() {
    let po_content = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"

msgid "Hello"
msgstr "Hola"
"#;

    let (temp_dir, po_path) = create_temp_po_file(po_content);
    let mo_path = temp_dir.path().join("test.mo");

    run_test(TestPlan::new("msgfmt", &["-o", &arg(&mo_path), &arg(&po_path)]));

    let data = fs::read(&mo_path).unwrap();
    // Magic number 0x950412de, little-endian
    assert_eq!(&data[..4], &[0xde, 0x12, 0x04, 0x95]);

    let catalog = mo_file::read_catalog(&data).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(&MsgId::new("Hello")), Some(&MsgStr::new("Hola")));
}

/// Test msgfmt with plural forms
#[test]
fn test_msgfmt_plural() {
    let po_content = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

msgid "One file"
msgid_plural "%d files"
msgstr[0] "Un archivo"
msgstr[1] "%d archivos"
"#;

    let (_dir, catalog) = compile(po_content, &["-c"]);
    assert_eq!(
        catalog.get(&MsgId::plural("One file", "%d files")),
        MsgStr::from_forms(["Un archivo", "%d archivos"]).as_ref()
    );
    assert_eq!(catalog.header_info().plural_forms.unwrap().nplurals, 2);
}

#[test]
fn test_msgfmt_context() {
    let po_content = r#"
msgid ""
msgstr "Content-Type: text/plain; charset=UTF-8\n"

msgctxt "menu"
msgid "File"
msgstr "Archivo"

msgid "File"
msgstr "Fichero"
"#;

    let (_dir, catalog) = compile(po_content, &[]);
    assert_eq!(
        catalog.get(&MsgId::new("File").with_context("menu")),
        Some(&MsgStr::new("Archivo"))
    );
    assert_eq!(catalog.get(&MsgId::new("File")), Some(&MsgStr::new("Fichero")));
}

/// Test msgfmt skips fuzzy entries by default
#[test]
fn test_msgfmt_skip_fuzzy() {
    let po_content = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"

#, fuzzy
msgid "Fuzzy message"
msgstr "Mensaje difuso"

msgid "Normal message"
msgstr "Mensaje normal"
"#;

    let (_dir, catalog) = compile(po_content, &[]);
    assert!(!catalog.contains_key(&MsgId::new("Fuzzy message")));
    assert!(catalog.contains_key(&MsgId::new("Normal message")));
}

/// Test msgfmt with -f flag includes fuzzy entries
#[test]
fn test_msgfmt_include_fuzzy() {
    let po_content = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"

#, fuzzy
msgid "Fuzzy message"
msgstr "Mensaje difuso"
"#;

    let (_dir, catalog) = compile(po_content, &["-f"]);
    assert_eq!(
        catalog.get(&MsgId::new("Fuzzy message")),
        Some(&MsgStr::new("Mensaje difuso"))
    );
}

/// Test msgfmt with empty .po file
#[test]
fn test_msgfmt_empty() {
    let po_content = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"#;

    let (_dir, catalog) = compile(po_content, &[]);
    assert_eq!(catalog.len(), 1);
    assert!(catalog.header().is_some());
}

#[test]
fn test_msgfmt_default_header() {
    let (_dir, catalog) = compile("msgid \"Yes\"\nmsgstr \"Si\"\n", &[]);
    assert_eq!(catalog.header(), Some(&MsgStr::new(DEFAULT_HEADER)));
    assert_eq!(catalog.get(&MsgId::new("Yes")), Some(&MsgStr::new("Si")));
}

#[test]
fn test_msgfmt_drops_untranslated() {
    let po_content = r#"
msgid ""
msgstr "Content-Type: text/plain; charset=UTF-8\n"

msgid "Done"
msgstr ""

msgid "Open"
msgstr "Abrir"
"#;

    let (_dir, catalog) = compile(po_content, &[]);
    assert!(!catalog.contains_key(&MsgId::new("Done")));
    assert!(catalog.contains_key(&MsgId::new("Open")));
}

#[test]
fn test_msgfmt_big_endian() {
    let (temp_dir, po_path) = create_temp_po_file("msgid \"a\"\nmsgstr \"b\"\n");
    let mo_path = temp_dir.path().join("be.mo");

    run_test(TestPlan::new(
        "msgfmt",
        &["--endianness", "big", "-o", &arg(&mo_path), &arg(&po_path)],
    ));

    let data = fs::read(&mo_path).unwrap();
    assert_eq!(&data[..4], &[0x95, 0x04, 0x12, 0xde]);
    let mo = MoFile::read(&data).unwrap();
    assert_eq!(mo.endianness, Endianness::Big);
    assert_eq!(mo.catalog.get(&MsgId::new("a")), Some(&MsgStr::new("b")));
}

#[test]
fn test_msgfmt_merges_inputs() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.po");
    let second = temp_dir.path().join("second.po");
    let mo_path = temp_dir.path().join("merged.mo");
    fs::write(&first, "msgid \"a\"\nmsgstr \"1\"\n\nmsgid \"b\"\nmsgstr \"2\"\n").unwrap();
    fs::write(&second, "msgid \"b\"\nmsgstr \"3\"\n").unwrap();

    run_test(TestPlan::new(
        "msgfmt",
        &["-o", &arg(&mo_path), &arg(&first), &arg(&second)],
    ));

    let catalog = mo_file::read_catalog(&fs::read(&mo_path).unwrap()).unwrap();
    assert_eq!(catalog.get(&MsgId::new("a")), Some(&MsgStr::new("1")));
    assert_eq!(catalog.get(&MsgId::new("b")), Some(&MsgStr::new("3")));
}

#[test]
fn test_msgfmt_search_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("found.po"), "msgid \"x\"\nmsgstr \"y\"\n").unwrap();
    let mo_path = temp_dir.path().join("found.mo");

    run_test(TestPlan::new(
        "msgfmt",
        &["-D", &arg(temp_dir.path()), "-o", &arg(&mo_path), "found.po"],
    ));

    assert!(mo_path.exists());
}

#[test]
fn test_msgfmt_check_plural_count() {
    let po_content = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 ? 1 : 2);\n"

msgid "One file"
msgid_plural "%d files"
msgstr[0] "Jeden plik"
msgstr[1] "%d pliki"
"#;

    let (temp_dir, po_path) = create_temp_po_file(po_content);
    let mo_path = temp_dir.path().join("bad.mo");

    run_test(TestPlan {
        expected_err: String::from(
            "msgfmt: error: \"One file\": expected 3 plural forms, found 2\n",
        ),
        expected_exit_code: 1,
        ..TestPlan::new("msgfmt", &["-c", "-o", &arg(&mo_path), &arg(&po_path)])
    });

    assert!(!mo_path.exists(), "no output after a failed check");
}

#[test]
fn test_msgfmt_check_newlines() {
    let (temp_dir, po_path) =
        create_temp_po_file("msgid \"line\\n\"\nmsgstr \"ligne\"\n");
    let mo_path = temp_dir.path().join("nl.mo");

    run_test(TestPlan {
        expected_err: String::from(
            "msgfmt: error: \"line\\n\": msgid and msgstr[0] differ in a trailing newline\n",
        ),
        expected_exit_code: 1,
        ..TestPlan::new("msgfmt", &["-c", "-o", &arg(&mo_path), &arg(&po_path)])
    });
}

#[test]
fn test_msgfmt_statistics() {
    let po_content = r#"
msgid ""
msgstr "Content-Type: text/plain; charset=UTF-8\n"

msgid "Done"
msgstr ""

#, fuzzy
msgid "Close"
msgstr "Cerrar"

msgid "Open"
msgstr "Abrir"
"#;

    let (temp_dir, po_path) = create_temp_po_file(po_content);
    let mo_path = temp_dir.path().join("stats.mo");

    run_test(TestPlan {
        expected_err: String::from(
            "1 translated messages, 1 fuzzy translations, 1 untranslated messages.\n",
        ),
        ..TestPlan::new("msgfmt", &["-v", "-o", &arg(&mo_path), &arg(&po_path)])
    });
}

#[test]
fn test_msgfmt_syntax_error() {
    let (temp_dir, po_path) = create_temp_po_file("msgid \"open\nmsgstr \"\"\n");
    let mo_path = temp_dir.path().join("broken.mo");

    run_test_with_checker(
        TestPlan::new("msgfmt", &["-o", &arg(&mo_path), &arg(&po_path)]),
        |_, output| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            assert!(stderr.starts_with("msgfmt: "), "stderr: {stderr}");
            assert!(stderr.contains("line 1"), "stderr: {stderr}");
            assert_eq!(output.status.code(), Some(1));
        },
    );
    assert!(!mo_path.exists());
}

#[test]
fn test_msgfmt_missing_input() {
    run_test_with_checker(
        TestPlan::new("msgfmt", &["-o", "/nonexistent/out.mo", "/nonexistent/in.po"]),
        |_, output| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            assert!(stderr.starts_with("msgfmt: /nonexistent/in.po: "));
            assert_eq!(output.status.code(), Some(1));
        },
    );
}
