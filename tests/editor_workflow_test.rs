use backup_win_env::*;

fn text(name: &str, value: &str, code: u32) -> WireValue {
    WireValue::new(name, RegistryValueData::Text(value.into()), code)
}

fn live_hive() -> (MemoryHive, KeyLocation) {
    let hive = MemoryHive::new();
    let location = KeyLocation::user_environment();
    hive.insert(&location, text("PATH", "C:\\x", REG_EXPAND_SZ));
    hive.insert(&location, text("TEMP", "C:\\old", REG_SZ));
    hive.insert(&location, text("ONLY_LIVE", "kept", REG_SZ));
    (hive, location)
}

fn write_doc(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("import.yml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn import_unions_path_and_keeps_live_only_values() {
    let (hive, location) = live_hive();
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        &dir,
        "- [PATH, ['C:\\y'], REG_EXPAND_SZ]\n- [TEMP, ['C:\\new'], REG_SZ]\n",
    );

    let editor = RegistryEditor::new(&hive, EditorOptions::default());
    let mut out = Vec::new();
    let outcome = editor.run(&Command::Import(path), &mut out).unwrap();

    assert_eq!(Outcome::Imported { written: 3, removed: 0 }, outcome);
    assert!(out.is_empty());
    assert_eq!(Some(text("PATH", "C:\\x;C:\\y", REG_EXPAND_SZ)), hive.get(&location, "PATH"));
    assert_eq!(Some(text("TEMP", "C:\\new", REG_SZ)), hive.get(&location, "TEMP"));
    assert_eq!(Some(text("ONLY_LIVE", "kept", REG_SZ)), hive.get(&location, "ONLY_LIVE"));
    assert_eq!(0, hive.open_handles());
}

#[test]
fn import_replaces_single_valued_live_value_with_a_list() {
    let (hive, location) = live_hive();
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(&dir, "- [TEMP, ['C:\\a', 'C:\\b'], REG_SZ]\n");

    let editor = RegistryEditor::new(&hive, EditorOptions::default());
    editor.run(&Command::Import(path), &mut Vec::new()).unwrap();

    assert_eq!(Some(text("TEMP", "C:\\a;C:\\b", REG_SZ)), hive.get(&location, "TEMP"));
    assert_eq!(Some(text("PATH", "C:\\x", REG_EXPAND_SZ)), hive.get(&location, "PATH"));
}

#[test]
fn repeated_import_does_not_duplicate_path_entries() {
    let (hive, location) = live_hive();
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(&dir, "- [PATH, ['C:\\x', 'C:\\y'], REG_EXPAND_SZ]\n");
    let editor = RegistryEditor::new(&hive, EditorOptions::default());

    editor.run(&Command::Import(path.clone()), &mut Vec::new()).unwrap();
    editor.run(&Command::Import(path), &mut Vec::new()).unwrap();

    assert_eq!(Some(text("PATH", "C:\\x;C:\\y", REG_EXPAND_SZ)), hive.get(&location, "PATH"));
}

#[test]
fn import_preview_prints_merged_values_and_writes_nothing() {
    let (hive, location) = live_hive();
    let before = hive.values(&location).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(&dir, "- [PATH, ['C:\\y'], REG_EXPAND_SZ]\n");

    let options = EditorOptions {
        view: true,
        ..EditorOptions::default()
    };
    let editor = RegistryEditor::new(&hive, options);
    let mut out = Vec::new();
    let outcome = editor.run(&Command::Import(path), &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("C:\\x;C:\\y"));
    assert!(printed.contains("ONLY_LIVE"));
    assert!(matches!(outcome, Outcome::Previewed(ref item) if item.len() == 3));
    assert_eq!(before, hive.values(&location).unwrap());
}

#[test]
fn import_with_replace_drops_values_missing_from_file() {
    let (hive, location) = live_hive();
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(&dir, "- [PATH, ['C:\\y'], REG_EXPAND_SZ]\n");

    let options = EditorOptions {
        replace: true,
        ..EditorOptions::default()
    };
    let editor = RegistryEditor::new(&hive, options);
    let outcome = editor.run(&Command::Import(path), &mut Vec::new()).unwrap();

    assert_eq!(Outcome::Imported { written: 1, removed: 3 }, outcome);
    assert_eq!(Some(vec![text("PATH", "C:\\y", REG_EXPAND_SZ)]), hive.values(&location));
}

#[test]
fn replace_leaves_registry_alone_when_file_cannot_convert() {
    let (hive, location) = live_hive();
    let before = hive.values(&location).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(&dir, "- [Flag, ['1', '2'], REG_DWORD]\n");

    let options = EditorOptions {
        replace: true,
        ..EditorOptions::default()
    };
    let editor = RegistryEditor::new(&hive, options);
    let err = editor.run(&Command::Import(path), &mut Vec::new()).unwrap_err();

    assert!(matches!(err, EditorError::Registry(RegistryError::ScalarArity { .. })));
    assert_eq!(before, hive.values(&location).unwrap());
}

#[test]
fn import_with_unknown_type_fails_before_writing() {
    let (hive, location) = live_hive();
    let before = hive.values(&location).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(&dir, "- [X, ['1'], REG_WHATEVER]\n");

    let editor = RegistryEditor::new(&hive, EditorOptions::default());
    let err = editor.run(&Command::Import(path), &mut Vec::new()).unwrap_err();

    assert!(matches!(err, EditorError::Registry(RegistryError::UnknownType(_))));
    assert_eq!(before, hive.values(&location).unwrap());
}

#[test]
fn export_writes_a_document_that_imports_back() {
    let (hive, _location) = live_hive();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.yml");

    let editor = RegistryEditor::new(&hive, EditorOptions::default());
    let outcome = editor.run(&Command::Export(path.clone()), &mut Vec::new()).unwrap();
    assert_eq!(Outcome::Exported { path: path.clone(), count: 3 }, outcome);

    let restored = MemoryHive::new();
    let location = KeyLocation::user_environment();
    restored.create_key(&location);
    RegistryEditor::new(&restored, EditorOptions::default())
        .run(&Command::Import(path), &mut Vec::new())
        .unwrap();
    assert_eq!(hive.values(&location), restored.values(&location));
}

#[test]
fn export_preview_prints_and_writes_no_file() {
    let hive = MemoryHive::new();
    let location = KeyLocation::user_environment();
    hive.insert(&location, text("EDITOR", "vim", REG_SZ));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.yml");

    let options = EditorOptions {
        view: true,
        ..EditorOptions::default()
    };
    let mut out = Vec::new();
    let outcome = RegistryEditor::new(&hive, options)
        .run(&Command::Export(path.clone()), &mut out)
        .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("EDITOR"));
    assert!(printed.contains("vim"));
    assert!(printed.contains("REG_SZ"));
    assert!(matches!(outcome, Outcome::Previewed(_)));
    assert!(!path.exists());
    assert_eq!(0, std::fs::read_dir(dir.path()).unwrap().count());
}

#[test]
fn export_of_missing_key_fails() {
    let hive = MemoryHive::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.yml");
    let err = RegistryEditor::new(&hive, EditorOptions::default())
        .run(&Command::Export(path.clone()), &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, EditorError::Registry(RegistryError::KeyNotFound(_))));
    assert!(!path.exists());
}
