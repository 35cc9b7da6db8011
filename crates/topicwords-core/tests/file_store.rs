//! Manager behavior against the directory-backed store.

use std::time::Duration;
use topicwords_core::error::ErrorCode;
use topicwords_core::lock::LockMode;
use topicwords_core::manager::{FAVORITES_KEY, HISTORY_KEY, SETTINGS_KEY, THEME_KEY};
use topicwords_core::model::{FavoriteEntry, SettingChange, Theme, ViewMode};
use topicwords_core::{FileStore, KeyValueStore, StateManager};

fn open(dir: &tempfile::TempDir) -> StateManager<FileStore> {
    StateManager::load(FileStore::open(dir.path()).expect("open store"))
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let mut m = open(&dir);
        m.record_generation_at("space travel", "rocket.stars.orbit", 10)
            .expect("record");
        m.toggle_favorite(FavoriteEntry::new("space travel", "rocket.stars.orbit"))
            .expect("favorite");
        m.add_tag("rocket.stars.orbit", "sci-fi").expect("tag");
        m.update_setting(SettingChange::ViewMode(ViewMode::Expanded))
            .expect("setting");
        m.toggle_theme().expect("theme");
    }

    let m = open(&dir);
    assert_eq!(m.history().len(), 1);
    assert_eq!(m.history()[0].timestamp, 10);
    assert_eq!(m.favorites()[0].tags(), ["sci-fi"]);
    assert_eq!(m.settings().view_mode, ViewMode::Expanded);
    assert_eq!(m.theme(), Theme::Dark);
    assert_eq!(m.statistics().total_generations, 1);
    // The undo log does not outlive the process.
    assert_eq!(m.undo_depth(), 0);
}

#[test]
fn raw_files_use_storage_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut m = open(&dir);
    m.toggle_theme().expect("theme");
    m.update_setting(SettingChange::Sounds(true)).expect("setting");

    assert_eq!(
        std::fs::read_to_string(dir.path().join(THEME_KEY)).expect("theme file"),
        "dark"
    );
    let settings = std::fs::read_to_string(dir.path().join(SETTINGS_KEY)).expect("settings file");
    let value: serde_json::Value = serde_json::from_str(&settings).expect("settings json");
    assert_eq!(value["sounds"], true);
    assert_eq!(value["viewMode"], "normal");
}

#[test]
fn hand_edited_garbage_falls_back_per_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(FAVORITES_KEY), "not json at all").expect("write");
    std::fs::write(
        dir.path().join(HISTORY_KEY),
        r#"[{"topic":"ocean","words":"wave.salt.deep","timestamp":5}]"#,
    )
    .expect("write");

    let m = open(&dir);
    assert!(m.favorites().is_empty());
    assert_eq!(m.history().len(), 1);
}

#[test]
fn clear_history_deletes_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut m = open(&dir);
    m.record_generation_at("ocean", "wave.salt.deep", 1)
        .expect("record");
    assert!(dir.path().join(HISTORY_KEY).exists());

    m.clear_history().expect("clear");
    assert!(!dir.path().join(HISTORY_KEY).exists());
    assert_eq!(m.store().get(HISTORY_KEY).expect("get"), None);

    m.undo().expect("undo");
    assert!(dir.path().join(HISTORY_KEY).exists());
    drop(m);
    assert_eq!(open(&dir).history().len(), 1);
}

#[test]
fn loaded_manager_keeps_the_directory_until_dropped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let short = Duration::from_millis(50);
    let mut m = open(&dir);

    // Held from load through the save below.
    let err = FileStore::open_with(dir.path(), LockMode::Exclusive, short)
        .expect_err("directory is held");
    assert_eq!(err.code(), ErrorCode::LockContention);

    m.toggle_favorite(FavoriteEntry::new("ocean", "wave.salt.deep"))
        .expect("favorite");
    drop(m);

    let reader = StateManager::load(FileStore::open_shared(dir.path()).expect("shared"));
    assert_eq!(reader.favorites().len(), 1);
}
