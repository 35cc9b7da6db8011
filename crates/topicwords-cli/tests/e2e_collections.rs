//! E2E CLI tests covering:
//! - Favorites: toggle, tag, tag filter, search and sort
//! - History: newest-first listing, search, suggest, stats, clear
//! - Import/export of favorites and history
//!
//! Each test runs `tw` as a subprocess against an isolated data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the `tw` binary with `dir` as data and config
/// root.
fn tw_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tw"));
    cmd.arg("--data-dir").arg(dir.join("data"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env("TOPICWORDS_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("TOPICWORDS_DATA_DIR");
    cmd.env_remove("TOPICWORDS_ENDPOINT");
    cmd
}

/// Run with `--json` and parse stdout.
fn tw_json(dir: &Path, args: &[&str]) -> Value {
    let output = tw_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("tw should not crash");
    assert!(
        output.status.success(),
        "tw {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

/// Write a history file directly, oldest entry first.
fn seed_history(dir: &Path, entries: &[(&str, &str, i64)]) {
    let data = dir.join("data");
    std::fs::create_dir_all(&data).expect("create data dir");
    let history: Vec<Value> = entries
        .iter()
        .map(|(topic, words, ts)| serde_json::json!({ "topic": topic, "words": words, "timestamp": ts }))
        .collect();
    std::fs::write(
        data.join("w3t_history"),
        serde_json::to_string(&history).expect("encode history"),
    )
    .expect("write history");
}

fn add_favorite(dir: &Path, topic: &str, words: &str) {
    tw_cmd(dir)
        .args(["favorite", topic, words])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[test]
fn favorite_toggles_on_and_off() {
    let dir = TempDir::new().expect("tempdir");

    let first = tw_json(dir.path(), &["favorite", "space travel", "#rocket.stars.orbit"]);
    assert_eq!(first["favorite"], true);
    assert_eq!(first["words"], "rocket.stars.orbit");

    let second = tw_json(dir.path(), &["favorite", "space travel", "rocket.stars.orbit"]);
    assert_eq!(second["favorite"], false);

    let list = tw_json(dir.path(), &["favorites"]);
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}

#[test]
fn favorite_prints_notification_in_text_mode() {
    let dir = TempDir::new().expect("tempdir");
    tw_cmd(dir.path())
        .args(["--format", "text", "favorite", "ocean", "wave.salt.deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("★ #wave.salt.deep"))
        .stderr(predicate::str::contains("Added to favorites!"));
}

#[test]
fn quiet_suppresses_notifications() {
    let dir = TempDir::new().expect("tempdir");
    tw_cmd(dir.path())
        .args(["-q", "--format", "text", "favorite", "ocean", "wave.salt.deep"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Added to favorites!").not());
}

#[test]
fn tag_adds_once_and_filters() {
    let dir = TempDir::new().expect("tempdir");
    add_favorite(dir.path(), "space travel", "rocket.stars.orbit");
    add_favorite(dir.path(), "ocean", "wave.salt.deep");

    let tagged = tw_json(dir.path(), &["tag", "rocket.stars.orbit", "  sci-fi "]);
    assert_eq!(tagged["added"], true);
    assert_eq!(tagged["tags"], serde_json::json!(["sci-fi"]));

    let again = tw_json(dir.path(), &["tag", "rocket.stars.orbit", "sci-fi"]);
    assert_eq!(again["added"], false);

    let filtered = tw_json(dir.path(), &["favorites", "--tag", "sci-fi"]);
    let rows = filtered.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["topic"], "space travel");
}

#[test]
fn tag_unknown_favorite_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");
    tw_cmd(dir.path())
        .args(["--format", "text", "tag", "no.such.words", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2003]"));
}

#[test]
fn favorites_search_and_alpha_sort() {
    let dir = TempDir::new().expect("tempdir");
    add_favorite(dir.path(), "zebra crossing", "stripe.road.walk");
    add_favorite(dir.path(), "apple pie", "crust.sweet.bake");
    add_favorite(dir.path(), "space travel", "rocket.stars.orbit");

    let sorted = tw_json(dir.path(), &["favorites", "--sort", "alpha"]);
    let topics: Vec<&str> = sorted
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|f| f["topic"].as_str())
        .collect();
    assert_eq!(topics, ["apple pie", "space travel", "zebra crossing"]);

    let searched = tw_json(dir.path(), &["favorites", "--search", "ROAD"]);
    assert_eq!(searched.as_array().map(Vec::len), Some(1));
    assert_eq!(searched[0]["topic"], "zebra crossing");
}

#[test]
fn favorites_list_newest_first() {
    let dir = TempDir::new().expect("tempdir");
    add_favorite(dir.path(), "ocean", "wave.salt.deep");
    add_favorite(dir.path(), "space travel", "rocket.stars.orbit");

    let recent = tw_json(dir.path(), &["favorites"]);
    assert_eq!(recent[0]["topic"], "space travel");
    assert_eq!(recent[1]["topic"], "ocean");

    let oldest = tw_json(dir.path(), &["favorites", "--sort", "oldest"]);
    assert_eq!(oldest[0]["topic"], "ocean");

    tw_cmd(dir.path())
        .args(["--format", "text", "favorites"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("rocket.stars.orbit\tspace travel"));
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[test]
fn history_lists_newest_first() {
    let dir = TempDir::new().expect("tempdir");
    seed_history(
        dir.path(),
        &[("ocean", "wave.salt.deep", 1), ("space", "rocket.stars.orbit", 2)],
    );

    let history = tw_json(dir.path(), &["history"]);
    let rows = history.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["topic"], "space");
    assert_eq!(rows[0]["timestamp"], 2);
    assert_eq!(rows[1]["topic"], "ocean");

    let oldest = tw_json(dir.path(), &["history", "--sort", "oldest"]);
    assert_eq!(oldest[0]["topic"], "ocean");
}

#[test]
fn history_search_matches_words() {
    let dir = TempDir::new().expect("tempdir");
    seed_history(
        dir.path(),
        &[("ocean", "wave.salt.deep", 1), ("space", "rocket.stars.orbit", 2)],
    );

    let found = tw_json(dir.path(), &["history", "--search", "salt"]);
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["topic"], "ocean");
}

#[test]
fn suggest_needs_two_characters() {
    let dir = TempDir::new().expect("tempdir");
    seed_history(
        dir.path(),
        &[("space travel", "a.b.c", 1), ("spa day", "d.e.f", 2), ("ocean", "g.h.i", 3)],
    );

    let one = tw_json(dir.path(), &["suggest", "s"]);
    assert_eq!(one, serde_json::json!([]));

    let two = tw_json(dir.path(), &["suggest", "SPA"]);
    assert_eq!(two, serde_json::json!(["space travel", "spa day"]));
}

#[test]
fn stats_on_empty_store() {
    let dir = TempDir::new().expect("tempdir");
    let stats = tw_json(dir.path(), &["stats"]);
    assert_eq!(stats["total_generations"], 0);
    assert_eq!(stats["favorites_count"], 0);
    assert_eq!(stats["unique_topics"], 0);
    assert!(stats["most_used"].is_null());
}

#[test]
fn clear_history_requires_yes() {
    let dir = TempDir::new().expect("tempdir");
    seed_history(dir.path(), &[("ocean", "wave.salt.deep", 1)]);

    tw_cmd(dir.path())
        .args(["--format", "text", "clear-history"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2005]"));
    assert_eq!(tw_json(dir.path(), &["history"]).as_array().map(Vec::len), Some(1));

    let cleared = tw_json(dir.path(), &["clear-history", "--yes"]);
    assert_eq!(cleared["cleared"], 1);
    assert_eq!(tw_json(dir.path(), &["history"]), serde_json::json!([]));
    assert!(!dir.path().join("data/w3t_history").exists());
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[test]
fn export_favorites_to_stdout_is_a_json_array() {
    let dir = TempDir::new().expect("tempdir");
    add_favorite(dir.path(), "ocean", "wave.salt.deep");

    let output = tw_cmd(dir.path())
        .args(["export", "favorites"])
        .output()
        .expect("export should not crash");
    assert!(output.status.success());
    let payload: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(
        payload,
        serde_json::json!([{ "topic": "ocean", "words": "wave.salt.deep" }])
    );
}

#[test]
fn export_into_directory_uses_generated_name() {
    let dir = TempDir::new().expect("tempdir");
    seed_history(dir.path(), &[("ocean", "wave.salt.deep", 1)]);
    let out_dir = dir.path().join("backups");
    std::fs::create_dir_all(&out_dir).expect("mkdir");

    let result = tw_json(
        dir.path(),
        &["export", "history", "--output", out_dir.to_str().expect("utf8 path")],
    );
    let path = result["path"].as_str().expect("path");
    assert!(path.contains("topicwords-history-"));
    let written = std::fs::read_to_string(path).expect("export file");
    let parsed: Value = serde_json::from_str(&written).expect("valid JSON");
    assert_eq!(parsed[0]["timestamp"], 1);
}

#[test]
fn import_merges_then_replaces() {
    let dir = TempDir::new().expect("tempdir");
    add_favorite(dir.path(), "ocean", "wave.salt.deep");

    let file = dir.path().join("import.json");
    std::fs::write(
        &file,
        r#"[{"topic":"space","words":"rocket.stars.orbit","tags":["sci-fi"]}]"#,
    )
    .expect("write import");
    let file_arg = file.to_str().expect("utf8 path");

    let merged = tw_json(dir.path(), &["import", file_arg]);
    assert_eq!(merged["imported"], 1);
    assert_eq!(merged["favorites"], 2);

    let replaced = tw_json(dir.path(), &["import", file_arg, "--replace"]);
    assert_eq!(replaced["favorites"], 1);
    let list = tw_json(dir.path(), &["favorites"]);
    assert_eq!(list[0]["tags"], serde_json::json!(["sci-fi"]));
}

#[test]
fn invalid_import_leaves_favorites_untouched() {
    let dir = TempDir::new().expect("tempdir");
    add_favorite(dir.path(), "ocean", "wave.salt.deep");

    let file = dir.path().join("bad.json");
    std::fs::write(&file, r#"{"not":"an array"}"#).expect("write import");

    tw_cmd(dir.path())
        .args(["--format", "text", "import"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"));

    let list = tw_json(dir.path(), &["favorites"]);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}
