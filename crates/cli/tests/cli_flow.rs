use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const GUIDE: &str = "Deployment happens every Tuesday after the release review.";
const LUNCH: &str = "Lunch is served in the cafeteria at noon.";

#[allow(deprecated)]
fn kbase(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kbase").expect("binary");
    cmd.current_dir(workdir)
        .env("KBASE_EMBEDDING_MODE", "hash")
        .env_remove("RUST_LOG");
    cmd
}

fn json_of(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn setup_data() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("guide.txt"), GUIDE).unwrap();
    fs::write(data.join("office.txt"), LUNCH).unwrap();
    temp
}

#[test]
fn index_then_vector_search() {
    let temp = setup_data();
    let root = temp.path();

    let stats = json_of(kbase(root).args(["index", "--json"]));
    assert_eq!(stats["documents"], 2);
    assert_eq!(stats["chunks"], 2);
    assert_eq!(stats["dimension"], 384);
    assert!(root.join(".kbase/index.json").is_file());

    let ranked = json_of(kbase(root).args(["search", LUNCH, "-n", "2", "--json"]));
    assert_eq!(ranked["path"], "vector");
    let results = ranked["results"].as_array().expect("results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["rank"], 1);
    assert_eq!(results[0]["source"], "office.txt");
    assert_eq!(results[0]["text"], LUNCH);
}

#[test]
fn search_without_index_falls_back_to_lexical() {
    let temp = setup_data();

    let ranked = json_of(kbase(temp.path()).args(["search", "deploy", "--json"]));
    assert_eq!(ranked["path"], "lexical");
    let results = ranked["results"].as_array().expect("results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["source"], "guide.txt");
    assert!(results[0]["distance_or_score"].as_f64().unwrap() >= 2.0);
}

#[test]
fn embedding_off_uses_lexical_and_highlights() {
    let temp = setup_data();
    let root = temp.path();
    kbase(root).arg("index").assert().success();

    kbase(root)
        .env("KBASE_EMBEDDING_MODE", "off")
        .args(["search", "tuesday", "--highlight"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**Tuesday**"))
        .stdout(predicate::str::contains("Source: guide.txt"));
}

#[test]
fn empty_query_fails() {
    let temp = setup_data();

    kbase(temp.path())
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Empty query"));
}

#[test]
fn indexing_requires_embeddings() {
    let temp = setup_data();

    kbase(temp.path())
        .args(["--embedding-mode", "off", "index"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("embedding backend"));
}

#[test]
fn delete_source_is_persisted() {
    let temp = setup_data();
    let root = temp.path();
    kbase(root).arg("index").assert().success();

    let deleted = json_of(kbase(root).args(["delete-source", "guide.txt", "--json"]));
    assert_eq!(deleted["deactivated"], 1);
    let again = json_of(kbase(root).args(["delete-source", "guide.txt", "--json"]));
    assert_eq!(again["deactivated"], 0);

    let stats = json_of(kbase(root).args(["stats", "--json"]));
    assert_eq!(stats["entries"], 2);
    assert_eq!(stats["active_entries"], 1);
    assert_eq!(stats["sources"], 1);
    assert_eq!(stats["metric"], "l2");

    let ranked = json_of(kbase(root).args(["search", GUIDE, "--json"]));
    let results = ranked["results"].as_array().expect("results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["source"], "office.txt");
}

#[test]
fn corrupt_snapshot_is_reported() {
    let temp = setup_data();
    let root = temp.path();
    fs::create_dir_all(root.join(".kbase")).unwrap();
    fs::write(root.join(".kbase/index.json"), b"{\"version\":1").unwrap();

    kbase(root)
        .args(["search", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupt snapshot"));
}

#[test]
fn config_file_overrides_defaults() {
    let temp = setup_data();
    let root = temp.path();
    fs::write(
        root.join("kbase.toml"),
        concat!(
            "store_path = \"out/kb.json\"\n\n",
            "[index]\nmetric = \"cosine\"\n\n",
            "[chunking]\nmax_size = 20\noverlap = 5\n",
        ),
    )
    .unwrap();

    let stats = json_of(kbase(root).args(["index", "--json"]));
    assert!(stats["chunks"].as_u64().unwrap() > 2);
    assert!(root.join("out/kb.json").is_file());

    let summary = json_of(kbase(root).args(["stats", "--json"]));
    assert_eq!(summary["metric"], "cosine");
}

#[test]
fn invalid_config_fails_fast() {
    let temp = setup_data();
    let root = temp.path();
    fs::write(root.join("bad.toml"), "[chunking]\nmax_size = 10\noverlap = 10\n").unwrap();

    kbase(root)
        .args(["--config", "bad.toml", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunking"));
}
