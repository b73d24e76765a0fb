use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn holo_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_holo"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Vehicles skip ids 1-3, 5, and 9-13 the way the live catalog does, so
    // id 20 lands on page 3 of a 3-per-page listing rather than page 7.
    let fixture = r#"{
  "base_url": "https://swapi.dev",
  "page_size": 3,
  "entities": {
    "people": {
      "1": {
        "name": "Luke Skywalker",
        "height": "172",
        "homeworld": "https://swapi.dev/api/planets/1/",
        "films": ["https://swapi.dev/api/films/2/", "https://swapi.dev/api/films/1/"],
        "species": [],
        "vehicles": ["https://swapi.dev/api/vehicles/14/"]
      }
    },
    "planets": {
      "1": { "name": "Tatooine" }
    },
    "films": {
      "1": { "title": "A New Hope", "episode_id": 4 },
      "2": { "title": "The Empire Strikes Back", "episode_id": 5 },
      "4": { "title": "The Phantom Menace", "episode_id": 1 }
    },
    "vehicles": {
      "4": { "name": "Sand Crawler" },
      "6": { "name": "T-16 skyhopper" },
      "7": { "name": "X-34 landspeeder" },
      "8": { "name": "TIE/LN starfighter" },
      "14": { "name": "Snowspeeder" },
      "16": { "name": "TIE bomber" },
      "18": { "name": "AT-AT" },
      "19": { "name": "AT-ST" },
      "20": { "name": "Storm IV Twin-Pod cloud car" }
    }
  }
}"#;
    let fixture_path = root.join("catalog.json");
    fs::write(&fixture_path, fixture).unwrap();

    let config_content = format!(
        r#"[catalog]
fixture = "{}"

[resolution]
concurrency = 2

[locator]
max_pages = 5
page_size = 3
"#,
        fixture_path.display()
    );

    let config_path = config_dir.join("holo.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_holo(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = holo_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run holo binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_fields_default_and_thorough() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_holo(&config_path, &["fields", "people"]);
    assert!(success);
    assert!(stdout.lines().any(|l| l == "homeworld"));
    assert!(!stdout.lines().any(|l| l == "species"));

    let (stdout, _, success) = run_holo(&config_path, &["fields", "people", "--thorough"]);
    assert!(success);
    assert!(stdout.lines().any(|l| l == "species"));
}

#[test]
fn test_entry_text_output() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_holo(&config_path, &["entry", "people", "1"]);
    assert!(success, "entry failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("people-luke-skywalker"));
    assert!(stdout.contains("Tatooine"));
    assert!(stdout.contains("The Empire Strikes Back, A New Hope"));
    assert!(!stdout.contains("listing page"));
}

#[test]
fn test_entry_json_with_locate() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_holo(&config_path, &["entry", "people", "1", "--locate", "--json"]);
    assert!(success, "entry failed: stdout={}, stderr={}", stdout, stderr);

    let view: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(view["entity"]["composite_id"], "people-luke-skywalker");
    assert_eq!(view["entity"]["fields"]["homeworld"]["kind"], "link");
    assert_eq!(
        view["entity"]["fields"]["homeworld"]["value"]["path"],
        "/planets/1/"
    );
    assert_eq!(view["located"]["page"], 1);
}

#[test]
fn test_entry_thorough_resolves_vehicles() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_holo(
        &config_path,
        &["entry", "people", "1", "--thorough", "--json"],
    );
    assert!(success);
    let view: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        view["entity"]["fields"]["vehicles"]["value"][0]["label"],
        "Snowspeeder"
    );
    assert_eq!(view["entity"]["fields"]["species"]["kind"], "missing");
    assert_eq!(view["entity"]["fields"]["species"]["value"], "N/a");
}

#[test]
fn test_entry_missing_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_holo(&config_path, &["entry", "people", "42"]);
    assert!(!success);
    assert!(stderr.contains("entity not found"));
}

#[test]
fn test_unknown_category_rejected() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_holo(&config_path, &["entry", "droids", "1"]);
    assert!(!success);
    assert!(stderr.contains("unknown category"));
}

#[test]
fn test_search_show_all_films_in_episode_order() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_holo(
        &config_path,
        &["search", "[show all]", "--category", "films"],
    );
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);

    let phantom = stdout.find("The Phantom Menace").unwrap();
    let hope = stdout.find("A New Hope").unwrap();
    let empire = stdout.find("The Empire Strikes Back").unwrap();
    assert!(phantom < hope && hope < empire);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_holo(&config_path, &["search", "jar jar"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_json_ranks_categories() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_holo(
        &config_path,
        &[
            "search", "s", "--category", "people", "--category", "vehicles", "--json",
        ],
    );
    assert!(success);
    let results: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(results[0]["category"], "vehicles");
    assert_eq!(results[1]["category"], "people");
}

#[test]
fn test_locate_gapped_vehicle() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_holo(&config_path, &["locate", "vehicles", "20"]);
    assert!(success, "locate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("vehicles/20/ is on page 3 (3 page(s) scanned)"));
}

#[test]
fn test_locate_absent_vehicle() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_holo(&config_path, &["locate", "vehicles", "5"]);
    assert!(!success);
    assert!(stderr.contains("no page of vehicles"));
}

#[test]
fn test_fields_does_not_read_config() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("absent.toml");

    let (stdout, _, success) = run_holo(&missing, &["fields", "films"]);
    assert!(success);
    assert!(stdout.lines().any(|l| l == "characters"));

    let (_, stderr, success) = run_holo(&missing, &["locate", "films", "1"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
