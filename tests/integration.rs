use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;

fn me_api_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("me-api");
    path
}

fn setup_test_env(port: u16) -> (TempDir, PathBuf) {
    setup_test_env_with(port, "")
}

fn setup_test_env_with(port: u16, extra_server_config: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(data_dir.join("seed.json"), TEST_SEED).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/portfolio.db"

[server]
bind = "127.0.0.1:{}"
{}

[auth]
username = "admin"
password = "secret"
"#,
        root.display(),
        port,
        extra_server_config
    );

    let config_path = config_dir.join("me-api.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

const TEST_SEED: &str = r#"{
  "profile": {"name": "Test Person", "email": "test@example.com"},
  "links": [{"name": "GitHub", "url": "https://github.com/example"}],
  "skills": [
    {"name": "Python", "is_top_skill": true},
    {"name": "Rust", "is_top_skill": true},
    {"name": "SQL"}
  ],
  "categories": ["Backend", "Games", "Empty Corner"],
  "education": [{
    "institution": "Test University", "degree": "BSc",
    "start_date": "2020-09-01", "end_date": "2024-06-30"
  }],
  "work_experience": [
    {
      "company": "Acme", "position": "Backend Intern",
      "start_date": "2024-01-01", "end_date": null,
      "description": "Python services.", "categories": ["Backend"]
    },
    {
      "company": "Oldco", "position": "QA",
      "start_date": "2022-05-01", "end_date": "2023-04-30",
      "description": "Testing.", "categories": ["Games"]
    }
  ],
  "projects": [
    {
      "title": "Python Scraper", "description": "A web scraper in Python.",
      "links": {"github": "https://github.com/example/scraper"},
      "categories": ["Backend"], "skills": ["Python", "SQL"]
    },
    {
      "title": "Chess Engine", "description": "A chess engine in Rust.",
      "links": {}, "categories": ["Games"], "skills": ["Rust"]
    },
    {
      "title": "Portfolio Site", "description": "Static site for the portfolio.",
      "links": {}, "categories": ["Backend"], "skills": ["Python"]
    }
  ]
}"#;

fn run_me_api(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = me_api_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run me-api binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Kills the spawned server when the test ends, pass or fail.
struct ServerGuard {
    child: Child,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn start_server(config_path: &Path, port: u16) -> (ServerGuard, String) {
    let child = Command::new(me_api_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("serve")
        .spawn()
        .unwrap();
    let guard = ServerGuard { child };

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::blocking::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{}/health", base)).send() {
            if resp.status().is_success() {
                return (guard, base);
            }
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    panic!("server did not become ready on {}", base);
}

fn init_seed_serve(port: u16) -> (TempDir, ServerGuard, String) {
    let (tmp, config_path) = setup_test_env(port);
    let seed_path = tmp.path().join("data/seed.json");

    let (stdout, stderr, success) = run_me_api(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    let (stdout, stderr, success) =
        run_me_api(&config_path, &["seed", seed_path.to_str().unwrap()]);
    assert!(success, "seed failed: stdout={}, stderr={}", stdout, stderr);

    let (guard, base) = start_server(&config_path, port);
    (tmp, guard, base)
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env(7460);

    let (stdout, stderr, success) = run_me_api(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env(7460);

    let (_, _, success1) = run_me_api(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_me_api(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_seed_is_rerunnable() {
    let (tmp, config_path) = setup_test_env(7460);
    let seed_path = tmp.path().join("data/seed.json");

    run_me_api(&config_path, &["init"]);

    let (stdout1, stderr1, success1) =
        run_me_api(&config_path, &["seed", seed_path.to_str().unwrap()]);
    assert!(success1, "seed failed: {} {}", stdout1, stderr1);
    assert!(stdout1.contains("seeded: 3 skills"));

    // Re-running converges instead of accumulating duplicates
    let (stdout2, _, success2) =
        run_me_api(&config_path, &["seed", seed_path.to_str().unwrap()]);
    assert!(success2, "Second seed failed");
    assert!(stdout2.contains("seeded: 3 skills"));
}

#[test]
fn test_health() {
    let (_tmp, _guard, base) = init_seed_serve(7461);

    let resp = reqwest::blocking::get(format!("{}/health", base)).unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["status"], "ok");
}

#[test]
fn test_full_profile() {
    let (_tmp, _guard, base) = init_seed_serve(7462);

    let resp = reqwest::blocking::get(format!("{}/profile", base)).unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();

    assert_eq!(body["name"], "Test Person");
    assert_eq!(body["email"], "test@example.com");

    // Top skills sort first, alphabetical within each group
    let skills = body["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 3);
    assert_eq!(skills[0]["name"], "Python");
    assert_eq!(skills[1]["name"], "Rust");
    assert_eq!(skills[2]["name"], "SQL");
    assert_eq!(skills[0]["is_top_skill"], true);
    assert_eq!(skills[2]["is_top_skill"], false);

    // Work experience is most-recent-first and carries its categories
    let work = body["work_experience"].as_array().unwrap();
    assert_eq!(work.len(), 2);
    assert_eq!(work[0]["company"], "Acme");
    assert!(work[0]["end_date"].is_null());
    assert_eq!(work[0]["categories"][0]["name"], "Backend");
    assert_eq!(work[1]["company"], "Oldco");

    assert_eq!(body["education"][0]["institution"], "Test University");
    assert_eq!(body["links"][0]["name"], "GitHub");

    // Projects carry parsed link maps and both tag lists
    let projects = body["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 3);
    assert_eq!(
        projects[0]["links"]["github"],
        "https://github.com/example/scraper"
    );
    assert_eq!(projects[0]["categories"][0]["name"], "Backend");
    assert_eq!(projects[0]["skills"].as_array().unwrap().len(), 2);
}

#[test]
fn test_profile_links_never_null() {
    let (_tmp, _guard, base) = init_seed_serve(7463);

    let body: serde_json::Value = reqwest::blocking::get(format!("{}/profile", base))
        .unwrap()
        .json()
        .unwrap();

    // Chess Engine was seeded with no links; the field must be {} not null
    let projects = body["projects"].as_array().unwrap();
    let chess = projects
        .iter()
        .find(|p| p["title"] == "Chess Engine")
        .unwrap();
    assert!(chess["links"].is_object());
    assert_eq!(chess["links"].as_object().unwrap().len(), 0);
}

#[test]
fn test_projects_pagination_and_filter() {
    let (_tmp, _guard, base) = init_seed_serve(7464);

    let all: serde_json::Value = reqwest::blocking::get(format!("{}/projects", base))
        .unwrap()
        .json()
        .unwrap();
    let all = all.as_array().unwrap().clone();
    assert_eq!(all.len(), 3);

    // limit is a stable prefix of the id-ordered full list
    let page: serde_json::Value =
        reqwest::blocking::get(format!("{}/projects?skip=0&limit=2", base))
            .unwrap()
            .json()
            .unwrap();
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["id"], all[0]["id"]);
    assert_eq!(page[1]["id"], all[1]["id"]);

    let rest: serde_json::Value =
        reqwest::blocking::get(format!("{}/projects?skip=2&limit=10", base))
            .unwrap()
            .json()
            .unwrap();
    assert_eq!(rest.as_array().unwrap().len(), 1);

    // Case-insensitive skill substring filter
    let python: serde_json::Value =
        reqwest::blocking::get(format!("{}/projects?skill=python", base))
            .unwrap()
            .json()
            .unwrap();
    let titles: Vec<&str> = python
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Python Scraper", "Portfolio Site"]);

    let rust: serde_json::Value =
        reqwest::blocking::get(format!("{}/projects?skill=RUST", base))
            .unwrap()
            .json()
            .unwrap();
    assert_eq!(rust.as_array().unwrap().len(), 1);
    assert_eq!(rust[0]["title"], "Chess Engine");
}

#[test]
fn test_search() {
    let (_tmp, _guard, base) = init_seed_serve(7465);

    // Blank query returns empty lists, not an error
    let empty: serde_json::Value = reqwest::blocking::get(format!("{}/search?q=", base))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(empty["projects"].as_array().unwrap().len(), 0);
    assert_eq!(empty["skills"].as_array().unwrap().len(), 0);

    // Case-insensitive match over title/description plus skill names
    let python: serde_json::Value = reqwest::blocking::get(format!("{}/search?q=python", base))
        .unwrap()
        .json()
        .unwrap();
    let titles: Vec<&str> = python["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Python Scraper"));
    assert_eq!(python["skills"][0]["name"], "Python");

    // Description-only match
    let chess: serde_json::Value = reqwest::blocking::get(format!("{}/search?q=chess", base))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(chess["projects"][0]["title"], "Chess Engine");
    assert_eq!(chess["skills"].as_array().unwrap().len(), 0);

    let nothing: serde_json::Value = reqwest::blocking::get(format!("{}/search?q=zzzz", base))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(nothing["projects"].as_array().unwrap().len(), 0);
    assert_eq!(nothing["skills"].as_array().unwrap().len(), 0);
}

#[test]
fn test_by_category() {
    let (_tmp, _guard, base) = init_seed_serve(7466);

    let backend: serde_json::Value =
        reqwest::blocking::get(format!("{}/by-category/backend", base))
            .unwrap()
            .json()
            .unwrap();
    assert_eq!(backend["projects"].as_array().unwrap().len(), 2);
    assert_eq!(backend["work_experience"].as_array().unwrap().len(), 1);
    assert_eq!(backend["work_experience"][0]["company"], "Acme");

    // A category that exists but has no linked content is a 404, same as
    // one that does not exist at all
    let empty = reqwest::blocking::get(format!("{}/by-category/Empty%20Corner", base)).unwrap();
    assert_eq!(empty.status(), 404);
    let body: serde_json::Value = empty.json().unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    let missing = reqwest::blocking::get(format!("{}/by-category/nope", base)).unwrap();
    assert_eq!(missing.status(), 404);
}

#[test]
fn test_create_skill() {
    let (_tmp, _guard, base) = init_seed_serve(7467);
    let client = reqwest::blocking::Client::new();

    // No credentials: 401 with a Basic challenge
    let resp = client
        .post(format!("{}/skills", base))
        .json(&serde_json::json!({"name": "Go", "is_top_skill": true}))
        .send()
        .unwrap();
    assert_eq!(resp.status(), 401);
    let challenge = resp.headers().get("www-authenticate").unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic"));

    // Wrong password: still 401
    let resp = client
        .post(format!("{}/skills", base))
        .basic_auth("admin", Some("wrong"))
        .json(&serde_json::json!({"name": "Go"}))
        .send()
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Valid credentials: 201 with the assigned id
    let resp = client
        .post(format!("{}/skills", base))
        .basic_auth("admin", Some("secret"))
        .json(&serde_json::json!({"name": "Go", "is_top_skill": true}))
        .send()
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: serde_json::Value = resp.json().unwrap();
    assert_eq!(created["name"], "Go");
    assert_eq!(created["is_top_skill"], true);
    assert!(created["id"].as_i64().unwrap() > 0);

    // The new skill shows up in /skills/top exactly once
    let top: serde_json::Value = reqwest::blocking::get(format!("{}/skills/top", base))
        .unwrap()
        .json()
        .unwrap();
    let go_count = top
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["name"] == "Go")
        .count();
    assert_eq!(go_count, 1);

    // Duplicate name: 409, and no second row appears
    let resp = client
        .post(format!("{}/skills", base))
        .basic_auth("admin", Some("secret"))
        .json(&serde_json::json!({"name": "Go"}))
        .send()
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["error"]["code"], "conflict");

    let top_after: serde_json::Value = reqwest::blocking::get(format!("{}/skills/top", base))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(top_after.as_array().unwrap().len(), top.as_array().unwrap().len());

    // Duplicate of a seeded skill behaves the same
    let resp = client
        .post(format!("{}/skills", base))
        .basic_auth("admin", Some("secret"))
        .json(&serde_json::json!({"name": "Python"}))
        .send()
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Blank names never reach the store
    let resp = client
        .post(format!("{}/skills", base))
        .basic_auth("admin", Some("secret"))
        .json(&serde_json::json!({"name": "   "}))
        .send()
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[test]
fn test_profile_rate_limit() {
    let port = 7468;
    let (tmp, config_path) =
        setup_test_env_with(port, "profile_rate_limit_per_minute = 2");
    let seed_path = tmp.path().join("data/seed.json");

    run_me_api(&config_path, &["init"]);
    run_me_api(&config_path, &["seed", seed_path.to_str().unwrap()]);
    let (_guard, base) = start_server(&config_path, port);

    let first = reqwest::blocking::get(format!("{}/profile", base)).unwrap();
    assert_eq!(first.status(), 200);
    let second = reqwest::blocking::get(format!("{}/profile", base)).unwrap();
    assert_eq!(second.status(), 200);

    let third = reqwest::blocking::get(format!("{}/profile", base)).unwrap();
    assert_eq!(third.status(), 429);
    let body: serde_json::Value = third.json().unwrap();
    assert_eq!(body["error"]["code"], "too_many_requests");

    // Other endpoints stay unlimited
    let health = reqwest::blocking::get(format!("{}/health", base)).unwrap();
    assert_eq!(health.status(), 200);
}

#[test]
fn test_unseeded_profile_is_404() {
    let port = 7469;
    let (_tmp, config_path) = setup_test_env(port);

    run_me_api(&config_path, &["init"]);
    let (_guard, base) = start_server(&config_path, port);

    let resp = reqwest::blocking::get(format!("{}/profile", base)).unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    // Reads that return collections degrade to empty instead
    let top: serde_json::Value = reqwest::blocking::get(format!("{}/skills/top", base))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(top.as_array().unwrap().len(), 0);
}
