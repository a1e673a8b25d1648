// tests/run_from_settings.rs
//
// Production wiring end to end: config files on disk, sources over HTTP,
// seen-state in a JSON file.

use std::{env, fs};

use job_watch::config::{ENV_PROFILE_PATH, ENV_SEEN_PATH, ENV_SOURCES_PATH};
use job_watch::{run_from_settings, ConfigError, Report, RunError, RunStatus, Settings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_XML: &str = include_str!("fixtures/jobs_rss.xml");
const PAGE_HTML: &str = include_str!("fixtures/jobs_page.html");

const PROFILE_YAML: &str = r#"
skills_keywords:
  - Python
  - SQL
  - machine learning
  - research
  - data
  - curator
exclude_keywords:
  - unpaid
score_threshold: 0.1
"#;

fn settings_in(dir: &std::path::Path) -> Settings {
    Settings {
        profile_path: dir.join("profile.yaml"),
        sources_path: dir.join("sources.yaml"),
        seen_path: dir.join("state").join("seen.json"),
        metrics_path: None,
    }
}

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_XML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn full_run_then_idempotent_rerun() {
    let server = server().await;
    let tmp = tempfile::tempdir().unwrap();
    let s = settings_in(tmp.path());

    fs::write(&s.profile_path, PROFILE_YAML).unwrap();
    fs::write(
        &s.sources_path,
        format!(
            r#"
timeout_secs: 5
sources:
  - name: Science Jobs
    type: rss
    url: {uri}/feed.xml
  - name: Gone
    type: rss
    url: {uri}/gone
  - name: Museum
    type: html
    url: {uri}/careers
  - name: Legacy
    type: ftp
    url: ftp://legacy.example
"#,
            uri = server.uri()
        ),
    )
    .unwrap();

    let first = run_from_settings(&s).await.expect("first run");
    assert_eq!(first.status(), RunStatus::CompletedWithWarnings);
    assert_eq!(first.warnings.len(), 2);
    assert_eq!(first.report.hits().len(), 3);
    assert!(first
        .report
        .render()
        .starts_with("=== New matching jobs ===\n- [0.25] (Science Jobs) Data Scientist – Python & SQL → https://jobs.example.org/posts/101"));

    let seen: Vec<String> =
        serde_json::from_str(&fs::read_to_string(&s.seen_path).unwrap()).unwrap();
    assert_eq!(seen.len(), 6);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));

    let second = run_from_settings(&s).await.expect("second run");
    assert_eq!(second.report, Report::NoMatches);
}

#[tokio::test]
async fn bad_profile_aborts_before_any_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_XML))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let s = settings_in(tmp.path());
    fs::write(&s.profile_path, "score_treshold: 0.5\n").unwrap();
    fs::write(
        &s.sources_path,
        format!(
            "sources:\n  - name: A\n    type: rss\n    url: {}/feed.xml\n",
            server.uri()
        ),
    )
    .unwrap();

    let err = run_from_settings(&s).await.unwrap_err();
    assert!(matches!(err, RunError::Config(ConfigError::Parse { .. })), "{err}");
    assert_eq!(err.exit_code(), 2);
    assert!(!s.seen_path.exists());
}

#[tokio::test]
async fn missing_sources_file_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let s = settings_in(tmp.path());
    fs::write(&s.profile_path, PROFILE_YAML).unwrap();

    let err = run_from_settings(&s).await.unwrap_err();
    assert!(matches!(err, RunError::Config(ConfigError::Read { .. })));
}

#[serial_test::serial]
#[test]
fn settings_come_from_env() {
    let tmp = tempfile::tempdir().unwrap();
    let profile = tmp.path().join("p.yaml");
    let sources = tmp.path().join("s.toml");
    fs::write(&profile, PROFILE_YAML).unwrap();
    fs::write(&sources, "sources = []\n").unwrap();

    env::set_var(ENV_PROFILE_PATH, &profile);
    env::set_var(ENV_SOURCES_PATH, &sources);
    env::set_var(ENV_SEEN_PATH, tmp.path().join("seen.json"));

    let s = Settings::from_env().unwrap();
    assert_eq!(s.profile_path, profile);
    assert_eq!(s.sources_path, sources);
    assert_eq!(s.seen_path, tmp.path().join("seen.json"));

    let (p, src) = s.load().unwrap();
    assert_eq!(p.skills_keywords.len(), 6);
    assert!(src.sources.is_empty());
    assert_eq!(src.timeout_secs, 20);

    env::remove_var(ENV_PROFILE_PATH);
    env::remove_var(ENV_SOURCES_PATH);
    env::remove_var(ENV_SEEN_PATH);
}
