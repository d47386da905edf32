//! Integration tests for the `scan`, `init` and `clear` commands.

use chrono::{Datelike, Utc};
use serde_json::json;
use starcheck_lib::Host;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test host that captures output to in-memory buffers.
#[derive(Default)]
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
}

impl TestHost {
    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }

    fn exit(&mut self, _code: i32) {}
}

fn rate_limit() -> serde_json::Value {
    json!({ "limit": 5000, "remaining": 4000, "resetAt": "2030-01-01T00:00:00Z" })
}

async fn mount_repository(server: &MockServer, stargazers: usize) {
    let edges: Vec<_> = (0..stargazers).map(|i| json!({ "cursor": format!("c{i}") })).collect();
    let logins: Vec<_> = (0..stargazers).map(|i| json!({ "login": format!("u{i}") })).collect();
    let contributors: Vec<_> = (0..stargazers)
        .map(|i| {
            json!({
                "login": format!("u{i}"),
                "createdAt": "2015-03-01T00:00:00Z",
                "contributionsCollection": {
                    "restrictedContributionsCount": 20,
                    "totalIssueContributions": 3,
                    "totalCommitContributions": 200,
                    "totalRepositoryContributions": 4,
                    "totalPullRequestContributions": 6,
                    "totalPullRequestReviewContributions": 2,
                    "contributionCalendar": { "totalContributions": 400 }
                }
            })
        })
        .collect();

    Mock::given(method("POST"))
        .and(body_string_contains("nodes { login }"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "rateLimit": rate_limit(),
                "repository": { "stargazers": { "pageInfo": { "hasNextPage": false }, "edges": edges.clone(), "nodes": logins } }
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("contributionsCollection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "rateLimit": rate_limit(),
                "repository": { "stargazers": { "edges": edges, "nodes": contributors } }
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot do network I/O")]
async fn test_scan_command_console_and_json_output() {
    let server = MockServer::start().await;
    mount_repository(&server, 12).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cache_dir = temp_dir.path().join("cache");
    let json_path = temp_dir.path().join("report.json");
    let endpoint = format!("{}/graphql", server.uri());
    let this_year = Utc::now().year().to_string();

    let mut host = TestHost::default();
    let result = starcheck_lib::run(
        &mut host,
        [
            "starcheck",
            "scan",
            "ullaakut/astronomer",
            "--github-token",
            "test-token",
            "--endpoint",
            endpoint.as_str(),
            "--cache-dir",
            cache_dir.to_str().expect("valid path"),
            "--until-year",
            this_year.as_str(),
            "--json",
            json_path.to_str().expect("valid path"),
            "--color",
            "never",
        ],
    )
    .await;

    assert!(result.is_ok(), "scan command failed: {result:?}");

    let output = host.output_str();
    assert!(output.contains("ullaakut/astronomer: 12 of 12 stargazers scanned"), "{output}");
    assert!(output.contains("Averages"));
    assert!(output.contains("Commits authored:"));
    assert!(output.contains("Overall trust:"));
    assert!(!output.contains("percentile"), "12 stargazers are too few for percentiles");

    let json_content = std::fs::read_to_string(&json_path).expect("read JSON");
    let parsed: serde_json::Value = serde_json::from_str(&json_content).expect("valid JSON");
    assert_eq!(parsed["repository"], "ullaakut/astronomer");
    assert_eq!(parsed["stargazers"], 12);
    assert_eq!(parsed["exhaustive"], true);
    assert_eq!(parsed["factors"]["Commits authored"]["value"], 200.0);
    assert_eq!(parsed["factors"]["Weighted contributions"]["value"], 420.0);
    assert!(parsed.get("percentiles").is_none());
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot do network I/O")]
async fn test_scan_command_requires_token() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut host = TestHost::default();
    let result = starcheck_lib::run(
        &mut host,
        [
            "starcheck",
            "scan",
            "ullaakut/astronomer",
            "--github-token",
            "",
            "--cache-dir",
            temp_dir.path().to_str().expect("valid path"),
        ],
    )
    .await;

    let err = result.expect_err("scan without a token should fail");
    assert!(format!("{err}").contains("token"));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_init_then_clear() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("starcheck.toml");
    let cache_dir = temp_dir.path().join("cache");
    std::fs::create_dir_all(cache_dir.join("ullaakut").join("astronomer")).expect("create cache dir");

    let mut host = TestHost::default();
    starcheck_lib::run(&mut host, ["starcheck", "init", "--output", config_path.to_str().expect("valid path")])
        .await
        .expect("init should succeed");
    assert!(config_path.exists());

    starcheck_lib::run(
        &mut host,
        [
            "starcheck",
            "clear",
            "ullaakut/astronomer",
            "--cache-dir",
            cache_dir.to_str().expect("valid path"),
        ],
    )
    .await
    .expect("clear should succeed");

    assert!(!cache_dir.join("ullaakut").join("astronomer").exists());
    assert!(host.output_str().contains("Cleared cached responses for ullaakut/astronomer"));
}
