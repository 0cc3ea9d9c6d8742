//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawl
//! jobs end-to-end: fetching, extraction, link probing, report files and the
//! persisted job status.

use onpage_crawl::config::Config;
use onpage_crawl::output::{simple_report, FETCH_FAILED};
use onpage_crawl::scope::load_domain_inputs;
use onpage_crawl::storage::{open_job_store, FileJobStore, JobStore};
use onpage_crawl::{CrawlJob, DomainInput, IndexStatus, JobRunner, JobStatus};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing all artifacts under `dir`
fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.http.retries = 0;
    config.http.timeout_secs = 5;
    config.http.probe_timeout_secs = 5;
    config.output.reports_dir = dir.path().join("reports").display().to_string();
    config.output.status_path = dir.path().join("cache/crawl_status.json").display().to_string();
    config
}

fn domain_input(server: &MockServer, max_pages: usize) -> DomainInput {
    DomainInput {
        max_pages: Some(max_pages),
        ..DomainInput::new(server.uri())
    }
}

async fn run_job(config: Config, inputs: Vec<DomainInput>) -> CrawlJob {
    let store = open_job_store(Path::new(&config.output.status_path));
    let runner = JobRunner::new(config, store).unwrap();
    let job = runner.start();
    runner.run(job, inputs).await
}

/// Mounts an HTML page served on GET
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Answers every HEAD probe with 200
async fn mount_head_ok(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn links_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>Test</title></head><body>{}</body></html>",
        anchors
    )
}

fn page_paths(job: &CrawlJob) -> Vec<String> {
    job.reports.as_ref().unwrap()[0]
        .pages
        .iter()
        .map(|p| url::Url::parse(&p.url).unwrap().path().to_string())
        .collect()
}

#[tokio::test]
async fn test_single_page_budget_discards_frontier() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", links_page(&["/a", "/b", "/c", "/d", "/e"])).await;

    let dir = TempDir::new().unwrap();
    let job = run_job(create_test_config(&dir), vec![domain_input(&server, 1)]).await;

    assert_eq!(job.status, JobStatus::Done);
    let report = &job.reports.as_ref().unwrap()[0];
    assert_eq!(report.pages.len(), 1);

    let page = &report.pages[0];
    assert!(page.ok);
    assert_eq!(page.status, Some(200));
    assert_eq!(page.internal_links.len(), 5);
    assert!(page.internal_links.iter().all(|l| l.status == Some(200)));

    let gets = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.to_string() == "GET")
        .count();
    assert_eq!(gets, 1);
}

#[tokio::test]
async fn test_failed_seed_terminates_crawl() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string(links_page(&["/a"])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let job = run_job(create_test_config(&dir), vec![domain_input(&server, 10)]).await;

    assert_eq!(job.status, JobStatus::Done);
    let report = &job.reports.as_ref().unwrap()[0];
    assert_eq!(report.pages.len(), 1);

    let page = &report.pages[0];
    assert!(!page.ok);
    assert_eq!(page.status, Some(500));
    assert_eq!(page.error.as_deref(), Some(FETCH_FAILED));
    assert!(page.internal_links.is_empty());
    assert!(page.external_links.is_empty());
}

#[tokio::test]
async fn test_unreachable_domain_records_failed_page() {
    let dir = TempDir::new().unwrap();
    let input = DomainInput {
        max_pages: Some(3),
        ..DomainInput::new("http://127.0.0.1:1")
    };
    let job = run_job(create_test_config(&dir), vec![input]).await;

    assert_eq!(job.status, JobStatus::Done);
    let page = &job.reports.as_ref().unwrap()[0].pages[0];
    assert!(!page.ok);
    assert_eq!(page.status, None);
    assert_eq!(page.error.as_deref(), Some(FETCH_FAILED));
}

#[tokio::test]
async fn test_noindex_seed_still_expands() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><head><meta name="robots" content="NOINDEX, follow"></head>
           <body><a href="/next">next</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/next", links_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let job = run_job(create_test_config(&dir), vec![domain_input(&server, 10)]).await;

    let pages = &job.reports.as_ref().unwrap()[0].pages;
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].index_status, IndexStatus::Noindex);
    assert_eq!(pages[0].meta_robots.as_deref(), Some("NOINDEX, follow"));
    assert_eq!(pages[1].index_status, IndexStatus::Unknown);
}

#[tokio::test]
async fn test_blocked_prefix_never_crawled() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", links_page(&["/wp-admin/", "/wp-admin/edit", "/about"])).await;
    mount_page(&server, "/about", links_page(&["/wp-admin/settings"])).await;
    mount_page(&server, "/wp-admin/", links_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let input = DomainInput {
        blocked_paths: vec!["/wp-admin/".to_string()],
        ..domain_input(&server, 10)
    };
    let job = run_job(create_test_config(&dir), vec![input]).await;

    let paths = page_paths(&job);
    assert_eq!(paths, vec!["/", "/about"]);
    assert!(paths.iter().all(|p| !p.starts_with("/wp-admin/")));
}

#[tokio::test]
async fn test_allowed_prefix_limits_crawl() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", links_page(&["/blog/one", "/shop/item", "/blog/two"])).await;
    mount_page(&server, "/blog/one", links_page(&["/shop/other", "/blog/two"])).await;
    mount_page(&server, "/blog/two", links_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let input = DomainInput {
        allowed_paths: vec!["/blog/".to_string()],
        ..domain_input(&server, 10)
    };
    let job = run_job(create_test_config(&dir), vec![input]).await;

    let paths = page_paths(&job);
    assert_eq!(paths, vec!["/", "/blog/one", "/blog/two"]);
    assert!(paths[1..].iter().all(|p| p.starts_with("/blog/")));
}

#[tokio::test]
async fn test_shared_link_probed_once() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    let shared = format!("http://localhost:{}/shared", external.address().port());

    mount_head_ok(&server).await;
    Mock::given(method("HEAD"))
        .and(path("/shared"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&external)
        .await;
    mount_page(&server, "/", links_page(&["/a", &shared])).await;
    mount_page(&server, "/a", links_page(&[&shared, "/"])).await;

    let dir = TempDir::new().unwrap();
    let job = run_job(create_test_config(&dir), vec![domain_input(&server, 10)]).await;

    let pages = &job.reports.as_ref().unwrap()[0].pages;
    assert_eq!(pages.len(), 2);
    for page in pages {
        assert_eq!(page.external_links.len(), 1);
        assert_eq!(page.external_links[0].url, shared);
        assert_eq!(page.external_links[0].status, Some(404));
        for link in &page.internal_links {
            let host = url::Url::parse(&link.url).unwrap().host_str().unwrap().to_string();
            assert_eq!(host, "127.0.0.1");
        }
    }
}

#[tokio::test]
async fn test_probe_falls_back_to_get_on_405() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    mount_page(&server, "/", links_page(&["/exists"])).await;
    mount_page(&server, "/exists", links_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let job = run_job(create_test_config(&dir), vec![domain_input(&server, 1)]).await;

    let page = &job.reports.as_ref().unwrap()[0].pages[0];
    assert_eq!(page.internal_links[0].status, Some(200));
}

#[tokio::test]
async fn test_redirect_target_not_crawled_twice() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/home", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/home", links_page(&["/home", "/about"])).await;
    mount_page(&server, "/about", links_page(&["/home"])).await;

    let dir = TempDir::new().unwrap();
    let job = run_job(create_test_config(&dir), vec![domain_input(&server, 10)]).await;

    let pages = &job.reports.as_ref().unwrap()[0].pages;
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].final_url, format!("{}/home", server.uri()));
    assert!(pages[1].url.ends_with("/about"));
}

#[tokio::test]
async fn test_report_and_status_files_written() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", links_page(&["/a"])).await;
    mount_page(&server, "/a", links_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.output.extracted_dir = Some(dir.path().join("extracted").display().to_string());
    let status_path = config.output.status_path.clone();

    let job = run_job(config, vec![domain_input(&server, 10)]).await;
    let report = &job.reports.as_ref().unwrap()[0];

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report.report_path).unwrap()).unwrap();
    assert_eq!(saved["slug"], report.slug.as_str());
    assert_eq!(saved["pages"].as_array().unwrap().len(), 2);
    assert_eq!(saved["config"]["max_pages_effective"], 10);

    for (index, page) in report.pages.iter().enumerate() {
        let extracted = page.extracted_path.as_ref().unwrap();
        assert!(Path::new(extracted).exists());
        assert!(extracted.ends_with(&format!("{:04}_200.json", index)));
    }

    let persisted = FileJobStore::new(&status_path).current();
    assert_eq!(persisted, job);

    let simple = simple_report(&persisted).unwrap();
    assert_eq!(simple.len(), 2);
    assert_eq!(simple[0].url, format!("{}/", server.uri()));
}

#[tokio::test]
async fn test_status_is_idle_before_any_job() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let job = open_job_store(Path::new(&config.output.status_path)).current();

    assert_eq!(job.status, JobStatus::Idle);
    assert_eq!(job.job_id, "none");
    assert!(simple_report(&job).is_none());
}

#[tokio::test]
async fn test_domain_file_job_crawls_in_order() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    for server in [&first, &second] {
        mount_head_ok(server).await;
        mount_page(server, "/", links_page(&[])).await;
    }

    let dir = TempDir::new().unwrap();
    let list = dir.path().join("domains.json");
    std::fs::write(
        &list,
        format!(
            r#"{{"domains": [
                {{"domain": "{}", "slug": "first", "max_pages": 2}},
                {{"domain": ""}},
                {{"domain": "{}", "slug": "second"}}
            ]}}"#,
            first.uri(),
            second.uri()
        ),
    )
    .unwrap();

    let inputs = load_domain_inputs(&list).unwrap();
    assert_eq!(inputs.len(), 3);

    let config = create_test_config(&dir);
    let store = Arc::new(FileJobStore::new(&config.output.status_path));
    let runner = Arc::new(JobRunner::new(config, store.clone()).unwrap());

    let (pending, handle) = runner.spawn(inputs);
    assert_eq!(pending.status, JobStatus::Pending);

    let job = handle.await.unwrap();
    assert_eq!(job.status, JobStatus::Done);
    let slugs: Vec<&str> = job
        .reports
        .as_ref()
        .unwrap()
        .iter()
        .map(|r| r.slug.as_str())
        .collect();
    assert_eq!(slugs, vec!["first", "second"]);
    assert!(dir.path().join("reports/first_report.json").exists());
    assert!(dir.path().join("reports/second_report.json").exists());
    assert_eq!(store.current().status, JobStatus::Done);
}
