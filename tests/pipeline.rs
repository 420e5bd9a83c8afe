use arxiv_sitebot::arxiv::{ArxivClient, FetchOptions};
use arxiv_sitebot::dedup::RecencyWindow;
use arxiv_sitebot::pipeline::{run, SitePaths, SyncOptions};
use arxiv_sitebot::summarizer::{LlmConfig, Summarizer};
use arxiv_sitebot::SiteBotError;
use chrono::{DateTime, TimeZone, Utc};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=au:Doe_J</title>
  <entry>
    <id>http://arxiv.org/abs/2506.01234v1</id>
    <published>2025-06-14T08:00:00Z</published>
    <title>Scalable Flow Matching for Graphs</title>
    <summary>We make flow matching scale to large graphs.</summary>
    <author><name>Jane Q. Doe</name></author>
    <author><name>John Roe</name></author>
    <link href="http://arxiv.org/abs/2506.01234v1" rel="alternate" type="text/html"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00042v2</id>
    <published>2024-01-05T08:00:00Z</published>
    <title>An Older Result</title>
    <summary>Old news.</summary>
    <author><name>Jane Q. Doe</name></author>
    <link href="http://arxiv.org/abs/2401.00042v2" rel="alternate" type="text/html"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="stat.ML" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn options(dir: &Path, dry_run: bool) -> SyncOptions {
    SyncOptions {
        fetch: FetchOptions::new("au:Doe_J"),
        window: RecencyWindow::default(),
        dry_run,
        paths: SitePaths {
            bibliography: dir.join("_bibliography").join("papers.bib"),
            seen: dir.join("_data").join("arxiv_seen.json"),
            news_dir: dir.join("_news"),
            blog_dir: dir.join("_posts"),
        },
    }
}

fn completion(content: &serde_json::Value) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content.to_string()}}],
        "usage": {"prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200}
    })
    .to_string()
}

async fn arxiv_mock(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("GET", "/api/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search_query".into(), "au:Doe_J".into()),
            Matcher::UrlEncoded("sortBy".into(), "submittedDate".into()),
            Matcher::UrlEncoded("sortOrder".into(), "descending".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(FEED)
        .expect(hits)
        .create_async()
        .await
}

fn clients(server: &ServerGuard) -> (ArxivClient, Summarizer) {
    let arxiv = ArxivClient::with_base(&format!("{}/api/query", server.url()))
        .expect("arxiv client");
    let mut config = LlmConfig::new("test-key");
    config.base_url = server.url();
    let summarizer = Summarizer::new(config).expect("llm client");
    (arxiv, summarizer)
}

#[tokio::test]
async fn test_full_sync_then_idle_rerun() {
    let dir = TempDir::new().expect("temp dir");
    let mut server = Server::new_async().await;
    let feed = arxiv_mock(&mut server, 2).await;
    let llm = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "response_format": {"type": "json_object"}
        })))
        .with_status(200)
        .with_body(completion(&json!({
            "news_title": "Flow matching goes big",
            "news_body": "Our new paper scales flow matching to graphs.",
            "blog_title": "Scaling Flow Matching: Why Graphs?",
            "blog_body": "Graphs are everywhere.\n\nHere is how we did it."
        })))
        .expect(1)
        .create_async()
        .await;

    let (arxiv, summarizer) = clients(&server);
    let opts = options(dir.path(), false);

    let first = run(&arxiv, Some(&summarizer), &opts, now())
        .await
        .expect("first run");
    assert_eq!(first.fetched, 2);
    assert_eq!(first.cited, vec!["2506.01234v1", "2401.00042v2"]);
    assert_eq!(first.announced, vec!["2506.01234v1"]);
    assert!(first.seen_updated);
    assert_eq!(first.usage.total_tokens, 200);
    // bibliography + news + blog
    assert_eq!(first.files_written.len(), 3);

    let bib = std::fs::read_to_string(&opts.paths.bibliography).expect("bib written");
    assert!(bib.contains("@article{doe2025scalableflowmatching,"));
    assert!(bib.contains("@article{doe2024anolderresult,"));
    assert!(bib.contains("author = {Jane Q. Doe and John Roe}"));

    let news = std::fs::read_to_string(
        dir.path().join("_news").join("2025-06-14-flow-matching-goes-big.md"),
    )
    .expect("news written");
    assert!(news.starts_with("---\nlayout: \"post\"\ntitle: \"Flow matching goes big\"\n"));
    assert!(news.contains("tags: [paper]\ncategory: \"news\"\n"));
    assert!(news.contains("link: \"https://arxiv.org/abs/2506.01234v1\"\n"));
    assert!(bib.contains("url = {https://arxiv.org/abs/2506.01234v1}"));

    let blog = std::fs::read_to_string(
        dir.path()
            .join("_posts")
            .join("2025-06-14-scaling-flow-matching-why-graphs.md"),
    )
    .expect("blog written");
    assert!(blog.contains("categories: [research]\n"));

    let seen = std::fs::read_to_string(&opts.paths.seen).expect("seen written");
    let ids: Vec<String> = serde_json::from_str(&seen).expect("seen json");
    assert_eq!(ids, vec!["2506.01234v1"]);

    let second = run(&arxiv, Some(&summarizer), &opts, now())
        .await
        .expect("second run");
    assert!(second.cited.is_empty());
    assert!(second.announced.is_empty());
    assert!(second.files_written.is_empty());
    assert!(!second.seen_updated);
    assert_eq!(
        std::fs::read_to_string(&opts.paths.bibliography).expect("bib"),
        bib
    );

    feed.assert_async().await;
    llm.assert_async().await;
}

#[tokio::test]
async fn test_malformed_summary_keeps_citations() {
    let dir = TempDir::new().expect("temp dir");
    let mut server = Server::new_async().await;
    let _feed = arxiv_mock(&mut server, 1).await;
    let _llm = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(&json!({
            "news_title": "Only a title"
        })))
        .create_async()
        .await;

    let (arxiv, summarizer) = clients(&server);
    let opts = options(dir.path(), false);

    let err = run(&arxiv, Some(&summarizer), &opts, now())
        .await
        .expect_err("summary should be rejected");
    assert!(matches!(err, SiteBotError::MalformedSummary { ref id, .. } if id == "2506.01234v1"));

    let bib = std::fs::read_to_string(&opts.paths.bibliography).expect("bib written");
    assert!(bib.contains("2506.01234v1"));
    assert!(!opts.paths.seen.exists());
    assert!(!dir.path().join("_news").exists());
}

#[tokio::test]
async fn test_arxiv_error_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let mut server = Server::new_async().await;
    let _feed = server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let (arxiv, summarizer) = clients(&server);
    let opts = options(dir.path(), false);

    let err = run(&arxiv, Some(&summarizer), &opts, now())
        .await
        .expect_err("503 should abort");
    assert!(matches!(err, SiteBotError::Api { code: 503, .. }));
    assert!(!opts.paths.bibliography.exists());
}

#[tokio::test]
async fn test_without_llm_defers_announcements() {
    let dir = TempDir::new().expect("temp dir");
    let mut server = Server::new_async().await;
    let _feed = arxiv_mock(&mut server, 1).await;

    let (arxiv, _) = clients(&server);
    let opts = options(dir.path(), false);

    let summary = run(&arxiv, None, &opts, now()).await.expect("run");
    assert_eq!(summary.cited.len(), 2);
    assert_eq!(summary.deferred, vec!["2506.01234v1"]);
    assert!(summary.announced.is_empty());
    assert!(!summary.seen_updated);
    assert!(opts.paths.bibliography.exists());
    assert!(!opts.paths.seen.exists());
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let mut server = Server::new_async().await;
    let _feed = arxiv_mock(&mut server, 1).await;
    let llm = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let (arxiv, summarizer) = clients(&server);
    let opts = options(dir.path(), true);

    let summary = run(&arxiv, Some(&summarizer), &opts, now())
        .await
        .expect("dry run");
    assert_eq!(summary.cited.len(), 2);
    assert_eq!(summary.announced, vec!["2506.01234v1"]);
    assert!(summary.files_written.is_empty());
    assert!(summary.to_string().starts_with("[dry run] Fetched 2 papers"));
    assert!(!opts.paths.bibliography.exists());
    assert!(!opts.paths.seen.exists());

    llm.assert_async().await;
}
