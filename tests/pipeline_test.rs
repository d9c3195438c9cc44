//! End-to-end tests for a publish run
//!
//! GitHub and attachment hosts are mockito servers; dry runs write assets to
//! a temporary directory.

use issue_mirror::config::{secret_string, MirrorConfig, PublishMode};
use issue_mirror::core::hashing::url_content_hash;
use issue_mirror::core::pipeline::{IssueSnapshot, PublishCoordinator, PublishOutcome};
use issue_mirror::domain::SourceDocument;
use mockito::{Matcher, Server};
use serde_json::json;
use tempfile::TempDir;

const TINY_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0";

fn dry_run_config(output: &TempDir) -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.application.dry_run = true;
    config.source.repository = Some("octo/notes".parse().unwrap());
    config.source.issue_number = Some(7);
    config.redaction.start_marker = Some("<private>".to_string());
    config.redaction.end_marker = Some("</private>".to_string());
    config.redaction.hash_rounds = 10;
    config.assets.enabled = true;
    config.assets.repository = Some("owner/repo".parse().unwrap());
    config.assets.directory = Some("assets".to_string());
    config.assets.local_output_dir = output.path().to_string_lossy().into_owned();
    config
}

fn live_config(server: &Server) -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.github.api_base_url = server.url();
    config.github.token = Some(secret_string("ghp_test".to_string()));
    config.source.repository = Some("octo/notes".parse().unwrap());
    config.source.issue_number = Some(7);
    config.redaction.start_marker = Some("<private>".to_string());
    config.redaction.end_marker = Some("</private>".to_string());
    config.redaction.hash_rounds = 10;
    config.publish.mode = PublishMode::File;
    config.publish.repository = Some("octo/site".parse().unwrap());
    config.publish.path = Some("notes/7.md".to_string());
    config.committer.name = Some("Mirror Bot".to_string());
    config.committer.email = Some("bot@example.com".to_string());
    config
}

fn snapshot(documents: Vec<SourceDocument>) -> IssueSnapshot {
    IssueSnapshot {
        repository: "octo/notes".parse().unwrap(),
        number: 7,
        title: "Notes".to_string(),
        html_url: None,
        documents,
    }
}

async fn mock_source_issue(server: &mut Server, body: &str) {
    server
        .mock("GET", "/repos/octo/notes/issues/7")
        .with_status(200)
        .with_body(
            json!({
                "number": 7,
                "title": "Notes",
                "body": body,
                "created_at": "2024-05-01T08:00:00Z",
                "html_url": "https://github.com/octo/notes/issues/7"
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octo/notes/issues/7/comments")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([{ "id": 1, "body": "Reply", "created_at": "2024-05-02T08:00:00Z" }]).to_string(),
        )
        .create_async()
        .await;
}

#[tokio::test]
async fn test_dry_run_replicates_to_local_directory() {
    let output = TempDir::new().unwrap();
    let mut attachments = Server::new_async().await;
    let fetch = attachments
        .mock("GET", "/pic.png")
        .with_status(200)
        .with_body(TINY_PNG)
        .expect(1)
        .create_async()
        .await;
    let url = format!("{}/pic.png", attachments.url());

    let coordinator = PublishCoordinator::new(dry_run_config(&output)).unwrap();
    let summary = coordinator
        .process_snapshot(snapshot(vec![
            SourceDocument::issue_body(format!("![x]({url}) <private>secret</private>")),
            SourceDocument::comment(format!("same picture ![y]({url})"), None),
        ]))
        .await
        .unwrap();

    fetch.assert_async().await;
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.private_spans, 1);
    assert_eq!(summary.attachments.fetched, 1);
    assert_eq!(summary.attachments.published, 1);
    assert!(summary.references_published);
    assert_eq!(summary.outcome, Some(PublishOutcome::Printed));

    let asset = output
        .path()
        .join(format!("assets/{}.png", url_content_hash(&url)));
    assert_eq!(std::fs::read(asset).unwrap(), TINY_PNG);
}

#[tokio::test]
async fn test_dry_run_skips_empty_document() {
    let output = TempDir::new().unwrap();
    let mut config = dry_run_config(&output);
    config.publish.skip_if_empty = true;
    config.publish.skip_body = true;

    let coordinator = PublishCoordinator::new(config).unwrap();
    let summary = coordinator
        .process_snapshot(snapshot(vec![SourceDocument::issue_body("only a body")]))
        .await
        .unwrap();

    assert!(summary.is_skipped());
    assert_eq!(summary.documents, 0);
}

#[tokio::test]
async fn test_live_run_posts_references_then_commits() {
    let mut server = Server::new_async().await;
    mock_source_issue(&mut server, "Hello <private>secret</private>").await;

    let mut config = live_config(&server);
    config.redaction.reference_repository = Some("octo/private".parse().unwrap());
    config.redaction.reference_issue_number = Some(1);

    let references = server
        .mock("POST", "/repos/octo/private/issues/1/comments")
        .match_body(Matcher::Regex(r"\| `\[\^pvt_[0-9a-f]{7}\]` \| secret \|".to_string()))
        .with_status(201)
        .with_body(json!({ "id": 10 }).to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octo/site/contents/notes/7.md")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octo/site")
        .with_status(200)
        .with_body(json!({ "full_name": "octo/site", "archived": false }).to_string())
        .create_async()
        .await;
    let commit = server
        .mock("PUT", "/repos/octo/site/contents/notes/7.md")
        .match_body(Matcher::PartialJson(json!({ "message": "Add notes/7.md" })))
        .with_status(201)
        .with_body(json!({ "content": { "sha": "blob-7", "path": "notes/7.md" } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let summary = PublishCoordinator::new(config)
        .unwrap()
        .execute()
        .await
        .unwrap();

    references.assert_async().await;
    commit.assert_async().await;
    assert_eq!(summary.private_spans, 1);
    assert_eq!(
        summary.outcome,
        Some(PublishOutcome::Committed {
            path: "notes/7.md".to_string(),
            revision: "blob-7".to_string(),
        })
    );
}

#[tokio::test]
async fn test_spans_without_reference_issue_publish_nothing() {
    let mut server = Server::new_async().await;
    mock_source_issue(&mut server, "Hello <private>secret</private>").await;

    let comment = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let commit = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = PublishCoordinator::new(live_config(&server))
        .unwrap()
        .execute()
        .await
        .unwrap_err();

    comment.assert_async().await;
    commit.assert_async().await;
    assert!(err.is_configuration());
}
