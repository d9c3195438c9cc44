//! Integration tests for attachment replication
//!
//! The store is an in-memory fake that counts writes; attachments are served
//! either by a counting fake fetcher or by a mockito server.

use async_trait::async_trait;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageBuffer, Rgb};
use issue_mirror::adapters::fetch::{AttachmentFetcher, HttpFetcher};
use issue_mirror::adapters::store::{LocalDirStore, ObjectStore, StoredObject};
use issue_mirror::config::GitHubConfig;
use issue_mirror::core::attachments::{AttachmentResolver, ResolutionCache, ResolverSettings};
use issue_mirror::core::hashing::url_content_hash;
use issue_mirror::core::media::MediaTransformer;
use issue_mirror::core::store::StoreClient;
use issue_mirror::domain::{MirrorError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const NAMESPACE: &str = "https://owner.github.io/repo";

/// Smallest buffer the type sniffer recognises as PNG
const TINY_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0";

fn tiny_webp() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(8, 8, |x, y| {
        Rgb([(x * 30) as u8, (y * 30) as u8, 128])
    }));
    let mut bytes = Vec::new();
    image
        .write_with_encoder(WebPEncoder::new_lossless(&mut bytes))
        .unwrap();
    bytes
}

#[derive(Default)]
struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    fn seeded(path: &str, bytes: &[u8]) -> Self {
        let store = Self::default();
        store
            .objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        store
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(path)
            .map(|bytes| StoredObject {
                path: path.to_string(),
                revision: format!("rev-{}", bytes.len()),
                bytes: Some(bytes.clone()),
            }))
    }

    async fn create_or_update(
        &self,
        path: &str,
        bytes: &[u8],
        _message: &str,
        _base_revision: Option<&str>,
    ) -> Result<String> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(format!("rev-{}", bytes.len()))
    }

    async fn is_archived(&self) -> Result<bool> {
        Ok(false)
    }
}

struct CountingFetcher {
    body: Vec<u8>,
    calls: AtomicUsize,
}

impl CountingFetcher {
    fn new(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttachmentFetcher for CountingFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.body.clone())
    }
}

fn settings(location_base: &str) -> ResolverSettings {
    ResolverSettings {
        namespace: NAMESPACE.to_string(),
        location_base: location_base.to_string(),
        directory: "assets".to_string(),
        transformer: MediaTransformer::default(),
    }
}

fn resolver(
    fetcher: Arc<dyn AttachmentFetcher>,
    store: Arc<dyn ObjectStore>,
) -> AttachmentResolver {
    resolver_with(MediaTransformer::default(), fetcher, store)
}

fn resolver_with(
    transformer: MediaTransformer,
    fetcher: Arc<dyn AttachmentFetcher>,
    store: Arc<dyn ObjectStore>,
) -> AttachmentResolver {
    AttachmentResolver::new(
        ResolverSettings {
            transformer,
            ..settings(NAMESPACE)
        },
        fetcher,
        StoreClient::new(store, 3),
        Arc::new(ResolutionCache::new()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_end_to_end_png_is_published_once() {
    let url = "https://h/a.png";
    let fetcher = Arc::new(CountingFetcher::new(TINY_PNG));
    let store = Arc::new(MemoryStore::default());
    let resolver = resolver(fetcher.clone(), store.clone());

    let text = resolver.resolve_all("see ![x](https://h/a.png)").await.unwrap();

    let expected = format!("{NAMESPACE}/assets/{}.png", url_content_hash(url));
    assert_eq!(text, format!("see ![x]({expected})"));
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(store.writes(), 1);
    assert!(store.contains(&format!("assets/{}.png", url_content_hash(url))));
}

#[tokio::test]
async fn test_duplicate_urls_are_fetched_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/img.png")
        .with_status(200)
        .with_body(TINY_PNG)
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/img.png", server.url());
    let fetcher = Arc::new(HttpFetcher::new(&GitHubConfig::default()).unwrap());
    let store = Arc::new(MemoryStore::default());
    let resolver = resolver(fetcher, store.clone());

    let text = format!(
        "![a]({url})\r\n![b]({url})\r\n<img src=\"{url}\" width=\"10\">\r\n![c]({url})"
    );
    let rewritten = resolver.resolve_all(&text).await.unwrap();

    mock.assert_async().await;
    let location = format!("{NAMESPACE}/assets/{}.png", url_content_hash(&url));
    assert_eq!(rewritten.matches(location.as_str()).count(), 4);
    assert!(!rewritten.contains(&url));
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_concurrent_documents_share_one_resolution() {
    let fetcher = Arc::new(CountingFetcher::new(TINY_PNG));
    let store = Arc::new(MemoryStore::default());
    let resolver = resolver(fetcher.clone(), store.clone());

    let body = "![x](https://h/shared.png)";
    let comment = "again ![y](https://h/shared.png) and ![z](https://h/other.png)";
    let (a, b) = tokio::join!(resolver.resolve_all(body), resolver.resolve_all(comment));

    let a = a.unwrap();
    let b = b.unwrap();
    let shared = format!("{NAMESPACE}/assets/{}.png", url_content_hash("https://h/shared.png"));
    assert!(a.contains(&shared));
    assert!(b.contains(&shared));
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(store.writes(), 2);
    assert_eq!(resolver.counts().published, 2);
}

#[tokio::test]
async fn test_existing_object_is_not_written_again() {
    let url = "https://h/seen.png";
    let path = format!("assets/{}.png", url_content_hash(url));
    let fetcher = Arc::new(CountingFetcher::new(TINY_PNG));
    let store = Arc::new(MemoryStore::seeded(&path, TINY_PNG));
    let resolver = resolver(fetcher, store.clone());

    let text = resolver.resolve_all("![x](https://h/seen.png)").await.unwrap();

    assert_eq!(text, format!("![x]({NAMESPACE}/{path})"));
    assert_eq!(store.writes(), 0);
    assert_eq!(resolver.counts().reused, 1);
}

#[tokio::test]
async fn test_urls_inside_namespace_are_left_alone() {
    let fetcher = Arc::new(CountingFetcher::new(TINY_PNG));
    let store = Arc::new(MemoryStore::default());
    let resolver = resolver(fetcher.clone(), store.clone());

    let text = format!("![x]({NAMESPACE}/assets/old.png)");
    let rewritten = resolver.resolve_all(&text).await.unwrap();

    assert_eq!(rewritten, text);
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(store.writes(), 0);
    assert_eq!(resolver.counts().skipped, 1);
}

#[tokio::test]
async fn test_code_and_excluded_images_are_ignored() {
    let fetcher = Arc::new(CountingFetcher::new(TINY_PNG));
    let store = Arc::new(MemoryStore::default());
    let resolver = resolver(fetcher.clone(), store);

    let text = "`![x](https://h/code.png)` <img src=\"https://h/skip.png\" exclude>";
    let rewritten = resolver.resolve_all(text).await.unwrap();

    assert_eq!(rewritten, text);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_fetch_failure_aborts_the_document() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/missing.png")
        .with_status(404)
        .create_async()
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&GitHubConfig::default()).unwrap());
    let store = Arc::new(MemoryStore::default());
    let resolver = resolver(fetcher, store.clone());

    let text = format!("![x]({}/missing.png)", server.url());
    let err = resolver.resolve_all(&text).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, MirrorError::Fetch(_)));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_dry_run_writes_to_local_directory() {
    let dir = TempDir::new().unwrap();
    let url = "https://h/local.png";
    let fetcher = Arc::new(CountingFetcher::new(TINY_PNG));
    let store: Arc<dyn ObjectStore> = Arc::new(LocalDirStore::new(dir.path()));
    let resolver = AttachmentResolver::new(
        settings("."),
        fetcher,
        StoreClient::new(store, 1),
        Arc::new(ResolutionCache::new()),
    )
    .unwrap();

    let text = resolver.resolve_all("![x](https://h/local.png)").await.unwrap();

    let path = format!("assets/{}.png", url_content_hash(url));
    assert_eq!(text, format!("![x](./{path})"));
    assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), TINY_PNG);
}

#[tokio::test]
async fn test_normalized_webp_is_published_as_jpeg() {
    let url = "https://h/photo.webp";
    let hash = url_content_hash(url);
    let fetcher = Arc::new(CountingFetcher::new(&tiny_webp()));
    let store = Arc::new(MemoryStore::default());
    let resolver = resolver_with(MediaTransformer::new(true, None), fetcher, store.clone());

    let text = resolver.resolve_all("![p](https://h/photo.webp)").await.unwrap();

    let path = format!("assets/{hash}.jpg");
    assert_eq!(text, format!("![p]({NAMESPACE}/{path})"));
    assert_eq!(store.writes(), 1);
    assert!(!store.contains(&format!("assets/{hash}.webp")));
    let stored = store.object(&path).unwrap();
    assert_eq!(&stored[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_normalized_webp_reuses_existing_jpeg() {
    let url = "https://h/photo.webp";
    let path = format!("assets/{}.jpg", url_content_hash(url));
    let fetcher = Arc::new(CountingFetcher::new(&tiny_webp()));
    let store = Arc::new(MemoryStore::seeded(&path, b"\xFF\xD8\xFF"));
    let resolver = resolver_with(
        MediaTransformer::new(true, None),
        fetcher.clone(),
        store.clone(),
    );

    let text = resolver.resolve_all("![p](https://h/photo.webp)").await.unwrap();

    assert_eq!(text, format!("![p]({NAMESPACE}/{path})"));
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(store.writes(), 0);
    assert_eq!(resolver.counts().reused, 1);
    assert_eq!(resolver.counts().published, 0);
}

