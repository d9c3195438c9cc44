//! Attachment resolution
//!
//! For every distinct media URL in a document: download it, fix it up, store
//! it at a path derived from the URL and rewrite the document to point at
//! the stored copy. Resolutions for different URLs run concurrently; the
//! same URL is only ever resolved once per run.

use super::scanner::AttachmentScanner;
use super::singleflight::ResolutionCache;
use crate::adapters::fetch::AttachmentFetcher;
use crate::config::MirrorConfig;
use crate::core::hashing::url_content_hash;
use crate::core::media::{detect_extension, MediaTransformer};
use crate::core::store::StoreClient;
use crate::domain::{Asset, AttachmentReference, MirrorError, Result};
use crate::log_asset_published;
use futures::future::try_join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Where assets go and how their public locations are formed
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// URLs under this prefix are already replicated and are left alone
    pub namespace: String,

    /// Prefix of the locations written into documents
    pub location_base: String,

    /// Directory inside the store
    pub directory: String,

    pub transformer: MediaTransformer,
}

impl ResolverSettings {
    /// Derives settings from configuration
    ///
    /// Dry runs point locations at the local output directory (`./{path}`)
    /// while still recognising the public namespace.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the asset repository or directory
    /// is missing.
    pub fn from_config(config: &MirrorConfig) -> Result<Self> {
        let assets = &config.assets;
        let namespace = assets.public_base().ok_or_else(|| {
            MirrorError::Configuration(
                "assets.repository or assets.public_base_url is required to replicate attachments"
                    .to_string(),
            )
        })?;
        let directory = assets
            .directory
            .as_deref()
            .map(|d| d.trim_matches('/').to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                MirrorError::Configuration(
                    "assets.directory is required to replicate attachments".to_string(),
                )
            })?;

        let location_base = if config.application.dry_run {
            ".".to_string()
        } else {
            namespace.clone()
        };

        Ok(Self {
            namespace,
            location_base,
            directory,
            transformer: MediaTransformer::from_config(assets),
        })
    }

    /// Public location of a store path
    pub fn location_of(&self, path: &str) -> String {
        format!("{}/{}", self.location_base.trim_end_matches('/'), path)
    }
}

/// Running totals for the run summary
#[derive(Debug, Default)]
struct ResolverStats {
    fetched: AtomicUsize,
    published: AtomicUsize,
    reused: AtomicUsize,
    skipped: AtomicUsize,
}

/// Snapshot of [`AttachmentResolver`] activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverCounts {
    /// Attachments downloaded
    pub fetched: usize,
    /// New objects written to the store
    pub published: usize,
    /// Attachments whose object already existed
    pub reused: usize,
    /// URLs already inside the asset namespace
    pub skipped: usize,
}

/// Rewrites media URLs to replicated copies
pub struct AttachmentResolver {
    scanner: AttachmentScanner,
    cache: Arc<ResolutionCache>,
    fetcher: Arc<dyn AttachmentFetcher>,
    store: StoreClient,
    settings: ResolverSettings,
    stats: ResolverStats,
}

impl AttachmentResolver {
    pub fn new(
        settings: ResolverSettings,
        fetcher: Arc<dyn AttachmentFetcher>,
        store: StoreClient,
        cache: Arc<ResolutionCache>,
    ) -> Result<Self> {
        Ok(Self {
            scanner: AttachmentScanner::new()?,
            cache,
            fetcher,
            store,
            settings,
            stats: ResolverStats::default(),
        })
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn counts(&self) -> ResolverCounts {
        ResolverCounts {
            fetched: self.stats.fetched.load(Ordering::Relaxed),
            published: self.stats.published.load(Ordering::Relaxed),
            reused: self.stats.reused.load(Ordering::Relaxed),
            skipped: self.stats.skipped.load(Ordering::Relaxed),
        }
    }

    /// Replaces every media URL in `text` with its resolved location
    ///
    /// All distinct URLs are resolved before any replacement happens. Each
    /// URL is then replaced everywhere it occurs in the text, including
    /// occurrences outside the media reference that found it.
    ///
    /// # Errors
    ///
    /// The first failed resolution fails the whole document.
    pub async fn resolve_all(&self, text: &str) -> Result<String> {
        let references = self.resolve_references(text).await?;

        let mut rewritten = text.to_string();
        for reference in &references {
            if reference.original_url != reference.resolved_location {
                rewritten = rewritten.replace(&reference.original_url, &reference.resolved_location);
            }
        }
        Ok(rewritten)
    }

    /// Resolves every distinct media URL in `text` without rewriting it
    pub async fn resolve_references(&self, text: &str) -> Result<Vec<AttachmentReference>> {
        let urls = self.scanner.distinct_urls(text)?;
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = urls.len(), "Resolving attachments");

        let resolutions = urls.into_iter().map(|url| async move {
            let resolved_location = self.resolve(&url).await?;
            Ok::<_, MirrorError>(AttachmentReference {
                original_url: url,
                resolved_location,
            })
        });
        try_join_all(resolutions).await
    }

    /// Resolves one URL through the shared cache
    pub async fn resolve(&self, url: &str) -> Result<String> {
        self.cache
            .get_or_resolve(url, || self.resolve_uncached(url))
            .await
    }

    async fn resolve_uncached(&self, url: &str) -> Result<String> {
        if url.starts_with(&self.settings.namespace) {
            tracing::debug!(url = %url, "Attachment already replicated");
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(url.to_string());
        }

        let bytes = self.fetcher.fetch(url).await?;
        self.stats.fetched.fetch_add(1, Ordering::Relaxed);

        let content_hash = url_content_hash(url);
        let extension = detect_extension(&bytes);
        let path = Asset::path_for(&self.settings.directory, &content_hash, &extension);
        if self.store.exists(&path).await.is_some() {
            return Ok(self.reuse(url, &path));
        }

        let transformer = self.settings.transformer;
        let transformed = tokio::task::spawn_blocking(move || transformer.process(bytes))
            .await
            .map_err(|e| MirrorError::Media(format!("Transform task for {url} failed: {e}")))??;

        let extension = detect_extension(&transformed);
        let asset = Asset {
            path: Asset::path_for(&self.settings.directory, &content_hash, &extension),
            bytes: transformed,
            extension,
            content_hash,
        };

        // A format change moves the object, and that path may already be taken
        if asset.path != path && self.store.exists(&asset.path).await.is_some() {
            return Ok(self.reuse(url, &asset.path));
        }

        self.store
            .publish(&asset.path, &asset.bytes, &format!("Add {}", asset.path), None)
            .await?;
        self.stats.published.fetch_add(1, Ordering::Relaxed);

        let location = self.settings.location_of(&asset.path);
        log_asset_published!(asset.path, asset.bytes.len(), location);
        Ok(location)
    }

    fn reuse(&self, url: &str, path: &str) -> String {
        self.stats.reused.fetch_add(1, Ordering::Relaxed);
        let location = self.settings.location_of(path);
        tracing::info!(url = %url, location = %location, "Asset already published");
        location
    }
}
