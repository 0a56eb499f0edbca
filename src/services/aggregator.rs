//! Book-detail aggregation
//!
//! Resolves a batch of work keys into best-effort detail records. All
//! primary fetches run concurrently under an in-flight cap and the call
//! returns only once every one of them has settled; author names and cover
//! images are fetched opportunistically afterwards and arrive on a patch
//! stream so they never hold the batch up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use crate::{
    catalog::CatalogFetch,
    config::AggregatorConfig,
    models::{
        book::{PatchChange, WorkPayload},
        BookDetailRecord, CoverSize, RecordPatch, WorkKey,
    },
};

/// Tunables for one aggregator instance.
#[derive(Debug, Clone)]
pub struct AggregatorPolicy {
    /// Upper bound on simultaneous primary fetches.
    pub max_in_flight: usize,
    /// Per-fetch deadline. `None` waits indefinitely, which lets a single
    /// hung connection hold the whole batch open.
    pub fetch_timeout: Option<Duration>,
}

impl Default for AggregatorPolicy {
    fn default() -> Self {
        Self {
            max_in_flight: 12,
            fetch_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl From<&AggregatorConfig> for AggregatorPolicy {
    fn from(config: &AggregatorConfig) -> Self {
        Self {
            max_in_flight: config.max_in_flight.max(1),
            fetch_timeout: config.fetch_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Outcome of one [`BookDetailAggregator::resolve`] call.
pub struct ResolvedBatch {
    /// One record per key whose primary fetch succeeded, in completion
    /// order. Sort by [`BookDetailRecord::ordinal`] for input order.
    pub records: Vec<BookDetailRecord>,
    /// Late author-name and cover-image updates for those records. The
    /// stream ends once every secondary fetch has settled.
    pub patches: UnboundedReceiverStream<RecordPatch>,
}

impl ResolvedBatch {
    /// Drain the patch stream, folding every late update into the records.
    /// A hung secondary fetch holds this open (not `resolve`).
    pub async fn into_settled(mut self) -> Vec<BookDetailRecord> {
        while let Some(patch) = self.patches.next().await {
            patch.apply_to(&mut self.records);
        }
        self.records
    }
}

/// Fan-out resolver for book detail records.
#[derive(Clone)]
pub struct BookDetailAggregator {
    catalog: Arc<dyn CatalogFetch>,
    policy: AggregatorPolicy,
}

impl BookDetailAggregator {
    pub fn new(catalog: Arc<dyn CatalogFetch>, policy: AggregatorPolicy) -> Self {
        Self { catalog, policy }
    }

    /// Resolve `keys` into best-effort records.
    ///
    /// Every failure mode of a primary fetch (bad key, transport error,
    /// non-success status, undecodable body) settles as an omission; the
    /// batch still waits for it. Keys are not deduplicated.
    pub async fn resolve(&self, keys: Vec<WorkKey>) -> ResolvedBatch {
        let (patch_tx, patch_rx) = mpsc::unbounded_channel();
        let patches = UnboundedReceiverStream::new(patch_rx);

        if keys.is_empty() {
            return ResolvedBatch {
                records: Vec::new(),
                patches,
            };
        }

        let total = keys.len();
        let semaphore = Arc::new(Semaphore::new(self.policy.max_in_flight));
        let mut in_flight = JoinSet::new();

        for (ordinal, key) in keys.into_iter().enumerate() {
            let catalog = Arc::clone(&self.catalog);
            let semaphore = Arc::clone(&semaphore);
            let patch_tx = patch_tx.clone();
            let timeout = self.policy.fetch_timeout;
            in_flight.spawn(async move {
                // The semaphore is never closed while tasks hold it.
                let _permit = semaphore.acquire_owned().await.ok()?;
                let payload = fetch_primary(catalog.as_ref(), &key, timeout).await?;
                spawn_secondary(catalog, &payload, ordinal, key.clone(), patch_tx);
                Some(payload.into_record(ordinal, key))
            });
        }
        drop(patch_tx);

        let mut records = Vec::with_capacity(total);
        while let Some(settled) = in_flight.join_next().await {
            match settled {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!("primary fetch task panicked: {}", e),
            }
        }
        tracing::debug!(resolved = records.len(), total, "detail batch settled");

        ResolvedBatch { records, patches }
    }
}

async fn fetch_primary(
    catalog: &dyn CatalogFetch,
    key: &WorkKey,
    timeout: Option<Duration>,
) -> Option<WorkPayload> {
    let fetched = match timeout {
        Some(deadline) => match tokio::time::timeout(deadline, catalog.work(key)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("work fetch timed out for {}", key);
                return None;
            }
        },
        None => catalog.work(key).await,
    };
    match fetched {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!("work fetch failed for {}: {}", key, e);
            None
        }
    }
}

/// Fire the author-name and cover-image fetches for a decoded primary.
/// Detached on purpose: the join barrier must not wait on them.
fn spawn_secondary(
    catalog: Arc<dyn CatalogFetch>,
    payload: &WorkPayload,
    ordinal: usize,
    key: WorkKey,
    patch_tx: mpsc::UnboundedSender<RecordPatch>,
) {
    if let Some(author_id) = payload.first_author_id() {
        let catalog = Arc::clone(&catalog);
        let key = key.clone();
        let patch_tx = patch_tx.clone();
        tokio::spawn(async move {
            match catalog.author_name(&author_id).await {
                Ok(name) => {
                    let _ = patch_tx.send(RecordPatch {
                        ordinal,
                        key,
                        change: PatchChange::AuthorName(name),
                    });
                }
                Err(e) => tracing::debug!("author fetch failed for {}: {}", author_id, e),
            }
        });
    }

    if let Some(cover_id) = payload.first_cover_id() {
        tokio::spawn(async move {
            match catalog.cover(cover_id, CoverSize::Medium).await {
                Ok(bytes) => {
                    let _ = patch_tx.send(RecordPatch {
                        ordinal,
                        key,
                        change: PatchChange::CoverImage(bytes),
                    });
                }
                Err(e) => tracing::debug!("cover fetch failed for {}: {}", cover_id, e),
            }
        });
    }
}
