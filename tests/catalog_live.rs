//! Live catalog integration tests
//!
//! These hit the public catalog API and are ignored by default.
//! Run with: cargo test -- --ignored

use std::sync::Arc;

use lectern_client::catalog::{CatalogClient, CatalogFetch};
use lectern_client::config::{CatalogConfig, HttpConfig};
use lectern_client::models::{CoverSize, WorkKey};
use lectern_client::services::aggregator::{AggregatorPolicy, BookDetailAggregator};

fn client() -> CatalogClient {
    CatalogClient::new(&CatalogConfig::default(), &HttpConfig::default())
        .expect("Failed to build catalog client")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_subject_listing() {
    let works = client()
        .subject_works("fiction", 10)
        .await
        .expect("Failed to fetch subject listing");

    assert!(!works.is_empty());
    assert!(works.len() <= 10);
    assert!(works.iter().all(|w| w.key.as_str().starts_with("/works/")));
}

#[tokio::test]
#[ignore]
async fn test_work_detail() -> anyhow::Result<()> {
    let payload = client().work(&WorkKey::from("/works/OL45883W")).await?;

    assert!(payload.title.is_some());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_author_name() -> anyhow::Result<()> {
    let name = client().author_name("OL23919A").await?;

    assert!(!name.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_cover_bytes() -> anyhow::Result<()> {
    let bytes = client().cover(8739161, CoverSize::Medium).await?;

    assert!(!bytes.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_aggregator_against_live_catalog() {
    let aggregator =
        BookDetailAggregator::new(Arc::new(client()), AggregatorPolicy::default());

    let keys = vec![
        WorkKey::from("/works/OL45883W"),
        WorkKey::from("/works/OL27448W"),
        WorkKey::from("/works/definitely-not-a-work"),
    ];
    let batch = aggregator.resolve(keys).await;

    // The bogus key settles as an omission; the real ones resolve.
    assert_eq!(batch.records.len(), 2);
    assert!(batch.records.iter().all(|r| !r.title.is_empty()));
}
