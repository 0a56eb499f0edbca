//! Subject browsing and search

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use tokio::task::JoinSet;

use crate::{
    catalog::CatalogFetch,
    config::BrowseConfig,
    error::AppResult,
    models::BookSummary,
};

/// Home screen payload: one row per subject plus a shuffled top shelf.
#[derive(Debug, Clone)]
pub struct HomeShelves {
    pub top: Vec<BookSummary>,
    /// Rows keyed by subject, in the configured subject order.
    pub rows: IndexMap<String, Vec<BookSummary>>,
}

#[derive(Clone)]
pub struct BrowseService {
    catalog: Arc<dyn CatalogFetch>,
    config: BrowseConfig,
}

impl BrowseService {
    pub fn new(catalog: Arc<dyn CatalogFetch>, config: BrowseConfig) -> Self {
        Self { catalog, config }
    }

    /// Fetch every configured subject at `limit`, join-barrier style.
    /// Subjects that fail to fetch drop out of the result with a warning.
    async fn sweep(&self, limit: usize) -> IndexMap<String, Vec<BookSummary>> {
        let mut in_flight = JoinSet::new();
        for subject in self.config.subjects.clone() {
            let catalog = Arc::clone(&self.catalog);
            in_flight.spawn(async move {
                match catalog.subject_works(&subject, limit).await {
                    Ok(works) => Some((subject, works)),
                    Err(e) => {
                        tracing::warn!("subject fetch failed for {}: {}", subject, e);
                        None
                    }
                }
            });
        }

        let mut by_subject: HashMap<String, Vec<BookSummary>> = HashMap::new();
        while let Some(joined) = in_flight.join_next().await {
            if let Ok(Some((subject, works))) = joined {
                by_subject.insert(subject, works);
            }
        }

        // Re-impose the configured subject order on the joined results.
        let mut rows = IndexMap::new();
        for subject in &self.config.subjects {
            if let Some(works) = by_subject.remove(subject) {
                rows.insert(subject.clone(), works);
            }
        }
        rows
    }

    /// Per-subject rows at the home limit plus a shuffled top shelf.
    pub async fn home(&self) -> HomeShelves {
        let rows = self.sweep(self.config.home_limit).await;
        let mut top: Vec<BookSummary> = rows.values().flatten().cloned().collect();
        top.shuffle(&mut rand::thread_rng());
        top.truncate(self.config.home_limit);
        HomeShelves { top, rows }
    }

    /// Every configured subject at the browse limit, shuffled together.
    pub async fn all_books(&self) -> Vec<BookSummary> {
        let rows = self.sweep(self.config.browse_limit).await;
        let mut books: Vec<BookSummary> = rows.into_values().flatten().collect();
        books.shuffle(&mut rand::thread_rng());
        books
    }

    /// Case-insensitive title filter over the full sweep. An empty query
    /// returns everything.
    pub async fn search(&self, query: &str) -> Vec<BookSummary> {
        let books = self.all_books().await;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return books;
        }
        books
            .into_iter()
            .filter(|book| book.title.to_lowercase().contains(&query))
            .collect()
    }

    /// One subject at the browse limit.
    pub async fn category(&self, subject: &str) -> AppResult<Vec<BookSummary>> {
        self.catalog
            .subject_works(subject, self.config.browse_limit)
            .await
    }
}
