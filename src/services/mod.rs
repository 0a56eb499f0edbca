//! Business logic services

pub mod aggregator;
pub mod auth;
pub mod browse;
pub mod profile;
pub mod reviews;
pub mod shelf;

use std::sync::Arc;

use crate::{backend::Backend, catalog::CatalogFetch, config::AppConfig};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub profile: profile::ProfileService,
    pub shelf: shelf::ShelfService,
    pub browse: browse::BrowseService,
    pub aggregator: aggregator::BookDetailAggregator,
    pub reviews: reviews::ReviewService,
}

impl Services {
    /// Create all services over the given catalog and backend handles
    pub fn new(catalog: Arc<dyn CatalogFetch>, backend: Backend, config: &AppConfig) -> Self {
        let sessions = auth::SessionStore::default();
        let aggregator = aggregator::BookDetailAggregator::new(
            Arc::clone(&catalog),
            (&config.aggregator).into(),
        );
        Self {
            auth: auth::AuthService::new(
                backend.clone(),
                sessions.clone(),
                config.backend.clone(),
            ),
            profile: profile::ProfileService::new(
                backend.clone(),
                sessions.clone(),
                config.backend.clone(),
            ),
            shelf: shelf::ShelfService::new(
                backend,
                sessions,
                config.backend.clone(),
                aggregator.clone(),
            ),
            browse: browse::BrowseService::new(catalog, config.browse.clone()),
            aggregator,
            reviews: reviews::ReviewService,
        }
    }
}
