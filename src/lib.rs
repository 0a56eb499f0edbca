//! Lectern library-browsing client
//!
//! Catalog browsing and search over a public book-catalog API, a bounded
//! fan-out book-detail aggregator, and session, profile and shelf operations
//! against a hosted auth+document-store backend. View and navigation code
//! lives in the consuming application.

use std::sync::Arc;

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state handed to the consuming UI layer
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire the HTTP clients and services from a loaded configuration.
    pub fn initialize(config: AppConfig) -> AppResult<Self> {
        let catalog = catalog::CatalogClient::new(&config.catalog, &config.http)?;
        let hosted = backend::http::HostedBackend::new(&config.backend, &config.http)?;
        let backend = backend::Backend {
            auth: Arc::new(hosted.clone()),
            documents: Arc::new(hosted.clone()),
            storage: Arc::new(hosted),
        };
        let services = services::Services::new(Arc::new(catalog), backend, &config);

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
