//! Bookmark and loaned-book shelves
//!
//! Both shelves are array fields on the caller's user document; listing one
//! reads the array and hands the keys to the detail aggregator.

use crate::{
    backend::Backend,
    config::BackendConfig,
    error::AppResult,
    models::{UserProfile, WorkKey},
    services::{
        aggregator::{BookDetailAggregator, ResolvedBatch},
        auth::SessionStore,
    },
};

const BOOKMARKS_FIELD: &str = "bookmarks";
const LOANS_FIELD: &str = "loanedBooks";

#[derive(Clone)]
pub struct ShelfService {
    backend: Backend,
    sessions: SessionStore,
    config: BackendConfig,
    aggregator: BookDetailAggregator,
}

impl ShelfService {
    pub fn new(
        backend: Backend,
        sessions: SessionStore,
        config: BackendConfig,
        aggregator: BookDetailAggregator,
    ) -> Self {
        Self {
            backend,
            sessions,
            config,
            aggregator,
        }
    }

    async fn shelf_keys(&self, field: &str) -> AppResult<Vec<WorkKey>> {
        let session = self.sessions.current().await?;
        let document = self
            .backend
            .documents
            .get(&session, &self.config.user_collection, &session.uid)
            .await?;
        let profile: UserProfile = serde_json::from_value(document)?;
        let keys = match field {
            BOOKMARKS_FIELD => profile.bookmarks,
            _ => profile.loaned_books,
        };
        Ok(keys.into_iter().map(WorkKey::from).collect())
    }

    async fn add(&self, field: &str, key: &WorkKey) -> AppResult<()> {
        let session = self.sessions.current().await?;
        self.backend
            .documents
            .array_union(
                &session,
                &self.config.user_collection,
                &session.uid,
                field,
                vec![key.to_string()],
            )
            .await
    }

    async fn remove(&self, field: &str, key: &WorkKey) -> AppResult<()> {
        let session = self.sessions.current().await?;
        self.backend
            .documents
            .array_remove(
                &session,
                &self.config.user_collection,
                &session.uid,
                field,
                vec![key.to_string()],
            )
            .await
    }

    /// Resolve the bookmark shelf into detail records.
    pub async fn bookmarks(&self) -> AppResult<ResolvedBatch> {
        let keys = self.shelf_keys(BOOKMARKS_FIELD).await?;
        Ok(self.aggregator.resolve(keys).await)
    }

    pub async fn add_bookmark(&self, key: &WorkKey) -> AppResult<()> {
        self.add(BOOKMARKS_FIELD, key).await
    }

    pub async fn remove_bookmark(&self, key: &WorkKey) -> AppResult<()> {
        self.remove(BOOKMARKS_FIELD, key).await
    }

    /// Resolve the loan shelf into detail records.
    pub async fn loaned(&self) -> AppResult<ResolvedBatch> {
        let keys = self.shelf_keys(LOANS_FIELD).await?;
        Ok(self.aggregator.resolve(keys).await)
    }

    pub async fn loan(&self, key: &WorkKey) -> AppResult<()> {
        self.add(LOANS_FIELD, key).await
    }

    pub async fn return_book(&self, key: &WorkKey) -> AppResult<()> {
        self.remove(LOANS_FIELD, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockAuthProvider, MockDocumentStore, MockFileStorage};
    use crate::catalog::MockCatalogFetch;
    use crate::error::AppError;
    use crate::models::Session;
    use crate::services::aggregator::AggregatorPolicy;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn session() -> Session {
        Session {
            uid: "uid-1".into(),
            token: "token-1".into(),
            email: "reader@example.org".into(),
        }
    }

    async fn service(documents: MockDocumentStore, catalog: MockCatalogFetch) -> ShelfService {
        let sessions = SessionStore::default();
        sessions.replace(Some(session())).await;
        ShelfService::new(
            Backend {
                auth: Arc::new(MockAuthProvider::new()),
                documents: Arc::new(documents),
                storage: Arc::new(MockFileStorage::new()),
            },
            sessions,
            BackendConfig::default(),
            BookDetailAggregator::new(Arc::new(catalog), AggregatorPolicy::default()),
        )
    }

    #[tokio::test]
    async fn bookmarks_resolve_through_the_aggregator() {
        let mut documents = MockDocumentStore::new();
        documents.expect_get().returning(|_, _, _| {
            Ok(json!({ "bookmarks": ["/works/OL1W", "/works/OL2W"], "loanedBooks": [] }))
        });

        let mut catalog = MockCatalogFetch::new();
        catalog
            .expect_work()
            .times(2)
            .returning(|key| {
                Ok(serde_json::from_value(json!({ "title": format!("Title {}", key) })).unwrap())
            });

        let batch = service(documents, catalog)
            .await
            .bookmarks()
            .await
            .unwrap();
        assert_eq!(batch.records.len(), 2);
    }

    #[tokio::test]
    async fn empty_shelf_resolves_to_nothing() {
        let mut documents = MockDocumentStore::new();
        documents
            .expect_get()
            .returning(|_, _, _| Ok(json!({ "bookmarks": [], "loanedBooks": [] })));

        let batch = service(documents, MockCatalogFetch::new())
            .await
            .loaned()
            .await
            .unwrap();
        assert!(batch.records.is_empty());
    }

    #[tokio::test]
    async fn add_bookmark_unions_the_array_field() {
        let mut documents = MockDocumentStore::new();
        documents
            .expect_array_union()
            .times(1)
            .withf(|_, collection, id, field, values| {
                collection == "students"
                    && id == "uid-1"
                    && field == "bookmarks"
                    && values == &["/works/OL1W".to_string()]
            })
            .returning(|_, _, _, _, _| Ok(()));

        let result = service(documents, MockCatalogFetch::new())
            .await
            .add_bookmark(&WorkKey::from("/works/OL1W"))
            .await;
        assert_ok!(result);
    }

    #[tokio::test]
    async fn return_book_removes_from_the_loan_field() {
        let mut documents = MockDocumentStore::new();
        documents
            .expect_array_remove()
            .times(1)
            .withf(|_, _, _, field, values| {
                field == "loanedBooks" && values == &["/works/OL1W".to_string()]
            })
            .returning(|_, _, _, _, _| Ok(()));

        let result = service(documents, MockCatalogFetch::new())
            .await
            .return_book(&WorkKey::from("/works/OL1W"))
            .await;
        assert_ok!(result);
    }

    #[tokio::test]
    async fn shelves_require_a_session() {
        let shelf = ShelfService::new(
            Backend {
                auth: Arc::new(MockAuthProvider::new()),
                documents: Arc::new(MockDocumentStore::new()),
                storage: Arc::new(MockFileStorage::new()),
            },
            SessionStore::default(),
            BackendConfig::default(),
            BookDetailAggregator::new(
                Arc::new(MockCatalogFetch::new()),
                AggregatorPolicy::default(),
            ),
        );
        assert!(matches!(
            shelf.bookmarks().await,
            Err(AppError::Authentication(_))
        ));
    }
}
