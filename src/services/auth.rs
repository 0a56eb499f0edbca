//! Authentication and session service

use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    backend::Backend,
    config::BackendConfig,
    error::{AppError, AppResult},
    models::{
        user::{ChangePassword, LoginRequest, RegisterRequest},
        Session, UserProfile,
    },
    validation,
};

/// Signed-in session shared across services.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub async fn current(&self) -> AppResult<Session> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::Authentication("Not signed in".to_string()))
    }

    pub async fn replace(&self, session: Option<Session>) {
        *self.inner.write().await = session;
    }
}

#[derive(Clone)]
pub struct AuthService {
    backend: Backend,
    sessions: SessionStore,
    config: BackendConfig,
}

impl AuthService {
    pub fn new(backend: Backend, sessions: SessionStore, config: BackendConfig) -> Self {
        Self {
            backend,
            sessions,
            config,
        }
    }

    /// Register a new account and its user document, then sign in.
    ///
    /// An email that already has an account falls back to signing in and
    /// proceeds, so an account left without its document gets one on retry.
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<Session> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validation::validate_username(&request.username)?;
        validation::validate_email(&request.email, self.config.email_domain.as_deref())?;
        validation::validate_password(&request.password)?;

        let session = match self
            .backend
            .auth
            .create_account(&request.email, &request.password)
            .await
        {
            Ok(session) => session,
            Err(AppError::Conflict(_)) => {
                tracing::info!("account already exists for {}, signing in", request.email);
                self.backend
                    .auth
                    .sign_in(&request.email, &request.password)
                    .await?
            }
            Err(e) => return Err(e),
        };

        let profile = UserProfile::new_registration(&request.username, &request.email);
        self.backend
            .documents
            .set(
                &session,
                &self.config.user_collection,
                &session.uid,
                serde_json::to_value(&profile)?,
                false,
            )
            .await?;

        if let Err(e) = self.backend.auth.send_verification_email(&session).await {
            tracing::warn!("verification email failed for {}: {}", session.uid, e);
        }

        self.sessions.replace(Some(session.clone())).await;
        Ok(session)
    }

    /// Sign in and store the session.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<Session> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = self
            .backend
            .auth
            .sign_in(&request.email, &request.password)
            .await?;
        self.sessions.replace(Some(session.clone())).await;
        Ok(session)
    }

    /// Sign out and clear the stored session.
    pub async fn logout(&self) -> AppResult<()> {
        let session = self.sessions.current().await?;
        self.backend.auth.sign_out(&session).await?;
        self.sessions.replace(None).await;
        Ok(())
    }

    /// The signed-in session, or an authentication error.
    pub async fn current(&self) -> AppResult<Session> {
        self.sessions.current().await
    }

    /// Trigger the provider's password-reset email.
    pub async fn reset_password(&self, email: &str) -> AppResult<()> {
        validation::validate_email(email, self.config.email_domain.as_deref())?;
        self.backend.auth.send_password_reset(email).await
    }

    /// Change the password after re-authenticating with the current one.
    pub async fn change_password(&self, request: &ChangePassword) -> AppResult<()> {
        let session = self.sessions.current().await?;
        validation::validate_password(&request.new_password)?;

        let refreshed = self
            .backend
            .auth
            .sign_in(&session.email, &request.current_password)
            .await
            .map_err(|_| AppError::Authentication("Current password is incorrect".to_string()))?;
        self.backend
            .auth
            .update_password(&refreshed, &request.new_password)
            .await?;
        self.sessions.replace(Some(refreshed)).await;
        Ok(())
    }

    /// Delete the account after re-authenticating with its credentials.
    pub async fn delete_account(&self, email: &str, password: &str) -> AppResult<()> {
        let session = self.backend.auth.sign_in(email, password).await?;
        self.backend.auth.delete_account(&session).await?;
        self.sessions.replace(None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockAuthProvider, MockDocumentStore, MockFileStorage};

    fn session() -> Session {
        Session {
            uid: "uid-1".into(),
            token: "token-1".into(),
            email: "reader@example.org".into(),
        }
    }

    fn backend(
        auth: MockAuthProvider,
        documents: MockDocumentStore,
    ) -> Backend {
        Backend {
            auth: Arc::new(auth),
            documents: Arc::new(documents),
            storage: Arc::new(MockFileStorage::new()),
        }
    }

    fn service(auth: MockAuthProvider, documents: MockDocumentStore) -> AuthService {
        AuthService::new(
            backend(auth, documents),
            SessionStore::default(),
            BackendConfig::default(),
        )
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            username: "reader_1".into(),
            email: "reader@example.org".into(),
            password: "Passw0rd!".into(),
        }
    }

    #[tokio::test]
    async fn register_creates_account_document_and_session() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_account()
            .times(1)
            .returning(|_, _| Ok(session()));
        auth.expect_send_verification_email()
            .times(1)
            .returning(|_| Ok(()));

        let mut documents = MockDocumentStore::new();
        documents
            .expect_set()
            .times(1)
            .withf(|_, collection, id, data, merge| {
                collection == "students"
                    && id == "uid-1"
                    && data["username"] == "reader_1"
                    && data["bookmarks"].as_array().is_some_and(|a| a.is_empty())
                    && !*merge
            })
            .returning(|_, _, _, _, _| Ok(()));

        let service = service(auth, documents);
        let session = service.register(&register_request()).await.unwrap();
        assert_eq!(session.uid, "uid-1");
        assert_eq!(service.current().await.unwrap().uid, "uid-1");
    }

    #[tokio::test]
    async fn register_existing_email_falls_back_to_sign_in() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_account()
            .times(1)
            .returning(|_, _| Err(AppError::Conflict("email in use".into())));
        auth.expect_sign_in().times(1).returning(|_, _| Ok(session()));
        auth.expect_send_verification_email().returning(|_| Ok(()));

        let mut documents = MockDocumentStore::new();
        documents
            .expect_set()
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));

        let service = service(auth, documents);
        assert!(service.register(&register_request()).await.is_ok());
    }

    #[tokio::test]
    async fn register_rejects_weak_password_before_any_call() {
        let auth = MockAuthProvider::new();
        let documents = MockDocumentStore::new();
        let service = service(auth, documents);

        let mut request = register_request();
        request.password = "alllowercase1!".into();
        let result = service.register(&request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn register_survives_verification_email_failure() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_account().returning(|_, _| Ok(session()));
        auth.expect_send_verification_email()
            .returning(|_| Err(AppError::Remote("smtp down".into())));

        let mut documents = MockDocumentStore::new();
        documents.expect_set().returning(|_, _, _, _, _| Ok(()));

        let service = service(auth, documents);
        assert!(service.register(&register_request()).await.is_ok());
    }

    #[tokio::test]
    async fn change_password_reauthenticates_first() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in()
            .times(2)
            .returning(|_, _| Ok(session()));
        auth.expect_update_password()
            .times(1)
            .withf(|_, new_password| new_password == "N3wSecret!")
            .returning(|_, _| Ok(()));

        let documents = MockDocumentStore::new();
        let service = service(auth, documents);
        service
            .login(&LoginRequest {
                email: "reader@example.org".into(),
                password: "Passw0rd!".into(),
            })
            .await
            .unwrap();

        service
            .change_password(&ChangePassword {
                current_password: "Passw0rd!".into(),
                new_password: "N3wSecret!".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn change_password_maps_reauth_failure() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in()
            .times(1)
            .returning(|_, _| Ok(session()));

        let documents = MockDocumentStore::new();
        let service = service(auth, documents);
        service
            .login(&LoginRequest {
                email: "reader@example.org".into(),
                password: "Passw0rd!".into(),
            })
            .await
            .unwrap();

        let mut auth_fail = MockAuthProvider::new();
        auth_fail
            .expect_sign_in()
            .returning(|_, _| Err(AppError::Authentication("nope".into())));
        // Rebuild the service around the failing provider but keep the session.
        let service = AuthService::new(
            backend(auth_fail, MockDocumentStore::new()),
            service.sessions.clone(),
            BackendConfig::default(),
        );

        let result = service
            .change_password(&ChangePassword {
                current_password: "Wrong0ne!".into(),
                new_password: "N3wSecret!".into(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn logout_requires_a_session() {
        let service = service(MockAuthProvider::new(), MockDocumentStore::new());
        assert!(matches!(
            service.logout().await,
            Err(AppError::Authentication(_))
        ));
    }
}
