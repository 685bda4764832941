//! Credential bundle and token store.
//!
//! The store is the persistence seam: the core only needs `load`, `save`,
//! and `clear`, plus synchronous read access to the in-memory bundle
//! between saves. Persistence medium and format belong to the embedding
//! application.

mod refresh;

pub use refresh::AuthRefreshCoordinator;

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// An authenticated session: user identifier plus access/refresh tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    /// Backend user identifier
    pub user_id: String,
    /// Short-lived access token, sent as a bearer Authorization header
    pub access_token: String,
    /// Long-lived token used to renew the access token
    pub refresh_token: String,
}

impl CredentialBundle {
    /// Creates a bundle from its parts.
    pub fn new(
        user_id: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// True iff both tokens are present.
    pub fn has_tokens(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

/// Token persistence interface.
///
/// Reads are synchronous by contract; implementations that persist to disk
/// or a keychain flush inside `save`/`clear` and serve `load` from their
/// in-memory copy.
pub trait TokenStore: Send + Sync {
    /// Returns the current bundle (empty if no session is stored).
    fn load(&self) -> CredentialBundle;

    /// Replaces the stored bundle.
    fn save(&self, bundle: CredentialBundle);

    /// Drops the stored bundle.
    fn clear(&self);
}

/// Process-local token store with no persistence.
#[derive(Default)]
pub struct InMemoryTokenStore {
    bundle: RwLock<CredentialBundle>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a bundle.
    pub fn with_bundle(bundle: CredentialBundle) -> Self {
        Self {
            bundle: RwLock::new(bundle),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> CredentialBundle {
        self.bundle.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, bundle: CredentialBundle) {
        *self.bundle.write().unwrap_or_else(|e| e.into_inner()) = bundle;
    }

    fn clear(&self) {
        *self.bundle.write().unwrap_or_else(|e| e.into_inner()) = CredentialBundle::default();
    }
}
