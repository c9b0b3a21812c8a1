//! Per-club gateway credential lookup boundary.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ClubId;

use crate::error::GatewayError;

/// Per-club gateway credentials as a named-field map.
///
/// The field set differs per processor and is owned by the club database,
/// so the shape stays open; adapters declare which fields they require.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    fields: HashMap<String, String>,
}

impl Credentials {
    /// Builds credentials from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns a field value if present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Returns a field value or a `MissingCredential` error.
    ///
    /// A missing credential field is a configuration failure, fatal to the
    /// attempt and distinct from a gateway decline.
    pub fn require(&self, gateway: &'static str, field: &'static str) -> Result<&str, GatewayError> {
        self.get(field)
            .ok_or(GatewayError::MissingCredential { gateway, field })
    }
}

/// Boundary trait for fetching per-club gateway credentials.
///
/// Implemented by the club database elsewhere; the in-memory store below
/// backs tests and local runs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetches the credentials for a club and processor.
    async fn credentials(&self, club: ClubId, processor: &str) -> Result<Credentials, GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryCredentialState {
    entries: HashMap<(u32, String), Credentials>,
    lookups: usize,
    fail_lookup: bool,
}

/// In-memory credential store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    state: Arc<RwLock<InMemoryCredentialState>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers credentials for a club/processor pair.
    pub fn insert(&self, club: ClubId, processor: &str, creds: Credentials) {
        self.state
            .write()
            .unwrap()
            .entries
            .insert((club.as_u32(), processor.to_string()), creds);
    }

    /// Configures the store to fail lookups.
    pub fn set_fail_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_lookup = fail;
    }

    /// Returns the number of lookups made against the store.
    pub fn lookup_count(&self) -> usize {
        self.state.read().unwrap().lookups
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn credentials(&self, club: ClubId, processor: &str) -> Result<Credentials, GatewayError> {
        let mut state = self.state.write().unwrap();
        state.lookups += 1;

        if state.fail_lookup {
            return Err(GatewayError::CredentialLookup(
                "credential store unavailable".to_string(),
            ));
        }

        state
            .entries
            .get(&(club.as_u32(), processor.to_string()))
            .cloned()
            .ok_or_else(|| {
                GatewayError::CredentialLookup(format!(
                    "no {processor} credentials configured for club {club}"
                ))
            })
    }
}
