//! Session CSRF token.
//!
//! A random token generated once per session and kept in session-scoped
//! storage. Without a server that checks it, the token proves nothing; the
//! pipeline does not enforce it and it is kept so a server-side deployment
//! has something to compare against.

use crate::application::ports::SessionStore;
use crate::domain::submission::CSRF_FIELD;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Mutex;

/// Random bytes in a nonce.
const NONCE_BYTES: usize = 16;

/// Generate a 32-character hex nonce from the operating system's CSPRNG.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issues and checks the per-session CSRF token.
#[derive(Debug)]
pub struct CsrfGuard<St: SessionStore> {
    store: St,
    token: Mutex<Option<String>>,
}

impl<St: SessionStore> CsrfGuard<St> {
    /// Create a guard backed by `store`.
    pub fn new(store: St) -> Self {
        Self {
            store,
            token: Mutex::new(None),
        }
    }

    /// Generate a fresh token, store it and return it.
    pub fn generate(&self) -> String {
        let token = generate_nonce();
        self.store.set(CSRF_FIELD, token.clone());
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());
        token
    }

    /// Current token: the cached one, else whatever the store holds.
    pub fn get(&self) -> Option<String> {
        let cached = self
            .token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        cached.or_else(|| self.store.get(CSRF_FIELD))
    }

    /// Compare a posted token with the stored one, exactly.
    pub fn validate(&self, candidate: &str) -> bool {
        match self.store.get(CSRF_FIELD) {
            Some(stored) => !stored.is_empty() && stored == candidate,
            None => false,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &St {
        &self.store
    }
}
