//! Security tokens
//!
//! Token persistence belongs to the caller; the gateway only needs lookup.
//! `InMemoryTokenStore` is provided for tests and single-process setups.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A payment security token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub hash: String,
    pub gateway_name: String,
    pub target_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_url: Option<String>,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Storage of security tokens keyed by hash
pub trait TokenStore: Send + Sync + fmt::Debug {
    fn find(&self, hash: &str) -> Option<Token>;

    fn insert(&self, token: Token);

    fn remove(&self, hash: &str) -> Option<Token>;
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<String, Token>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn find(&self, hash: &str) -> Option<Token> {
        self.tokens.read().get(hash).cloned()
    }

    fn insert(&self, token: Token) {
        self.tokens.write().insert(token.hash.clone(), token);
    }

    fn remove(&self, hash: &str) -> Option<Token> {
        self.tokens.write().remove(hash)
    }
}
