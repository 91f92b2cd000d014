// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Mutex;

/// Last known sequence token per stream.
///
/// Every operation runs under the one internal lock, so a refresh can never
/// interleave with a point update on the same stream. The lock is never held
/// across a call to the backend.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: Mutex<HashMap<String, String>>,
}

#[allow(clippy::expect_used)]
impl TokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, stream: &str) -> Option<String> {
        self.tokens
            .lock()
            .expect("lock poisoned")
            .get(stream)
            .cloned()
    }

    pub fn set(&self, stream: &str, token: String) {
        self.tokens
            .lock()
            .expect("lock poisoned")
            .insert(stream.to_string(), token);
    }

    /// Merges a refreshed listing into the store.
    ///
    /// Listed streams are inserted or overwritten; streams missing from the
    /// listing keep their entry. A listed stream without a token has never
    /// been written to, so any entry we hold for it is dropped.
    pub fn replace_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut tokens = self.tokens.lock().expect("lock poisoned");
        for (stream, token) in entries {
            match token {
                Some(token) => {
                    tokens.insert(stream, token);
                }
                None => {
                    tokens.remove(&stream);
                }
            }
        }
    }

    pub fn forget(&self, stream: &str) {
        self.tokens.lock().expect("lock poisoned").remove(stream);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.lock().expect("lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current entries.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.tokens.lock().expect("lock poisoned").clone()
    }
}
