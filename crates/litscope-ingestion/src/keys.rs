//! Ordered pool of Scopus API keys.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ScopusError;

/// The key in use plus the spares to fall back on once it is rate limited.
///
/// Rotation only moves forward: a key that hit its quota is not reused.
#[derive(Debug)]
pub struct KeyPool {
    keys: Vec<SecretString>,
    current: usize,
}

impl KeyPool {
    pub fn new(keys: Vec<SecretString>) -> Result<Self, ScopusError> {
        if keys.is_empty() {
            return Err(ScopusError::NoApiKeys);
        }
        Ok(Self { keys, current: 0 })
    }

    pub fn current(&self) -> &str {
        self.keys[self.current].expose_secret()
    }

    /// Position of the key in use, for logging without exposing it.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Keys not yet tried.
    pub fn remaining(&self) -> usize {
        self.keys.len() - self.current - 1
    }

    /// Advance to the next key. Returns `false` when the current key is the last one.
    pub fn rotate(&mut self) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.current += 1;
        true
    }
}
