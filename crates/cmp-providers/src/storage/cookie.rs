//! Legacy cookie-string store
//!
//! Models the `document.cookie` jar older engine versions wrote the
//! visitor id into: `name=value` pairs separated by `; `.

use cmp_domain::error::Result;
use cmp_domain::ports::KeyValueStore;
use std::sync::{Mutex, MutexGuard, PoisonError};

const TIER_NAME: &str = "cookie";

/// Cookie jar store
#[derive(Debug, Default)]
pub struct CookieStringStore {
    jar: Mutex<String>,
}

impl CookieStringStore {
    /// Jar initialized from a raw cookie string
    pub fn new(cookies: impl Into<String>) -> Self {
        Self {
            jar: Mutex::new(cookies.into()),
        }
    }

    /// Current raw cookie string
    pub fn raw(&self) -> String {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Split a cookie string into `(name, value)` pairs
fn pairs(jar: &str) -> impl Iterator<Item = (&str, &str)> {
    jar.split(';').filter_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        (!name.is_empty()).then_some((name, value.trim()))
    })
}

fn rewrite(jar: &str, key: &str, value: Option<&str>) -> String {
    let mut kept: Vec<String> = pairs(jar)
        .filter(|(name, _)| *name != key)
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    if let Some(value) = value {
        kept.push(format!("{key}={value}"));
    }
    kept.join("; ")
}

impl KeyValueStore for CookieStringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let jar = self.lock();
        Ok(pairs(&jar)
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut jar = self.lock();
        *jar = rewrite(&jar, key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut jar = self.lock();
        *jar = rewrite(&jar, key, None);
        Ok(())
    }

    fn tier_name(&self) -> &str {
        TIER_NAME
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use cmp_application::registry::{KEY_VALUE_STORES, StorageProviderConfig, StorageProviderEntry};
use std::sync::Arc;

fn cookie_factory(
    config: &StorageProviderConfig,
) -> std::result::Result<Arc<dyn KeyValueStore>, String> {
    Ok(Arc::new(CookieStringStore::new(
        config.initial.clone().unwrap_or_default(),
    )))
}

#[linkme::distributed_slice(KEY_VALUE_STORES)]
static COOKIE_STORE: StorageProviderEntry = StorageProviderEntry {
    name: "cookie",
    description: "Legacy cookie-string store",
    factory: cookie_factory,
};
