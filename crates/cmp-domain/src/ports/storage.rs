//! Key-Value Storage Port
//!
//! One implementation per storage tier (durable store, legacy cookie string,
//! in-memory). Host storage is synchronous, so is the port.

use crate::error::Result;
use std::fmt::Debug;

/// Storage tier interface
///
/// Any failure must surface as [`crate::Error::StorageUnavailable`] so the
/// identity store can fall through to the next tier.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key succeeds
    fn remove(&self, key: &str) -> Result<()>;

    /// Tier name used in logs
    fn tier_name(&self) -> &str;
}
