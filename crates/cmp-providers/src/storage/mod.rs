//! Key-Value Storage Tiers
//!
//! Implementations of the `KeyValueStore` port used by the identity store.
//!
//! | Provider | Tier | Backing |
//! |----------|------|---------|
//! | [`InMemoryKeyValueStore`] | durable (tests) or fallback | `DashMap` |
//! | [`FileKeyValueStore`] | durable | JSON file |
//! | [`CookieStringStore`] | legacy | `k=v; k2=v2` cookie string |

pub mod cookie;
pub mod file;
pub mod memory;

pub use cookie::CookieStringStore;
pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
