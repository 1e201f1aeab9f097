//! TCF command API
//!
//! The in-page [`CommandStub`], the [`CrossFrameBridge`] that exposes it to
//! other frames, and the [`TcfFrameClient`] used on the calling side.

pub mod bridge;
pub mod frame_client;
pub mod stub;

pub use bridge::{CrossFrameBridge, EnvelopeEncoding, LocatorInstall, decode_envelope};
pub use frame_client::TcfFrameClient;
pub use stub::{CommandStub, StubIdentity, TcfCallback};
