//! Frame Messengers

pub mod channel;

pub use channel::{ChannelMessenger, PostedMessage};
