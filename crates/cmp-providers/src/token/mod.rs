//! Consent Token Encoders

pub mod compact;

pub use compact::CompactTokenEncoder;
