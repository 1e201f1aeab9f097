//! Vendor List Sources

pub mod static_list;

pub use static_list::StaticVendorList;
