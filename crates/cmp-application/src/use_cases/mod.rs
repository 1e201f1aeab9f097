//! Use Cases
//!
//! | Use case | Runs in |
//! |----------|---------|
//! | [`IdentityStore`] | embedded engine |
//! | [`SubmissionClient`] | embedded engine |
//! | [`ConsentLogService`] | persistence service |

pub mod consent_log_service;
pub mod identity_store;
pub mod submission_client;

pub use consent_log_service::ConsentLogService;
pub use identity_store::{IdentitySource, IdentityStore};
pub use submission_client::{
    ExistingDecision, SubmissionClient, SubmissionOutcome, SubmissionReport,
};
