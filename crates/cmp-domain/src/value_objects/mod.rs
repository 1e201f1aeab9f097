//! Domain Value Objects
//!
//! Immutable value objects shared by the engine and the persistence service.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`ConsentDecision`] | Authoritative decision per visitor and site |
//! | [`ConsentChoices`] | Purpose and vendor consent maps |
//! | [`VisitorId`] / [`SiteId`] | Identifiers |
//! | [`TcData`] / [`PingReturn`] | TCF command replies |
//! | [`BannerState`] | Lifecycle controller states |
//! | [`SubmissionPayload`] | Decision submission body |
//! | [`VendorListSnapshot`] | Read-only vendor list |
//! | [`EngineSettings`] | Per-instance engine settings |

/// Banner lifecycle vocabulary
pub mod banner;
/// Consent decision model
pub mod consent;
/// Visitor and site identifiers
pub mod identity;
/// Engine settings
pub mod settings;
/// Submission payload
pub mod submission;
/// TCF command API shapes
pub mod tcf;
/// Vendor list snapshot
pub mod vendor_list;

pub use banner::{BannerAction, BannerState, BindingConfidence, DiscoveryMethod};
pub use consent::{ConsentChoices, ConsentDecision, InteractionType, PurposeId, VendorId};
pub use identity::{SiteId, VisitorId};
pub use settings::EngineSettings;
pub use submission::{
    BackendOperation, BannerInteraction, ClientMetadata, DecisionSet, DeviceType,
    SubmissionPayload,
};
pub use tcf::{
    CmpStatus, DisplayStatus, EventStatus, ListenerId, PingReturn, PurposeConsents, TcData,
    TcfCall, TcfCallEnvelope, TcfCommand, TcfReturn, TcfReturnEnvelope, VendorConsents,
};
pub use vendor_list::{PurposeInfo, VendorInfo, VendorListSnapshot};
