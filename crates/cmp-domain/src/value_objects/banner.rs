//! Banner lifecycle vocabulary

use super::consent::InteractionType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the banner controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerState {
    /// Engine not started
    Idle,
    /// Waiting for the persistence lookup
    AwaitingExistingDecision,
    /// Looking for (or synthesizing) a banner root
    Searching,
    /// Banner root located
    Bound,
    /// Controls bound, waiting for the visitor
    AwaitingUserChoice,
    /// Decision being submitted
    Submitting,
    /// Banner will not be shown (restored or fresh decision)
    Suppressed,
    /// Unrecoverable error recorded; the controller still searches afterwards
    Failed,
}

impl BannerState {
    /// Whether the machine may move from `self` to `next`
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (_, Self::Failed)
                | (Self::Idle, Self::AwaitingExistingDecision)
                | (
                    Self::AwaitingExistingDecision,
                    Self::Suppressed | Self::Searching
                )
                | (Self::Failed, Self::Searching)
                | (Self::Searching, Self::Bound)
                | (Self::Bound, Self::AwaitingUserChoice)
                | (Self::AwaitingUserChoice, Self::Submitting)
                | (Self::Submitting, Self::Suppressed)
        )
    }

    /// Wire/log name of the state
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingExistingDecision => "awaiting_existing_decision",
            Self::Searching => "searching",
            Self::Bound => "bound",
            Self::AwaitingUserChoice => "awaiting_user_choice",
            Self::Submitting => "submitting",
            Self::Suppressed => "suppressed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical action a banner control maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerAction {
    /// Grant everything
    AcceptAll,
    /// Refuse everything optional
    RejectAll,
    /// Reveal the preferences panel
    ShowPreferences,
    /// Submit granular choices
    SavePreferences,
}

impl BannerAction {
    /// Every action, in binding order
    pub const ALL: [Self; 4] = [
        Self::AcceptAll,
        Self::RejectAll,
        Self::ShowPreferences,
        Self::SavePreferences,
    ];

    /// Parse an explicit `data-cmp-action` marker value
    pub fn from_marker(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "accept_all" | "accept" => Some(Self::AcceptAll),
            "reject_all" | "reject" => Some(Self::RejectAll),
            "show_preferences" | "preferences" => Some(Self::ShowPreferences),
            "save_preferences" | "save" => Some(Self::SavePreferences),
            _ => None,
        }
    }

    /// Interaction recorded when this action submits a decision
    pub fn interaction_type(self) -> Option<InteractionType> {
        match self {
            Self::AcceptAll => Some(InteractionType::AcceptAll),
            Self::RejectAll => Some(InteractionType::RejectAll),
            Self::SavePreferences => Some(InteractionType::SavePreferences),
            Self::ShowPreferences => None,
        }
    }

    /// Wire/log name of the action
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AcceptAll => "accept_all",
            Self::RejectAll => "reject_all",
            Self::ShowPreferences => "show_preferences",
            Self::SavePreferences => "save_preferences",
        }
    }
}

impl fmt::Display for BannerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a control was matched to its action, strongest first
///
/// Lower tiers are fuzzier guesses and only apply when no stronger match
/// exists for the same action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConfidence {
    /// Explicit `data-cmp-action` marker
    Marker,
    /// id/class naming convention
    Naming,
    /// Visible label text
    Label,
}

/// How the banner root was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum DiscoveryMethod {
    /// Well-known element id
    WellKnownId,
    /// A registered third-party CMP detector matched
    Detector {
        /// Detector name
        name: String,
    },
    /// Scored DOM scan
    Heuristic {
        /// Winning score
        score: u32,
    },
    /// Fallback banner created by the engine
    Synthesized,
}
