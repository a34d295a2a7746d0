//! Subscription/trial status and the tier shown in the UI.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Status payload of the status call.
///
/// Missing fields read as `false`; the backend spells the trial flag
/// `trial_used`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementStatus {
    #[serde(default)]
    pub subscribed: bool,
    #[serde(default, alias = "trial_used")]
    pub trial_used: bool,
}

impl EntitlementStatus {
    /// Decode a status body. Malformed input yields the default status.
    pub fn from_json(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|e| {
            warn!(error = %e, "malformed status payload, assuming free trial");
            Self::default()
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DisplayTier {
    Premium,
    TrialExpired,
    #[default]
    FreeTrialAvailable,
}

impl DisplayTier {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayTier::Premium => "Premium",
            DisplayTier::TrialExpired => "Trial used",
            DisplayTier::FreeTrialAvailable => "Free trial",
        }
    }

    pub fn can_generate(&self) -> bool {
        !matches!(self, DisplayTier::TrialExpired)
    }
}

/// Map a status to its tier. Subscription wins over a used trial.
pub fn reduce(status: &EntitlementStatus) -> DisplayTier {
    if status.subscribed {
        DisplayTier::Premium
    } else if status.trial_used {
        DisplayTier::TrialExpired
    } else {
        DisplayTier::FreeTrialAvailable
    }
}

/// Current tier of the session.
///
/// Starts at [`DisplayTier::FreeTrialAvailable`] until a status arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntitlementState {
    tier: DisplayTier,
}

impl EntitlementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> DisplayTier {
        self.tier
    }

    /// Replace the tier with the reduction of an authoritative status.
    pub fn apply_status(&mut self, status: &EntitlementStatus) -> DisplayTier {
        self.tier = reduce(status);
        self.tier
    }

    /// A failed status fetch leaves the current tier in place.
    pub fn apply_status_failure(&mut self) -> DisplayTier {
        self.tier
    }

    /// A successful subscribe makes the session premium immediately.
    pub fn apply_subscription(&mut self) -> DisplayTier {
        self.tier = DisplayTier::Premium;
        self.tier
    }

    /// The backend refused a generation for quota reasons.
    pub fn apply_limit_reached(&mut self) -> DisplayTier {
        if self.tier != DisplayTier::Premium {
            self.tier = DisplayTier::TrialExpired;
        }
        self.tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(subscribed: bool, trial_used: bool) -> EntitlementStatus {
        EntitlementStatus {
            subscribed,
            trial_used,
        }
    }

    #[test]
    fn test_reduce_truth_table() {
        assert_eq!(reduce(&status(true, true)), DisplayTier::Premium);
        assert_eq!(reduce(&status(true, false)), DisplayTier::Premium);
        assert_eq!(reduce(&status(false, true)), DisplayTier::TrialExpired);
        assert_eq!(
            reduce(&status(false, false)),
            DisplayTier::FreeTrialAvailable
        );
    }

    #[test]
    fn test_only_used_trial_blocks_generation() {
        assert!(DisplayTier::Premium.can_generate());
        assert!(DisplayTier::FreeTrialAvailable.can_generate());
        assert!(!DisplayTier::TrialExpired.can_generate());
    }

    #[test]
    fn test_status_accepts_both_spellings() {
        assert_eq!(
            EntitlementStatus::from_json(r#"{"subscribed":false,"trial_used":true}"#),
            status(false, true)
        );
        assert_eq!(
            EntitlementStatus::from_json(r#"{"subscribed":false,"trialUsed":true}"#),
            status(false, true)
        );
    }

    #[test]
    fn test_malformed_status_is_free_trial() {
        for body in ["", "not json", "[1,2]", r#"{"subscribed":"yes"}"#] {
            let status = EntitlementStatus::from_json(body);
            assert_eq!(reduce(&status), DisplayTier::FreeTrialAvailable);
        }
        assert_eq!(EntitlementStatus::from_json("{}"), status(false, false));
    }

    #[test]
    fn test_subscription_forces_premium_until_next_status() {
        let mut state = EntitlementState::new();
        state.apply_status(&status(false, true));
        assert_eq!(state.tier(), DisplayTier::TrialExpired);

        assert_eq!(state.apply_subscription(), DisplayTier::Premium);
        assert_eq!(state.apply_status_failure(), DisplayTier::Premium);

        assert_eq!(state.apply_status(&status(true, true)), DisplayTier::Premium);
    }

    #[test]
    fn test_limit_reached_never_downgrades_premium() {
        let mut state = EntitlementState::new();
        assert_eq!(state.apply_limit_reached(), DisplayTier::TrialExpired);
        state.apply_subscription();
        assert_eq!(state.apply_limit_reached(), DisplayTier::Premium);
    }
}
