use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Pipeline stage of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStage {
    /// First contact.
    Approach,
    /// Proposal sent.
    Proposal,
    /// Terms under negotiation.
    Negotiate,
    /// Deal won.
    ClosedWon,
    /// Deal lost.
    ClosedLost,
}

/// Normalized words in a free-text stage hint that point at a stage.
const STAGE_KEYWORDS: &[(OpportunityStage, &[&str])] = &[
    (OpportunityStage::Proposal, &["proposal", "propose"]),
    (OpportunityStage::Negotiate, &["negotiate", "negotiation", "pricing"]),
    (OpportunityStage::Approach, &["approach", "initial", "interest"]),
];

impl OpportunityStage {
    /// Stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approach => "approach",
            Self::Proposal => "proposal",
            Self::Negotiate => "negotiate",
            Self::ClosedWon => "closed_won",
            Self::ClosedLost => "closed_lost",
        }
    }

    /// Returns true when `hint` (already normalized) contains any keyword
    /// mapped to this stage. Closed stages have no keywords.
    #[must_use]
    pub fn is_hinted_by(self, hint: &str) -> bool {
        STAGE_KEYWORDS
            .iter()
            .filter(|(stage, _)| *stage == self)
            .any(|(_, words)| words.iter().any(|w| hint.contains(w)))
    }

    /// Stages mentioned by a normalized free-text hint, in table order.
    pub fn hinted_by(hint: &str) -> impl Iterator<Item = Self> + '_ {
        STAGE_KEYWORDS
            .iter()
            .filter(move |(_, words)| words.iter().any(|w| hint.contains(w)))
            .map(|(stage, _)| *stage)
    }
}

impl TryFrom<&str> for OpportunityStage {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approach" => Ok(Self::Approach),
            "proposal" => Ok(Self::Proposal),
            "negotiate" => Ok(Self::Negotiate),
            "closed_won" => Ok(Self::ClosedWon),
            "closed_lost" => Ok(Self::ClosedLost),
            _ => Err(ValidationError::UnknownLabel {
                what: "opportunity stage",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for OpportunityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
