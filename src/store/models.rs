//! Lead and operator records as stored in the remote document store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Funnel stages
// ============================================================================

/// One funnel position, i.e. one board column.
///
/// `Won` and `Lost` are terminal outcomes in the funnel's reading, but the
/// engine does not restrict transitions: any stage is reachable from any
/// stage, matching the store's unconditional field update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Initial,
    Contacted,
    Proposal,
    Won,
    Lost,
}

impl Stage {
    /// Board column order.
    pub const ALL: [Stage; 5] = [
        Stage::Initial,
        Stage::Contacted,
        Stage::Proposal,
        Stage::Won,
        Stage::Lost,
    ];

    /// Stage identifier as stored in lead documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Contacted => "contacted",
            Stage::Proposal => "proposal",
            Stage::Won => "won",
            Stage::Lost => "lost",
        }
    }

    /// Column header shown on the board.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Initial => "New Leads",
            Stage::Contacted => "In Contact",
            Stage::Proposal => "Proposal",
            Stage::Won => "Won",
            Stage::Lost => "Lost",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The given string is not a stage identifier.
#[derive(Debug, Error)]
#[error("unknown stage: {0}")]
pub struct ParseStageError(String);

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

// ============================================================================
// Lead
// ============================================================================

/// A prospective-customer record tracked through the funnel.
///
/// `id` and `owner_id` are assigned by the store and required; a pushed
/// document missing either fails to decode and is skipped during snapshot
/// handling. Everything else is optional display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub owner_id: String,
    #[serde(default)]
    pub display_name: String,
    /// Social handle, stored without the leading `@`.
    #[serde(default)]
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    /// Absence is a valid state meaning "first stage", not an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Display-only recency marker, opaque to the engine; no ordering is
    /// enforced over it and no date format is assumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Lead {
    /// Stage the lead is rendered under. The single place the implicit
    /// default is resolved; never inline the `unwrap_or` at call sites.
    pub fn effective_stage(&self) -> Stage {
        self.stage.unwrap_or(Stage::Initial)
    }

    /// Handle normalized for display with exactly one leading `@`.
    pub fn display_handle(&self) -> String {
        format!("@{}", self.handle.trim_start_matches('@'))
    }
}

// ============================================================================
// Operator
// ============================================================================

/// A salesperson who owns a subset of leads, resolved by access code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub code: String,
}
