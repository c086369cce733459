//! The lead pipeline engine
//!
//! This module provides:
//! - `LeadPipeline` — live, operator-scoped view with subscription lifecycle
//! - `filter_leads` / `group_by_stage` — pure board projections
//! - `commit_transition` — server-confirmed stage reassignment

pub mod board;
mod committer;
mod subscriber;

pub use board::{filter_leads, group_by_stage, StageColumn};
pub use subscriber::{decode_snapshot, LeadPipeline};
