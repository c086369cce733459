//! Leadboard
//!
//! Engine for tracking sales leads through a fixed funnel on a live board:
//! - live, operator-scoped lead views pushed from a remote document store
//! - text filtering and stage grouping over the view
//! - stage transitions persisted back to the store, server-confirmed and
//!   never applied locally
//!
//! The remote store itself is consumed through the narrow
//! [`store::LeadStore`] boundary; session handling, routing, and rendering
//! belong to surrounding collaborators.

pub mod error;
pub mod pipeline;
pub mod store;

pub use error::{PipelineError, StoreError};
pub use pipeline::LeadPipeline;
pub use store::{Lead, Operator, Stage};
