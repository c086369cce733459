//! Lead store boundary: records, the `LeadStore` trait, the in-memory
//! implementation, and seed-file loading.

pub mod mock;
pub mod models;
pub mod seed;
pub mod traits;

pub use mock::MockLeadStore;
pub use models::{Lead, Operator, ParseStageError, Stage};
pub use traits::{LeadStore, LeadSubscription, Snapshot};
