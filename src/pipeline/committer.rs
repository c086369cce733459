//! Transition committer
//!
//! Persists a stage reassignment as a single field-level update. The live
//! view is deliberately never mutated here: the board reflects the change
//! only once the store pushes the resulting snapshot back through the
//! subscription, keeping the server as the single source of truth.

use crate::error::PipelineError;
use crate::pipeline::subscriber::LeadPipeline;
use crate::store::models::Stage;
use tracing::{debug, warn};

impl LeadPipeline {
    /// Commit a stage transition for one lead.
    ///
    /// Issues exactly one `stage := target` update and returns once the
    /// store confirms or rejects it. No transition is forbidden: moving a
    /// lead out of `won` is accepted the same as any other move. The call
    /// is idempotent in effect; re-issuing a commit the lead already
    /// satisfies is a no-op write.
    ///
    /// On failure the board is guaranteed to still show the pre-gesture
    /// state, because nothing was changed locally. The engine does not
    /// retry; the caller may re-issue.
    pub async fn commit_transition(
        &self,
        lead_id: &str,
        target: Stage,
    ) -> Result<(), PipelineError> {
        match self.store.update_stage(lead_id, target).await {
            Ok(()) => {
                debug!(lead_id, stage = %target, "stage transition committed");
                Ok(())
            }
            Err(source) => {
                warn!(lead_id, stage = %target, error = %source, "stage transition rejected");
                Err(PipelineError::TransitionCommit {
                    lead_id: lead_id.to_string(),
                    source,
                })
            }
        }
    }
}
