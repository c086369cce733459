//! Filter projection and stage grouping over the live view.
//!
//! Both are pure functions of their inputs and cheap enough to recompute
//! in full on every keystroke or snapshot; nothing here touches the store.

use crate::store::models::{Lead, Stage};

/// Leads whose display name or handle contains the search term,
/// case-folded. An empty term keeps everything. Missing name or handle
/// fields arrive as empty strings and simply never match.
pub fn filter_leads<'a>(leads: &'a [Lead], term: &str) -> Vec<&'a Lead> {
    if term.is_empty() {
        return leads.iter().collect();
    }
    let needle = term.to_lowercase();
    leads
        .iter()
        .filter(|lead| {
            lead.display_name.to_lowercase().contains(&needle)
                || lead.handle.to_lowercase().contains(&needle)
        })
        .collect()
}

/// One board column: a stage and the leads currently sitting in it.
#[derive(Debug)]
pub struct StageColumn<'a> {
    pub stage: Stage,
    pub leads: Vec<&'a Lead>,
}

impl StageColumn<'_> {
    pub fn count(&self) -> usize {
        self.leads.len()
    }
}

/// Partition leads into board columns in `Stage::ALL` order.
///
/// A lead with no recorded stage lands under `Stage::Initial`. Relative
/// order within a column matches the input order, so grouping the same
/// sequence twice yields identical columns.
pub fn group_by_stage<'a>(leads: &[&'a Lead]) -> Vec<StageColumn<'a>> {
    Stage::ALL
        .iter()
        .map(|&stage| StageColumn {
            stage,
            leads: leads
                .iter()
                .copied()
                .filter(|lead| lead.effective_stage() == stage)
                .collect(),
        })
        .collect()
}
