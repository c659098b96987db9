//! Item set synchronisation: add missing candidates, optionally prune the rest.
//!
//! The board's full membership is read before any add is issued, so the add
//! loop never races its own writes. Pruning re-reads membership afterwards
//! and works from that fresh view.

use std::collections::{BTreeMap, BTreeSet};

use crate::github::error::BoardError;
use crate::github::gateway::GraphQlGateway;

use super::api::BoardApi;
use super::issues::{RunIssue, RunStage};
use super::models::{BoardId, BoardItem, CandidateItem, ContentId, ItemId};

/// Content identifier to item identifier for one board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipIndex {
    items: BTreeMap<ContentId, ItemId>,
}

impl MembershipIndex {
    /// Indexes board items by content, ignoring items with no content.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = BoardItem>) -> Self {
        let entries = items
            .into_iter()
            .filter_map(|item| item.content_id.map(|content| (content, item.id)))
            .collect();
        Self { items: entries }
    }

    /// Item identifier for `content`, if it is on the board.
    #[must_use]
    pub fn item_for(&self, content: &ContentId) -> Option<&ItemId> {
        self.items.get(content)
    }

    /// Records a newly added item.
    pub fn insert(&mut self, content: ContentId, item: ItemId) {
        self.items.insert(content, item);
    }

    /// Number of indexed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Where a candidate ended up on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Position of the candidate in the input list.
    pub candidate: usize,
    /// Board item carrying the candidate's content.
    pub item: ItemId,
    /// True when this run added the item.
    pub newly_added: bool,
}

/// Outcome of [`ItemSynchronizer::add_candidates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Candidates added during this run.
    pub added: usize,
    /// Candidates already present, repeated, invalid, or failed.
    pub skipped: usize,
    /// Board items for added and already-present candidates.
    pub placements: Vec<Placement>,
    /// Index and add failures.
    pub issues: Vec<RunIssue>,
}

impl AddReport {
    fn skip(&mut self) {
        self.skipped = self.skipped.saturating_add(1);
    }
}

/// Outcome of [`ItemSynchronizer::prune_stale`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Items deleted.
    pub removed: usize,
    /// Deletions that failed.
    pub failed: usize,
    /// Listing and deletion failures.
    pub issues: Vec<RunIssue>,
}

/// Keeps board membership in line with a candidate list.
pub struct ItemSynchronizer<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    api: &'api BoardApi<'gateway, Gateway>,
}

impl<'api, 'gateway, Gateway> ItemSynchronizer<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    /// Creates a synchroniser using `api`.
    #[must_use]
    pub const fn new(api: &'api BoardApi<'gateway, Gateway>) -> Self {
        Self { api }
    }

    /// Reads the board's complete membership.
    ///
    /// # Errors
    ///
    /// Fails if any page fails; a partial index is never returned.
    pub async fn index_membership(&self, board: &BoardId) -> Result<MembershipIndex, BoardError> {
        let items = self.api.list_items(board).await?;
        let index = MembershipIndex::from_items(items);
        tracing::info!(board = %board, existing = index.len(), "indexed board items");
        Ok(index)
    }

    /// Adds each candidate not already on the board, in input order.
    ///
    /// Candidates without a content identifier, repeats within the list,
    /// and failed adds are counted as skipped. If membership cannot be read
    /// nothing is added: every candidate is counted as skipped and an
    /// [`RunStage::Index`] issue is recorded.
    pub async fn add_candidates(&self, board: &BoardId, candidates: &[CandidateItem]) -> AddReport {
        let mut report = AddReport::default();

        let mut index = match self.index_membership(board).await {
            Ok(index) => index,
            Err(error) => {
                report.skipped = candidates.len();
                report
                    .issues
                    .push(RunIssue::record(RunStage::Index, "board items", error));
                return report;
            }
        };

        let mut seen = BTreeSet::new();
        for (position, candidate) in candidates.iter().enumerate() {
            let label = candidate.label();
            let Some(content) = candidate.content_id() else {
                report.skip();
                report.issues.push(RunIssue::record(
                    RunStage::Add,
                    label,
                    BoardError::Manifest {
                        message: "candidate has no content id".to_owned(),
                    },
                ));
                continue;
            };

            if !seen.insert(content.clone()) {
                tracing::debug!(item = label, content = %content, "duplicate candidate, skipping");
                report.skip();
                continue;
            }

            if let Some(item) = index.item_for(content) {
                tracing::debug!(item = label, "already on board");
                report.skip();
                report.placements.push(Placement {
                    candidate: position,
                    item: item.clone(),
                    newly_added: false,
                });
                continue;
            }

            match self.api.add_item(board, content).await {
                Ok(item) => {
                    tracing::info!(item = label, item_id = %item, "added item");
                    index.insert(content.clone(), item.clone());
                    report.added = report.added.saturating_add(1);
                    report.placements.push(Placement {
                        candidate: position,
                        item,
                        newly_added: true,
                    });
                }
                Err(error) => {
                    report.skip();
                    report
                        .issues
                        .push(RunIssue::record(RunStage::Add, label, error));
                }
            }
        }

        report
    }

    /// Deletes board items whose content is not among `candidates`.
    ///
    /// Membership is re-read first. Items without content are left alone.
    /// Each deletion is independent; a failure is recorded and the rest
    /// proceed.
    pub async fn prune_stale(&self, board: &BoardId, candidates: &[CandidateItem]) -> PruneReport {
        let mut report = PruneReport::default();

        let items = match self.api.list_items(board).await {
            Ok(items) => items,
            Err(error) => {
                report
                    .issues
                    .push(RunIssue::record(RunStage::Prune, "board items", error));
                return report;
            }
        };

        let wanted: BTreeSet<&ContentId> = candidates
            .iter()
            .filter_map(CandidateItem::content_id)
            .collect();

        for item in items {
            let Some(content) = item.content_id.as_ref() else {
                continue;
            };
            if wanted.contains(content) {
                continue;
            }

            let label = item.title.as_deref().unwrap_or(content.as_str());
            match self.api.delete_item(board, &item.id).await {
                Ok(()) => {
                    tracing::info!(item = label, item_id = %item.id, "removed stale item");
                    report.removed = report.removed.saturating_add(1);
                }
                Err(error) => {
                    report.failed = report.failed.saturating_add(1);
                    report
                        .issues
                        .push(RunIssue::record(RunStage::Prune, label, error));
                }
            }
        }

        report
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
