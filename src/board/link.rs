//! Linking a board to repositories.

use crate::github::error::BoardError;
use crate::github::gateway::GraphQlGateway;
use crate::github::locator::RepositorySlug;

use super::api::BoardApi;
use super::issues::{RunIssue, RunStage};
use super::models::BoardId;

/// Outcome of [`RepositoryLinker::link_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Repositories linked during this run.
    pub linked: usize,
    /// Repositories GitHub reported as already linked.
    pub skipped: usize,
    /// Resolution and link failures.
    pub issues: Vec<RunIssue>,
}

/// Returns true when GitHub rejected a link because it already exists.
#[must_use]
pub fn is_already_linked(error: &BoardError) -> bool {
    let message = match error {
        BoardError::GraphQl { message } | BoardError::Api { message } => message,
        _ => return false,
    };
    let lowered = message.to_lowercase();
    lowered.contains("already linked") || lowered.contains("already exists")
}

/// Links a board to each configured repository.
pub struct RepositoryLinker<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    api: &'api BoardApi<'gateway, Gateway>,
}

impl<'api, 'gateway, Gateway> RepositoryLinker<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    /// Creates a linker using `api`.
    #[must_use]
    pub const fn new(api: &'api BoardApi<'gateway, Gateway>) -> Self {
        Self { api }
    }

    /// Links `board` to every repository in `repositories`, independently.
    pub async fn link_all(&self, board: &BoardId, repositories: &[RepositorySlug]) -> LinkReport {
        let mut report = LinkReport::default();

        for slug in repositories {
            let subject = slug.to_string();
            let outcome = match self.api.resolve_repository_id(slug).await {
                Ok(repository) => self.api.link_repository(board, &repository).await,
                Err(error) => Err(error),
            };

            match outcome {
                Ok(()) => {
                    tracing::info!(repository = %subject, "linked repository");
                    report.linked = report.linked.saturating_add(1);
                }
                Err(error) if is_already_linked(&error) => {
                    tracing::debug!(repository = %subject, "repository already linked");
                    report.skipped = report.skipped.saturating_add(1);
                }
                Err(error) => report
                    .issues
                    .push(RunIssue::record(RunStage::Link, subject, error)),
            }
        }

        report
    }
}
