//! End-to-end reconciliation of one destination board.
//!
//! A run resolves the board, brings its visibility and schema in line, adds
//! missing candidates, applies field values, links repositories, and
//! optionally prunes stale items. Only board resolution is fatal; every
//! later failure is scoped to one entity and collected in the
//! [`RunSummary`].

use std::fmt;

use crate::github::error::BoardError;
use crate::github::gateway::GraphQlGateway;
use crate::github::locator::RepositorySlug;

use super::api::BoardApi;
use super::issues::{RunIssue, RunStage};
use super::link::RepositoryLinker;
use super::mapper::{FieldValueMapper, MappingReport, MappingWarning};
use super::models::{
    BoardId, BoardOwner, BoardSchema, CandidateItem, FieldSpec, ProjectBoard, Visibility,
};
use super::schema::{OptionGap, SchemaResolver};
use super::sync::{AddReport, ItemSynchronizer};

/// Desired state for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileRequest {
    /// Login of the user or organisation owning the board.
    pub owner: String,
    /// Board title; the board is matched by exact title.
    pub title: String,
    /// Visibility the board should have.
    pub visibility: Visibility,
    /// Fields the board should carry.
    pub fields: Vec<FieldSpec>,
    /// Items the board should contain, with desired field values.
    pub items: Vec<CandidateItem>,
    /// Repositories to link the board to.
    pub link_repositories: Vec<RepositorySlug>,
    /// Remove board items that are not candidates.
    pub sync: bool,
}

/// Whether the board existed before the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState {
    /// An existing board matched the title.
    Found,
    /// The board was created by this run.
    Created,
}

impl BoardState {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Created => "created",
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The reconciled board.
    pub board: ProjectBoard,
    /// Whether the board was found or created.
    pub board_state: BoardState,
    /// Fields created.
    pub fields_created: Vec<String>,
    /// Items added.
    pub added: usize,
    /// Candidates not added: already present, repeated, invalid, or failed.
    pub skipped: usize,
    /// Stale items removed; zero unless pruning ran.
    pub removed: usize,
    /// True when stale-item pruning ran.
    pub pruned: bool,
    /// Repositories linked.
    pub linked: usize,
    /// Repositories already linked.
    pub link_skipped: usize,
    /// Field-value mutations that succeeded.
    pub fields_applied: usize,
    /// Field values that could not be mapped.
    pub warnings: Vec<MappingWarning>,
    /// Existing single-select fields lacking requested options.
    pub option_gaps: Vec<OptionGap>,
    /// Degraded failures, in the order they happened.
    pub issues: Vec<RunIssue>,
}

impl RunSummary {
    fn new(board: ProjectBoard, board_state: BoardState) -> Self {
        Self {
            board,
            board_state,
            fields_created: Vec::new(),
            added: 0,
            skipped: 0,
            removed: 0,
            pruned: false,
            linked: 0,
            link_skipped: 0,
            fields_applied: 0,
            warnings: Vec::new(),
            option_gaps: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Returns true when no issue was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// First issue caused by GitHub throttling, if any.
    #[must_use]
    pub fn rate_limit_issue(&self) -> Option<&RunIssue> {
        self.issues.iter().find(|issue| issue.is_rate_limited())
    }

    fn absorb_adds(&mut self, report: &mut AddReport) {
        self.added = report.added;
        self.skipped = report.skipped;
        self.issues.append(&mut report.issues);
    }

    fn absorb_mapping(&mut self, report: MappingReport) {
        self.fields_applied = report.applied;
        self.warnings = report.warnings;
        self.issues.extend(report.issues);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            formatter,
            "Board {title:?} ({state}): {url}",
            title = self.board.title,
            state = self.board_state.as_str(),
            url = self.board.url
        )?;
        writeln!(
            formatter,
            "Items: {added} added, {skipped} skipped (already present or error)",
            added = self.added,
            skipped = self.skipped
        )?;
        writeln!(
            formatter,
            "Fields: {created} created, {applied} values set, {warnings} values skipped",
            created = self.fields_created.len(),
            applied = self.fields_applied,
            warnings = self.warnings.len()
        )?;
        writeln!(
            formatter,
            "Links: {linked} linked, {skipped} already linked",
            linked = self.linked,
            skipped = self.link_skipped
        )?;
        if self.pruned {
            writeln!(formatter, "Removed {} stale item(s)", self.removed)?;
        }
        for gap in &self.option_gaps {
            writeln!(
                formatter,
                "Field {field:?} is missing {missing} of {requested} options",
                field = gap.field,
                missing = gap.missing,
                requested = gap.requested
            )?;
        }
        if !self.issues.is_empty() {
            writeln!(formatter, "Issues ({}):", self.issues.len())?;
            for issue in &self.issues {
                writeln!(formatter, "  - {issue}")?;
            }
        }
        Ok(())
    }
}

/// Drives a reconciliation run against one gateway.
///
/// # Example
///
/// ```no_run
/// use boardsync::board::engine::{ReconcileRequest, ReconciliationEngine};
/// use boardsync::github::gateway::GraphQlGateway;
///
/// async fn reconcile(gateway: &dyn GraphQlGateway) {
///     let request = ReconcileRequest {
///         owner: "octocat".to_owned(),
///         title: "Enhancements".to_owned(),
///         ..ReconcileRequest::default()
///     };
///     match ReconciliationEngine::new(gateway).run(&request).await {
///         Ok(summary) => print!("{summary}"),
///         Err(error) => eprintln!("{error}"),
///     }
/// }
/// ```
pub struct ReconciliationEngine<'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    api: BoardApi<'gateway, Gateway>,
}

impl<'gateway, Gateway> ReconciliationEngine<'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    /// Creates an engine issuing requests through `gateway`.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self {
            api: BoardApi::new(gateway),
        }
    }

    /// Runs one reconciliation.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::BoardResolution`] when the board can neither be
    /// found nor created. Every other failure is recorded in the summary.
    pub async fn run(&self, request: &ReconcileRequest) -> Result<RunSummary, BoardError> {
        tracing::info!(owner = %request.owner, title = %request.title, "resolving board");
        let (board, board_state) =
            self.resolve_board(request)
                .await
                .map_err(|error| BoardError::BoardResolution {
                    owner: request.owner.clone(),
                    title: request.title.clone(),
                    message: error.to_string(),
                })?;
        tracing::info!(
            url = %board.url,
            state = board_state.as_str(),
            owner_kind = board.owner.kind.as_str(),
            "board resolved"
        );

        let mut summary = RunSummary::new(board, board_state);
        self.align_visibility(&mut summary, request.visibility).await;

        let board_id = summary.board.id.clone();
        let mut schema_report = SchemaResolver::new(&self.api)
            .ensure(&board_id, &request.fields)
            .await;
        summary.fields_created = std::mem::take(&mut schema_report.created);
        summary.option_gaps = std::mem::take(&mut schema_report.option_gaps);
        summary.issues.append(&mut schema_report.issues);

        tracing::info!(candidates = request.items.len(), "adding items");
        let mut add_report = ItemSynchronizer::new(&self.api)
            .add_candidates(&board_id, &request.items)
            .await;
        summary.absorb_adds(&mut add_report);
        tracing::info!(
            added = summary.added,
            skipped = summary.skipped,
            "items added"
        );

        let mapping = self
            .apply_field_values(&board_id, &schema_report.schema, &add_report, request)
            .await;
        summary.absorb_mapping(mapping);

        if !request.link_repositories.is_empty() {
            tracing::info!(
                repositories = request.link_repositories.len(),
                "linking repositories"
            );
            let mut link_report = RepositoryLinker::new(&self.api)
                .link_all(&board_id, &request.link_repositories)
                .await;
            summary.linked = link_report.linked;
            summary.link_skipped = link_report.skipped;
            summary.issues.append(&mut link_report.issues);
        }

        if request.sync {
            tracing::info!("removing stale items");
            let mut prune_report = ItemSynchronizer::new(&self.api)
                .prune_stale(&board_id, &request.items)
                .await;
            summary.pruned = true;
            summary.removed = prune_report.removed;
            summary.issues.append(&mut prune_report.issues);
            tracing::info!(
                removed = prune_report.removed,
                failed = prune_report.failed,
                "stale items removed"
            );
        }

        Ok(summary)
    }

    async fn resolve_board(
        &self,
        request: &ReconcileRequest,
    ) -> Result<(ProjectBoard, BoardState), BoardError> {
        if let Some(board) = self.api.find_board(&request.owner, &request.title).await? {
            return Ok((board, BoardState::Found));
        }

        tracing::info!(title = %request.title, "board not found, creating");
        let (owner_id, kind) = self.api.resolve_owner_id(&request.owner).await?;
        let owner = BoardOwner {
            login: request.owner.clone(),
            kind,
        };
        let board = self
            .api
            .create_board(owner, &owner_id, &request.title)
            .await?;
        Ok((board, BoardState::Created))
    }

    async fn align_visibility(&self, summary: &mut RunSummary, wanted: Visibility) {
        if summary.board_state == BoardState::Found && summary.board.visibility == wanted {
            return;
        }

        match self.api.set_visibility(&summary.board.id, wanted).await {
            Ok(visibility) => {
                tracing::info!(public = visibility.is_public(), "board visibility set");
                summary.board.visibility = visibility;
            }
            Err(error) => summary.issues.push(RunIssue::record(
                RunStage::Visibility,
                summary.board.title.as_str(),
                error,
            )),
        }
    }

    async fn apply_field_values(
        &self,
        board: &BoardId,
        schema: &BoardSchema,
        adds: &AddReport,
        request: &ReconcileRequest,
    ) -> MappingReport {
        let mapper = FieldValueMapper::new(&self.api);
        let mut report = MappingReport::default();

        for placement in &adds.placements {
            let Some(candidate) = request.items.get(placement.candidate) else {
                continue;
            };
            if candidate.fields.is_empty() {
                continue;
            }
            let item_report = mapper
                .apply_item(
                    board,
                    &placement.item,
                    candidate.label(),
                    schema,
                    &candidate.fields,
                )
                .await;
            report.merge(item_report);
        }

        report
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
