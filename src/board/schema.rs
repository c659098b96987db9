//! Board schema reconciliation.
//!
//! Missing fields are created; fields that already exist are never modified.
//! A single-select field that lacks some requested options is reported as an
//! [`OptionGap`] instead of patched, because changing options on a live board
//! can orphan the values items already carry.

use crate::github::gateway::GraphQlGateway;

use super::api::BoardApi;
use super::issues::{RunIssue, RunStage};
use super::models::{BoardId, BoardSchema, FieldDataType, FieldSpec};

/// A single-select field missing some requested options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGap {
    /// Field display name.
    pub field: String,
    /// Requested options with no case-insensitive match on the board.
    pub missing: usize,
    /// Number of options requested.
    pub requested: usize,
}

/// Outcome of [`SchemaResolver::ensure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Up-to-date name-keyed field table.
    pub schema: BoardSchema,
    /// Names of fields created during this run.
    pub created: Vec<String>,
    /// Option divergence found on existing fields.
    pub option_gaps: Vec<OptionGap>,
    /// Read and creation failures.
    pub issues: Vec<RunIssue>,
}

impl SchemaReport {
    /// Returns true when every requested field is present in the schema.
    #[must_use]
    pub fn is_complete(&self, specs: &[FieldSpec]) -> bool {
        specs.iter().all(|spec| self.schema.contains(&spec.name))
    }
}

/// Ensures a board carries a desired set of fields.
pub struct SchemaResolver<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    api: &'api BoardApi<'gateway, Gateway>,
}

impl<'api, 'gateway, Gateway> SchemaResolver<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    /// Creates a resolver using `api`.
    #[must_use]
    pub const fn new(api: &'api BoardApi<'gateway, Gateway>) -> Self {
        Self { api }
    }

    /// Reads the board's fields once and creates any that `specs` name but
    /// the board lacks.
    ///
    /// Never fails: read and creation errors are recorded in the report and
    /// the affected fields are simply absent from the returned schema.
    pub async fn ensure(&self, board: &BoardId, specs: &[FieldSpec]) -> SchemaReport {
        let mut report = SchemaReport::default();

        match self.api.list_fields(board).await {
            Ok(schema) => report.schema = schema,
            Err(error) => report
                .issues
                .push(RunIssue::record(RunStage::Schema, "existing fields", error)),
        }

        for spec in specs {
            if report.schema.contains(&spec.name) {
                Self::check_existing(&mut report, spec);
                continue;
            }

            tracing::info!(
                field = %spec.name,
                data_type = spec.data_type.as_api_str(),
                options = spec.options.len(),
                "creating field"
            );
            match self.api.create_field(board, spec).await {
                Ok(definition) => {
                    tracing::info!(field = %definition.name, id = %definition.id, "created field");
                    report.created.push(spec.name.clone());
                    report.schema.insert(definition);
                }
                Err(error) => {
                    report
                        .issues
                        .push(RunIssue::record(RunStage::Schema, spec.name.as_str(), error));
                }
            }
        }

        report
    }

    fn check_existing(report: &mut SchemaReport, spec: &FieldSpec) {
        let Some(existing) = report.schema.get(&spec.name) else {
            return;
        };

        if spec.data_type == FieldDataType::SingleSelect
            && existing.data_type != FieldDataType::SingleSelect
        {
            tracing::warn!(
                field = %spec.name,
                existing = existing.data_type.as_api_str(),
                "field exists with a different data type; leaving it unchanged"
            );
            return;
        }

        if spec.data_type != FieldDataType::SingleSelect || spec.options.is_empty() {
            tracing::debug!(field = %spec.name, "field already exists");
            return;
        }

        let missing = existing.missing_options(&spec.options);
        if missing == 0 {
            tracing::debug!(
                field = %spec.name,
                options = existing.options.len(),
                "field already exists"
            );
            return;
        }

        tracing::warn!(
            field = %spec.name,
            missing,
            requested = spec.options.len(),
            "field is missing options; delete the field on the board and re-run to recreate it"
        );
        report.option_gaps.push(OptionGap {
            field: spec.name.clone(),
            missing,
            requested: spec.options.len(),
        });
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
