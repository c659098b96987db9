//! Mapping of desired field values onto destination fields and options.
//!
//! Values arrive as display strings keyed by field name. They are resolved
//! against the destination schema at apply time: text passes through, and
//! single-select values become the destination board's own option
//! identifier. Fields of any other data type are never written. Options are
//! never created here; see [`super::schema`].

use std::collections::BTreeMap;
use std::fmt;

use crate::github::gateway::GraphQlGateway;

use super::api::BoardApi;
use super::issues::{RunIssue, RunStage};
use super::models::{BoardId, BoardSchema, FieldDataType, FieldDefinition, FieldValue, ItemId};

/// How one desired value resolves against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'schema> {
    /// Issue a mutation setting `value` on `field`.
    Apply {
        /// Destination field.
        field: &'schema FieldDefinition,
        /// Resolved value.
        value: FieldValue,
    },
    /// The desired value is empty; leave the field as it is.
    SkipEmpty,
    /// No destination field has this name.
    UnknownField,
    /// The destination single-select field has no option with this name.
    UnknownOption,
    /// The destination field is neither text nor single-select.
    UnsupportedType,
}

/// Resolves `desired` for the field called `name`.
///
/// # Example
///
/// ```
/// use boardsync::board::mapper::{Resolution, resolve};
/// use boardsync::board::models::BoardSchema;
///
/// let schema = BoardSchema::default();
/// assert_eq!(resolve(&schema, "Status", ""), Resolution::SkipEmpty);
/// assert_eq!(resolve(&schema, "Status", "Done"), Resolution::UnknownField);
/// ```
#[must_use]
pub fn resolve<'schema>(
    schema: &'schema BoardSchema,
    name: &str,
    desired: &str,
) -> Resolution<'schema> {
    if desired.is_empty() {
        return Resolution::SkipEmpty;
    }

    let Some(field) = schema.get(name) else {
        return Resolution::UnknownField;
    };

    match field.data_type {
        FieldDataType::SingleSelect => field.option_named(desired).map_or(
            Resolution::UnknownOption,
            |option| Resolution::Apply {
                field,
                value: FieldValue::SingleSelect(option.id.clone()),
            },
        ),
        FieldDataType::Text => Resolution::Apply {
            field,
            value: FieldValue::Text(desired.to_owned()),
        },
        FieldDataType::Other(_) => Resolution::UnsupportedType,
    }
}

/// A value that could not be mapped and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingWarning {
    /// The destination board has no such field.
    UnknownField {
        /// Item label.
        item: String,
        /// Field name.
        field: String,
    },
    /// The destination field has no such option.
    UnknownOption {
        /// Item label.
        item: String,
        /// Field name.
        field: String,
        /// Desired option name.
        option: String,
    },
    /// The destination field's data type is not written by the engine.
    UnsupportedType {
        /// Item label.
        item: String,
        /// Field name.
        field: String,
        /// GraphQL data type of the destination field.
        data_type: String,
    },
}

impl MappingWarning {
    /// Name of the field the warning concerns.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::UnknownField { field, .. }
            | Self::UnknownOption { field, .. }
            | Self::UnsupportedType { field, .. } => field,
        }
    }
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { item, field } => {
                write!(formatter, "{item}: field {field:?} not found on destination board")
            }
            Self::UnknownOption {
                item,
                field,
                option,
            } => write!(formatter, "{item}: option {option:?} not found for field {field:?}"),
            Self::UnsupportedType {
                item,
                field,
                data_type,
            } => write!(formatter, "{item}: field {field:?} has unsupported type {data_type}"),
        }
    }
}

/// Outcome of applying field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingReport {
    /// Mutations that succeeded.
    pub applied: usize,
    /// Values skipped because they were empty.
    pub skipped_empty: usize,
    /// Values skipped because they could not be resolved.
    pub warnings: Vec<MappingWarning>,
    /// Mutations that failed.
    pub issues: Vec<RunIssue>,
}

impl MappingReport {
    /// Folds another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.applied = self.applied.saturating_add(other.applied);
        self.skipped_empty = self.skipped_empty.saturating_add(other.skipped_empty);
        self.warnings.extend(other.warnings);
        self.issues.extend(other.issues);
    }
}

/// Applies desired field values to board items.
pub struct FieldValueMapper<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    api: &'api BoardApi<'gateway, Gateway>,
}

impl<'api, 'gateway, Gateway> FieldValueMapper<'api, 'gateway, Gateway>
where
    Gateway: GraphQlGateway + ?Sized,
{
    /// Creates a mapper using `api`.
    #[must_use]
    pub const fn new(api: &'api BoardApi<'gateway, Gateway>) -> Self {
        Self { api }
    }

    /// Applies each entry of `fields` to `item`, in field-name order.
    ///
    /// Every entry is independent: an unresolvable value or a failed
    /// mutation is recorded and the remaining entries are still processed.
    pub async fn apply_item(
        &self,
        board: &BoardId,
        item: &ItemId,
        label: &str,
        schema: &BoardSchema,
        fields: &BTreeMap<String, String>,
    ) -> MappingReport {
        let mut report = MappingReport::default();

        for (name, desired) in fields {
            match resolve(schema, name, desired) {
                Resolution::SkipEmpty => {
                    report.skipped_empty = report.skipped_empty.saturating_add(1);
                }
                Resolution::UnknownField => {
                    tracing::warn!(item = label, field = %name, "field not found on destination board, skipping");
                    report.warnings.push(MappingWarning::UnknownField {
                        item: label.to_owned(),
                        field: name.clone(),
                    });
                }
                Resolution::UnknownOption => {
                    tracing::warn!(item = label, field = %name, option = %desired, "option not found, skipping");
                    report.warnings.push(MappingWarning::UnknownOption {
                        item: label.to_owned(),
                        field: name.clone(),
                        option: desired.clone(),
                    });
                }
                Resolution::UnsupportedType => {
                    let data_type = schema
                        .get(name)
                        .map(|field| field.data_type.as_api_str().to_owned())
                        .unwrap_or_default();
                    tracing::warn!(item = label, field = %name, data_type = %data_type, "field type not supported, skipping");
                    report.warnings.push(MappingWarning::UnsupportedType {
                        item: label.to_owned(),
                        field: name.clone(),
                        data_type,
                    });
                }
                Resolution::Apply { field, value } => {
                    match self
                        .api
                        .update_item_field(board, item, &field.id, &value)
                        .await
                    {
                        Ok(()) => {
                            tracing::debug!(item = label, field = %name, value = %desired, "set field value");
                            report.applied = report.applied.saturating_add(1);
                        }
                        Err(error) => report.issues.push(RunIssue::record(
                            RunStage::FieldValue,
                            format!("{label} {name}={desired}"),
                            error,
                        )),
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
