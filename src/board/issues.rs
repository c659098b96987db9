//! Non-fatal problems collected during a reconciliation run.

use std::fmt;

use crate::github::error::BoardError;

/// Step of the run in which an issue occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Setting board visibility.
    Visibility,
    /// Reading or creating fields.
    Schema,
    /// Reading board membership before adding.
    Index,
    /// Adding a candidate.
    Add,
    /// Setting a field value.
    FieldValue,
    /// Linking a repository.
    Link,
    /// Removing a stale item.
    Prune,
}

impl RunStage {
    /// Short lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visibility => "visibility",
            Self::Schema => "schema",
            Self::Index => "index",
            Self::Add => "add",
            Self::FieldValue => "field value",
            Self::Link => "link",
            Self::Prune => "prune",
        }
    }
}

/// A degraded failure scoped to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIssue {
    /// Step that failed.
    pub stage: RunStage,
    /// Entity affected: field name, item label, repository, and so on.
    pub subject: String,
    /// Underlying error.
    pub error: BoardError,
}

impl RunIssue {
    /// Records an issue and logs it at `warn`.
    #[must_use]
    pub fn record(stage: RunStage, subject: impl Into<String>, error: BoardError) -> Self {
        let issue = Self {
            stage,
            subject: subject.into(),
            error,
        };
        tracing::warn!(
            stage = issue.stage.as_str(),
            subject = %issue.subject,
            rate_limited = issue.error.is_rate_limited(),
            "{}",
            issue.error
        );
        issue
    }

    /// Returns true when the failure was GitHub throttling.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        self.error.is_rate_limited()
    }
}

impl fmt::Display for RunIssue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{stage} {subject}: {error}",
            stage = self.stage.as_str(),
            subject = self.subject,
            error = self.error
        )
    }
}
