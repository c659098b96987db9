//! Reconciliation of a GitHub Projects V2 board against a desired state.
//!
//! The [`engine::ReconciliationEngine`] drives one run: it finds or creates
//! the board, then delegates to the [`schema`], [`sync`], [`mapper`], and
//! [`link`] components. All GitHub traffic goes through [`api::BoardApi`],
//! which wraps a [`crate::github::GraphQlGateway`].

pub mod api;
pub mod engine;
pub mod issues;
pub mod link;
pub mod mapper;
pub mod models;
mod queries;
pub mod schema;
pub mod sync;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use engine::{BoardState, ReconcileRequest, ReconciliationEngine, RunSummary};
pub use issues::{RunIssue, RunStage};
pub use models::{CandidateItem, FieldSpec, Visibility};
