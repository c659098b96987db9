//! Boardsync library crate for reconciling GitHub Projects V2 boards.
//!
//! Given a board owner and title, a set of desired custom fields, and a list
//! of candidate issues and pull requests, the library finds or creates the
//! board, ensures its schema, adds missing items, sets field values, links
//! repositories, and optionally prunes items that are no longer wanted.
//! Every GitHub call goes through the [`GraphQlGateway`] seam so the engine
//! can be driven by Octocrab in production and by fakes in tests.

pub mod board;
pub mod config;
pub mod github;
pub mod manifest;

pub use board::{
    BoardState, CandidateItem, FieldSpec, ReconcileRequest, ReconciliationEngine, RunIssue,
    RunStage, RunSummary, Visibility,
};
pub use config::BoardsyncConfig;
pub use github::{
    BoardError, GraphQlEndpoint, GraphQlGateway, GraphQlRequest, OctocrabGraphQlGateway,
    PersonalAccessToken, RepositorySlug,
};
pub use manifest::RunManifest;
