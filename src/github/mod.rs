//! GitHub GraphQL transport and identity types.
//!
//! This module wraps Octocrab to post GraphQL documents, parses owner and
//! repository references, and maps transport failures into [`BoardError`]
//! variants. Throttling is reported as [`BoardError::RateLimited`] so callers
//! can tell it apart from ordinary failures.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod pagination;
pub mod rate_limit;

pub use error::BoardError;
pub use gateway::{GraphQlGateway, GraphQlRequest, OctocrabGraphQlGateway};
pub use locator::{GraphQlEndpoint, PersonalAccessToken, RepositorySlug};

#[cfg(test)]
pub use gateway::MockGraphQlGateway;
