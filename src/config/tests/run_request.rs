//! Tests for repository lists, endpoints, and run request assembly.

use rstest::rstest;

use crate::BoardsyncConfig;
use crate::board::models::{CandidateItem, FieldSpec, Visibility};
use crate::github::error::BoardError;
use crate::manifest::RunManifest;

#[rstest]
fn link_repositories_qualify_bare_names_with_owner() {
    let config = BoardsyncConfig {
        board_owner: Some("kubernetes".to_owned()),
        link_repos: Some("enhancements, kubernetes-sigs/kind".to_owned()),
        ..Default::default()
    };

    let slugs: Vec<String> = config
        .link_repositories()
        .expect("repositories should parse")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(slugs, vec!["kubernetes/enhancements", "kubernetes-sigs/kind"]);
}

#[rstest]
fn link_repositories_default_to_empty() {
    let config = BoardsyncConfig::default();
    assert_eq!(config.link_repositories(), Ok(Vec::new()));
}

#[rstest]
fn bare_repository_without_owner_is_rejected() {
    let config = BoardsyncConfig {
        link_repos: Some("enhancements".to_owned()),
        ..Default::default()
    };

    assert!(matches!(
        config.link_repositories(),
        Err(BoardError::InvalidRepository(_))
    ));
}

#[rstest]
#[case::default(None, "https://api.github.com/", "/graphql")]
#[case::blank(Some(" "), "https://api.github.com/", "/graphql")]
#[case::enterprise(Some("https://ghe.example.com/api/v3"), "https://ghe.example.com/", "/api/graphql")]
fn graphql_endpoint_follows_api_base(
    #[case] api_base: Option<&str>,
    #[case] origin: &str,
    #[case] path: &str,
) {
    let config = BoardsyncConfig {
        api_base: api_base.map(str::to_owned),
        ..Default::default()
    };

    let endpoint = config.graphql_endpoint().expect("endpoint should parse");
    assert_eq!(endpoint.origin().as_str(), origin);
    assert_eq!(endpoint.path(), path);
}

#[rstest]
fn reconcile_request_combines_config_and_manifest() {
    let config = BoardsyncConfig {
        board_owner: Some("kubernetes".to_owned()),
        board_title: Some("SIG Auth".to_owned()),
        link_repos: Some("enhancements".to_owned()),
        sync: true,
        public: true,
        ..Default::default()
    };
    let manifest = RunManifest {
        fields: vec![FieldSpec::text("KEP")],
        items: vec![CandidateItem::new("I_1")],
    };

    let request = config
        .reconcile_request(manifest)
        .expect("request should build");

    assert_eq!(request.owner, "kubernetes");
    assert_eq!(request.title, "SIG Auth");
    assert_eq!(request.visibility, Visibility::Public);
    assert!(request.sync);
    assert_eq!(request.fields.len(), 1);
    assert_eq!(request.items.len(), 1);
    assert_eq!(request.link_repositories.len(), 1);
}
