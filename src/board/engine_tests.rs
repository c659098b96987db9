//! Unit tests for the reconciliation engine.

use std::time::Duration;

use rstest::{fixture, rstest};

use super::{BoardState, ReconcileRequest, ReconciliationEngine};
use crate::board::issues::RunStage;
use crate::board::models::{CandidateItem, FieldSpec, Visibility};
use crate::board::test_support::InMemoryBoard;
use crate::github::error::BoardError;
use crate::github::locator::RepositorySlug;

const BOARD: &str = "Enhancements";

#[fixture]
fn request() -> ReconcileRequest {
    ReconcileRequest {
        owner: "octo".to_owned(),
        title: BOARD.to_owned(),
        visibility: Visibility::Private,
        fields: vec![
            FieldSpec::single_select("Stage", ["Alpha", "Beta", "Stable"]),
            FieldSpec::text("KEP"),
        ],
        items: vec![
            CandidateItem::new("I_b")
                .with_title("B")
                .with_field("Stage", "beta")
                .with_field("KEP", "4321"),
            CandidateItem::new("I_c")
                .with_title("C")
                .with_field("Stage", "Alpha"),
        ],
        link_repositories: vec![RepositorySlug::parse("octo/enhancements").expect("valid slug")],
        sync: false,
    }
}

#[fixture]
fn github() -> InMemoryBoard {
    InMemoryBoard::new()
        .with_organization("octo")
        .with_repository("octo/enhancements")
}

#[rstest]
#[tokio::test]
async fn creates_and_populates_a_missing_board(github: InMemoryBoard, request: ReconcileRequest) {
    let public = ReconcileRequest {
        visibility: Visibility::Public,
        ..request
    };

    let summary = ReconciliationEngine::new(&github)
        .run(&public)
        .await
        .expect("run should succeed");

    assert_eq!(summary.board_state, BoardState::Created);
    assert_eq!(summary.board.visibility, Visibility::Public);
    assert_eq!(github.is_public(BOARD), Some(true));
    assert_eq!(summary.fields_created, vec!["Stage", "KEP"]);
    assert_eq!((summary.added, summary.skipped), (2, 0));
    assert_eq!(summary.fields_applied, 3);
    assert_eq!((summary.linked, summary.link_skipped), (1, 0));
    assert!(summary.is_clean(), "issues: {:?}", summary.issues);
    assert_eq!(
        github.field_value(BOARD, "I_b", "Stage"),
        Some("Beta".to_owned())
    );
    assert_eq!(github.field_value(BOARD, "I_b", "KEP"), Some("4321".to_owned()));
    assert_eq!(github.linked_repositories(BOARD), vec!["octo/enhancements"]);
}

#[rstest]
#[tokio::test]
async fn rerun_is_idempotent(github: InMemoryBoard, request: ReconcileRequest) {
    let engine = ReconciliationEngine::new(&github);
    engine.run(&request).await.expect("first run should succeed");

    let second = engine.run(&request).await.expect("second run should succeed");

    assert_eq!(second.board_state, BoardState::Found);
    assert_eq!((second.added, second.skipped), (0, 2));
    assert!(second.fields_created.is_empty());
    assert_eq!((second.linked, second.link_skipped), (0, 1));
    assert_eq!(github.boards_titled(BOARD), 1);
    assert_eq!(github.item_count(BOARD), 2);
    assert_eq!(github.call_count("set visibility"), 1);
}

#[rstest]
#[tokio::test]
async fn sync_prunes_items_outside_the_candidate_set(
    github: InMemoryBoard,
    request: ReconcileRequest,
) {
    let seeded = github
        .with_board("octo", BOARD, false)
        .with_item(BOARD, "I_a", "A")
        .with_item(BOARD, "I_b", "B");
    let syncing = ReconcileRequest {
        sync: true,
        ..request
    };

    let summary = ReconciliationEngine::new(&seeded)
        .run(&syncing)
        .await
        .expect("run should succeed");

    assert_eq!(summary.board_state, BoardState::Found);
    assert!(summary.pruned);
    assert_eq!(summary.removed, 1);
    assert_eq!((summary.added, summary.skipped), (1, 1));
    assert_eq!(seeded.item_contents(BOARD), vec!["I_b", "I_c"]);
    assert_eq!(seeded.call_count("set visibility"), 0);
    assert_eq!(
        seeded.field_value(BOARD, "I_b", "Stage"),
        Some("Beta".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn missing_option_is_warned_and_left_unset(github: InMemoryBoard, request: ReconcileRequest) {
    let seeded = github
        .with_board("octo", BOARD, false)
        .with_select_field(BOARD, "Stage", &["Alpha", "Stable"]);

    let summary = ReconciliationEngine::new(&seeded)
        .run(&request)
        .await
        .expect("run should succeed");

    assert_eq!(summary.option_gaps.len(), 1);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(seeded.field_value(BOARD, "I_b", "Stage"), None);
    assert_eq!(
        seeded.field_value(BOARD, "I_c", "Stage"),
        Some("Alpha".to_owned())
    );
    assert_eq!(seeded.option_names(BOARD, "Stage"), vec!["Alpha", "Stable"]);
}

#[rstest]
#[tokio::test]
async fn throttled_lookup_is_fatal_and_creates_nothing(
    github: InMemoryBoard,
    request: ReconcileRequest,
) {
    let throttled = github.rate_limited("find user boards", Some(Duration::from_secs(30)));

    let result = ReconciliationEngine::new(&throttled).run(&request).await;

    assert!(
        matches!(result, Err(BoardError::BoardResolution { ref title, .. }) if title == BOARD),
        "expected BoardResolution, got {result:?}"
    );
    assert_eq!(throttled.call_count("create board"), 0);
    assert_eq!(throttled.boards_titled(BOARD), 0);
}

#[rstest]
#[tokio::test]
async fn degraded_failures_are_collected(github: InMemoryBoard, request: ReconcileRequest) {
    let flaky = github
        .rate_limited("set visibility", Some(Duration::from_secs(5)))
        .failing_add("I_c");

    let summary = ReconciliationEngine::new(&flaky)
        .run(&request)
        .await
        .expect("run should succeed despite degraded failures");

    let stages: Vec<RunStage> = summary.issues.iter().map(|issue| issue.stage).collect();
    assert_eq!(stages, vec![RunStage::Visibility, RunStage::Add]);
    assert_eq!((summary.added, summary.skipped), (1, 1));
    assert_eq!(
        summary.rate_limit_issue().map(|issue| issue.error.retry_after()),
        Some(Some(Duration::from_secs(5)))
    );
    assert!(summary.to_string().contains("Issues (2):"));

    flaky.clear_failures();
    let retry = ReconciliationEngine::new(&flaky)
        .run(&request)
        .await
        .expect("retry should succeed");
    assert_eq!((retry.added, retry.skipped), (1, 1));
    assert!(retry.is_clean(), "issues: {:?}", retry.issues);
    assert_eq!(flaky.item_contents(BOARD), vec!["I_b", "I_c"]);
}
