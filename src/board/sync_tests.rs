//! Unit tests for item set synchronisation.

use rstest::{fixture, rstest};

use super::ItemSynchronizer;
use crate::board::api::BoardApi;
use crate::board::issues::RunStage;
use crate::board::models::{BoardId, CandidateItem};
use crate::board::test_support::InMemoryBoard;
use crate::github::error::BoardError;

const BOARD: &str = "Enhancements";

#[fixture]
fn github() -> InMemoryBoard {
    InMemoryBoard::new()
        .with_user("octo")
        .with_board("octo", BOARD, false)
        .with_item(BOARD, "I_a", "A")
        .with_item(BOARD, "I_b", "B")
}

async fn board_id(api: &BoardApi<'_, InMemoryBoard>) -> BoardId {
    api.find_board("octo", BOARD)
        .await
        .expect("lookup should succeed")
        .expect("board should exist")
        .id
}

fn candidates(ids: &[&str]) -> Vec<CandidateItem> {
    ids.iter().copied().map(CandidateItem::new).collect()
}

#[rstest]
#[tokio::test]
async fn adds_only_missing_candidates(github: InMemoryBoard) {
    let api = BoardApi::new(&github);
    let board = board_id(&api).await;

    let report = ItemSynchronizer::new(&api)
        .add_candidates(&board, &candidates(&["I_b", "I_c"]))
        .await;

    assert_eq!((report.added, report.skipped), (1, 1));
    assert_eq!(github.item_contents(BOARD), vec!["I_a", "I_b", "I_c"]);
    assert_eq!(github.call_count("add item"), 1);
    let placed: Vec<(usize, bool)> = report
        .placements
        .iter()
        .map(|placement| (placement.candidate, placement.newly_added))
        .collect();
    assert_eq!(placed, vec![(0, false), (1, true)]);
}

#[rstest]
#[tokio::test]
async fn repeated_run_adds_nothing(github: InMemoryBoard) {
    let api = BoardApi::new(&github);
    let board = board_id(&api).await;
    let wanted = candidates(&["I_c", "I_d"]);
    let synchronizer = ItemSynchronizer::new(&api);

    let first = synchronizer.add_candidates(&board, &wanted).await;
    let second = synchronizer.add_candidates(&board, &wanted).await;

    assert_eq!(first.added, 2);
    assert_eq!((second.added, second.skipped), (0, 2));
    assert_eq!(github.item_count(BOARD), 4);
}

#[rstest]
#[tokio::test]
async fn duplicates_and_invalid_candidates_are_skipped(github: InMemoryBoard) {
    let api = BoardApi::new(&github);
    let board = board_id(&api).await;
    let mut wanted = candidates(&["I_c", "I_c"]);
    wanted.push(CandidateItem::default().with_title("untracked"));

    let report = ItemSynchronizer::new(&api)
        .add_candidates(&board, &wanted)
        .await;

    assert_eq!((report.added, report.skipped), (1, 2));
    assert_eq!(report.issues.len(), 1);
    assert_eq!(
        report.issues.first().map(|issue| issue.subject.as_str()),
        Some("untracked")
    );
    assert_eq!(github.call_count("add item"), 1);
}

#[rstest]
#[tokio::test]
async fn failed_add_is_counted_and_others_proceed(github: InMemoryBoard) {
    let failing = github.failing_add("I_c");
    let api = BoardApi::new(&failing);
    let board = board_id(&api).await;

    let report = ItemSynchronizer::new(&api)
        .add_candidates(&board, &candidates(&["I_c", "I_d"]))
        .await;

    assert_eq!((report.added, report.skipped), (1, 1));
    assert_eq!(
        report.issues.first().map(|issue| issue.stage),
        Some(RunStage::Add)
    );
    assert_eq!(failing.item_contents(BOARD), vec!["I_a", "I_b", "I_d"]);
}

#[rstest]
#[tokio::test]
async fn unreadable_membership_aborts_adds(github: InMemoryBoard) {
    let failing = github.failing_operation(
        "list items",
        BoardError::Network {
            message: "connection reset".to_owned(),
        },
    );
    let api = BoardApi::new(&failing);
    let board = board_id(&api).await;

    let report = ItemSynchronizer::new(&api)
        .add_candidates(&board, &candidates(&["I_c", "I_d"]))
        .await;

    assert_eq!((report.added, report.skipped), (0, 2));
    assert_eq!(
        report.issues.first().map(|issue| issue.stage),
        Some(RunStage::Index)
    );
    assert_eq!(failing.call_count("add item"), 0);
}

#[tokio::test]
async fn membership_index_spans_pages() {
    let github = InMemoryBoard::new()
        .with_user("octo")
        .with_board("octo", BOARD, false)
        .with_item(BOARD, "I_a", "A")
        .with_item(BOARD, "I_b", "B")
        .with_item(BOARD, "I_c", "C")
        .with_redacted_item(BOARD)
        .with_page_size(2);
    let api = BoardApi::new(&github);
    let board = board_id(&api).await;

    let index = ItemSynchronizer::new(&api)
        .index_membership(&board)
        .await
        .expect("index should build");

    assert_eq!(index.len(), 3);
    assert_eq!(github.call_count("list items"), 2);
}

#[rstest]
#[tokio::test]
async fn prune_removes_exactly_the_stale_items(github: InMemoryBoard) {
    let redacted = github.with_redacted_item(BOARD);
    let api = BoardApi::new(&redacted);
    let board = board_id(&api).await;

    let report = ItemSynchronizer::new(&api)
        .prune_stale(&board, &candidates(&["I_b", "I_z"]))
        .await;

    assert_eq!((report.removed, report.failed), (1, 0));
    assert_eq!(redacted.item_contents(BOARD), vec!["I_b"]);
    assert_eq!(redacted.item_count(BOARD), 2);
}

#[rstest]
#[tokio::test]
async fn prune_failure_is_isolated(github: InMemoryBoard) {
    let failing = github.with_item(BOARD, "I_c", "C").failing_delete("I_a");
    let api = BoardApi::new(&failing);
    let board = board_id(&api).await;

    let report = ItemSynchronizer::new(&api)
        .prune_stale(&board, &candidates(&["I_b"]))
        .await;

    assert_eq!((report.removed, report.failed), (1, 1));
    assert_eq!(
        report.issues.first().map(|issue| issue.stage),
        Some(RunStage::Prune)
    );
    assert_eq!(failing.item_contents(BOARD), vec!["I_a", "I_b"]);
}

#[rstest]
#[tokio::test]
async fn drafts_are_never_indexed_or_pruned(github: InMemoryBoard) {
    let with_draft = github.with_draft_item(BOARD, "operator note");
    let api = BoardApi::new(&with_draft);
    let board = board_id(&api).await;
    let synchronizer = ItemSynchronizer::new(&api);

    let index = synchronizer
        .index_membership(&board)
        .await
        .expect("index should build");
    let report = synchronizer.prune_stale(&board, &[]).await;

    assert_eq!(index.len(), 2);
    assert_eq!((report.removed, report.failed), (2, 0));
    assert_eq!(with_draft.item_count(BOARD), 1);
    assert!(with_draft.item_contents(BOARD).is_empty());
}
