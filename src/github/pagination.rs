//! Cursor pagination for GitHub GraphQL connections.
//!
//! GraphQL connections return a page of `nodes` with a `pageInfo` object. The
//! types here decode that shape and track the cursor between requests so that
//! listing code can page until the connection is exhausted.

use serde::Deserialize;

use super::error::BoardError;

/// Maximum page size GitHub accepts for connection queries.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Page state for a GraphQL connection.
///
/// # Example
///
/// ```
/// use boardsync::github::pagination::PageInfo;
///
/// let info = PageInfo::new(true, Some("Y3Vyc29yOjEwMA==".to_owned()));
/// assert!(!info.is_last_page());
/// assert_eq!(info.next_cursor(), Some("Y3Vyc29yOjEwMA=="));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

impl PageInfo {
    /// Creates page info from its raw parts.
    #[must_use]
    pub const fn new(has_next_page: bool, end_cursor: Option<String>) -> Self {
        Self {
            has_next_page,
            end_cursor,
        }
    }

    /// Returns true if GitHub reported more pages.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Returns the cursor for the following page when one exists.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }

    /// Returns true if this is the final page.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        !self.has_next_page
    }
}

/// One page of a GraphQL connection.
///
/// GitHub returns `null` for nodes the token cannot see, so nodes are decoded
/// as options and dropped by [`Connection::into_parts`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
    #[serde(default)]
    page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Splits the connection into visible nodes and page state.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, PageInfo) {
        (self.nodes.into_iter().flatten().collect(), self.page_info)
    }
}

/// Tracks the cursor while walking a connection.
///
/// Guards against a server that keeps reporting `hasNextPage` without moving
/// the cursor, which would otherwise loop forever.
#[derive(Debug, Clone, Default)]
pub struct CursorWalk {
    cursor: Option<String>,
    pages: u32,
}

impl CursorWalk {
    /// Starts a walk at the first page.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: None,
            pages: 0,
        }
    }

    /// Cursor to send with the next request (`None` for the first page).
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Number of pages consumed so far.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.pages
    }

    /// Records a received page and reports whether another should be fetched.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Decode`] when GitHub reports more pages but
    /// returns a missing or repeated cursor.
    pub fn advance(&mut self, operation: &str, page: &PageInfo) -> Result<bool, BoardError> {
        self.pages = self.pages.saturating_add(1);
        if page.is_last_page() {
            return Ok(false);
        }

        let Some(next) = page.next_cursor() else {
            return Err(BoardError::Decode {
                operation: operation.to_owned(),
                message: "hasNextPage is true but endCursor is missing".to_owned(),
            });
        };

        if self.cursor.as_deref() == Some(next) {
            return Err(BoardError::Decode {
                operation: operation.to_owned(),
                message: format!("cursor {next:?} did not advance"),
            });
        }

        self.cursor = Some(next.to_owned());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Connection, CursorWalk, PageInfo};
    use crate::github::error::BoardError;

    #[rstest]
    fn connection_drops_null_nodes() {
        let connection: Connection<String> = serde_json::from_value(json!({
            "nodes": ["a", null, "b"],
            "pageInfo": { "hasNextPage": false, "endCursor": null }
        }))
        .expect("connection should decode");

        let (nodes, page) = connection.into_parts();
        assert_eq!(nodes, vec!["a".to_owned(), "b".to_owned()]);
        assert!(page.is_last_page());
    }

    #[rstest]
    fn walk_stops_on_last_page() {
        let mut walk = CursorWalk::new();
        let more = walk
            .advance("items", &PageInfo::new(true, Some("c1".to_owned())))
            .expect("first page should advance");
        assert!(more);
        assert_eq!(walk.cursor(), Some("c1"));

        let done = walk
            .advance("items", &PageInfo::new(false, Some("c2".to_owned())))
            .expect("last page should succeed");
        assert!(!done);
        assert_eq!(walk.pages(), 2);
    }

    #[rstest]
    #[case::missing_cursor(None)]
    #[case::repeated_cursor(Some("c1"))]
    fn walk_rejects_stuck_cursor(#[case] second: Option<&str>) {
        let mut walk = CursorWalk::new();
        walk.advance("items", &PageInfo::new(true, Some("c1".to_owned())))
            .expect("first page should advance");

        let result = walk.advance("items", &PageInfo::new(true, second.map(str::to_owned)));
        assert!(
            matches!(result, Err(BoardError::Decode { .. })),
            "expected Decode error, got {result:?}"
        );
    }
}
