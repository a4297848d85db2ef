//! Shared GraphQL response types used across commands.

use serde::Deserialize;

/// A page of nodes from a Linear connection.
#[derive(Deserialize)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
}

impl<T> Connection<T> {
    /// Cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.page_info
            .as_ref()
            .filter(|info| info.has_next_page)
            .and_then(|info| info.end_cursor.as_deref())
    }
}

/// Pagination info for cursor-based pagination.
#[derive(Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cursor() {
        let page: Connection<u32> = serde_json::from_str(
            r#"{"nodes": [1, 2], "pageInfo": {"hasNextPage": true, "endCursor": "abc"}}"#,
        )
        .unwrap();
        assert_eq!(page.next_cursor(), Some("abc"));

        let last: Connection<u32> = serde_json::from_str(
            r#"{"nodes": [], "pageInfo": {"hasNextPage": false, "endCursor": "abc"}}"#,
        )
        .unwrap();
        assert_eq!(last.next_cursor(), None);

        let bare: Connection<u32> = serde_json::from_str(r#"{"nodes": [3]}"#).unwrap();
        assert_eq!(bare.next_cursor(), None);
    }
}
