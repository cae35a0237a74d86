//! Change feed download messages.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopsync_core::timestamp;

/// Parameters of a change feed request.
///
/// `since` is the client-owned cursor, carried as the raw wire string so the
/// server owns its parsing (and its error reporting). A missing or empty
/// `since` asks for the full table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangesQuery {
    /// Cursor: only rows with `last_modified_at` strictly after this are
    /// returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// Restrict the feed to one shop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<i64>,
    /// Client-requested page cap; the server clamps it to its own maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ChangesQuery {
    /// A query for everything: no cursor, no filters.
    pub fn full() -> Self {
        Self::default()
    }

    /// A query for rows modified strictly after `since`.
    pub fn since(since: &str) -> Self {
        Self {
            since: Some(since.to_string()),
            ..Self::default()
        }
    }

    /// Restricts the query to one shop.
    pub fn with_shop(mut self, shop_id: i64) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    /// Caps the page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of the change feed for a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangesResponse<T> {
    /// Always `true`; failures use [`ErrorResponse`](crate::ErrorResponse).
    pub success: bool,
    /// The changed rows, newest first.
    pub entities: Vec<T>,
    /// Number of rows in this page.
    pub count: usize,
    /// The cursor the page was computed against, echoed back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// Server time the page was produced; the client's next cursor.
    #[serde(with = "timestamp::wire")]
    pub timestamp: NaiveDateTime,
}

impl<T> ChangesResponse<T> {
    /// Builds a page, filling `count` from the rows.
    pub fn new(entities: Vec<T>, since: Option<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            success: true,
            count: entities.len(),
            entities,
            since,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_count_and_cursor() {
        let page = ChangesResponse::new(
            vec!["a", "b"],
            Some("2024-05-01 10:00:00".to_string()),
            timestamp::parse("2024-05-01 10:05:00").unwrap(),
        );

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 2);
        assert_eq!(json["since"], "2024-05-01 10:00:00");
        assert_eq!(json["timestamp"], "2024-05-01 10:05:00");
    }

    #[test]
    fn query_omits_absent_fields() {
        let json = serde_json::to_value(ChangesQuery::full()).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let json =
            serde_json::to_value(ChangesQuery::since("2024-05-01 10:00:00").with_shop(3)).unwrap();
        assert_eq!(json["shop_id"], 3);
        assert!(json.get("limit").is_none());
    }
}
