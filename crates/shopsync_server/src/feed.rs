//! Change feed queries.

use crate::error::ServerResult;
use chrono::NaiveDateTime;
use shopsync_core::entity::SyncEntity;
use shopsync_core::{timestamp, HasTable, Store};
use shopsync_protocol::ChangesQuery;

/// Runs a change feed query against one entity's table.
///
/// Rows are included when their `last_modified_at` is strictly after the
/// cursor; a row stamped exactly at the cursor was already delivered by the
/// page that produced that cursor. No cursor means the full table.
///
/// The shop filter applies only to rows that carry a shop scope; global
/// entities like currency rates pass through untouched.
///
/// Pages are ordered newest first by business date, falling back to the
/// modification stamp, and truncated to `cap`. The client advances its
/// cursor to the server timestamp echoed with the page, so a truncated page
/// is caught up by the next request.
pub fn query_changes<T>(store: &Store, query: &ChangesQuery, cap: usize) -> ServerResult<Vec<T>>
where
    T: SyncEntity,
    Store: HasTable<T>,
{
    let since = timestamp::parse_cursor(query.since.as_deref())?;

    let mut rows: Vec<T> = store
        .snapshot::<T>()
        .into_iter()
        .filter(|row| match since {
            Some(cursor) => row.meta().last_modified_at > cursor,
            None => true,
        })
        .filter(|row| match (query.shop_id, row.shop_id()) {
            (Some(wanted), Some(shop)) => shop == wanted,
            _ => true,
        })
        .collect();

    rows.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
    rows.truncate(cap);

    tracing::debug!(
        entity = T::ENTITY,
        since = query.since.as_deref().unwrap_or("<full>"),
        count = rows.len(),
        "change feed page"
    );
    Ok(rows)
}

fn sort_key<T: SyncEntity>(row: &T) -> (NaiveDateTime, NaiveDateTime) {
    let modified = row.meta().last_modified_at;
    (row.business_timestamp().unwrap_or(modified), modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::entity::VirtualTransaction;

    fn transaction(reference: &str, shop_id: i64, modified: &str) -> VirtualTransaction {
        serde_json::from_value(serde_json::json!({
            "reference": reference,
            "montant_virtuel": 10.0,
            "montant_cash": 10.0,
            "sim_numero": "+243700000001",
            "shop_id": shop_id,
            "agent_id": 1,
            "date_enregistrement": modified,
            "last_modified_at": modified
        }))
        .unwrap()
    }

    fn seeded_store() -> Store {
        let store = Store::new();
        store
            .write(|txn: &mut shopsync_core::TableTxn<'_, VirtualTransaction>| {
                txn.insert(transaction("VT-1", 1, "2024-06-01 08:00:00"))?;
                txn.insert(transaction("VT-2", 1, "2024-06-01 09:00:00"))?;
                txn.insert(transaction("VT-3", 2, "2024-06-01 10:00:00"))
            })
            .unwrap();
        store
    }

    #[test]
    fn cursor_filtering_is_strict() {
        let store = seeded_store();

        let rows: Vec<VirtualTransaction> =
            query_changes(&store, &ChangesQuery::since("2024-06-01 09:00:00"), 1000).unwrap();

        // VT-2 sits exactly on the cursor and is excluded.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reference, "VT-3");
    }

    #[test]
    fn no_cursor_returns_everything_newest_first() {
        let store = seeded_store();

        let rows: Vec<VirtualTransaction> =
            query_changes(&store, &ChangesQuery::full(), 1000).unwrap();

        let refs: Vec<&str> = rows.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, vec!["VT-3", "VT-2", "VT-1"]);
    }

    #[test]
    fn transactions_order_by_modification_not_recording_date() {
        let store = seeded_store();
        // Recorded earliest, edited last: the edit puts it on top.
        let mut edited = transaction("VT-0", 1, "2024-05-20 08:00:00");
        edited.meta.last_modified_at =
            shopsync_core::timestamp::parse("2024-06-02 07:00:00").unwrap();
        store
            .write(|txn: &mut shopsync_core::TableTxn<'_, VirtualTransaction>| {
                txn.insert(edited)
            })
            .unwrap();

        let rows: Vec<VirtualTransaction> =
            query_changes(&store, &ChangesQuery::full(), 1000).unwrap();

        assert_eq!(rows[0].reference, "VT-0");
    }

    #[test]
    fn shop_filter_narrows_the_page() {
        let store = seeded_store();

        let rows: Vec<VirtualTransaction> =
            query_changes(&store, &ChangesQuery::full().with_shop(1), 1000).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.shop_id == 1));
    }

    #[test]
    fn cap_truncates_after_ordering() {
        let store = seeded_store();

        let rows: Vec<VirtualTransaction> =
            query_changes(&store, &ChangesQuery::full(), 2).unwrap();

        let refs: Vec<&str> = rows.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, vec!["VT-3", "VT-2"]);
    }

    #[test]
    fn malformed_cursor_is_rejected() {
        let store = seeded_store();

        let err = query_changes::<VirtualTransaction>(
            &store,
            &ChangesQuery::since("yesterday"),
            1000,
        )
        .unwrap_err();

        assert!(err.is_client_error());
    }
}
