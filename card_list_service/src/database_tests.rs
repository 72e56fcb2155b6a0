//! Tests for card list persistence

use super::test_support::{make_test_card, test_db};
use super::*;
use crate::models::RawCardRequest;

fn item_count(conn: &Connection, list_id: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM card_list_items WHERE list_id = ?1",
        params![list_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn init_schema_creates_tables() {
    let conn = test_db();

    for table in ["card_lists", "card_list_items"] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                params![table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "missing table {}", table);
    }
}

#[test]
fn init_schema_is_idempotent() {
    let conn = test_db();
    init_schema(&conn).unwrap();
    assert_eq!(get_card_list_count(&conn).unwrap(), 0);
}

#[test]
fn ping_succeeds_on_open_connection() {
    let conn = test_db();
    assert!(ping(&conn).is_ok());
}

#[test]
fn new_list_identity_uses_id_prefix() {
    let (id, name) = new_list_identity();
    assert_eq!(id.len(), 36);
    assert_eq!(name, format!("Card List {}", &id[..8]));

    let (other_id, _) = new_list_identity();
    assert_ne!(id, other_id);
}

#[test]
fn create_card_list_stores_items_in_order() {
    let mut conn = test_db();
    let cards = vec![
        make_test_card("c", "Counterspell"),
        make_test_card("a", "Ancestral Recall"),
        make_test_card("b", "Black Lotus"),
    ];

    let result = create_card_list(&mut conn, "list-1", "My List", &cards).unwrap();
    assert_eq!(
        result,
        InsertResult {
            inserted: 3,
            incremented: 0
        }
    );

    let list = get_card_list(&conn, "list-1").unwrap().unwrap();
    assert_eq!(list.name, "My List");
    assert!(!list.created_at.is_empty());
    let ids: Vec<&str> = list.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    assert_eq!(
        list.items[0].image_uris.get("normal").map(String::as_str),
        Some("https://example.com/c.jpg")
    );
    assert!((list.items[0].price - 1.25).abs() < 1e-9);
}

#[test]
fn duplicate_cards_increment_quantity() {
    let mut conn = test_db();
    let cards = vec![
        make_test_card("bolt", "Lightning Bolt"),
        make_test_card("ring", "Sol Ring"),
        make_test_card("bolt", "Lightning Bolt"),
        make_test_card("bolt", "Lightning Bolt"),
    ];

    let result = create_card_list(&mut conn, "list-1", "Dupes", &cards).unwrap();
    assert_eq!(result.inserted, 2);
    assert_eq!(result.incremented, 2);

    let list = get_card_list(&conn, "list-1").unwrap().unwrap();
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.items[0].id, "bolt");
    assert_eq!(list.items[0].quantity, 3);
    assert_eq!(list.items[1].quantity, 1);
    assert_eq!(list.total_quantity(), 4);
}

#[test]
fn first_seen_attributes_win() {
    let mut conn = test_db();
    let first = make_test_card("bolt", "Lightning Bolt");
    let mut second = make_test_card("bolt", "Lightning Bolt (reprint data)");
    second.price = 99.0;
    second.set_name = "Other".to_string();

    create_card_list(&mut conn, "list-1", "List", &[first, second]).unwrap();

    let list = get_card_list(&conn, "list-1").unwrap().unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].name, "Lightning Bolt");
    assert_eq!(list.items[0].set_name, "Limited Edition Alpha");
    assert!((list.items[0].price - 1.25).abs() < 1e-9);
    assert_eq!(list.items[0].quantity, 2);
}

#[test]
fn upsert_is_scoped_per_list() {
    let mut conn = test_db();
    let bolt = make_test_card("bolt", "Lightning Bolt");

    create_card_list(&mut conn, "list-1", "One", &[bolt.clone()]).unwrap();
    create_card_list(&mut conn, "list-2", "Two", &[bolt.clone(), bolt]).unwrap();

    let one = get_card_list(&conn, "list-1").unwrap().unwrap();
    let two = get_card_list(&conn, "list-2").unwrap().unwrap();
    assert_eq!(one.items[0].quantity, 1);
    assert_eq!(two.items[0].quantity, 2);
}

#[test]
fn placeholders_are_kept_as_separate_items() {
    let mut conn = test_db();
    let request = RawCardRequest::new("Missing", "XXX", "");
    let cards = vec![
        ResolvedCard::placeholder(&request, 0),
        make_test_card("bolt", "Lightning Bolt"),
        ResolvedCard::placeholder(&request, 2),
    ];

    create_card_list(&mut conn, "list-1", "List", &cards).unwrap();

    let list = get_card_list(&conn, "list-1").unwrap().unwrap();
    assert_eq!(list.items.len(), 3);
    assert_eq!(list.items[0].id, "error_0");
    assert_eq!(list.items[0].set_name, "Unknown");
    assert!(list.items[0].image_uris.is_empty());
    assert_eq!(list.items[2].id, "error_2");
}

#[test]
fn empty_batch_creates_empty_list() {
    let mut conn = test_db();
    let result = create_card_list(&mut conn, "list-1", "Empty", &[]).unwrap();
    assert_eq!(result, InsertResult::default());

    let list = get_card_list(&conn, "list-1").unwrap().unwrap();
    assert!(list.items.is_empty());
}

#[test]
fn failure_mid_batch_rolls_back_everything() {
    let mut conn = test_db();
    // Reject one specific card to simulate a storage failure partway through
    conn.execute_batch(
        "CREATE TRIGGER reject_card BEFORE INSERT ON card_list_items
         WHEN NEW.card_id = 'boom'
         BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
    )
    .unwrap();

    let cards = vec![
        make_test_card("bolt", "Lightning Bolt"),
        make_test_card("ring", "Sol Ring"),
        make_test_card("boom", "Exploding Card"),
        make_test_card("lotus", "Black Lotus"),
    ];

    let result = create_card_list(&mut conn, "list-1", "Doomed", &cards);
    assert!(result.is_err());

    assert!(get_card_list(&conn, "list-1").unwrap().is_none());
    assert_eq!(item_count(&conn, "list-1"), 0);
    assert_eq!(get_card_list_count(&conn).unwrap(), 0);
}

#[test]
fn duplicate_list_id_is_rejected_without_touching_existing_list() {
    let mut conn = test_db();
    create_card_list(&mut conn, "list-1", "Original", &[make_test_card("a", "A")]).unwrap();

    let result = create_card_list(&mut conn, "list-1", "Clash", &[make_test_card("b", "B")]);
    assert!(result.is_err());

    let list = get_card_list(&conn, "list-1").unwrap().unwrap();
    assert_eq!(list.name, "Original");
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].id, "a");
}

#[test]
fn get_unknown_list_returns_none() {
    let conn = test_db();
    assert!(get_card_list(&conn, "does-not-exist").unwrap().is_none());
    assert!(!card_list_exists(&conn, "does-not-exist").unwrap());
}

#[test]
fn rename_updates_name_only() {
    let mut conn = test_db();
    create_card_list(&mut conn, "list-1", "Old", &[make_test_card("a", "A")]).unwrap();

    assert!(rename_card_list(&conn, "list-1", "New Name").unwrap());

    let list = get_card_list(&conn, "list-1").unwrap().unwrap();
    assert_eq!(list.name, "New Name");
    assert_eq!(list.items.len(), 1);
}

#[test]
fn rename_unknown_list_changes_nothing() {
    let mut conn = test_db();
    create_card_list(&mut conn, "list-1", "Keep", &[]).unwrap();

    assert!(!rename_card_list(&conn, "missing", "Whatever").unwrap());
    assert_eq!(get_card_list(&conn, "list-1").unwrap().unwrap().name, "Keep");
    assert_eq!(get_card_list_count(&conn).unwrap(), 1);
}

#[test]
fn delete_cascades_to_items() {
    let mut conn = test_db();
    let cards = vec![make_test_card("a", "A"), make_test_card("b", "B")];
    create_card_list(&mut conn, "list-1", "Gone", &cards).unwrap();
    create_card_list(&mut conn, "list-2", "Stays", &cards).unwrap();

    assert!(delete_card_list(&conn, "list-1").unwrap());
    assert!(!delete_card_list(&conn, "list-1").unwrap());

    assert_eq!(item_count(&conn, "list-1"), 0);
    assert_eq!(item_count(&conn, "list-2"), 2);
}

#[test]
fn items_require_existing_list() {
    let conn = test_db();
    let result = conn.execute(
        "INSERT INTO card_list_items
         (list_id, card_id, position, name, set_code, set_name, collector_number)
         VALUES ('orphan', 'x', 1, 'X', 'lea', 'Alpha', '1')",
        [],
    );
    assert!(result.is_err());
}
