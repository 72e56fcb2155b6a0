//! Database operations for card lists
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Every upload is written in a single transaction so a failed batch never
//! leaves a partial list behind.

use crate::models::{CardList, CardListItem, ResolvedCard};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `card_lists`: one row per uploaded list
/// - `card_list_items`: cards of a list, one row per (list, card), removed
///   together with their list
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS card_lists (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        -- Composite primary key: (list_id, card_id) keeps one entry per card per list
        CREATE TABLE IF NOT EXISTS card_list_items (
            list_id TEXT NOT NULL,
            card_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            set_code TEXT NOT NULL,
            set_name TEXT NOT NULL,
            collector_number TEXT NOT NULL,
            image_uris TEXT,
            price REAL NOT NULL DEFAULT 0 CHECK (price >= 0),
            foil_price REAL NOT NULL DEFAULT 0 CHECK (foil_price >= 0),
            quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity > 0),
            PRIMARY KEY (list_id, card_id),
            FOREIGN KEY (list_id) REFERENCES card_lists(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_card_list_items_position
            ON card_list_items(list_id, position);
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// Trivial liveness probe
pub fn ping(conn: &Connection) -> DbResult<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Generate an id and default display name for a new list
pub fn new_list_identity() -> (String, String) {
    let id = Uuid::new_v4().to_string();
    let name = format!("Card List {}", &id[..8]);
    (id, name)
}

/// Result of storing an uploaded list
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InsertResult {
    /// Distinct cards inserted as new items
    pub inserted: usize,
    /// Cards that matched an existing item and bumped its quantity
    pub incremented: usize,
}

/// Create a list and add all resolved cards to it.
///
/// A card already present in the list increments that item's quantity and
/// keeps the first-seen attributes. All writes share one transaction: on
/// any error the list and its items are rolled back.
pub fn create_card_list(
    conn: &mut Connection,
    list_id: &str,
    name: &str,
    cards: &[ResolvedCard],
) -> DbResult<InsertResult> {
    let tx = conn.transaction()?;
    let result = create_card_list_tx(&tx, list_id, name, cards)?;
    tx.commit()?;
    Ok(result)
}

fn create_card_list_tx(
    tx: &Transaction<'_>,
    list_id: &str,
    name: &str,
    cards: &[ResolvedCard],
) -> DbResult<InsertResult> {
    tx.execute(
        "INSERT INTO card_lists (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![list_id, name, chrono::Utc::now().to_rfc3339()],
    )?;
    log::info!("Created new card list: {}", list_id);

    let mut stmt = tx.prepare_cached(
        "INSERT INTO card_list_items
         (list_id, card_id, position, name, set_code, set_name, collector_number,
          image_uris, price, foil_price, quantity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1)
         ON CONFLICT(list_id, card_id) DO UPDATE SET quantity = quantity + 1",
    )?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = InsertResult::default();

    for card in cards {
        let is_new = seen.insert(card.id.as_str());
        let image_uris = serde_json::to_string(&card.image_uris)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        stmt.execute(params![
            list_id,
            &card.id,
            seen.len() as i64,
            &card.name,
            &card.set_code,
            &card.set_name,
            &card.collector_number,
            image_uris,
            card.price,
            card.foil_price,
        ])?;

        if is_new {
            result.inserted += 1;
        } else {
            log::debug!("Incremented quantity of {} in list {}", card.id, list_id);
            result.incremented += 1;
        }
    }

    log::info!(
        "Stored {} items for list {} ({} duplicates merged)",
        result.inserted,
        list_id,
        result.incremented
    );
    Ok(result)
}

/// Get a list with its items in first-seen order
pub fn get_card_list(conn: &Connection, list_id: &str) -> DbResult<Option<CardList>> {
    let header = conn
        .query_row(
            "SELECT id, name, created_at FROM card_lists WHERE id = ?1",
            params![list_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, created_at)) = header else {
        return Ok(None);
    };

    let items = get_card_list_items(conn, &id)?;
    Ok(Some(CardList {
        id,
        name,
        created_at,
        items,
    }))
}

fn get_card_list_items(conn: &Connection, list_id: &str) -> DbResult<Vec<CardListItem>> {
    let mut stmt = conn.prepare(
        "SELECT card_id, name, set_code, set_name, image_uris, price, foil_price,
                collector_number, quantity
         FROM card_list_items
         WHERE list_id = ?1
         ORDER BY position ASC",
    )?;

    let results: DbResult<Vec<CardListItem>> = stmt
        .query_map(params![list_id], |row| {
            let image_uris: Option<String> = row.get(4)?;
            Ok(CardListItem {
                id: row.get(0)?,
                name: row.get(1)?,
                set_code: row.get(2)?,
                set_name: row.get(3)?,
                image_uris: parse_image_uris(image_uris.as_deref())?,
                price: row.get(5)?,
                foil_price: row.get(6)?,
                collector_number: row.get(7)?,
                quantity: row.get(8)?,
            })
        })?
        .collect();
    results
}

fn parse_image_uris(raw: Option<&str>) -> DbResult<BTreeMap<String, String>> {
    match raw {
        None | Some("") => Ok(BTreeMap::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))),
    }
}

/// Check whether a list exists
pub fn card_list_exists(conn: &Connection, list_id: &str) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM card_lists WHERE id = ?1",
        params![list_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Rename a list. Returns false when no list has this id.
pub fn rename_card_list(conn: &Connection, list_id: &str, name: &str) -> DbResult<bool> {
    let updated = conn.execute(
        "UPDATE card_lists SET name = ?2 WHERE id = ?1",
        params![list_id, name],
    )?;
    if updated > 0 {
        log::info!("Renamed card list {} to {:?}", list_id, name);
    }
    Ok(updated > 0)
}

/// Delete a list together with its items. Returns false when no list has this id.
pub fn delete_card_list(conn: &Connection, list_id: &str) -> DbResult<bool> {
    let deleted = conn.execute("DELETE FROM card_lists WHERE id = ?1", params![list_id])?;
    if deleted > 0 {
        log::info!("Deleted card list {}", list_id);
    }
    Ok(deleted > 0)
}

/// Get total count of stored lists
pub fn get_card_list_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM card_lists", [], |row| row.get(0))
}


#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;
