mod changes;

#[cfg(test)]
mod tests;

pub use changes::{ChangeEvent, EventName};

use crate::review::ReviewItem;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// Table name used when none is configured
pub const DEFAULT_TABLE_NAME: &str = "ReviewHistoryTable";

/// Write side of the review table, as seen by the intake handler
pub trait ReviewTable: Send + Sync {
    fn put_item(&self, item: &ReviewItem) -> Result<EventName>;
}

/// SQLite-backed review table keyed by (product id, review id).
///
/// Every write also appends to an ordered change feed that consumers read
/// with [`ReviewStore::changes_since`] and resume through named checkpoints.
pub struct ReviewStore {
    conn: Mutex<Connection>,
    table: String,
}

impl ReviewStore {
    /// Create a new in-memory store
    pub fn new_in_memory(table: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        Self::with_connection(conn, table)
    }

    /// Open (or create) a store file
    pub fn open(path: &str, table: &str) -> Result<Self> {
        let conn =
            Connection::open(path).context(format!("Failed to open database at {}", path))?;
        Self::with_connection(conn, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let store = Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        match self.conn.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => bail!("review store connection lock poisoned"),
        }
    }

    fn init_schema(&self) -> Result<()> {
        let t = &self.table;
        self.conn()?
            .execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS "{t}" (
                    product_id TEXT NOT NULL,
                    review_id TEXT NOT NULL,
                    review TEXT NOT NULL,
                    timestamp INTEGER NOT NULL,
                    sentiment TEXT NOT NULL,
                    PRIMARY KEY (product_id, review_id)
                );

                CREATE TABLE IF NOT EXISTS "{t}_changes" (
                    sequence INTEGER PRIMARY KEY AUTOINCREMENT,
                    event_name TEXT NOT NULL,
                    product_id TEXT NOT NULL,
                    review_id TEXT NOT NULL,
                    new_image TEXT,
                    old_image TEXT
                );

                CREATE TABLE IF NOT EXISTS "{t}_checkpoints" (
                    consumer TEXT PRIMARY KEY,
                    sequence INTEGER NOT NULL
                );
                "#
            ))
            .context("Failed to initialize review table schema")?;
        Ok(())
    }

    /// Insert or replace an item, recording an INSERT or MODIFY change
    pub fn put_item(&self, item: &ReviewItem) -> Result<EventName> {
        let t = &self.table;
        let conn = self.conn()?;
        let tx = conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let old_image = select_item(&tx, t, &item.product_id, &item.review_id)?;
        let event_name = if old_image.is_some() {
            EventName::Modify
        } else {
            EventName::Insert
        };

        let sentiment = serde_json::to_string(&item.sentiment)?;
        tx.execute(
            &format!(
                r#"INSERT OR REPLACE INTO "{t}" (product_id, review_id, review, timestamp, sentiment)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#
            ),
            params![
                item.product_id,
                item.review_id,
                item.review,
                item.timestamp,
                sentiment
            ],
        )
        .context(format!("Failed to put review: {}", item.review_id))?;

        let new_image = serde_json::to_string(item)?;
        let old_image = old_image.map(|old| serde_json::to_string(&old)).transpose()?;
        append_change(&tx, t, event_name, &item.product_id, &item.review_id, Some(new_image), old_image)?;

        tx.commit().context("Failed to commit review")?;
        Ok(event_name)
    }

    /// Delete an item, recording a REMOVE change. Returns the removed item.
    pub fn delete_item(&self, product_id: &str, review_id: &str) -> Result<Option<ReviewItem>> {
        let t = &self.table;
        let conn = self.conn()?;
        let tx = conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let Some(old) = select_item(&tx, t, product_id, review_id)? else {
            return Ok(None);
        };

        tx.execute(
            &format!(r#"DELETE FROM "{t}" WHERE product_id = ?1 AND review_id = ?2"#),
            params![product_id, review_id],
        )
        .context(format!("Failed to delete review: {}", review_id))?;

        let old_image = serde_json::to_string(&old)?;
        append_change(&tx, t, EventName::Remove, product_id, review_id, None, Some(old_image))?;

        tx.commit().context("Failed to commit delete")?;
        Ok(Some(old))
    }

    pub fn get_item(&self, product_id: &str, review_id: &str) -> Result<Option<ReviewItem>> {
        let conn = self.conn()?;
        select_item(&conn, &self.table, product_id, review_id)
    }

    /// All reviews for a product, ordered by review id
    pub fn query_product(&self, product_id: &str) -> Result<Vec<ReviewItem>> {
        let t = &self.table;
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                r#"SELECT product_id, review_id, review, timestamp, sentiment FROM "{t}"
                   WHERE product_id = ?1 ORDER BY review_id"#
            ))
            .context("Failed to prepare statement")?;

        let rows = stmt
            .query_map(params![product_id], read_row)
            .context("Failed to query reviews")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect reviews")?;

        rows.into_iter().map(into_item).collect()
    }

    pub fn count(&self) -> Result<u64> {
        let t = &self.table;
        let count: i64 = self
            .conn()?
            .query_row(&format!(r#"SELECT COUNT(*) FROM "{t}""#), [], |row| row.get(0))
            .context("Failed to count reviews")?;
        Ok(count.max(0) as u64)
    }

    /// Change events with a sequence number greater than `after`, oldest first
    pub fn changes_since(&self, after: i64, limit: usize) -> Result<Vec<ChangeEvent>> {
        let t = &self.table;
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                r#"SELECT sequence, event_name, product_id, review_id, new_image, old_image
                   FROM "{t}_changes" WHERE sequence > ?1 ORDER BY sequence LIMIT ?2"#
            ))
            .context("Failed to prepare statement")?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![after, limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })
            .context("Failed to query change feed")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect change feed")?;

        rows.into_iter()
            .map(|(sequence, event_name, product_id, review_id, new_image, old_image)| -> Result<ChangeEvent> {
                Ok(ChangeEvent {
                    sequence,
                    event_name: event_name.parse()?,
                    product_id,
                    review_id,
                    new_image: new_image.map(|json| serde_json::from_str(&json)).transpose()?,
                    old_image: old_image.map(|json| serde_json::from_str(&json)).transpose()?,
                })
            })
            .collect()
    }

    /// Last sequence a consumer has fully processed (0 if it never ran)
    pub fn checkpoint(&self, consumer: &str) -> Result<i64> {
        let t = &self.table;
        let sequence: Option<i64> = self
            .conn()?
            .query_row(
                &format!(r#"SELECT sequence FROM "{t}_checkpoints" WHERE consumer = ?1"#),
                params![consumer],
                |row| row.get(0),
            )
            .optional()
            .context(format!("Failed to read checkpoint for {}", consumer))?;
        Ok(sequence.unwrap_or(0))
    }

    pub fn save_checkpoint(&self, consumer: &str, sequence: i64) -> Result<()> {
        let t = &self.table;
        self.conn()?
            .execute(
                &format!(
                    r#"INSERT INTO "{t}_checkpoints" (consumer, sequence) VALUES (?1, ?2)
                       ON CONFLICT(consumer) DO UPDATE SET sequence = excluded.sequence"#
                ),
                params![consumer, sequence],
            )
            .context(format!("Failed to save checkpoint for {}", consumer))?;
        Ok(())
    }
}

impl ReviewTable for ReviewStore {
    fn put_item(&self, item: &ReviewItem) -> Result<EventName> {
        ReviewStore::put_item(self, item)
    }
}

impl<T: ReviewTable + ?Sized> ReviewTable for Arc<T> {
    fn put_item(&self, item: &ReviewItem) -> Result<EventName> {
        (**self).put_item(item)
    }
}

type ItemRow = (String, String, String, i64, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn into_item((product_id, review_id, review, timestamp, sentiment): ItemRow) -> Result<ReviewItem> {
    Ok(ReviewItem {
        product_id,
        review_id,
        review,
        timestamp,
        sentiment: serde_json::from_str(&sentiment).context("Corrupt sentiment column")?,
    })
}

fn select_item(
    conn: &Connection,
    table: &str,
    product_id: &str,
    review_id: &str,
) -> Result<Option<ReviewItem>> {
    let row = conn
        .query_row(
            &format!(
                r#"SELECT product_id, review_id, review, timestamp, sentiment FROM "{table}"
                   WHERE product_id = ?1 AND review_id = ?2"#
            ),
            params![product_id, review_id],
            read_row,
        )
        .optional()
        .context(format!("Failed to read review: {}", review_id))?;

    row.map(into_item).transpose()
}

fn append_change(
    conn: &Connection,
    table: &str,
    event_name: EventName,
    product_id: &str,
    review_id: &str,
    new_image: Option<String>,
    old_image: Option<String>,
) -> Result<()> {
    conn.execute(
        &format!(
            r#"INSERT INTO "{table}_changes" (event_name, product_id, review_id, new_image, old_image)
               VALUES (?1, ?2, ?3, ?4, ?5)"#
        ),
        params![event_name.as_str(), product_id, review_id, new_image, old_image],
    )
    .context("Failed to append change event")?;
    Ok(())
}

/// Table names end up quoted inside SQL, so keep them to a safe alphabet
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 128 {
        bail!("invalid table name {:?}: must be 1..=128 characters", name);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        bail!(
            "invalid table name {:?}: only letters, digits, '_', '-' and '.' are allowed",
            name
        );
    }
    Ok(())
}
