use crate::Database;
use crate::models::RecordRow;
use anyhow::Result;
use postbox_types::models::StoredRecord;

impl Database {
    /// Insert a record and return its row id.
    pub fn insert_record(&self, record: &StoredRecord) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO records (date, username, message) VALUES (?1, ?2, ?3)",
                (&record.date, &record.username, &record.message),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest records first.
    pub fn recent_records(&self, limit: u32) -> Result<Vec<RecordRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, date, username, message, created_at
                 FROM records
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], |row| {
                    Ok(RecordRow {
                        id: row.get(0)?,
                        date: row.get(1)?,
                        username: row.get(2)?,
                        message: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_records(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |r| r.get(0))?;
            Ok(count as u64)
        })
    }
}

impl From<RecordRow> for StoredRecord {
    fn from(row: RecordRow) -> Self {
        StoredRecord {
            date: row.date,
            username: row.username,
            message: row.message,
        }
    }
}
