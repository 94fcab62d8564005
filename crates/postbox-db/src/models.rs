//! Database row types. Kept apart from `postbox-types` so the storage
//! layout can change without touching the wire-facing model.

pub struct RecordRow {
    pub id: i64,
    pub date: String,
    pub username: String,
    pub message: String,
    pub created_at: String,
}
