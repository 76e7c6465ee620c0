use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use phlam_schema::ConversationTurn;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

pub const DEFAULT_TIMEZONE: &str = "Asia/Bangkok";

/// Rolling memory cap per user; oldest turns evicted on append.
pub const TURN_CAP: usize = 10;

/// Per-user short-term memory and settings. All calls go through
/// `spawn_blocking`; callers treat failures as absence and keep the turn
/// alive.
#[derive(Clone)]
pub struct MemoryStore {
    db: Arc<Mutex<Connection>>,
}

impl MemoryStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        run_migrations(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Question of the most recent stored turn, if any.
    pub async fn previous_question(&self, user_id: i64) -> Result<Option<String>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = lock(&db)?;
            let question = conn
                .query_row(
                    "SELECT question FROM chat_turns WHERE user_id = ?1
                     ORDER BY id DESC LIMIT 1",
                    params![user_id],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(question)
        })
        .await?
    }

    /// Inserts a completed turn and evicts rows beyond [`TURN_CAP`].
    pub async fn append_turn(&self, turn: ConversationTurn) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = lock(&db)?;
            conn.execute(
                "INSERT INTO chat_turns (user_id, question, response, ts)
                 VALUES (?1, ?2, ?3, ?4)",
                params![turn.user_id, turn.question, turn.response, turn.at.to_rfc3339()],
            )?;
            conn.execute(
                "DELETE FROM chat_turns WHERE user_id = ?1 AND id NOT IN (
                     SELECT id FROM chat_turns WHERE user_id = ?1
                     ORDER BY id DESC LIMIT ?2
                 )",
                params![turn.user_id, TURN_CAP as i64],
            )?;
            Ok(())
        })
        .await?
    }

    /// Newest-last slice of recent turns.
    pub async fn recent_turns(&self, user_id: i64, limit: usize) -> Result<Vec<ConversationTurn>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = lock(&db)?;
            let mut stmt = conn.prepare(
                "SELECT user_id, question, response, ts FROM chat_turns
                 WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
            )?;
            let mut turns = stmt
                .query_map(params![user_id, limit as i64], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?
                .into_iter()
                .map(|(user_id, question, response, ts)| ConversationTurn {
                    user_id,
                    question,
                    response,
                    at: parse_ts(&ts),
                })
                .collect::<Vec<_>>();
            turns.reverse();
            Ok(turns)
        })
        .await?
    }

    /// Stored IANA zone name, or [`DEFAULT_TIMEZONE`].
    pub async fn timezone(&self, user_id: i64) -> Result<String> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = lock(&db)?;
            let zone = conn
                .query_row(
                    "SELECT timezone FROM user_settings WHERE user_id = ?1",
                    params![user_id],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(zone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()))
        })
        .await?
    }

    pub async fn set_timezone(&self, user_id: i64, zone: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let zone = zone.to_string();
        task::spawn_blocking(move || {
            let conn = lock(&db)?;
            conn.execute(
                "INSERT INTO user_settings (user_id, timezone) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET timezone = excluded.timezone",
                params![user_id, zone],
            )?;
            Ok(())
        })
        .await?
    }
}

fn lock(db: &Arc<Mutex<Connection>>) -> Result<std::sync::MutexGuard<'_, Connection>> {
    db.lock().map_err(|_| anyhow!("failed to lock sqlite connection"))
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chat_turns (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            question TEXT NOT NULL,
            response TEXT NOT NULL,
            ts TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_chat_turns_user ON chat_turns (user_id, id);
        CREATE TABLE IF NOT EXISTS user_settings (
            user_id INTEGER PRIMARY KEY,
            timezone TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(user_id: i64, q: &str, a: &str) -> ConversationTurn {
        ConversationTurn::new(user_id, q, a)
    }

    #[tokio::test]
    async fn previous_question_empty_store_is_none() {
        let store = MemoryStore::open_in_memory().unwrap();
        assert_eq!(store.previous_question(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn previous_question_returns_latest() {
        let store = MemoryStore::open_in_memory().unwrap();
        store.append_turn(turn(1, "คำถามแรก", "ตอบแรก")).await.unwrap();
        store.append_turn(turn(1, "คำถามสอง", "ตอบสอง")).await.unwrap();
        assert_eq!(
            store.previous_question(1).await.unwrap().as_deref(),
            Some("คำถามสอง")
        );
    }

    #[tokio::test]
    async fn turns_are_scoped_per_user() {
        let store = MemoryStore::open_in_memory().unwrap();
        store.append_turn(turn(1, "ของคนแรก", "a")).await.unwrap();
        store.append_turn(turn(2, "ของคนสอง", "b")).await.unwrap();
        assert_eq!(
            store.previous_question(1).await.unwrap().as_deref(),
            Some("ของคนแรก")
        );
        assert_eq!(
            store.previous_question(2).await.unwrap().as_deref(),
            Some("ของคนสอง")
        );
    }

    #[tokio::test]
    async fn append_evicts_oldest_beyond_cap() {
        let store = MemoryStore::open_in_memory().unwrap();
        for i in 0..(TURN_CAP + 3) {
            store
                .append_turn(turn(1, &format!("q{i}"), &format!("a{i}")))
                .await
                .unwrap();
        }
        let turns = store.recent_turns(1, 100).await.unwrap();
        assert_eq!(turns.len(), TURN_CAP);
        // Oldest evicted first: q0..q2 gone, newest kept.
        assert_eq!(turns.first().unwrap().question, "q3");
        assert_eq!(turns.last().unwrap().question, format!("q{}", TURN_CAP + 2));
    }

    #[tokio::test]
    async fn recent_turns_newest_last_order() {
        let store = MemoryStore::open_in_memory().unwrap();
        store.append_turn(turn(1, "q1", "a1")).await.unwrap();
        store.append_turn(turn(1, "q2", "a2")).await.unwrap();
        store.append_turn(turn(1, "q3", "a3")).await.unwrap();
        let turns = store.recent_turns(1, 2).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].question, "q2");
        assert_eq!(turns[1].question, "q3");
    }

    #[tokio::test]
    async fn timezone_defaults_to_bangkok() {
        let store = MemoryStore::open_in_memory().unwrap();
        assert_eq!(store.timezone(1).await.unwrap(), DEFAULT_TIMEZONE);
    }

    #[tokio::test]
    async fn timezone_set_and_overwrite() {
        let store = MemoryStore::open_in_memory().unwrap();
        store.set_timezone(1, "Asia/Tokyo").await.unwrap();
        assert_eq!(store.timezone(1).await.unwrap(), "Asia/Tokyo");
        store.set_timezone(1, "Europe/London").await.unwrap();
        assert_eq!(store.timezone(1).await.unwrap(), "Europe/London");
    }

    #[tokio::test]
    async fn open_on_disk_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.db");
        let path = path.to_str().unwrap();
        {
            let store = MemoryStore::open(path).unwrap();
            store.append_turn(turn(1, "คงอยู่", "ครับ")).await.unwrap();
        }
        let store = MemoryStore::open(path).unwrap();
        assert_eq!(
            store.previous_question(1).await.unwrap().as_deref(),
            Some("คงอยู่")
        );
    }
}
