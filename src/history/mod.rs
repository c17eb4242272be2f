//! Prediction history store
//!
//! A small SQLite log of past predictions. Access is plain open/write/close
//! with no locking; two simultaneous sessions may race, which is accepted
//! for a single-user tool.

use crate::data::EmployeeFeatures;
use crate::error::{Result, SalaryError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// One logged prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub features: EmployeeFeatures,
    pub predicted_salary: f64,
    pub model_r2: f64,
}

/// SQLite-backed prediction history
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (or create) the history database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts INTEGER NOT NULL,
                education TEXT NOT NULL,
                experience INTEGER NOT NULL,
                role TEXT NOT NULL,
                department TEXT NOT NULL,
                location TEXT NOT NULL,
                predicted_salary REAL NOT NULL,
                model_r2 REAL NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Append a prediction with the current UTC timestamp.
    pub fn insert(
        &self,
        features: &EmployeeFeatures,
        predicted_salary: f64,
        model_r2: f64,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO history
                (ts, education, experience, role, department, location,
                 predicted_salary, model_r2)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                Utc::now().timestamp(),
                features.education,
                features.experience,
                features.role,
                features.department,
                features.location,
                predicted_salary,
                model_r2,
            ],
        )?;
        Ok(())
    }

    /// All records, newest first.
    pub fn fetch(&self, limit: Option<usize>) -> Result<Vec<PredictionRecord>> {
        let mut sql = String::from(
            "SELECT id, ts, education, experience, role, department, location,
                    predicted_salary, model_r2
             FROM history ORDER BY ts DESC, id DESC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                EmployeeFeatures {
                    education: row.get(2)?,
                    experience: row.get(3)?,
                    role: row.get(4)?,
                    department: row.get(5)?,
                    location: row.get(6)?,
                },
                row.get::<_, f64>(7)?,
                row.get::<_, f64>(8)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, ts, features, predicted_salary, model_r2) = row?;
            let ts = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
                SalaryError::HistoryError(format!("record {} has invalid timestamp {}", id, ts))
            })?;
            records.push(PredictionRecord {
                id,
                ts,
                features,
                predicted_salary,
                model_r2,
            });
        }
        Ok(records)
    }

    /// Delete all records.
    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM history", [])?)
    }
}
