//! Partial updates: optional request fields turned into a positional `SET` clause.

use serde::{Deserialize, Deserializer};
use sqlx::Sqlite;

use super::{encode_list, now_timestamp};

/// A field of an update request: either absent (leave stored value alone)
/// or present (overwrite, even with an empty value).
///
/// A missing key and an explicit JSON `null` both deserialize to `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Present(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Patch::Present(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Present(value) => Some(value),
            Patch::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Absent, Patch::Present)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

/// Collects `column = ?N` assignments for the present fields of a request.
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    timestamp_column: Option<&'static str>,
    assignments: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl UpdateBuilder {
    /// Builder that bumps `updated_at` whenever anything changes.
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            timestamp_column: Some("updated_at"),
            assignments: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builder for tables without an `updated_at` column.
    pub fn without_timestamp(table: &'static str) -> Self {
        Self {
            timestamp_column: None,
            ..Self::new(table)
        }
    }

    /// Assign `column` if the patch is present.
    pub fn set<T>(&mut self, column: &'static str, patch: &Patch<T>) -> &mut Self
    where
        T: Clone + Into<SqlValue>,
    {
        if let Patch::Present(value) = patch {
            self.push(column, value.clone().into());
        }
        self
    }

    /// Assign an ordered-list column; a present empty list is written as `[]`.
    pub fn set_list(&mut self, column: &'static str, patch: &Patch<Vec<String>>) -> &mut Self {
        if let Patch::Present(items) = patch {
            self.push(column, SqlValue::Text(encode_list(items)));
        }
        self
    }

    fn push(&mut self, column: &'static str, value: SqlValue) {
        self.assignments.push(column);
        self.values.push(value);
    }

    /// Number of field assignments collected so far (timestamp excluded).
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Produce the statement for row `id`, or `None` when no field was present.
    pub fn build(mut self, id: &str) -> Option<UpdateStatement> {
        if self.assignments.is_empty() {
            return None;
        }

        if let Some(column) = self.timestamp_column {
            self.push(column, SqlValue::Text(now_timestamp()));
        }

        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        self.values.push(SqlValue::Text(id.to_string()));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            self.table,
            set_clause,
            self.values.len()
        );

        Some(UpdateStatement {
            sql,
            values: self.values,
        })
    }
}

/// A ready-to-run `UPDATE` with its values in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl UpdateStatement {
    /// Execute against a pool or an open transaction; returns rows affected.
    pub async fn execute<'c, E>(&self, executor: E) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'c, Database = Sqlite>,
    {
        let mut query = sqlx::query(&self.sql);
        for value in &self.values {
            query = match value {
                SqlValue::Text(text) => query.bind(text.clone()),
                SqlValue::Integer(n) => query.bind(*n),
                SqlValue::Real(n) => query.bind(*n),
            };
        }
        Ok(query.execute(executor).await?.rows_affected())
    }
}
