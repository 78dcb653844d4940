//! Conditional SurrealQL composition.
//!
//! Search endpoints assemble their WHERE clause, relevance projections,
//! and ordering from optional filters. The builder keeps clause text and
//! bound parameters together so the assembled statement never interpolates
//! user input.

use chrono::{DateTime, Utc};

/// A parameter value bound to a composed query.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
    DateTime(DateTime<Utc>),
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}
impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}
impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}
impl From<Vec<String>> for BindValue {
    fn from(v: Vec<String>) -> Self {
        Self::StrList(v)
    }
}
impl From<DateTime<Utc>> for BindValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

/// Incrementally composed `SELECT` statement.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    target: String,
    fields: Vec<String>,
    conditions: Vec<String>,
    order: Vec<String>,
    fetch: Vec<String>,
    binds: Vec<(String, BindValue)>,
    start: Option<u64>,
    limit: Option<u64>,
}

impl QueryBuilder {
    /// Starts a query against the given table or graph target.
    pub fn select(target: impl Into<String>) -> Self {
        Self { target: target.into(), ..Self::default() }
    }

    /// Adds a projection. Without any, the query selects `*`.
    pub fn field(mut self, expr: impl Into<String>) -> Self {
        self.fields.push(expr.into());
        self
    }

    /// Adds a `WHERE` conjunct. Clauses reference binds as `$name`.
    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.conditions.push(clause.into());
        self
    }

    /// Binds a parameter used by one of the clauses.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<BindValue>) -> Self {
        self.binds.push((name.into(), value.into()));
        self
    }

    /// Appends an `ORDER BY` term. Terms keep their insertion order, so
    /// relevance projections added first dominate the ranking.
    pub fn order(mut self, expr: impl Into<String>) -> Self {
        self.order.push(expr.into());
        self
    }

    /// Appends a `FETCH` target to inline referenced records.
    pub fn fetch(mut self, expr: impl Into<String>) -> Self {
        self.fetch.push(expr.into());
        self
    }

    /// Applies pagination: `page` is 1-based.
    pub const fn page(mut self, page: u64, per_page: u64) -> Self {
        self.start = Some(page.saturating_sub(1).saturating_mul(per_page));
        self.limit = Some(per_page);
        self
    }

    /// Bound parameters, in insertion order.
    #[must_use]
    pub fn binds(&self) -> &[(String, BindValue)] {
        &self.binds
    }

    /// Renders the full statement.
    #[must_use]
    pub fn build(&self) -> String {
        let fields = if self.fields.is_empty() { "*".to_owned() } else { self.fields.join(", ") };

        let mut sql = format!("SELECT {fields} FROM {}", self.target);

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(start) = self.start.filter(|s| *s > 0) {
            sql.push_str(&format!(" START {start}"));
        }
        if !self.fetch.is_empty() {
            sql.push_str(" FETCH ");
            sql.push_str(&self.fetch.join(", "));
        }
        sql.push(';');
        sql
    }

    /// Renders the matching row-count statement: same target and filters,
    /// no projections, ordering, or pagination.
    #[must_use]
    pub fn build_count(&self) -> String {
        let mut sql = format!("SELECT count() AS total FROM {}", self.target);
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(" GROUP ALL;");
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_query_selects_everything() {
        let q = QueryBuilder::select("artist");
        assert_eq!(q.build(), "SELECT * FROM artist;");
        assert!(q.binds().is_empty());
    }

    #[test]
    fn filters_join_with_and() {
        let q = QueryBuilder::select("opportunity")
            .filter("banned = false")
            .filter("deadline > $now")
            .bind("now", Utc::now());

        assert_eq!(
            q.build(),
            "SELECT * FROM opportunity WHERE banned = false AND deadline > $now;"
        );
        assert_eq!(q.binds().len(), 1);
    }

    #[test]
    fn relevance_order_precedes_fallback() {
        let q = QueryBuilder::select("artist")
            .field("*")
            .field("search::score(0) AS relevance")
            .filter("bio @0@ $kw")
            .bind("kw", "mural")
            .order("relevance DESC")
            .order("id DESC");

        let sql = q.build();
        assert!(sql.contains("search::score(0) AS relevance"));
        assert!(sql.ends_with("ORDER BY relevance DESC, id DESC;"));
    }

    #[test]
    fn pagination_renders_limit_and_start() {
        let q = QueryBuilder::select("news").page(3, 12);
        assert_eq!(q.build(), "SELECT * FROM news LIMIT 12 START 24;");

        let first_page = QueryBuilder::select("news").page(1, 12);
        assert_eq!(first_page.build(), "SELECT * FROM news LIMIT 12;");
    }

    #[test]
    fn count_query_keeps_filters_only() {
        let q = QueryBuilder::select("application")
            .field("id")
            .filter("status = $status")
            .bind("status", "sent")
            .order("id DESC")
            .page(2, 6);

        assert_eq!(
            q.build_count(),
            "SELECT count() AS total FROM application WHERE status = $status GROUP ALL;"
        );
    }

    #[test]
    fn fetch_clause_is_rendered_last() {
        let q = QueryBuilder::select("application").filter("artist = $a").fetch("opportunity");
        assert_eq!(
            q.build(),
            "SELECT * FROM application WHERE artist = $a FETCH opportunity;"
        );
    }
}
