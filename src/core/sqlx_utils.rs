use chrono::{DateTime, FixedOffset};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::{Query, QueryAs},
    Postgres,
};
use uuid::Uuid;

#[derive(Clone)]
pub enum SqlxBinds {
    String(String),
    OptionString(Option<String>),
    Int(i32),
    Bool(bool),
    Uuid(Uuid),
    DateTimeFixedOffset(DateTime<FixedOffset>),
}

pub fn binds_query(stmt: &str, binds: Vec<SqlxBinds>) -> Query<'_, Postgres, PgArguments> {
    let mut q: Query<'_, Postgres, PgArguments> = sqlx::query(stmt);
    for bind in binds.iter() {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val.clone()),
            SqlxBinds::OptionString(val) => q.bind(val.clone()),
            SqlxBinds::Int(val) => q.bind(*val),
            SqlxBinds::Bool(val) => q.bind(*val),
            SqlxBinds::Uuid(val) => q.bind(*val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(*val),
        };
    }
    q
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, PgRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Postgres, T, PgArguments> {
    let mut q: QueryAs<'_, Postgres, T, PgArguments> = sqlx::query_as(stmt);
    for bind in binds.iter() {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val.clone()),
            SqlxBinds::OptionString(val) => q.bind(val.clone()),
            SqlxBinds::Int(val) => q.bind(*val),
            SqlxBinds::Bool(val) => q.bind(*val),
            SqlxBinds::Uuid(val) => q.bind(*val),
            SqlxBinds::DateTimeFixedOffset(val) => q.bind(*val),
        };
    }
    q
}

pub fn query_builder(
    select: Option<String>,
    table_name: &str,
    wheres: &[String],
    order_by: Vec<String>,
    limit: Option<u32>,
    offset: Option<u64>,
) -> String {
    let mut stmt = "SELECT ".to_string();
    match select {
        Some(val) => stmt.push_str(&val),
        None => stmt.push('*'),
    }

    stmt.push_str(format!(" FROM {}", table_name).as_str());

    if !wheres.is_empty() {
        stmt.push_str(" WHERE ");
        stmt.push_str(&wheres.join(" AND "));
    }

    if !order_by.is_empty() {
        stmt.push_str(" ORDER BY ");
        stmt.push_str(&order_by.join(", "));
    }

    if let Some(limit) = limit {
        stmt.push_str(format!(" LIMIT {}", limit).as_str());
    }

    if let Some(offset) = offset {
        stmt.push_str(format!(" OFFSET {}", offset).as_str());
    }
    stmt
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size from a query parameter, kept within `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<u32>) -> u32 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Pagination offset, treating page 0 as the first page.
///
/// Computed in `u64` so any `u32` page and size fit.
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    page.saturating_sub(1) as u64 * page_size as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let stmt = query_builder(
            None,
            "public.job",
            &["status = $1".to_string(), "deleted_date IS NULL".to_string()],
            vec!["created_date DESC".to_string(), "title".to_string()],
            Some(10),
            Some(20),
        );
        assert_eq!(
            stmt,
            "SELECT * FROM public.job WHERE status = $1 AND deleted_date IS NULL \
             ORDER BY created_date DESC, title LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_query_builder_count() {
        let stmt = query_builder(
            Some("count(id)".to_string()),
            "public.employee",
            &[],
            vec![],
            None,
            None,
        );
        assert_eq!(stmt, "SELECT count(id) FROM public.employee");
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 10), 0);
    }

    #[test]
    fn test_page_offset_large_page() {
        assert_eq!(page_offset(3_000_000, 2_000), 5_999_998_000);
        assert_eq!(
            page_offset(u32::MAX, u32::MAX),
            (u32::MAX as u64 - 1) * u32::MAX as u64
        );
        let stmt = query_builder(
            None,
            "public.job",
            &[],
            vec![],
            Some(MAX_PAGE_SIZE),
            Some(page_offset(3_000_000, MAX_PAGE_SIZE)),
        );
        assert_eq!(stmt, "SELECT * FROM public.job LIMIT 100 OFFSET 299999900");
    }

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(25)), 25);
        assert_eq!(clamp_page_size(Some(2_000)), MAX_PAGE_SIZE);
    }
}
