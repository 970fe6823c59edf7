use sea_orm::{DatabaseConnection, DbErr, SqlErr};

use crate::{EngineError, ResultEngine, ValidationErrors};

mod microposts;
mod password_resets;
mod relationships;
mod sessions;
mod users;

pub use password_resets::RESET_TOKEN_TTL_HOURS;

pub const DEFAULT_PER_PAGE: u64 = 30;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    per_page: u64,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

}

/// One page of an ordered listing. `page` is 1-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

/// Pages are 1-based; missing or zero means the first one.
fn page_number(page: Option<u64>) -> u64 {
    page.filter(|p| *p > 0).unwrap_or(1)
}

/// Zero-based index to fetch, or `None` past the last page. Pages in range
/// keep `per_page * index` below the row count.
fn page_index(page: u64, total_pages: u64) -> Option<u64> {
    (page <= total_pages).then(|| page - 1)
}

fn email_taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("email", "has already been taken");
    errors
}

/// The unique index on `users.email` is the last line of defence when two
/// sign-ups race past the uniqueness pre-check.
fn unique_email_violation(err: DbErr) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::Validation(email_taken()),
        _ => EngineError::Database(err),
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    per_page: u64,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Size of every paginated listing (users, microposts, feed).
    pub fn per_page(mut self, per_page: u64) -> EngineBuilder {
        self.per_page = per_page.max(1);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
            per_page: self.per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_defaults_to_first() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some(0)), 1);
        assert_eq!(page_number(Some(3)), 3);
    }

    #[test]
    fn pages_past_the_end_are_not_fetched() {
        assert_eq!(page_index(1, 3), Some(0));
        assert_eq!(page_index(3, 3), Some(2));
        assert_eq!(page_index(4, 3), None);
        assert_eq!(page_index(1, 0), None);
        assert_eq!(page_index(u64::MAX, 3), None);
    }

    #[test]
    fn page_map_keeps_position() {
        let page = Page {
            items: vec![1, 2],
            page: 2,
            total_pages: 4,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!((mapped.page, mapped.total_pages), (2, 4));
    }
}
