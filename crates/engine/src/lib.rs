//! Domain rules of the sample social network: accounts, persistent logins,
//! password resets, microposts, follow relationships and the feed.
//!
//! Everything goes through [`Engine`], which owns the database connection and
//! keeps multi-row changes inside a single transaction.

pub use error::EngineError;
pub use ops::{DEFAULT_PER_PAGE, Engine, EngineBuilder, Page, RESET_TOKEN_TTL_HOURS};
pub use users::{TokenKind, UserParams};
pub use validation::ValidationErrors;

pub mod digest;
mod error;
pub mod microposts;
mod ops;
pub mod relationships;
pub mod users;
pub mod validation;

type ResultEngine<T> = Result<T, EngineError>;
