//! Database repositories for the data access layer
//!
//! `traits` defines the store seams, `user` and `video` implement them on
//! PostgreSQL, and `memory` provides an in-process implementation for tests.

pub mod traits;
pub mod user;
pub mod video;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use traits::{UserStore, VideoCatalog};
pub use user::UserRepository;
pub use video::VideoRepository;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

use themtube_core::AppError;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Map a unique-index violation to a client error, passing other failures through.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::BadRequest(message.to_string());
        }
    }
    AppError::Database(err)
}
