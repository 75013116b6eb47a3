//! Error types for the atelier backend

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AtelierError>;

/// Failures the storage layer can surface.
///
/// A lookup that finds nothing is `Ok(None)`, not an error; callers must
/// handle the missing case explicitly.
#[derive(Error, Debug)]
pub enum AtelierError {
    /// A unique constraint (username) was violated at insert time.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The backing store failed or is unreachable. Propagated untranslated;
    /// this layer does not retry or degrade.
    #[error("database error: {0}")]
    Database(String),
}
