//! Database access, one module per table
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

pub mod account_context;
pub mod brain;
pub mod feedback;
pub mod followers;
pub mod insights;
pub mod profiles;
pub mod videos;
