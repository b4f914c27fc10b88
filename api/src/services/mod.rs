pub mod db;
pub mod error;
pub mod llm;
pub mod rate_limit;
pub mod session;
