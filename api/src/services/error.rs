//! Error handling utilities for route handlers

use axum::http::StatusCode;

/// Extension trait for logging errors and converting to StatusCode
pub trait LogErr<T> {
    /// Log error with context and return INTERNAL_SERVER_ERROR
    fn log_500(self, context: &str) -> Result<T, StatusCode>;

    /// Log error with context and return a custom StatusCode
    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, StatusCode> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", context);
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }

    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode> {
        self.map_err(|e| {
            tracing::warn!(error = %e, status = %status, "{}", context);
            status
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_errors_to_status() {
        let failed: Result<(), &str> = Err("boom");
        assert_eq!(failed.log_500("ctx"), Err(StatusCode::INTERNAL_SERVER_ERROR));

        let bad: Result<(), &str> = Err("bad column");
        assert_eq!(
            bad.log_status("ctx", StatusCode::UNPROCESSABLE_ENTITY),
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        );

        let ok: Result<u8, &str> = Ok(7);
        assert_eq!(ok.log_500("ctx"), Ok(7));
    }
}
