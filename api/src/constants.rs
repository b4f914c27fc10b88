//! Application constants

/// Weight of the log-views z-score in the viral index
pub const VIRAL_WEIGHT_VIEWS: f64 = 0.35;
/// Weight of the retention z-score in the viral index
pub const VIRAL_WEIGHT_RETENTION: f64 = 0.25;
/// Weight of the saves-per-1k z-score in the viral index
pub const VIRAL_WEIGHT_SAVES: f64 = 0.15;
/// Weight of the follows-per-1k z-score in the viral index
pub const VIRAL_WEIGHT_FOLLOWS: f64 = 0.15;
/// Weight of the For You share z-score in the viral index
pub const VIRAL_WEIGHT_FOR_YOU: f64 = 0.10;

/// Offset that recenters the weighted z-score sum onto the 0-10 scale
pub const VIRAL_INDEX_CENTER: f64 = 5.0;
/// Upper bound of the viral index scale
pub const VIRAL_INDEX_MAX: f64 = 10.0;

/// Minimum viral index for the viral flag
pub const VIRAL_INDEX_THRESHOLD: f64 = 6.5;
/// Minimum views for the viral flag (independent of the index)
pub const VIRAL_MIN_VIEWS: i64 = 10_000;

/// Default page size for paginated list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size for paginated list endpoints
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default KPI window in days
pub const DEFAULT_KPI_WINDOW_DAYS: i64 = 30;

/// Maximum KPI window in days
pub const MAX_KPI_WINDOW_DAYS: i64 = 365;

/// Rows inserted concurrently per CSV import batch
pub const IMPORT_BATCH_SIZE: usize = 50;

/// Error messages kept in an import report
pub const IMPORT_MAX_REPORTED_ERRORS: usize = 20;

/// Maximum CSV payload accepted by the import endpoints (10 MB)
pub const MAX_IMPORT_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Top videos interpolated into AI prompts
pub const PROMPT_TOP_VIDEOS: usize = 5;

/// Idea feedback entries interpolated into AI prompts
pub const PROMPT_FEEDBACK_ENTRIES: i64 = 20;

/// Default number of ideas requested from the LLM
pub const DEFAULT_IDEA_COUNT: usize = 5;

/// Maximum number of ideas requested from the LLM
pub const MAX_IDEA_COUNT: usize = 10;

/// Default number of similar videos returned
pub const DEFAULT_SIMILAR_VIDEOS: usize = 5;
