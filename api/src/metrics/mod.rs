//! Metric derivation and scoring
//!
//! Everything here is pure arithmetic over rows already fetched from the
//! database. Derived values are recomputed on every read; a zero denominator
//! always yields 0 instead of NaN or infinity.

pub mod derived;
pub mod detail;
pub mod explorer;
pub mod followers;
pub mod kpis;
pub mod normalize;
pub mod scoring;
pub mod stats;
pub mod viral;

pub use scoring::{ScoredVideo, score_videos};
