//! CSV import: parse an export, map its columns onto video fields, coerce
//! cells and insert the rows in sequential batches.
//!
//! Coercion never fails a row. Unparseable numbers become 0 and unparseable
//! dates become the import day, so a messy export still lands in full.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::future::Future;

use crate::constants::IMPORT_MAX_REPORTED_ERRORS;
use crate::models::NewVideo;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV has no header row")]
    MissingHeaders,
    #[error("no columns mapped")]
    EmptyMapping,
    #[error("mapped column {0:?} not found in CSV headers")]
    UnknownHeader(String),
}

/// Database fields a CSV column can be mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportField {
    Title,
    PublishedAt,
    Views,
    Likes,
    Comments,
    Shares,
    Saves,
    NewFollowers,
    TrafficForYou,
    TrafficProfile,
    TrafficHashtag,
    TrafficSound,
    TrafficSearch,
    DurationSeconds,
    AvgWatchTime,
    /// Average percentage watched; converted to seconds with the duration
    AvgWatchPercentage,
    Hook,
    Script,
    Theme,
    CtaType,
    EditingStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    /// Count of views, or a share of views written as a percentage
    TrafficShare,
    Percentage,
    Duration,
    Date,
}

impl ImportField {
    pub const ALL: [ImportField; 21] = [
        ImportField::Title,
        ImportField::PublishedAt,
        ImportField::Views,
        ImportField::Likes,
        ImportField::Comments,
        ImportField::Shares,
        ImportField::Saves,
        ImportField::NewFollowers,
        ImportField::TrafficForYou,
        ImportField::TrafficProfile,
        ImportField::TrafficHashtag,
        ImportField::TrafficSound,
        ImportField::TrafficSearch,
        ImportField::DurationSeconds,
        ImportField::AvgWatchTime,
        ImportField::AvgWatchPercentage,
        ImportField::Hook,
        ImportField::Script,
        ImportField::Theme,
        ImportField::CtaType,
        ImportField::EditingStyle,
    ];

    pub fn kind(&self) -> FieldKind {
        match self {
            ImportField::Title
            | ImportField::Hook
            | ImportField::Script
            | ImportField::Theme
            | ImportField::CtaType
            | ImportField::EditingStyle => FieldKind::Text,
            ImportField::PublishedAt => FieldKind::Date,
            ImportField::Views
            | ImportField::Likes
            | ImportField::Comments
            | ImportField::Shares
            | ImportField::Saves
            | ImportField::NewFollowers => FieldKind::Integer,
            ImportField::TrafficForYou
            | ImportField::TrafficProfile
            | ImportField::TrafficHashtag
            | ImportField::TrafficSound
            | ImportField::TrafficSearch => FieldKind::TrafficShare,
            ImportField::DurationSeconds | ImportField::AvgWatchTime => FieldKind::Duration,
            ImportField::AvgWatchPercentage => FieldKind::Percentage,
        }
    }

    /// Normalized header spellings seen in TikTok Studio and spreadsheet exports
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ImportField::Title => &["title", "videotitle", "videodescription", "description", "caption"],
            ImportField::PublishedAt => &[
                "date",
                "publishdate",
                "publishedat",
                "posttime",
                "videoposttime",
                "posted",
                "createtime",
            ],
            ImportField::Views => &["views", "videoviews", "totalviews", "plays", "playcount"],
            ImportField::Likes => &["likes", "totallikes", "likecount"],
            ImportField::Comments => &["comments", "totalcomments", "commentcount"],
            ImportField::Shares => &["shares", "totalshares", "sharecount"],
            ImportField::Saves => &["saves", "totalsaves", "favorites", "addtofavorites", "bookmarks"],
            // A bare "Followers" column is the account total, not gained per video
            ImportField::NewFollowers => &["newfollowers", "followersgained", "gainedfollowers"],
            ImportField::TrafficForYou => &["foryou", "foryoupage", "fyp", "trafficforyou"],
            ImportField::TrafficProfile => &["personalprofile", "profile", "trafficprofile"],
            ImportField::TrafficHashtag => &["hashtag", "hashtags", "traffichashtag"],
            ImportField::TrafficSound => &["sound", "sounds", "trafficsound"],
            ImportField::TrafficSearch => &["search", "trafficsearch"],
            ImportField::DurationSeconds => &["duration", "videoduration", "durationseconds", "length"],
            ImportField::AvgWatchTime => &[
                "averagewatchtime",
                "avgwatchtime",
                "averagetimewatched",
                "avgtimewatched",
            ],
            ImportField::AvgWatchPercentage => &[
                "averagewatchpercentage",
                "avgwatchpercentage",
                "retention",
                "retentionrate",
            ],
            ImportField::Hook => &["hook", "openingline"],
            ImportField::Script => &["script", "transcript"],
            ImportField::Theme => &["theme", "topic", "category"],
            ImportField::CtaType => &["cta", "ctatype", "calltoaction"],
            ImportField::EditingStyle => &["editingstyle", "style", "format"],
        }
    }
}

/// Target field -> source header, as chosen by the user
pub type ColumnMapping = BTreeMap<ImportField, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse CSV text. Rows may be ragged; cells are trimmed.
pub fn parse_csv(text: &str) -> Result<CsvTable, ImportError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::MissingHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvTable { headers, rows })
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Propose a mapping from known header spellings. Each header maps at most once.
pub fn suggest_mapping(headers: &[String]) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut used = vec![false; headers.len()];
    let mut mapping = ColumnMapping::new();

    for field in ImportField::ALL {
        let aliases = field.aliases();
        // Alias order is preference order
        let hit = aliases.iter().find_map(|alias| {
            normalized
                .iter()
                .enumerate()
                .find(|(i, h)| !used[*i] && h.as_str() == *alias)
                .map(|(i, _)| i)
        });
        if let Some(i) = hit {
            used[i] = true;
            mapping.insert(field, headers[i].clone());
        }
    }

    mapping
}

// ============================================================================
// Cell coercion
// ============================================================================

/// Lenient number: thousands separators, spaces and a trailing `%` are
/// ignored. Anything else unparseable is 0.
pub fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}' | '_'))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub fn parse_integer(raw: &str) -> i64 {
    parse_number(raw).round() as i64
}

/// Seconds from `45`, `45s`, `0:45`, `1:02:03`. Unparseable is 0.
pub fn parse_duration(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.contains(':') {
        let mut total = 0.0;
        for part in raw.split(':') {
            match part.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => total = total * 60.0 + v,
                _ => return 0.0,
            }
        }
        return total;
    }
    let raw = raw
        .strip_suffix("sec")
        .or_else(|| raw.strip_suffix('s'))
        .unwrap_or(raw);
    parse_number(raw).max(0.0)
}

// Two-digit year forms come first: chrono's %Y also accepts "25" as year 25
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%m/%d/%y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
];

/// Earlier years are a misread short year, not a real publish date
const MIN_IMPORT_YEAR: i32 = 1000;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Calendar date in any common export format; `today` when unparseable
pub fn parse_date(raw: &str, today: NaiveDate) -> NaiveDate {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive();
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.date();
        }
    }
    DATE_FORMATS
        .into_iter()
        .filter_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .find(|d| d.year() >= MIN_IMPORT_YEAR)
        .unwrap_or(today)
}

/// `YYYY-MM-DD` of [`parse_date`]
pub fn coerce_date_string(raw: &str, today: NaiveDate) -> String {
    parse_date(raw, today).format("%Y-%m-%d").to_string()
}

/// Traffic cells are view counts, or a percentage of the row's views
fn parse_traffic(raw: &str, views: i64) -> i64 {
    if raw.trim().ends_with('%') {
        (parse_number(raw) / 100.0 * views as f64).round() as i64
    } else {
        parse_integer(raw)
    }
}

// ============================================================================
// Row mapping
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    /// 1-based line in the CSV (the header is line 1)
    pub line: usize,
    pub video: NewVideo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedRows {
    pub rows: Vec<MappedRow>,
    /// Rows with no content at all
    pub skipped: usize,
}

struct RowView<'a> {
    row: &'a [String],
    columns: &'a HashMap<ImportField, usize>,
}

impl RowView<'_> {
    fn cell(&self, field: ImportField) -> Option<&str> {
        let index = *self.columns.get(&field)?;
        self.row
            .get(index)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn integer(&self, field: ImportField) -> i64 {
        self.cell(field).map_or(0, parse_integer)
    }

    fn text(&self, field: ImportField) -> Option<String> {
        self.cell(field).map(str::to_string)
    }

    fn to_video(&self, today: NaiveDate) -> NewVideo {
        let views = self.integer(ImportField::Views);
        let traffic = |field| self.cell(field).map_or(0, |raw| parse_traffic(raw, views));
        let duration_seconds = self
            .cell(ImportField::DurationSeconds)
            .map_or(0.0, parse_duration);
        let avg_watch_time = match self.cell(ImportField::AvgWatchTime) {
            Some(raw) => parse_duration(raw),
            None => self
                .cell(ImportField::AvgWatchPercentage)
                .map_or(0.0, |raw| parse_number(raw) / 100.0 * duration_seconds),
        };

        NewVideo {
            title: self
                .text(ImportField::Title)
                .unwrap_or_else(|| "Untitled".to_string()),
            published_at: self
                .cell(ImportField::PublishedAt)
                .map_or(today, |raw| parse_date(raw, today)),
            views,
            likes: self.integer(ImportField::Likes),
            comments: self.integer(ImportField::Comments),
            shares: self.integer(ImportField::Shares),
            saves: self.integer(ImportField::Saves),
            new_followers: self.integer(ImportField::NewFollowers),
            traffic_for_you: traffic(ImportField::TrafficForYou),
            traffic_profile: traffic(ImportField::TrafficProfile),
            traffic_hashtag: traffic(ImportField::TrafficHashtag),
            traffic_sound: traffic(ImportField::TrafficSound),
            traffic_search: traffic(ImportField::TrafficSearch),
            duration_seconds,
            avg_watch_time,
            hook: self.text(ImportField::Hook),
            script: self.text(ImportField::Script),
            theme: self.text(ImportField::Theme),
            cta_type: self.text(ImportField::CtaType),
            editing_style: self.text(ImportField::EditingStyle),
        }
    }
}

/// Apply a mapping to every row. Empty rows are skipped, never rejected.
pub fn map_rows(
    table: &CsvTable,
    mapping: &ColumnMapping,
    today: NaiveDate,
) -> Result<MappedRows, ImportError> {
    if mapping.is_empty() {
        return Err(ImportError::EmptyMapping);
    }

    let mut columns = HashMap::new();
    for (field, header) in mapping {
        let index = table
            .headers
            .iter()
            .position(|h| h == header)
            .ok_or_else(|| ImportError::UnknownHeader(header.clone()))?;
        columns.insert(*field, index);
    }

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (i, row) in table.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        let view = RowView {
            row,
            columns: &columns,
        };
        rows.push(MappedRow {
            line: i + 2,
            video: view.to_video(today),
        });
    }

    Ok(MappedRows { rows, skipped })
}

// ============================================================================
// Batched insert
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// First few failures, as "line N: error"
    pub errors: Vec<String>,
}

/// Insert rows in sequential batches; the rows of one batch run concurrently.
/// A failed row is counted and reported, never fatal.
pub async fn insert_in_batches<F, Fut, E>(
    rows: Vec<MappedRow>,
    batch_size: usize,
    insert: F,
) -> ImportReport
where
    F: Fn(NewVideo) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut report = ImportReport::default();
    let mut rows = rows.into_iter().peekable();
    let batch_size = batch_size.max(1);

    while rows.peek().is_some() {
        let batch: Vec<MappedRow> = rows.by_ref().take(batch_size).collect();
        let lines: Vec<usize> = batch.iter().map(|r| r.line).collect();
        let results = join_all(batch.into_iter().map(|r| insert(r.video))).await;

        for (line, result) in lines.into_iter().zip(results) {
            match result {
                Ok(()) => report.inserted += 1,
                Err(e) => {
                    tracing::warn!(line, error = %e, "CSV row insert failed");
                    report.failed += 1;
                    if report.errors.len() < IMPORT_MAX_REPORTED_ERRORS {
                        report.errors.push(format!("line {}: {}", line, e));
                    }
                }
            }
        }
    }

    report
}
