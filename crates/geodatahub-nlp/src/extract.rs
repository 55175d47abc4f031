//! Rule-based field extraction from free text
//!
//! Every category (product, location, dates, cloud cover) is matched on its
//! own. Within a category the match that starts leftmost in the query wins;
//! when two rules match at the same offset the earlier rule wins.

use chrono::{Days, NaiveDate};
use geodatahub_core::models::{BoundingBox, DataType};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Fields pulled out of a query by one extraction strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub product: Option<String>,
    pub data_type: Option<DataType>,
    pub location: Option<String>,
    pub bbox: Option<BoundingBox>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cloud_cover_max: Option<f64>,
    pub provider: Option<String>,
}

impl ExtractedFields {
    /// A product or a date is enough to run a search
    pub fn is_complete_enough(&self) -> bool {
        self.product.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Run every rule category over `query`, resolving relative dates against `today`
pub fn extract(query: &str, today: NaiveDate) -> ExtractedFields {
    let (product, data_type) = match extract_product(query) {
        Some((product, data_type)) => (Some(product.to_string()), Some(data_type)),
        None => (None, None),
    };
    let (start_date, end_date) = match extract_dates(query, today) {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    };

    ExtractedFields {
        product,
        data_type,
        location: extract_location(query),
        bbox: None,
        start_date,
        end_date,
        cloud_cover_max: extract_cloud_cover(query),
        provider: None,
    }
}

/// Pick the leftmost resolvable match across `rules`
fn leftmost<R, T>(
    text: &str,
    rules: &[(Regex, R)],
    resolve: impl Fn(&R, &Captures) -> Option<T>,
) -> Option<T> {
    rules
        .iter()
        .enumerate()
        .filter_map(|(rank, (regex, rule))| {
            regex.captures_iter(text).find_map(|caps| {
                let start = caps.get(0)?.start();
                resolve(rule, &caps).map(|value| (start, rank, value))
            })
        })
        .min_by_key(|(start, rank, _)| (*start, *rank))
        .map(|(_, _, value)| value)
}

fn rules<R: Copy>(table: &[(&str, R)]) -> Vec<(Regex, R)> {
    table
        .iter()
        .map(|(pattern, rule)| (Regex::new(pattern).expect("valid regex"), *rule))
        .collect()
}

// Product

static PRODUCT_RULES: LazyLock<Vec<(Regex, (&'static str, DataType))>> = LazyLock::new(|| {
    rules(&[
        (r"(?i)sentinel[-\s]?2|\bs2\b", ("S2_MSI_L2A", DataType::Optical)),
        (r"(?i)sentinel[-\s]?1|\bs1\b|\bsar\b", ("S1_SAR_GRD", DataType::Sar)),
        (r"(?i)landsat[-\s]?8|\bl8\b", ("LANDSAT_C2L2", DataType::Optical)),
        (r"(?i)landsat[-\s]?9|\bl9\b", ("LANDSAT_C2L2", DataType::Optical)),
        (r"(?i)landsat", ("LANDSAT_C2L2", DataType::Optical)),
        (r"(?i)\bdem\b|elevation|srtm|height", ("COP-DEM_GLO-30", DataType::Dem)),
        (r"(?i)land\s?cover|\blulc\b", ("ESA_WORLDCOVER", DataType::LandCover)),
        (r"(?i)modis", ("MODIS_MOD09GA", DataType::Optical)),
    ])
});

/// Canonical product code and data type named in `text`
pub fn extract_product(text: &str) -> Option<(&'static str, DataType)> {
    leftmost(text, &PRODUCT_RULES, |rule, _| Some(*rule))
}

// Location

static LOCATION_RULES: LazyLock<Vec<(Regex, ())>> = LazyLock::new(|| {
    rules(&[
        // Name up to the next date, cloud or filler phrase
        (
            concat!(
                r"\b(?:for|of|in|over|around|near)\s+(\p{Lu}[\p{L}\s,'\-]*?)",
                r"(?:\s+(?i:(?:from|last|past|with|during|between|since|yesterday",
                r"|under|below|less\s+than|max(?:imum)?|at|showing|using)\b",
                r"|on\s+\d",
                r"|in\s+(?:\d{4}|january|february|march|april|may|june|july|august",
                r"|september|october|november|december)\b)",
                r"|\s*,?\s*\d",
                r"|\s*[.!?]*\s*$)",
            ),
            (),
        ),
        // Otherwise the run of capitalised words after the preposition
        (
            r"\b(?:for|of|in|over|around|near)\s+(\p{Lu}[\p{L}'\-]*(?:[ \t]+\p{Lu}[\p{L}'\-]*)*)",
            (),
        ),
    ])
});

const LOCATION_STOPWORDS: &[&str] = &[
    "the", "last", "past", "month", "week", "year", "today", "yesterday",
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december",
    "sentinel", "landsat", "modis", "images", "imagery", "data", "scenes",
];

/// Place name following a locative preposition
pub fn extract_location(query: &str) -> Option<String> {
    leftmost(query, &LOCATION_RULES, |_, caps| {
        let location = caps.get(1)?.as_str().trim().trim_end_matches(['.', ',', ';', ':', '-']).trim();
        let lower = location.to_lowercase();
        if location.chars().count() < 3 || LOCATION_STOPWORDS.contains(&lower.as_str()) {
            return None;
        }
        Some(location.to_string())
    })
}

// Dates

#[derive(Debug, Clone, Copy)]
enum DateRule {
    Range,
    LastWeek,
    LastMonth,
    LastDays,
    Yesterday,
    MonthYear,
    OnDay,
    IsoDay,
    Year,
}

static DATE_RULES: LazyLock<Vec<(Regex, DateRule)>> = LazyLock::new(|| {
    rules(&[
        (
            r"(?i)\b(?:from|between)\s+(\d{4}-\d{2}-\d{2})\s+(?:to|and|until)\s+(\d{4}-\d{2}-\d{2})\b",
            DateRule::Range,
        ),
        (r"(?i)\b(?:last|past)\s+week\b", DateRule::LastWeek),
        (r"(?i)\b(?:last|past)\s+month\b", DateRule::LastMonth),
        (r"(?i)\b(?:last|past)\s+(\d{1,5})\s+days?\b", DateRule::LastDays),
        (r"(?i)\byesterday\b", DateRule::Yesterday),
        (
            r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b",
            DateRule::MonthYear,
        ),
        (r"(?i)\bon\s+(\d{4}-\d{2}-\d{2})\b", DateRule::OnDay),
        (r"\b(\d{4}-\d{2}-\d{2})\b", DateRule::IsoDay),
        // A year not followed by more date digits
        (r"\b((?:19|20)\d{2})(?:$|[^\-\d])", DateRule::Year),
    ])
});

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Inclusive date window named in `query`
pub fn extract_dates(query: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    leftmost(query, &DATE_RULES, |rule, caps| resolve_date(*rule, caps, today))
}

fn resolve_date(rule: DateRule, caps: &Captures, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let days_back = |n: u64| today.checked_sub_days(Days::new(n)).map(|start| (start, today));

    match rule {
        DateRule::Range => {
            let a = parse_iso(caps.get(1)?.as_str())?;
            let b = parse_iso(caps.get(2)?.as_str())?;
            Some(if a <= b { (a, b) } else { (b, a) })
        }
        DateRule::LastWeek => days_back(7),
        DateRule::LastMonth => days_back(30),
        DateRule::LastDays => days_back(caps.get(1)?.as_str().parse().ok()?),
        DateRule::Yesterday => {
            let day = today.checked_sub_days(Days::new(1))?;
            Some((day, day))
        }
        DateRule::MonthYear => {
            let name = caps.get(1)?.as_str().to_lowercase();
            let month = MONTHS.iter().position(|m| *m == name)? as u32 + 1;
            let year: i32 = caps.get(2)?.as_str().parse().ok()?;
            month_range(year, month)
        }
        DateRule::OnDay | DateRule::IsoDay => {
            let day = parse_iso(caps.get(1)?.as_str())?;
            Some((day, day))
        }
        DateRule::Year => {
            let year: i32 = caps.get(1)?.as_str().parse().ok()?;
            Some((NaiveDate::from_ymd_opt(year, 1, 1)?, NaiveDate::from_ymd_opt(year, 12, 31)?))
        }
    }
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// First and last day of a calendar month
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

// Cloud cover

#[derive(Debug, Clone, Copy)]
enum CloudRule {
    Bounded,
    Percent,
    Fixed(f64),
}

static CLOUD_RULES: LazyLock<Vec<(Regex, CloudRule)>> = LazyLock::new(|| {
    rules(&[
        (
            r"(?i)\b(?:less\s+than|under|below|max|maximum)\s+(\d+(?:\.\d+)?)\s*%?\s*cloud",
            CloudRule::Bounded,
        ),
        (r"(?i)(\d+(?:\.\d+)?)\s*%\s*cloud", CloudRule::Percent),
        (r"(?i)\bclear\s+sk(?:y|ies)\b", CloudRule::Fixed(10.0)),
        (r"(?i)\bmostly\s+clear\b", CloudRule::Fixed(20.0)),
    ])
});

/// Maximum cloud cover percentage; values above 100 are ignored
pub fn extract_cloud_cover(query: &str) -> Option<f64> {
    leftmost(query, &CLOUD_RULES, |rule, caps| {
        let value = match rule {
            CloudRule::Bounded | CloudRule::Percent => caps.get(1)?.as_str().parse::<f64>().ok()?,
            CloudRule::Fixed(value) => *value,
        };
        (0.0..=100.0).contains(&value).then_some(value)
    })
}
