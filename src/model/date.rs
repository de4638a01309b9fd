//! Genealogical date values.
//!
//! GEDCOM dates are frequently partial (`1850`, `MAR 1850`), qualified
//! (`ABT 1850`, `BEF 3 JUN 1901`), ranged (`BET 1850 AND 1855`) or free-text
//! phrases (`(unknown)`). [`DateValue`] keeps the shape of the value so that
//! format checks can report imprecision while consistency checks still compare
//! the best-effort calendar bounds.

use chrono::format::{Item, ParseErrorKind, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Three-letter month codes used by the native GEDCOM date grammar.
const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Why a raw date string could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date is empty")]
    Empty,
    /// Syntactically recognisable but names a day that cannot exist.
    #[error("impossible date: {0}")]
    Impossible(String),
    #[error("unrecognised date format: {0}")]
    Unrecognized(String),
}

/// How raw date strings are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePolicy {
    /// Accepted chrono strftime patterns. Patterns without a day or month
    /// (`%b %Y`, `%Y`) yield partial dates.
    pub formats: Vec<String>,
    /// Accept the native GEDCOM `[day] [MON] year` grammar regardless of
    /// `formats`.
    pub allow_native: bool,
}

impl Default for DatePolicy {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            allow_native: true,
        }
    }
}

impl DatePolicy {
    /// Native grammar plus ISO `YYYY-MM-DD`; used for best-effort parsing at
    /// load time, before any rule configuration applies.
    pub fn lenient() -> Self {
        Self {
            formats: vec!["%Y-%m-%d".to_string()],
            allow_native: true,
        }
    }

    /// Check that a strftime pattern can be used for date parsing.
    pub fn validate_format(format: &str) -> Result<(), String> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(format!("'{}' is not a valid date pattern", format));
        }
        if !format.contains("%Y") && !format.contains("%y") {
            return Err(format!("'{}' has no year field (%Y)", format));
        }
        Ok(())
    }
}

/// Approximation qualifiers that keep a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approximation {
    About,
    Calculated,
    Estimated,
}

impl Approximation {
    fn label(&self) -> &'static str {
        match self {
            Approximation::About => "about",
            Approximation::Calculated => "calculated",
            Approximation::Estimated => "estimated",
        }
    }
}

/// A calendar date where day and month may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    earliest: NaiveDate,
    latest: NaiveDate,
}

impl PartialDate {
    /// Build a partial date, rejecting components that cannot exist.
    ///
    /// A day without a month is rejected as well.
    pub fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Result<Self, DateError> {
        let describe = || match (day, month) {
            (Some(d), Some(m)) => format!("{}-{:02}-{:02}", year, m, d),
            (None, Some(m)) => format!("{}-{:02}", year, m),
            _ => year.to_string(),
        };

        if day.is_some() && month.is_none() {
            return Err(DateError::Unrecognized(describe()));
        }
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(DateError::Impossible(format!("month {} in {}", m, describe())));
            }
        }

        let first_month = month.unwrap_or(1);
        let last_month = month.unwrap_or(12);
        let earliest = NaiveDate::from_ymd_opt(year, first_month, day.unwrap_or(1))
            .ok_or_else(|| DateError::Impossible(describe()))?;
        let latest = match day {
            Some(d) => NaiveDate::from_ymd_opt(year, last_month, d),
            None => last_day_of_month(year, last_month),
        }
        .ok_or_else(|| DateError::Impossible(describe()))?;

        Ok(Self {
            year,
            month,
            day,
            earliest,
            latest,
        })
    }

    fn from_naive(date: NaiveDate, has_month: bool, has_day: bool) -> Result<Self, DateError> {
        Self::new(
            date.year(),
            has_month.then(|| date.month()),
            (has_month && has_day).then(|| date.day()),
        )
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    /// First calendar day this value can denote.
    pub fn earliest(&self) -> NaiveDate {
        self.earliest
    }

    /// Last calendar day this value can denote.
    pub fn latest(&self) -> NaiveDate {
        self.latest
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// A parsed GEDCOM date value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Exact(PartialDate),
    Approximate(Approximation, PartialDate),
    Before(PartialDate),
    After(PartialDate),
    Between(PartialDate, PartialDate),
    Period {
        from: Option<PartialDate>,
        to: Option<PartialDate>,
    },
    /// `INT date (phrase)`.
    Interpreted(PartialDate, Option<String>),
    /// A free-text phrase in parentheses with no calendar value.
    Phrase(String),
}

impl DateValue {
    /// Parse a raw date string under the given policy.
    pub fn parse(raw: &str, policy: &DatePolicy) -> Result<Self, DateError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DateError::Empty);
        }

        if raw.starts_with('(') && raw.ends_with(')') {
            return Ok(DateValue::Phrase(raw[1..raw.len() - 1].trim().to_string()));
        }

        let (keyword, rest) = match raw.split_once(char::is_whitespace) {
            Some((head, tail)) => (head.to_uppercase(), tail.trim()),
            None => (raw.to_uppercase(), ""),
        };

        match keyword.as_str() {
            "ABT" | "ABOUT" | "CIRCA" | "CA." => {
                Ok(DateValue::Approximate(Approximation::About, component(rest, policy)?))
            }
            "CAL" => Ok(DateValue::Approximate(
                Approximation::Calculated,
                component(rest, policy)?,
            )),
            "EST" => Ok(DateValue::Approximate(
                Approximation::Estimated,
                component(rest, policy)?,
            )),
            "BEF" | "BEFORE" => Ok(DateValue::Before(component(rest, policy)?)),
            "AFT" | "AFTER" => Ok(DateValue::After(component(rest, policy)?)),
            "BET" | "BETWEEN" => {
                let (first, second) = split_keyword(rest, "AND")
                    .ok_or_else(|| DateError::Unrecognized(raw.to_string()))?;
                let first = component(first, policy)?;
                let second = component(second, policy)?;
                if second.latest() < first.earliest() {
                    return Err(DateError::Impossible(format!(
                        "range '{}' ends before it starts",
                        raw
                    )));
                }
                Ok(DateValue::Between(first, second))
            }
            "FROM" => {
                let (from, to) = match split_keyword(rest, "TO") {
                    Some((from, to)) => (component(from, policy)?, Some(component(to, policy)?)),
                    None => (component(rest, policy)?, None),
                };
                Ok(DateValue::Period {
                    from: Some(from),
                    to,
                })
            }
            "TO" => Ok(DateValue::Period {
                from: None,
                to: Some(component(rest, policy)?),
            }),
            "INT" => {
                let (date, phrase) = match rest.find('(') {
                    Some(idx) => (
                        rest[..idx].trim(),
                        Some(rest[idx..].trim_matches(|c| c == '(' || c == ')').trim()),
                    ),
                    None => (rest, None),
                };
                Ok(DateValue::Interpreted(
                    component(date, policy)?,
                    phrase.map(str::to_string),
                ))
            }
            _ => Ok(DateValue::Exact(component(raw, policy)?)),
        }
    }

    /// True for anything other than a plain calendar date.
    pub fn is_imprecise(&self) -> bool {
        !matches!(self, DateValue::Exact(_))
    }

    /// Short description of the imprecision, used in messages.
    pub fn qualifier_label(&self) -> Option<&'static str> {
        match self {
            DateValue::Exact(_) => None,
            DateValue::Approximate(approx, _) => Some(approx.label()),
            DateValue::Before(_) => Some("before"),
            DateValue::After(_) => Some("after"),
            DateValue::Between(..) => Some("between"),
            DateValue::Period { .. } => Some("period"),
            DateValue::Interpreted(..) => Some("interpreted"),
            DateValue::Phrase(_) => Some("phrase"),
        }
    }

    /// Earliest calendar day the value can denote; `None` when unbounded.
    pub fn earliest(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Exact(d)
            | DateValue::Approximate(_, d)
            | DateValue::Interpreted(d, _)
            | DateValue::After(d)
            | DateValue::Between(d, _) => Some(d.earliest()),
            DateValue::Period { from, .. } => from.map(|d| d.earliest()),
            DateValue::Before(_) | DateValue::Phrase(_) => None,
        }
    }

    /// Latest calendar day the value can denote; `None` when unbounded.
    pub fn latest(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Exact(d)
            | DateValue::Approximate(_, d)
            | DateValue::Interpreted(d, _)
            | DateValue::Before(d)
            | DateValue::Between(_, d) => Some(d.latest()),
            DateValue::Period { to, .. } => to.map(|d| d.latest()),
            DateValue::After(_) | DateValue::Phrase(_) => None,
        }
    }
}

/// Split `text` around a standalone keyword (case-insensitive).
fn split_keyword<'a>(text: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let upper = text.to_ascii_uppercase();
    let needle = format!(" {} ", keyword);
    let idx = upper.find(&needle)?;
    Some((text[..idx].trim(), text[idx + needle.len()..].trim()))
}

/// Parse one calendar component, trying the native grammar then each
/// configured pattern. An impossible-date error wins over "unrecognised" so
/// that `32 MAR 1850` is reported as impossible rather than as a format miss.
fn component(text: &str, policy: &DatePolicy) -> Result<PartialDate, DateError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DateError::Empty);
    }

    let mut impossible: Option<DateError> = None;

    if policy.allow_native {
        match native(text) {
            Ok(date) => return Ok(date),
            Err(err @ DateError::Impossible(_)) => impossible = Some(err),
            Err(_) => {}
        }
    }

    for format in &policy.formats {
        match with_format(text, format) {
            Ok(date) => return Ok(date),
            Err(err @ DateError::Impossible(_)) => {
                impossible.get_or_insert(err);
            }
            Err(_) => {}
        }
    }

    Err(impossible.unwrap_or_else(|| DateError::Unrecognized(text.to_string())))
}

/// `[day] [MON] year [B.C.]`, with dual years like `1750/51`.
fn native(text: &str) -> Result<PartialDate, DateError> {
    let unrecognized = || DateError::Unrecognized(text.to_string());
    let upper = text.to_uppercase();
    let mut tokens: Vec<&str> = upper.split_whitespace().collect();

    let mut bc = false;
    if let Some(last) = tokens.last() {
        if matches!(*last, "B.C." | "BC" | "BCE") {
            bc = true;
            tokens.pop();
        }
    }

    let year_token = tokens.pop().ok_or_else(unrecognized)?;
    let year_digits = year_token.split('/').next().unwrap_or(year_token);
    if year_digits.is_empty()
        || year_digits.len() > 4
        || !year_digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(unrecognized());
    }
    let mut year: i32 = year_digits.parse().map_err(|_| unrecognized())?;
    if bc {
        year = -year;
    }

    let month = match tokens.pop() {
        Some(token) => {
            let idx = MONTHS
                .iter()
                .position(|m| *m == token)
                .ok_or_else(unrecognized)?;
            Some(idx as u32 + 1)
        }
        None => None,
    };

    let day = match tokens.pop() {
        Some(token) => {
            if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_digit()) {
                return Err(unrecognized());
            }
            Some(token.parse::<u32>().map_err(|_| unrecognized())?)
        }
        None => None,
    };

    if !tokens.is_empty() {
        return Err(unrecognized());
    }

    PartialDate::new(year, month, day).map_err(|err| match err {
        DateError::Impossible(_) => DateError::Impossible(text.to_string()),
        other => other,
    })
}

/// Parse with a chrono pattern, completing partial patterns so that
/// `%b %Y` keeps month precision and `%Y` keeps year precision.
fn with_format(text: &str, format: &str) -> Result<PartialDate, DateError> {
    let has_day = ["%d", "%e", "%-d"].iter().any(|s| format.contains(s));
    let has_month = ["%m", "%b", "%B", "%h", "%-m"]
        .iter()
        .any(|s| format.contains(s));

    let mut full_format = String::new();
    let mut full_text = String::new();
    if !has_month {
        full_format.push_str("%m ");
        full_text.push_str("1 ");
    }
    if !has_day {
        full_format.push_str("%d ");
        full_text.push_str("1 ");
    }
    full_format.push_str(format);
    full_text.push_str(text);

    match NaiveDate::parse_from_str(&full_text, &full_format) {
        Ok(date) => PartialDate::from_naive(date, has_month, has_day),
        Err(err) => match err.kind() {
            ParseErrorKind::OutOfRange | ParseErrorKind::Impossible => {
                Err(DateError::Impossible(text.to_string()))
            }
            _ => Err(DateError::Unrecognized(text.to_string())),
        },
    }
}
