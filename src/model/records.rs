//! Individuals, families and their events.

use std::fmt;

use super::date::{DatePolicy, DateValue};

/// Kind of a life or family event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Birth,
    Christening,
    Death,
    Burial,
    Adoption,
    Marriage,
    Divorce,
    Engagement,
    Annulment,
    Other(String),
}

impl EventKind {
    /// Map a GEDCOM event tag to its kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "BIRT" => EventKind::Birth,
            "CHR" | "BAPM" => EventKind::Christening,
            "DEAT" => EventKind::Death,
            "BURI" | "CREM" => EventKind::Burial,
            "ADOP" => EventKind::Adoption,
            "MARR" => EventKind::Marriage,
            "DIV" => EventKind::Divorce,
            "ENGA" => EventKind::Engagement,
            "ANUL" => EventKind::Annulment,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// Human label used in field names, e.g. `birth` in `birth date`.
    pub fn label(&self) -> &str {
        match self {
            EventKind::Birth => "birth",
            EventKind::Christening => "christening",
            EventKind::Death => "death",
            EventKind::Burial => "burial",
            EventKind::Adoption => "adoption",
            EventKind::Marriage => "marriage",
            EventKind::Divorce => "divorce",
            EventKind::Engagement => "engagement",
            EventKind::Annulment => "annulment",
            EventKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw date text plus a best-effort parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDate {
    pub raw: String,
    /// `None` when the raw text is not a valid GEDCOM date.
    pub parsed: Option<DateValue>,
}

impl EventDate {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = DateValue::parse(&raw, &DatePolicy::lenient()).ok();
        Self { raw, parsed }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub date: Option<EventDate>,
    pub place: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            date: None,
            place: None,
        }
    }

    pub fn with_date(mut self, raw: impl Into<String>) -> Self {
        self.date = Some(EventDate::new(raw));
        self
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Best-effort parsed date, if any.
    pub fn parsed_date(&self) -> Option<&DateValue> {
        self.date.as_ref().and_then(|d| d.parsed.as_ref())
    }
}

/// A personal name in GEDCOM form: `Given /Surname/ Suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub raw: String,
    pub given: Option<String>,
    /// Text between the first pair of slashes; `None` when there are no
    /// slashes, `Some("")` when the slashes enclose nothing.
    pub surname: Option<String>,
}

impl PersonName {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        let (given, surname) = match raw.find('/') {
            Some(start) => {
                let rest = &raw[start + 1..];
                match rest.find('/') {
                    Some(end) => (non_empty(&raw[..start]), Some(rest[..end].trim().to_string())),
                    None => (non_empty(&raw[..start]), Some(rest.trim().to_string())),
                }
            }
            None => (non_empty(&raw), None),
        };

        Self {
            raw,
            given,
            surname,
        }
    }

    /// True when the name holds nothing but whitespace and slashes.
    pub fn is_blank(&self) -> bool {
        self.raw.chars().all(|c| c.is_whitespace() || c == '/')
    }
}

/// Recognised values of the GEDCOM `SEX` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
    Intersex,
}

impl Sex {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            "U" => Some(Sex::Unknown),
            "X" => Some(Sex::Intersex),
            _ => None,
        }
    }
}

/// How an individual belongs to a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyRole {
    /// `FAMC`: the individual is a child of the family.
    Child,
    /// `FAMS`: the individual is a spouse in the family.
    Spouse,
}

impl fmt::Display for FamilyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FamilyRole::Child => write!(f, "child"),
            FamilyRole::Spouse => write!(f, "spouse"),
        }
    }
}

/// Back-reference from an individual to a family it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyLink {
    pub family_id: String,
    pub role: FamilyRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Individual {
    pub id: String,
    pub name: Option<PersonName>,
    /// Raw `SEX` value as written in the source.
    pub sex: Option<String>,
    pub events: Vec<Event>,
    pub links: Vec<FamilyLink>,
    /// Source line of the record header, when loaded from a file.
    pub line: Option<usize>,
}

impl Individual {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// First event of the given kind.
    pub fn event(&self, kind: &EventKind) -> Option<&Event> {
        self.events.iter().find(|e| &e.kind == kind)
    }

    pub fn birth(&self) -> Option<&Event> {
        self.event(&EventKind::Birth)
    }

    pub fn death(&self) -> Option<&Event> {
        self.event(&EventKind::Death)
    }

    pub fn parsed_sex(&self) -> Option<Sex> {
        self.sex.as_deref().and_then(Sex::parse)
    }

    /// Family ids this individual links to in the given role.
    pub fn families_as(&self, role: FamilyRole) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .filter(move |link| link.role == role)
            .map(|link| link.family_id.as_str())
    }

    /// Display name for messages, falling back to the id.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_blank() => {
                format!("{} ({})", name.raw.replace('/', "").trim(), self.id)
            }
            _ => self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Family {
    pub id: String,
    pub husband: Option<String>,
    pub wife: Option<String>,
    /// Child references in source order.
    pub children: Vec<String>,
    pub events: Vec<Event>,
    pub line: Option<usize>,
}

impl Family {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn event(&self, kind: &EventKind) -> Option<&Event> {
        self.events.iter().find(|e| &e.kind == kind)
    }

    pub fn marriage(&self) -> Option<&Event> {
        self.event(&EventKind::Marriage)
    }

    /// Spouse references with their GEDCOM field name.
    pub fn spouses(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [("husband", &self.husband), ("wife", &self.wife)]
            .into_iter()
            .filter_map(|(field, id)| id.as_deref().map(|id| (field, id)))
    }

    /// Every member reference with the role it implies.
    pub fn members(&self) -> impl Iterator<Item = (FamilyRole, &str)> {
        self.spouses()
            .map(|(_, id)| (FamilyRole::Spouse, id))
            .chain(self.children.iter().map(|id| (FamilyRole::Child, id.as_str())))
    }
}
