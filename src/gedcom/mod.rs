//! GEDCOM loader.
//!
//! Builds a [`RecordSet`] from `INDI` and `FAM` records. Other record types
//! and unrecognised tags are skipped. References are stored as written; the
//! loader never drops or repairs a reference that does not resolve.

pub mod lines;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{
    Event, EventDate, EventKind, Family, FamilyLink, FamilyRole, Individual, PersonName, RecordSet,
    RecordSource,
};
use lines::{read_lines, Line};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read GEDCOM file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("GEDCOM syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

const INDIVIDUAL_EVENTS: &[&str] = &[
    "BIRT", "CHR", "BAPM", "DEAT", "BURI", "CREM", "ADOP", "BARM", "BASM", "CONF", "EMIG",
    "IMMI", "NATU", "RESI", "CENS", "PROB", "WILL", "GRAD", "RETI", "EVEN",
];

const FAMILY_EVENTS: &[&str] = &[
    "MARR", "DIV", "ENGA", "ANUL", "MARB", "MARC", "MARL", "MARS", "DIVF", "CENS", "EVEN",
];

/// Read and parse a GEDCOM file. Invalid UTF-8 is replaced, not rejected.
pub fn load_file(path: &Path) -> Result<RecordSet, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);
    if let std::borrow::Cow::Owned(_) = content {
        warn!(path = %path.display(), "file is not valid UTF-8; invalid bytes replaced");
    }

    let records = parse_str(&content)?;
    info!(
        path = %path.display(),
        individuals = records.individual_count(),
        families = records.family_count(),
        "GEDCOM loaded"
    );
    Ok(records)
}

/// Parse GEDCOM text.
pub fn parse_str(content: &str) -> Result<RecordSet, LoadError> {
    let lines = read_lines(content)?;
    let mut builder = Builder::default();

    if lines.first().map(|l| l.tag.as_str()) != Some("HEAD") {
        warn!("GEDCOM header not found; continuing");
    }

    for line in &lines {
        builder.line(line);
    }
    builder.finish();

    Ok(builder.records)
}

enum Current {
    Skipped,
    Individual(Individual),
    Family(Family),
}

#[derive(Default)]
struct Builder {
    records: RecordSet,
    current: Option<Current>,
    /// Index of the open level-1 event in the current record.
    event: Option<usize>,
}

impl Builder {
    fn line(&mut self, line: &Line) {
        if line.level == 0 {
            self.finish();
            self.current = Some(start_record(line));
            return;
        }

        if line.level == 1 {
            self.event = None;
        }

        match self.current.as_mut() {
            Some(Current::Individual(individual)) => {
                individual_line(individual, &mut self.event, line)
            }
            Some(Current::Family(family)) => family_line(family, &mut self.event, line),
            Some(Current::Skipped) | None => {}
        }
    }

    fn finish(&mut self) {
        self.event = None;
        match self.current.take() {
            Some(Current::Individual(individual)) => {
                let id = individual.id.clone();
                if self.records.insert_individual(individual).is_some() {
                    warn!(id = %id, "duplicate individual id; later record wins");
                }
            }
            Some(Current::Family(family)) => {
                let id = family.id.clone();
                if self.records.insert_family(family).is_some() {
                    warn!(id = %id, "duplicate family id; later record wins");
                }
            }
            Some(Current::Skipped) | None => {}
        }
    }
}

fn start_record(line: &Line) -> Current {
    match (line.tag.as_str(), line.xref.as_deref()) {
        ("INDI", Some(id)) => {
            let mut individual = Individual::new(id);
            individual.line = Some(line.number);
            Current::Individual(individual)
        }
        ("FAM", Some(id)) => {
            let mut family = Family::new(id);
            family.line = Some(line.number);
            Current::Family(family)
        }
        ("INDI" | "FAM", None) => {
            warn!(line = line.number, tag = %line.tag, "record without cross-reference id skipped");
            Current::Skipped
        }
        (tag, _) => {
            debug!(line = line.number, tag, "skipping record");
            Current::Skipped
        }
    }
}

/// Apply a level-2 `DATE` or `PLAC` to the open event.
fn event_detail(events: &mut [Event], open: Option<usize>, line: &Line) {
    if line.level != 2 {
        return;
    }
    let Some(event) = open.and_then(|idx| events.get_mut(idx)) else {
        return;
    };
    match line.tag.as_str() {
        "DATE" => {
            if let Some(value) = &line.value {
                event.date = Some(EventDate::new(value.as_str()));
            }
        }
        "PLAC" => event.place = Some(line.value.clone().unwrap_or_default()),
        _ => {}
    }
}

fn pointer_or_warn<'a>(line: &'a Line, record: &str) -> Option<&'a str> {
    let pointer = line.pointer();
    if pointer.is_none() {
        warn!(line = line.number, record, tag = %line.tag, "empty pointer ignored");
    }
    pointer
}

fn individual_line(individual: &mut Individual, event: &mut Option<usize>, line: &Line) {
    if line.level != 1 {
        event_detail(&mut individual.events, *event, line);
        return;
    }

    match line.tag.as_str() {
        "NAME" => {
            if individual.name.is_none() {
                individual.name = Some(PersonName::parse(line.value.clone().unwrap_or_default()));
            }
        }
        "SEX" => individual.sex = Some(line.value.clone().unwrap_or_default()),
        "FAMC" | "FAMS" => {
            if let Some(family_id) = pointer_or_warn(line, &individual.id) {
                let role = if line.tag == "FAMC" {
                    FamilyRole::Child
                } else {
                    FamilyRole::Spouse
                };
                individual.links.push(FamilyLink {
                    family_id: family_id.to_string(),
                    role,
                });
            }
        }
        tag if INDIVIDUAL_EVENTS.contains(&tag) => {
            individual.events.push(Event::new(EventKind::from_tag(tag)));
            *event = Some(individual.events.len() - 1);
        }
        _ => {}
    }
}

fn family_line(family: &mut Family, event: &mut Option<usize>, line: &Line) {
    if line.level != 1 {
        event_detail(&mut family.events, *event, line);
        return;
    }

    match line.tag.as_str() {
        "HUSB" | "WIFE" | "CHIL" => {
            let Some(id) = pointer_or_warn(line, &family.id) else {
                return;
            };
            let id = id.to_string();
            match line.tag.as_str() {
                "HUSB" => family.husband = Some(id),
                "WIFE" => family.wife = Some(id),
                _ => family.children.push(id),
            }
        }
        tag if FAMILY_EVENTS.contains(&tag) => {
            family.events.push(Event::new(EventKind::from_tag(tag)));
            *event = Some(family.events.len() - 1);
        }
        _ => {}
    }
}
