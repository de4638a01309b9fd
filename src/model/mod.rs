//! Normalised in-memory record model.
//!
//! The model is decoupled from the GEDCOM file format: a loader builds a
//! [`RecordSet`] once, and checks read it through the [`RecordSource`]
//! capability trait. Relationships are stored as identifiers only, so a
//! reference to a missing record survives loading and can be reported.

pub mod date;
pub mod records;

use std::collections::BTreeMap;

pub use date::{Approximation, DateError, DatePolicy, DateValue, PartialDate};
pub use records::{
    Event, EventDate, EventKind, Family, FamilyLink, FamilyRole, Individual, PersonName, Sex,
};

/// Read access every check relies on.
///
/// Iteration order must be stable for a given record set so that repeated
/// validation runs produce identical findings.
pub trait RecordSource: Sync {
    fn individuals(&self) -> Box<dyn Iterator<Item = &Individual> + '_>;

    fn families(&self) -> Box<dyn Iterator<Item = &Family> + '_>;

    fn individual(&self, id: &str) -> Option<&Individual>;

    fn family(&self, id: &str) -> Option<&Family>;

    fn individual_count(&self) -> usize {
        self.individuals().count()
    }

    fn family_count(&self) -> usize {
        self.families().count()
    }
}

/// Owner of every individual and family in one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    individuals: BTreeMap<String, Individual>,
    families: BTreeMap<String, Family>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an individual, returning the record it replaced.
    pub fn insert_individual(&mut self, individual: Individual) -> Option<Individual> {
        self.individuals.insert(individual.id.clone(), individual)
    }

    /// Insert a family, returning the record it replaced.
    pub fn insert_family(&mut self, family: Family) -> Option<Family> {
        self.families.insert(family.id.clone(), family)
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty() && self.families.is_empty()
    }
}

impl RecordSource for RecordSet {
    fn individuals(&self) -> Box<dyn Iterator<Item = &Individual> + '_> {
        Box::new(self.individuals.values())
    }

    fn families(&self) -> Box<dyn Iterator<Item = &Family> + '_> {
        Box::new(self.families.values())
    }

    fn individual(&self, id: &str) -> Option<&Individual> {
        self.individuals.get(id)
    }

    fn family(&self, id: &str) -> Option<&Family> {
        self.families.get(id)
    }

    fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    fn family_count(&self) -> usize {
        self.families.len()
    }
}
