use gedlint::model::{
    Event, EventKind, Family, FamilyLink, FamilyRole, Individual, PersonName, RecordSet,
};

pub struct IndividualBuilder {
    individual: Individual,
}

impl IndividualBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            individual: Individual::new(id),
        }
    }

    pub fn with_name(mut self, raw: &str) -> Self {
        self.individual.name = Some(PersonName::parse(raw));
        self
    }

    pub fn with_sex(mut self, sex: &str) -> Self {
        self.individual.sex = Some(sex.to_string());
        self
    }

    pub fn born(self, date: &str) -> Self {
        self.with_event(Event::new(EventKind::Birth).with_date(date))
    }

    pub fn born_in(self, date: &str, place: &str) -> Self {
        self.with_event(Event::new(EventKind::Birth).with_date(date).with_place(place))
    }

    pub fn died(self, date: &str) -> Self {
        self.with_event(Event::new(EventKind::Death).with_date(date))
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.individual.events.push(event);
        self
    }

    pub fn child_of(self, family: &str) -> Self {
        self.with_link(family, FamilyRole::Child)
    }

    pub fn spouse_in(self, family: &str) -> Self {
        self.with_link(family, FamilyRole::Spouse)
    }

    fn with_link(mut self, family: &str, role: FamilyRole) -> Self {
        self.individual.links.push(FamilyLink {
            family_id: family.to_string(),
            role,
        });
        self
    }

    pub fn build(self) -> Individual {
        self.individual
    }
}

pub struct FamilyBuilder {
    family: Family,
}

impl FamilyBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            family: Family::new(id),
        }
    }

    pub fn with_husband(mut self, id: &str) -> Self {
        self.family.husband = Some(id.to_string());
        self
    }

    pub fn with_wife(mut self, id: &str) -> Self {
        self.family.wife = Some(id.to_string());
        self
    }

    pub fn with_child(mut self, id: &str) -> Self {
        self.family.children.push(id.to_string());
        self
    }

    pub fn married(mut self, date: &str) -> Self {
        self.family
            .events
            .push(Event::new(EventKind::Marriage).with_date(date));
        self
    }

    pub fn build(self) -> Family {
        self.family
    }
}

#[derive(Default)]
pub struct TreeBuilder {
    records: RecordSet,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_individual(mut self, individual: IndividualBuilder) -> Self {
        self.records.insert_individual(individual.build());
        self
    }

    pub fn with_family(mut self, family: FamilyBuilder) -> Self {
        self.records.insert_family(family.build());
        self
    }

    /// Chain of single-parent families where each individual is the child of
    /// the next one, closing back on the first when `closed` is set.
    pub fn with_ancestry_chain(mut self, ids: &[&str], closed: bool) -> Self {
        let links = ids.len() - usize::from(!closed);
        for idx in 0..links {
            let child = ids[idx];
            let parent = ids[(idx + 1) % ids.len()];
            let family = format!("F{}", child);
            self.records.insert_family(
                FamilyBuilder::new(&family)
                    .with_husband(parent)
                    .with_child(child)
                    .build(),
            );
        }
        for (idx, id) in ids.iter().enumerate() {
            let mut person = IndividualBuilder::new(id);
            if idx < links {
                person = person.child_of(&format!("F{}", id));
            }
            if let Some(child) = (0..links).find(|&c| (c + 1) % ids.len() == idx) {
                person = person.spouse_in(&format!("F{}", ids[child]));
            }
            self.records.insert_individual(person.build());
        }
        self
    }

    pub fn build(self) -> RecordSet {
        self.records
    }
}
