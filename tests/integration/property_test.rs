//! Property tests over randomly linked trees

use proptest::prelude::*;
use std::collections::BTreeSet;

use gedlint::config::RuleConfiguration;
use gedlint::engine::ValidationEngine;
use gedlint::findings::Location;
use gedlint::gedcom;
use gedlint::model::RecordSet;

use crate::support::builders::{FamilyBuilder, IndividualBuilder, TreeBuilder};

/// One single-parent family per edge, linked in both directions.
fn tree_from_edges(people: usize, edges: &[(usize, usize)]) -> RecordSet {
    let mut individuals: Vec<IndividualBuilder> = (0..people)
        .map(|idx| IndividualBuilder::new(&format!("I{}", idx)))
        .collect();
    let mut tree = TreeBuilder::new();

    for (idx, &(child, parent)) in edges.iter().enumerate() {
        let family = format!("F{}", idx);
        tree = tree.with_family(
            FamilyBuilder::new(&family)
                .with_husband(&format!("I{}", parent))
                .with_child(&format!("I{}", child)),
        );
        let person = std::mem::replace(&mut individuals[child], IndividualBuilder::new(""));
        individuals[child] = person.child_of(&family);
        let person = std::mem::replace(&mut individuals[parent], IndividualBuilder::new(""));
        individuals[parent] = person.spouse_in(&family);
    }

    individuals
        .into_iter()
        .fold(tree, |tree, person| tree.with_individual(person))
        .build()
}

fn edges_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..30).prop_flat_map(|people| {
        (
            Just(people),
            prop::collection::vec((0..people, 0..people), 0..60),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cycle_paths_are_closed_and_unique((people, edges) in edges_strategy()) {
        let records = tree_from_edges(people, &edges);
        let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());

        let mut seen = BTreeSet::new();
        for finding in findings.with_code("ancestry-cycle") {
            let Location::Path { ids } = &finding.location else {
                panic!("cycle finding without a path: {:?}", finding.location);
            };
            prop_assert!(ids.len() >= 2);
            prop_assert_eq!(ids.first(), ids.last());

            let members: BTreeSet<_> = ids[..ids.len() - 1].iter().collect();
            prop_assert_eq!(members.len(), ids.len() - 1);
            prop_assert!(seen.insert(ids.clone()), "cycle reported twice: {:?}", ids);
        }
        prop_assert_eq!(findings.with_code("dangling-reference").count(), 0);
        prop_assert_eq!(findings.with_code("asymmetric-link").count(), 0);
    }

    #[test]
    fn prop_self_parent_always_detected(people in 1usize..20, who in 0usize..20) {
        let who = who % people;
        let records = tree_from_edges(people, &[(who, who)]);
        let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());

        let id = format!("I{}", who);
        let expected = Location::path(vec![id.clone(), id]);
        prop_assert_eq!(
            findings.with_code("ancestry-cycle").map(|f| &f.location).collect::<Vec<_>>(),
            vec![&expected]
        );
    }

    #[test]
    fn prop_runs_are_idempotent((people, edges) in edges_strategy(), parallel in any::<bool>()) {
        let records = tree_from_edges(people, &edges);
        let config = RuleConfiguration::defaults();
        let engine = ValidationEngine::new().with_parallel(parallel);

        prop_assert_eq!(engine.run(&records, &config), engine.run(&records, &config));
    }

    #[test]
    fn prop_loader_never_panics(lines in prop::collection::vec("[0-3] (@I[0-9]@ )?[A-Z]{3,4}( [ -~]{0,12})?", 0..20)) {
        let content = lines.join("\n");
        let _ = gedcom::parse_str(&content);
    }
}
