//! Property-based tests using QuickCheck

use casebridge_assembler::BundleAssembler;
use casebridge_models::{
    Composition, CreationRegistry, Encounter, EncounterLocation, ListResource, Location,
    Organization, Patient, Ref, ResourceId, Subject,
};
use quickcheck::{Arbitrary, Gen, QuickCheck};
use std::collections::HashSet;

const MAX_ORGANIZATIONS: usize = 8;

/// Shape of a random organization graph, cycles included
#[derive(Clone, Debug)]
struct Graph {
    parents: Vec<Option<usize>>,
    locations: Vec<usize>,
    provider: Option<usize>,
    practices: Vec<usize>,
}

impl Arbitrary for Graph {
    fn arbitrary(g: &mut Gen) -> Self {
        let organizations = 1 + usize::arbitrary(g) % MAX_ORGANIZATIONS;
        let pick = |g: &mut Gen| usize::arbitrary(g) % organizations;

        let parents = (0..organizations)
            .map(|_| bool::arbitrary(g).then(|| pick(g)))
            .collect();
        let locations = (0..usize::arbitrary(g) % 4).map(|_| pick(g)).collect();
        let provider = bool::arbitrary(g).then(|| pick(g));
        let practices = (0..usize::arbitrary(g) % 3).map(|_| pick(g)).collect();

        Graph {
            parents,
            locations,
            provider,
            practices,
        }
    }
}

struct Built {
    registry: CreationRegistry,
    organizations: Vec<Ref<Organization>>,
    encounter: Ref<Encounter>,
    composition: Ref<Composition>,
}

fn build(graph: &Graph) -> Built {
    let mut registry = CreationRegistry::new();
    let organizations: Vec<Ref<Organization>> = graph
        .parents
        .iter()
        .map(|_| registry.create(Organization::default()))
        .collect();
    for (child, parent) in graph.parents.iter().enumerate() {
        if let Some(parent) = parent {
            registry.resolve_mut(organizations[child]).unwrap().part_of =
                Some(organizations[*parent]);
        }
    }

    let location = graph
        .locations
        .iter()
        .map(|&org| {
            let site = registry.create(Location {
                managing_organization: Some(organizations[org]),
            });
            EncounterLocation {
                location: Some(site),
            }
        })
        .collect();
    let patient = registry.create(Patient {
        general_practitioner: graph.practices.iter().map(|&p| organizations[p]).collect(),
    });
    let encounter = registry.create(Encounter {
        service_provider: graph.provider.map(|p| organizations[p]),
        location,
        subject: Some(Subject::Individual(patient)),
        ..Encounter::default()
    });
    let composition = registry.create(Composition::default());

    Built {
        registry,
        organizations,
        encounter,
        composition,
    }
}

#[test]
fn prop_no_identity_emitted_twice() {
    fn prop(graph: Graph) -> bool {
        let built = build(&graph);
        let ids = BundleAssembler::new(&built.registry)
            .assemble(built.encounter, built.composition)
            .unwrap()
            .ids();

        let distinct: HashSet<ResourceId> = ids.iter().copied().collect();
        distinct.len() == ids.len()
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Graph) -> bool);
}

#[test]
fn prop_manifest_matches_emitted() {
    fn prop(graph: Graph) -> bool {
        let built = build(&graph);
        let assembled = BundleAssembler::new(&built.registry)
            .assemble(built.encounter, built.composition)
            .unwrap();

        let emitted: Vec<ResourceId> = assembled
            .entries()
            .iter()
            .map(|e| e.resource.id())
            .collect();
        let listed: Vec<ResourceId> = assembled
            .manifest()
            .downcast::<ListResource>()
            .map(|list| list.entry.iter().map(|e| e.item.id()).collect())
            .unwrap_or_default();
        emitted == listed
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Graph) -> bool);
}

#[test]
fn prop_managing_organizations_and_ancestors_emitted() {
    fn prop(graph: Graph) -> bool {
        let built = build(&graph);
        let ids: HashSet<ResourceId> = BundleAssembler::new(&built.registry)
            .assemble(built.encounter, built.composition)
            .unwrap()
            .ids()
            .into_iter()
            .collect();

        // Every organization reachable via partOf from a location's manager
        graph.locations.iter().all(|&start| {
            let mut seen = HashSet::new();
            let mut next = Some(start);
            while let Some(current) = next {
                if !seen.insert(current) {
                    break;
                }
                if !ids.contains(&built.organizations[current].id()) {
                    return false;
                }
                next = graph.parents[current];
            }
            true
        })
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Graph) -> bool);
}
