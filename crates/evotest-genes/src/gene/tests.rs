//! Tests for the gene model

use super::*;

fn create_address() -> Gene {
    Gene::object(
        "address",
        vec![
            Gene::string("street", "main", 0, 20).unwrap(),
            Gene::integer("number", 10, 1, 500).unwrap(),
            Gene::optional("zip", Gene::integer("code", 1000, 1000, 9999).unwrap(), false),
        ],
    )
    .unwrap()
}

#[test]
fn test_constructors_validate_domains() {
    assert!(matches!(
        Gene::integer("x", 5, 10, 1),
        Err(GeneError::InvalidDomain { .. })
    ));
    assert!(Gene::integer("x", 11, 0, 10).is_err());
    assert!(Gene::float("f", 0.5, 1.0, 0.0).is_err());
    assert!(Gene::string("s", "toolong", 0, 3).is_err());
    assert!(Gene::date("d", 2020, 2, 30, 1900, 2100).is_err());
    assert!(Gene::choice("c", vec![], 0).is_err());
    assert!(Gene::choice("c", vec![Gene::boolean("b", true)], 1).is_err());
    assert!(Gene::object(
        "o",
        vec![Gene::boolean("a", true), Gene::boolean("a", false)]
    )
    .is_err());
}

#[test]
fn test_mutation_weights() {
    assert_eq!(Gene::integer("x", 1, 0, 10).unwrap().mutation_weight(), 1.0);
    assert_eq!(Gene::integer("x", 3, 3, 3).unwrap().mutation_weight(), 0.0);
    assert_eq!(Gene::boolean("b", false).immutable().mutation_weight(), 0.0);
    assert_eq!(Gene::immutable_holder("fk", "42").mutation_weight(), 0.0);
    assert_eq!(Gene::cycle("parent", "Node").mutation_weight(), 0.0);

    // street + number + (optional toggle + inner code)
    assert_eq!(create_address().mutation_weight(), 4.0);
}

#[test]
fn test_placeholders_reject_changes() {
    let mut rng = Randomness::new(1);
    let ctx = MutationContext::default();

    let mut holder = Gene::immutable_holder("fk", "42");
    assert!(matches!(
        holder.randomize(&mut rng, true),
        Err(GeneError::ImmutableGene { .. })
    ));
    assert!(holder.mutate(&mut rng, &ctx).is_err());
    assert_eq!(holder.value_string().unwrap(), "42");

    let mut cycle = Gene::cycle("parent", "Node");
    assert!(matches!(
        cycle.randomize(&mut rng, false),
        Err(GeneError::CycleMaterialization { .. })
    ));
    assert!(cycle.mutate(&mut rng, &ctx).is_err());
    assert!(cycle.value_string().is_err());
}

#[test]
fn test_placeholder_errors_do_not_leak_values() {
    let mut rng = Randomness::new(1);
    let ctx = MutationContext::default();

    let mut holder = Gene::immutable_holder("fk", "secret-42");
    let GeneKind::ImmutableHolder(inner) = holder.kind_mut() else {
        panic!("expected holder");
    };
    for result in [inner.randomize(&mut rng, true), inner.mutate(&mut rng, &ctx)] {
        match result {
            Err(GeneError::ImmutableGene { name }) => assert_ne!(name, "secret-42"),
            other => panic!("unexpected {other:?}"),
        }
    }

    let mut cycle = Gene::cycle("parent", "Node");
    let GeneKind::Cycle(inner) = cycle.kind_mut() else {
        panic!("expected cycle");
    };
    match inner.mutate(&mut rng, &ctx) {
        Err(GeneError::CycleMaterialization { name }) => assert_ne!(name, "Node"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_immutable_flag_rejects_changes() {
    let mut rng = Randomness::new(1);
    let mut gene = Gene::integer("x", 1, 0, 10).unwrap().immutable();
    assert!(matches!(
        gene.mutate(&mut rng, &MutationContext::default()),
        Err(GeneError::ImmutableGene { .. })
    ));
    assert_eq!(gene.as_i64(), Some(1));
}

#[test]
fn test_forced_randomize_changes_every_mutable_variant() {
    let mut rng = Randomness::new(17);
    let mut genes = vec![
        Gene::integer("i", 0, 0, 1).unwrap(),
        Gene::float("f", 0.0, 0.0, 1.0).unwrap(),
        Gene::boolean("b", true),
        Gene::string("s", "", 0, 4).unwrap(),
        Gene::date("d", 2000, 1, 1, 1990, 2010).unwrap(),
        Gene::optional("o", Gene::boolean("inner", false), true),
        Gene::collection("c", Gene::integer("e", 0, 0, 3).unwrap(), vec![], 0, 3).unwrap(),
        create_address(),
        Gene::choice(
            "ch",
            vec![Gene::boolean("yes", true), Gene::integer("n", 0, 0, 9).unwrap()],
            0,
        )
        .unwrap(),
    ];

    for _ in 0..50 {
        for gene in genes.iter_mut() {
            let before = gene.clone();
            gene.randomize(&mut rng, true).unwrap();
            assert!(
                !gene.contains_same_value_as(&before),
                "{} kept its value",
                gene.name()
            );
            assert!(gene.is_locally_valid());
        }
    }
}

#[test]
fn test_mutate_always_changes_value() {
    let mut rng = Randomness::new(23);
    let ctx = MutationContext::default();
    let mut genes = vec![
        Gene::integer("i", 1000, -1000, 1000).unwrap(),
        Gene::integer("tiny", 0, 0, 1).unwrap(),
        Gene::float("f", 0.25, 0.0, 0.5).unwrap(),
        Gene::string("s", "abc", 1, 5).unwrap(),
        Gene::date("d", 2000, 12, 31, 2000, 2000).unwrap(),
        create_address(),
    ];

    for _ in 0..100 {
        for gene in genes.iter_mut() {
            let before = gene.clone();
            gene.mutate(&mut rng, &ctx).unwrap();
            assert!(!gene.contains_same_value_as(&before), "{}", gene.name());
            assert!(gene.is_locally_valid(), "{}", gene.name());
        }
    }
}

#[test]
fn test_float_mutate_moves_at_large_magnitude() {
    let mut rng = Randomness::new(3);
    let ctx = MutationContext::default();
    let mut gene = Gene::float("big", 1e17 + 512.0, 1e17, 1e17 + 1024.0).unwrap();

    for _ in 0..200 {
        let before = gene.clone();
        gene.mutate(&mut rng, &ctx).unwrap();
        assert!(!gene.contains_same_value_as(&before));
        assert!(gene.is_locally_valid());
    }
}

#[test]
fn test_integer_delta_is_local() {
    let mut rng = Randomness::new(5);
    let ctx = MutationContext {
        max_delta_exponent: 2,
        probability_of_randomization: 0.0,
    };
    let mut gene = Gene::integer("x", 500, 0, 1000).unwrap();
    for _ in 0..100 {
        let before = gene.as_i64().unwrap();
        gene.mutate(&mut rng, &ctx).unwrap();
        let after = gene.as_i64().unwrap();
        assert!((after - before).abs() <= 4);
        assert_ne!(after, before);
    }
}

#[test]
fn test_single_value_domain_is_waived() {
    let mut rng = Randomness::new(2);
    let mut gene = Gene::integer("x", 7, 7, 7).unwrap();
    gene.randomize(&mut rng, true).unwrap();
    assert_eq!(gene.as_i64(), Some(7));
    assert!(!gene.is_mutable());
}

#[test]
fn test_collection_with_cycle_template_is_empty() {
    let mut rng = Randomness::new(3);
    let mut gene = Gene::collection("children", Gene::cycle("child", "Node"), vec![], 1, 4).unwrap();
    assert_eq!(gene.mutation_weight(), 0.0);
    gene.randomize(&mut rng, false).unwrap();
    assert!(gene.children().is_empty());
    assert_eq!(gene.value_string().unwrap(), "[]");
}

#[test]
fn test_collection_respects_size_bounds() {
    let mut rng = Randomness::new(8);
    let ctx = MutationContext::default();
    let template = Gene::integer("x", 0, 0, 100).unwrap();
    let mut gene = Gene::collection("xs", template.clone(), vec![template], 1, 3).unwrap();
    for _ in 0..200 {
        gene.mutate(&mut rng, &ctx).unwrap();
        assert!((1..=3).contains(&gene.children().len()));
        assert!(gene.is_locally_valid());
    }
}

#[test]
fn test_optional_around_cycle_stays_inactive() {
    let mut rng = Randomness::new(4);
    let mut gene = Gene::optional("parent", Gene::cycle("ref", "Node"), true);
    assert_eq!(gene.value_string().unwrap(), "null");
    assert_eq!(gene.mutation_weight(), 0.0);
    gene.randomize(&mut rng, false).unwrap();
    assert_eq!(gene.value_string().unwrap(), "null");
}

#[test]
fn test_choice_never_activates_cycle() {
    let mut rng = Randomness::new(6);
    let mut gene = Gene::choice(
        "c",
        vec![Gene::integer("a", 0, 0, 10).unwrap(), Gene::cycle("b", "Node")],
        0,
    )
    .unwrap();
    for _ in 0..100 {
        gene.randomize(&mut rng, false).unwrap();
        assert!(gene.value_string().is_ok());
    }
}

#[test]
fn test_weighted_choice_follows_probabilities() {
    let mut rng = Randomness::new(10);
    let mut gene = Gene::weighted_choice(
        "c",
        vec![Gene::boolean("a", true), Gene::boolean("b", true)],
        0,
        vec![0.0, 1.0],
    )
    .unwrap();
    for _ in 0..20 {
        gene.randomize(&mut rng, false).unwrap();
        match gene.kind() {
            GeneKind::Choice(c) => assert_eq!(c.active_index(), 1),
            other => panic!("unexpected kind {}", other.kind_name()),
        }
    }
}

#[test]
fn test_flat_view_and_value_string() {
    let gene = create_address();
    let names: Vec<&str> = gene.flat_view().iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["address", "street", "number", "zip", "code"]);
    assert_eq!(
        gene.value_string().unwrap(),
        r#"{"street": "main", "number": 10, "zip": null}"#
    );
    assert_eq!(gene.field("number").and_then(Gene::as_i64), Some(10));
}

#[test]
fn test_deep_copy_is_independent() {
    let mut rng = Randomness::new(12);
    let original = create_address();
    let mut copy = original.clone();
    copy.mutate(&mut rng, &MutationContext::default()).unwrap();
    assert!(!copy.contains_same_value_as(&original));
    assert_eq!(original.field("street").and_then(Gene::as_str), Some("main"));
}

#[test]
fn test_set_i64() {
    let mut gene = Gene::integer("x", 0, 0, 10).unwrap();
    gene.set_i64(9).unwrap();
    assert_eq!(gene.as_i64(), Some(9));
    assert!(gene.set_i64(11).is_err());
    assert!(matches!(
        Gene::boolean("b", true).set_i64(1),
        Err(GeneError::TypeMismatch { .. })
    ));
}
