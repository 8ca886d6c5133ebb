use std::path::Path;

use tvpick_core::catalog::{self, Catalog};
use tvpick_core::explain::{explain, risks};
use tvpick_core::record::{Attribute, RecordId, SpecRecord};
use tvpick_core::scene::{AttributeWeight, SceneProfile, SceneProfiles};
use tvpick_core::schema::{CoreSchema, FieldMapping};
use tvpick_core::selection::{compare_candidates, rank, score_all, Scorer, WeightedSceneScorer};
use tvpick_core::types::Risk;

fn fixture_catalog() -> Catalog {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog");
    let (catalog, warnings) = catalog::load(&[dir], &CoreSchema::v0(), &FieldMapping::identity());
    assert!(warnings.is_empty());
    catalog
}

fn bare(model: &str, price: Option<f64>) -> SpecRecord {
    SpecRecord {
        id: RecordId::from_parts("Acme", model, 65, 2024).unwrap(),
        brand: "Acme".to_string(),
        model: model.to_string(),
        size_inch: 65,
        release_year: 2024,
        price,
        panel_technology: None,
        peak_brightness_nits: None,
        refresh_rate_hz: None,
        hdr_formats: None,
        input_lag_ms: None,
        local_dimming_zones: None,
        native_contrast: None,
        color_gamut_dci_p3_pct: None,
        reflectance_pct: None,
        uniformity_dev_pct: None,
        memc_max_fps: None,
        hdmi_2_1_ports: None,
        vrr: None,
        allm: None,
    }
}

fn profile(name: &str, weights: &[(Attribute, f64)]) -> SceneProfile {
    SceneProfile {
        name: name.to_string(),
        description: String::new(),
        weights: weights
            .iter()
            .map(|&(attribute, weight)| AttributeWeight { attribute, weight })
            .collect(),
        penalties: Vec::new(),
    }
}

#[test]
fn invariant_scores_are_bounded_for_every_builtin_scene() {
    let catalog = fixture_catalog();
    let records: Vec<&SpecRecord> = catalog.records().iter().collect();
    let profiles = SceneProfiles::builtin();
    let scorer = WeightedSceneScorer::default();

    for name in profiles.names() {
        let profile = profiles.get(name).unwrap();
        for candidate in score_all(&scorer, &records, profile) {
            assert!(candidate.score >= 0.0);
            assert!(candidate.score <= candidate.base_score);
            assert!(
                candidate.base_score <= profile.total_weight() + 1e-9,
                "{} under {name} scored {}",
                candidate.record.id,
                candidate.base_score
            );
            for entry in &candidate.breakdown {
                assert!((0.0..=100.0).contains(&entry.normalized), "{:?}", entry);
            }
            assert_eq!(candidate.breakdown.len(), profile.weights.len());
        }
    }
}

#[test]
fn scoring_is_deterministic() {
    let catalog = fixture_catalog();
    let records: Vec<&SpecRecord> = catalog.records().iter().collect();
    let profiles = SceneProfiles::builtin();
    let movie = profiles.get("movie").unwrap();
    let scorer = WeightedSceneScorer::default();

    let first = score_all(&scorer, &records, movie);
    let second = score_all(&scorer, &records, movie);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.breakdown, b.breakdown);
    }
}

#[test]
fn missing_attribute_is_never_rewarded() {
    let lag = profile("lag", &[(Attribute::InputLag, 100.0)]);

    let mut slow = bare("Slow", Some(500.0));
    slow.input_lag_ms = Some(35.0);
    let unknown = bare("Unknown", Some(500.0));

    let scorer = WeightedSceneScorer::new(0.0);
    let slow_score = scorer.score(&slow, &lag).score;
    let unknown_score = scorer.score(&unknown, &lag).score;
    assert!(unknown_score <= slow_score, "undocumented lag beat a measured slow one");
    assert_eq!(unknown_score, 0.0);

    let lenient = WeightedSceneScorer::new(40.0);
    let scored = lenient.score(&unknown, &lag);
    assert_eq!(scored.breakdown[0].normalized, 40.0);
    assert_eq!(scored.breakdown[0].raw, None);
}

#[test]
fn absent_price_is_not_treated_as_free() {
    let price = profile("value", &[(Attribute::Price, 100.0)]);
    let scorer = WeightedSceneScorer::default();

    let priced = bare("Priced", Some(49_000.0));
    let unpriced = bare("Unpriced", None);
    assert!(scorer.score(&unpriced, &price).score <= scorer.score(&priced, &price).score);
}

#[test]
fn penalty_multiplies_total_and_is_recorded() {
    let catalog = fixture_catalog();
    let profiles = SceneProfiles::builtin();
    let ps5 = profiles.get("ps5").unwrap();
    let scorer = WeightedSceneScorer::default();

    let q6 = catalog.get(&RecordId::parse("tcl_q6_75_2024")).unwrap();
    let scored = scorer.score(q6, ps5);
    assert_eq!(scored.penalties.len(), 1, "Q6 has no HDMI 2.1 ports");
    assert_eq!(scored.penalties[0].attribute, Attribute::Hdmi21Ports);
    assert!((scored.score - scored.base_score * 0.9).abs() < 1e-9);

    let qm8 = catalog.get(&RecordId::parse("tcl_qm8_75_2024")).unwrap();
    let scored = scorer.score(qm8, ps5);
    assert!(scored.penalties.is_empty());
    assert_eq!(scored.score, scored.base_score);
}

#[test]
fn ties_break_by_price_then_id_with_unpriced_last() {
    let lag = profile("lag", &[(Attribute::InputLag, 100.0)]);
    let mut records = vec![
        bare("Delta", None),
        bare("Bravo", Some(500.0)),
        bare("Alpha", Some(500.0)),
        bare("Charlie", Some(300.0)),
        bare("Echo", Some(100.0)),
    ];
    for r in &mut records {
        r.input_lag_ms = Some(10.0);
    }
    // Echo is slower, so score outranks its lower price.
    records[4].input_lag_ms = Some(20.0);

    let refs: Vec<&SpecRecord> = records.iter().collect();
    let ranked = rank(score_all(&WeightedSceneScorer::default(), &refs, &lag));
    let order: Vec<&str> = ranked.iter().map(|c| c.record.model.as_str()).collect();

    assert_eq!(order, vec!["Charlie", "Alpha", "Bravo", "Delta", "Echo"]);
}

#[test]
fn invariant_ranked_pairs_respect_total_order() {
    let catalog = fixture_catalog();
    let records: Vec<&SpecRecord> = catalog.records().iter().collect();
    let profiles = SceneProfiles::builtin();
    let scorer = WeightedSceneScorer::default();

    for name in profiles.names() {
        let ranked = rank(score_all(&scorer, &records, profiles.get(name).unwrap()));
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.score >= b.score);
            if a.score == b.score {
                match (a.record.price, b.record.price) {
                    (Some(x), Some(y)) => assert!(x <= y),
                    (None, Some(_)) => panic!("unpriced record ranked ahead of a priced tie"),
                    _ => {}
                }
            }
            assert_eq!(compare_candidates(a, b), std::cmp::Ordering::Less);
        }
    }
}

#[test]
fn explain_picks_largest_contributions_first() {
    let catalog = fixture_catalog();
    let profiles = SceneProfiles::builtin();
    let ps5 = profiles.get("ps5").unwrap();
    let qm8 = catalog.get(&RecordId::parse("tcl_qm8_75_2024")).unwrap();

    let scored = WeightedSceneScorer::default().score(qm8, ps5);
    let explanation = explain(&scored, 3);

    assert_eq!(explanation.len(), 3);
    assert_eq!(explanation[0].attribute, Attribute::InputLag);
    for pair in explanation.windows(2) {
        assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
    }

    let everything = explain(&scored, 50);
    assert_eq!(everything.len(), ps5.weights.len());
}

#[test]
fn explain_ties_follow_declaration_order() {
    let mut record = bare("Flags", Some(1000.0));
    record.vrr = Some(true);
    record.allm = Some(true);
    let scorer = WeightedSceneScorer::default();

    let vrr_first = profile("a", &[(Attribute::Vrr, 50.0), (Attribute::Allm, 50.0)]);
    let allm_first = profile("b", &[(Attribute::Allm, 50.0), (Attribute::Vrr, 50.0)]);

    assert_eq!(explain(&scorer.score(&record, &vrr_first), 1)[0].attribute, Attribute::Vrr);
    assert_eq!(explain(&scorer.score(&record, &allm_first), 1)[0].attribute, Attribute::Allm);
    assert_eq!(allm_first.declaration_index(Attribute::Vrr), Some(1));
}

#[test]
fn explanation_flags_missing_attributes() {
    let record = bare("Sparse", Some(1000.0));
    let scored = WeightedSceneScorer::default().score(&record, &profile("p", &[(Attribute::Price, 60.0), (Attribute::InputLag, 40.0)]));
    let explanation = explain(&scored, 2);

    assert!(!explanation[0].missing);
    assert_eq!(explanation[1].attribute, Attribute::InputLag);
    assert!(explanation[1].missing);
}

#[test]
fn risks_follow_declaration_order_without_truncation() {
    let profiles = SceneProfiles::builtin();
    let ps5 = profiles.get("ps5").unwrap();

    let mut console = bare("Console", Some(900.0));
    console.input_lag_ms = Some(8.0);
    console.hdmi_2_1_ports = Some(4);
    console.vrr = Some(true);
    console.refresh_rate_hz = Some(120);
    console.peak_brightness_nits = Some(800.0);
    console.local_dimming_zones = Some(200);

    let scored = WeightedSceneScorer::default().score(&console, ps5);
    assert_eq!(
        risks(&scored),
        vec![Risk::Undocumented {
            attribute: Attribute::Allm,
            weight: 5.0,
        }]
    );

    console.vrr = None;
    console.allm = Some(false);
    let scored = WeightedSceneScorer::default().score(&console, ps5);
    let attributes: Vec<Attribute> = risks(&scored)
        .into_iter()
        .map(|risk| match risk {
            Risk::Undocumented { attribute, .. }
            | Risk::Unsupported { attribute }
            | Risk::Penalized { attribute, .. } => attribute,
        })
        .collect();
    assert_eq!(attributes, vec![Attribute::Vrr, Attribute::Allm]);
}
