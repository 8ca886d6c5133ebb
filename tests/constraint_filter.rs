use tvpick_core::catalog::Catalog;
use tvpick_core::record::{RecordId, SpecRecord};
use tvpick_core::selection::{filter, ConstraintSet};

fn record(brand: &str, model: &str, size_inch: u32, price: Option<f64>) -> SpecRecord {
    SpecRecord {
        id: RecordId::from_parts(brand, model, size_inch, 2024).unwrap(),
        brand: brand.to_string(),
        model: model.to_string(),
        size_inch,
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

fn sizes_catalog() -> Catalog {
    Catalog::from_records(
        vec![
            record("TCL", "A", 72, Some(700.0)),
            record("TCL", "B", 73, Some(800.0)),
            record("Sony", "C", 75, Some(2500.0)),
            record("LG", "D", 77, None),
            record("TCL", "E", 78, Some(900.0)),
        ],
        0,
    )
}

fn ids(records: &[&SpecRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.to_string()).collect()
}

#[test]
fn size_tolerance_is_inclusive_at_two_inches() {
    let catalog = sizes_catalog();
    let matched = filter(&catalog, &ConstraintSet::new(75, 2));

    let sizes: Vec<u32> = matched.iter().map(|r| r.size_inch).collect();
    assert_eq!(sizes, vec![77, 75, 73], "72 and 78 sit three inches away");
    assert_eq!(
        ids(&matched),
        vec!["lg_d_77_2024", "sony_c_75_2024", "tcl_b_73_2024"],
        "filter preserves catalog order"
    );
}

#[test]
fn zero_tolerance_means_exact_size() {
    let catalog = sizes_catalog();
    let matched = filter(&catalog, &ConstraintSet::new(75, 0));
    assert_eq!(ids(&matched), vec!["sony_c_75_2024"]);
}

#[test]
fn absurd_size_matches_nothing() {
    let catalog = sizes_catalog();
    assert!(filter(&catalog, &ConstraintSet::new(1, 2)).is_empty());
}

#[test]
fn budget_excludes_unpriced_records_only_when_present() {
    let catalog = sizes_catalog();

    let unbounded = filter(&catalog, &ConstraintSet::new(75, 2));
    assert!(unbounded.iter().any(|r| r.price.is_none()));

    let bounded = filter(&catalog, &ConstraintSet::new(75, 2).with_budget(1_000_000.0));
    assert!(bounded.iter().all(|r| r.price.is_some()));
    assert_eq!(bounded.len(), unbounded.len() - 1);

    let tight = filter(&catalog, &ConstraintSet::new(75, 2).with_budget(800.0));
    assert_eq!(ids(&tight), vec!["tcl_b_73_2024"], "price equal to budget passes");
}

#[test]
fn brand_match_is_case_insensitive() {
    let catalog = sizes_catalog();
    let constraints = ConstraintSet::new(75, 3).with_brands(["tcl", " SONY "]);
    let matched = filter(&catalog, &constraints);

    assert_eq!(
        ids(&matched),
        vec!["sony_c_75_2024", "tcl_a_72_2024", "tcl_b_73_2024", "tcl_e_78_2024"]
    );
}

#[test]
fn id_set_restricts_candidates() {
    let catalog = sizes_catalog();
    let constraints = ConstraintSet::new(75, 2).with_ids([
        RecordId::parse("TCL_B_73_2024"),
        RecordId::parse("tcl_e_78_2024"),
    ]);

    assert_eq!(ids(&filter(&catalog, &constraints)), vec!["tcl_b_73_2024"]);
}

#[test]
fn invariant_widening_budget_never_shrinks_the_set() {
    let catalog = sizes_catalog();
    let budgets = [0.0, 650.0, 700.0, 800.0, 900.0, 2500.0, 10_000.0];

    let mut previous = 0;
    for budget in budgets {
        let n = filter(&catalog, &ConstraintSet::new(75, 5).with_budget(budget)).len();
        assert!(n >= previous, "budget {budget} shrank the set from {previous} to {n}");
        previous = n;
    }
}

#[test]
fn invariant_narrowing_tolerance_never_grows_the_set() {
    let catalog = sizes_catalog();

    let mut previous = usize::MAX;
    for tolerance in (0..=5).rev() {
        let matched = filter(&catalog, &ConstraintSet::new(75, tolerance));
        assert!(matched.len() <= previous);
        previous = matched.len();
    }
}
