use std::path::Path;
use std::sync::Arc;

use tvpick_core::catalog::{self, Catalog};
use tvpick_core::comparison::{compare, CompareError, ComparisonMatrix, ComparisonRow};
use tvpick_core::error::ErrorCode;
use tvpick_core::record::{Attribute, AttributeValue, Direction, InputLagClass, RecordId};
use tvpick_core::schema::{CoreSchema, FieldMapping};
use tvpick_core::selection::DecisionEngine;

fn fixture_catalog() -> Catalog {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog");
    let (catalog, _) = catalog::load(&[dir], &CoreSchema::v0(), &FieldMapping::identity());
    catalog
}

fn ids(raw: &[&str]) -> Vec<RecordId> {
    raw.iter().map(|s| RecordId::parse(s)).collect()
}

fn row(matrix: &ComparisonMatrix, attribute: Attribute) -> &ComparisonRow {
    matrix.rows.iter().find(|r| r.attribute == attribute).unwrap()
}

const QM8: &str = "tcl_qm8_75_2024";
const Q6: &str = "tcl_q6_75_2024";
const S90D: &str = "samsung_s90d_77_2024";

#[test]
fn rows_cover_the_fixed_attribute_list_with_raw_cells() {
    let catalog = fixture_catalog();
    let matrix = compare(&catalog, &ids(&[QM8, Q6])).unwrap();

    let attributes: Vec<Attribute> = matrix.rows.iter().map(|r| r.attribute).collect();
    assert_eq!(attributes, Attribute::ALL.to_vec());
    assert_eq!(matrix.columns.len(), 2);
    assert_eq!(matrix.columns[0].id.as_str(), QM8);

    let price = row(&matrix, Attribute::Price);
    assert_eq!(
        price.cells,
        vec![Some(AttributeValue::Number(2999.0)), Some(AttributeValue::Number(699.0))]
    );
    for r in &matrix.rows {
        assert_eq!(r.cells.len(), 2);
    }
}

#[test]
fn best_and_worst_follow_direction() {
    let catalog = fixture_catalog();
    let matrix = compare(&catalog, &ids(&[QM8, Q6, S90D])).unwrap();

    let price = row(&matrix, Attribute::Price);
    assert_eq!(price.direction, Direction::LowerIsBetter);
    assert_eq!(price.best, ids(&[Q6]));
    assert_eq!(price.worst, ids(&[QM8]));

    let brightness = row(&matrix, Attribute::PeakBrightness);
    assert_eq!(brightness.best, ids(&[QM8]));
    assert_eq!(brightness.worst, ids(&[Q6]));

    let lag = row(&matrix, Attribute::InputLag);
    assert_eq!(lag.best, ids(&[QM8]));
    assert_eq!(lag.worst, ids(&[Q6]));

    let vrr = row(&matrix, Attribute::Vrr);
    assert_eq!(vrr.best, ids(&[S90D, QM8]), "ties list every id, sorted");
    assert_eq!(vrr.worst, ids(&[Q6]));
}

#[test]
fn categorical_rows_carry_no_markers() {
    let catalog = fixture_catalog();
    let matrix = compare(&catalog, &ids(&[QM8, Q6, S90D])).unwrap();

    for attribute in [Attribute::PanelTechnology, Attribute::HdrFormats] {
        let r = row(&matrix, attribute);
        assert_eq!(r.direction, Direction::Categorical);
        assert!(r.best.is_empty() && r.worst.is_empty());
        assert!(r.cells.iter().all(Option::is_some));
    }
}

#[test]
fn equal_or_sparse_rows_carry_no_markers() {
    let catalog = fixture_catalog();
    let matrix = compare(&catalog, &ids(&[QM8, Q6])).unwrap();

    let allm = row(&matrix, Attribute::Allm);
    assert!(allm.best.is_empty(), "both support ALLM");

    // Only the QM8 documents local dimming zones.
    let zones = row(&matrix, Attribute::LocalDimmingZones);
    assert_eq!(zones.cells[1], None);
    assert!(zones.best.is_empty() && zones.worst.is_empty());
}

#[test]
fn invariant_comparison_is_symmetric() {
    let catalog = fixture_catalog();
    let forward = compare(&catalog, &ids(&[QM8, S90D])).unwrap();
    let backward = compare(&catalog, &ids(&[S90D, QM8])).unwrap();

    for (f, b) in forward.rows.iter().zip(backward.rows.iter()) {
        assert_eq!(f.attribute, b.attribute);
        let mut reversed = b.cells.clone();
        reversed.reverse();
        assert_eq!(f.cells, reversed);
        assert_eq!(f.best, b.best);
        assert_eq!(f.worst, b.worst);
    }
    assert_eq!(forward.catalog_version, backward.catalog_version);
}

#[test]
fn unknown_ids_are_reported_without_aborting() {
    let catalog = fixture_catalog();
    let matrix = compare(&catalog, &ids(&[QM8, "ghost_tv_75_2024", Q6])).unwrap();

    assert_eq!(matrix.columns.len(), 2);
    assert_eq!(matrix.unknown_ids.len(), 1);
    assert_eq!(matrix.unknown_ids[0].code, ErrorCode::UnknownId);
    assert_eq!(matrix.unknown_ids[0].id.as_str(), "ghost_tv_75_2024");
}

#[test]
fn fewer_than_two_distinct_ids_is_an_error() {
    let catalog = fixture_catalog();
    assert_eq!(compare(&catalog, &ids(&[QM8])).unwrap_err(), CompareError::TooFewIds(1));
    assert_eq!(
        compare(&catalog, &ids(&[QM8, "TCL_QM8_75_2024"])).unwrap_err(),
        CompareError::TooFewIds(1)
    );
}

#[test]
fn engine_compare_parses_caller_ids() {
    let engine = DecisionEngine::default();
    let catalog = Arc::new(fixture_catalog());
    let matrix = engine
        .compare(&catalog, &[" TCL_QM8_75_2024 ".to_string(), Q6.to_string()])
        .unwrap();

    assert!(matrix.unknown_ids.is_empty());
    assert_eq!(matrix.columns[0].id.as_str(), QM8);
}

#[test]
fn columns_carry_the_input_lag_class() {
    let catalog = fixture_catalog();
    let matrix = compare(&catalog, &ids(&[QM8, Q6, "hisense_u7n_65_2024"])).unwrap();

    let classes: Vec<Option<InputLagClass>> = matrix.columns.iter().map(|c| c.input_lag_class).collect();
    assert_eq!(
        classes,
        vec![
            Some(InputLagClass::Competitive),
            Some(InputLagClass::Responsive),
            Some(InputLagClass::Responsive),
        ]
    );
    assert_eq!(InputLagClass::from_millis(10.0), InputLagClass::Competitive);
    assert_eq!(InputLagClass::from_millis(20.5), InputLagClass::Casual);

    let json = serde_json::to_string(&matrix.columns[0]).unwrap();
    assert!(json.ends_with(r#""input_lag_class":"competitive"}"#), "{json}");
}
