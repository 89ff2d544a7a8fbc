//! Integration tests across the analytics modules on a shared sales table.

mod common;

use approx::assert_relative_eq;
use common::SalesFixture;
use proptest::prelude::*;
use tabstat::analytics::aggregation::{group_by, grouped_count, grouped_sum, pivot, Aggregation};
use tabstat::analytics::correlation::{correlation_matrix, pearson, CorrelationMethod};
use tabstat::analytics::descriptive::{mean, summarize};
use tabstat::analytics::distribution::histogram;
use tabstat::analytics::quantiles::{iqr_outliers, quantiles, zscore_outliers};
use tabstat::data::filter::{FilterOption, SortOption, SortOrder};
use tabstat::{AnalyticsError, ColumnRef, ErrorKind, ParsePolicy, Table};

// ============================================================================
// AGGREGATION
// ============================================================================

#[test]
fn grouped_sum_by_region() {
    let t = SalesFixture::table();
    let sums = grouped_sum(&group_by(&t, "region", "sales").unwrap());
    assert_eq!(sums["North"], 450.0);
    assert_eq!(sums["South"], 380.0);
    assert_eq!(sums["East"], 420.0);
    assert_eq!(grouped_count(&group_by(&t, "region", "sales").unwrap())["South"], 3);
}

#[test]
fn pivot_cells_match_scalar_reducers() {
    let t = SalesFixture::table();
    for agg in Aggregation::ALL {
        let p = pivot(&t, "region", "quarter", "sales", agg).unwrap();
        for (region, quarter, value) in p.cells() {
            let subset: Vec<f64> = SalesFixture::data()
                .into_iter()
                .filter(|row| row.0 == region && row.2 == quarter)
                .map(|row| row.3)
                .collect();
            assert_eq!(Some(value), agg.reduce(&subset), "{agg} at {region}/{quarter}");
        }
    }
}

#[test]
fn pivot_keys_come_from_data() {
    let t = SalesFixture::table();
    let p = pivot(&t, "product", "quarter", "units", Aggregation::Count).unwrap();
    assert_eq!(p.row_keys().collect::<Vec<_>>(), vec!["Gadget", "Widget"]);
    assert_eq!(p.column_keys(), vec!["Q1", "Q2"]);
    assert_eq!(p.cell("Gadget", "Q2").unwrap(), 3.0);
    assert_eq!(p.cell("Gadget", "Q3").unwrap_err().kind(), ErrorKind::KeyNotFound);
}

// ============================================================================
// CORRELATION
// ============================================================================

#[test]
fn sales_and_units_correlate() {
    let t = SalesFixture::table();
    let cols: Vec<ColumnRef> = vec!["sales".into(), "units".into()];
    let res = correlation_matrix(&t, &cols, CorrelationMethod::Pearson).unwrap();
    assert_eq!(res.labels, vec!["sales", "units"]);
    assert_eq!(res.matrix[0][1], res.matrix[1][0]);

    let units: Vec<f64> = SalesFixture::data().into_iter().map(|r| r.4).collect();
    assert_relative_eq!(res.matrix[0][1], pearson(&SalesFixture::sales(), &units).unwrap());
    assert!(res.matrix[0][1] > 0.0);
}

#[test]
fn correlation_of_text_column_fails() {
    let t = SalesFixture::table();
    let cols: Vec<ColumnRef> = vec!["sales".into(), "region".into()];
    let err = correlation_matrix(&t, &cols, CorrelationMethod::Spearman).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
}

// ============================================================================
// DESCRIPTIVE / DISTRIBUTION / OUTLIERS
// ============================================================================

#[test]
fn summary_of_sales() {
    let sales = SalesFixture::sales();
    let s = summarize(&sales).unwrap();
    assert_eq!(s.count, 8);
    assert_eq!(s.sum, 1250.0);
    assert_eq!(s.mean, mean(&sales).unwrap());
    assert_eq!(s.median, 135.0);
    assert_eq!(s.min, 50.0);
    assert_eq!(s.range, 250.0);
}

#[test]
fn quartiles_and_outliers_of_sales() {
    let sales = SalesFixture::sales();
    // sorted: 50 80 100 120 | 150 200 250 300
    let q = quantiles(&sales).unwrap();
    assert_eq!((q.q1, q.q2, q.q3), (90.0, 135.0, 225.0));
    assert!(iqr_outliers(&sales).unwrap().indices.is_empty());
    assert!(zscore_outliers(&sales, 3.0).unwrap().is_empty());
}

#[test]
fn histogram_covers_every_value() {
    let h = histogram(&SalesFixture::sales(), 5).unwrap();
    assert_eq!(h.total(), 8);
    assert_eq!(h.edges.first(), Some(&50.0));
    assert_eq!(h.edges.last(), Some(&300.0));
}

#[test]
fn skip_policy_drops_text_cells() {
    let mut t = SalesFixture::table();
    t.rows[0][3] = "n/a".into();
    t.rows[1].truncate(2);
    assert_eq!(t.numeric_column("sales", ParsePolicy::Skip).unwrap().len(), 6);
    assert!(matches!(
        t.numeric_column("sales", ParsePolicy::Strict),
        Err(AnalyticsError::ParseFailure { row: 0, .. })
    ));
}

// ============================================================================
// FILTER / SORT
// ============================================================================

#[test]
fn filter_then_summarize() {
    let t = SalesFixture::table();
    let gadgets = t
        .filter_sort(
            &[FilterOption::new("product", "eq", "Gadget").unwrap()],
            Some(&SortOption::new("sales", SortOrder::Desc)),
        )
        .unwrap();
    let sales = gadgets.numeric_column("sales", ParsePolicy::Strict).unwrap();
    assert_eq!(sales, vec![300.0, 250.0, 200.0, 50.0]);
}

fn small_table() -> impl Strategy<Value = Table> {
    proptest::collection::vec(("[a-c]", "[x-y]", -100i32..100), 1..40).prop_map(|rows| {
        Table::new(
            vec!["r".into(), "c".into(), "v".into()],
            rows.into_iter()
                .map(|(r, c, v)| vec![r, c, v.to_string()])
                .collect(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn pivot_sum_equals_filtered_sum(t in small_table()) {
        let p = pivot(&t, "r", "c", "v", Aggregation::Sum).unwrap();
        for (r, c, value) in p.cells() {
            let expected: f64 = t.rows
                .iter()
                .filter(|row| &row[0] == r && &row[1] == c)
                .map(|row| row[2].parse::<f64>().unwrap())
                .sum();
            prop_assert_eq!(value, expected);
        }
    }

    #[test]
    fn sort_is_a_permutation(t in small_table(), desc in any::<bool>()) {
        let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
        let sorted = t.filter_sort(&[], Some(&SortOption::new("v", order))).unwrap();
        let mut a = sorted.rows.clone();
        let mut b = t.rows.clone();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
        let vals: Vec<f64> = sorted.rows.iter().map(|r| r[2].parse().unwrap()).collect();
        let ordered = vals.windows(2).all(|w| if desc { w[0] >= w[1] } else { w[0] <= w[1] });
        prop_assert!(ordered);
    }
}
