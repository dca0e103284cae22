//! Tests for the A/B retention report

use retention_analytics::analytics::{aggregate, summarize, test_significance, Metric, Verdict};

use super::two_arm_table;

#[test]
fn test_aggregate_two_keys_in_range() {
    let table = two_arm_table((500, 120), (480, 90));
    for metric in Metric::ALL {
        let rates = aggregate(&table, metric);
        assert_eq!(rates.len(), 2);
        for rate in rates.values() {
            assert!((0.0..=100.0).contains(rate));
        }
    }
}

#[test]
fn test_identical_distributions_not_significant() {
    let table = two_arm_table((1000, 200), (1000, 200));
    let report = test_significance(&table, Metric::Day7).unwrap();

    assert!(report.p_value >= 0.05);
    assert_eq!(report.verdict, Verdict::NotSignificant);
}

#[test]
fn test_maximally_divergent_significant() {
    // control all retained, treatment none
    let table = two_arm_table((40, 40), (40, 0));
    let report = test_significance(&table, Metric::Day7).unwrap();

    assert!(report.p_value < 0.05);
    assert_eq!(report.verdict, Verdict::Significant);
}

#[test]
fn test_cookie_cats_effect_direction() {
    // 19% vs 18% day-7 retention over 45,000 players per arm
    let table = two_arm_table((45_000, 8_550), (45_000, 8_100));

    let rates = aggregate(&table, Metric::Day7);
    assert!((rates["control"] - 19.0).abs() < 1e-9);
    assert!((rates["treatment"] - 18.0).abs() < 1e-9);

    let report = test_significance(&table, Metric::Day7).unwrap();
    assert_eq!(report.dof, 1);
    assert!(report.p_value < 0.05, "p = {}", report.p_value);
    assert!(report.verdict.is_significant());
    assert_eq!(report.contingency.counts, vec![vec![36_450, 8_550], vec![36_900, 8_100]]);
}

#[test]
fn test_summary_matches_aggregate() {
    let table = two_arm_table((300, 75), (200, 30));
    let summary = summarize(&table, Metric::Day7);
    let rates = aggregate(&table, Metric::Day7);

    for variant in summary {
        assert_eq!(rates[&variant.variant], variant.rate);
    }
}
