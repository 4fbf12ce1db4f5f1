//! End-to-end scenarios through the public API and the JSON dispatcher.

use u_quality::anova::one_way_anova;
use u_quality::capability::{process_capability, SpecLimits};
use u_quality::distribution::{probability_plot, DistributionKind};
use u_quality::engine::{run, run_json, AnalysisKind, AnalysisRequest};
use u_quality::error::codes;
use u_quality::pareto::pareto_analysis;
use u_quality::spc::individuals_chart;
use u_quality::validate::{validate_groups, validate_tally, RawInput};
use u_quality::StatValue;

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

#[test]
fn individuals_chart_textbook_series() {
    let chart = individuals_chart(&[10.0, 12.0, 8.0, 11.0, 9.0]).expect("chart");
    assert!(close(chart.limits.center, 10.0, 1e-12));
    assert_eq!(chart.moving_ranges, vec![2.0, 4.0, 3.0, 2.0]);
    assert!(close(chart.average_moving_range, 2.75, 1e-12));
    assert!(close(chart.limits.sigma_hat, 2.4379, 1e-4));
    assert!(close(chart.limits.ucl, 17.31, 0.01));
    assert!(close(chart.limits.lcl, 2.69, 0.01));
    assert!(chart.out_of_control.is_empty());
    assert!(chart.is_in_control());
}

#[test]
fn constant_process_capability_is_unbounded() {
    let data = vec![10.0; 50];
    let spec = SpecLimits::new(9.0, 11.0).expect("spec");
    let report = process_capability(&data, &spec).expect("capability");
    assert_eq!(report.indices.cp, StatValue::Unbounded);
    assert_eq!(report.indices.cpk, StatValue::Unbounded);
    assert_eq!(report.defects.ppm_total, 0.0);

    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["indices"]["cp"], "+inf");
    assert_eq!(json["indices"]["cpk"], "+inf");
}

#[test]
fn anova_three_separated_groups() {
    let raw = RawInput::LabeledRecords(vec![
        ("A".to_string(), vec![1.0, 2.0, 3.0]),
        ("B".to_string(), vec![4.0, 5.0, 6.0]),
        ("C".to_string(), vec![7.0, 8.0, 9.0]),
    ]);
    let groups = validate_groups(&raw).expect("groups");
    let r = one_way_anova(&groups, 0.05).expect("anova");
    assert_eq!(r.df_between, 2);
    assert_eq!(r.df_within, 6);
    assert!(close(r.grand_mean, 5.0, 1e-12));
    // SSb = 3 * ((2-5)^2 + 0 + (8-5)^2) = 54; MSb = 27; MSw = 1
    assert!(close(r.ss_between, 54.0, 1e-9));
    assert!(close(r.ss_within, 6.0, 1e-9));
    assert!(close(r.ss_between + r.ss_within, r.ss_total, 1e-9));
    assert_eq!(r.f_statistic, StatValue::Finite(27.0));
    assert!(r.significance.is_significant());

    let hsd = r.post_hoc.expect("post-hoc runs for three groups");
    assert_eq!(hsd.comparisons.len(), 3);
    assert!(hsd.comparisons.iter().all(|c| c.significant));
}

#[test]
fn pareto_classic_split() {
    let raw = RawInput::CategoryMapping(vec![
        ("A".to_string(), 40.0),
        ("B".to_string(), 30.0),
        ("C".to_string(), 20.0),
        ("D".to_string(), 10.0),
    ]);
    let tally = validate_tally(&raw).expect("tally");
    let r = pareto_analysis(&tally, 0.8).expect("pareto");
    let cumulative: Vec<f64> = r.ranking.iter().map(|e| e.cumulative_percentage).collect();
    for (got, want) in cumulative.iter().zip([40.0, 70.0, 90.0, 100.0]) {
        assert!(close(*got, want, 1e-9));
    }
    assert_eq!(r.vital_few, vec!["A", "B", "C"]);
}

#[test]
fn normal_fit_on_small_sequence() {
    let plot = probability_plot(&[1.0, 2.0, 3.0, 4.0, 5.0], DistributionKind::Normal, 0.95)
        .expect("plot");
    assert!(plot
        .plotting_positions
        .windows(2)
        .all(|w| w[1] > w[0]));
    assert!(plot
        .plotting_positions
        .iter()
        .all(|&p| p > 0.0 && p < 1.0));
    assert!(plot.theoretical_quantiles.windows(2).all(|w| w[1] > w[0]));
    assert!(plot.sorted_values.windows(2).all(|w| w[1] >= w[0]));
    assert!(plot.fit.correlation > 0.99);
    assert!(plot.outliers.indices.is_empty());
    let ad = plot.normality_test.expect("normal fit runs Anderson-Darling");
    assert!(ad.p_value > 0.05);
}

#[test]
fn identical_requests_give_identical_reports() {
    let req = AnalysisRequest::from_json_str(
        r#"{"analysis": "process_analysis", "data": [9.8, 10.1, 10.0, 9.9, 10.2, 10.0, 9.95, 10.05, 10.1, 9.9], "lsl": 9.0, "usl": 11.0}"#,
    )
    .expect("parse");
    let first = run(&req).expect("run");
    let second = run(&req).expect("run");
    assert_eq!(first, second);
    assert_eq!(first.kind(), AnalysisKind::ProcessAnalysis);
}

#[test]
fn dispatcher_covers_every_analysis() {
    let requests = [
        r#"{"analysis": "i_chart", "data": [10, 12, 8, 11, 9]}"#,
        r#"{"analysis": "capability", "data": [10, 10.2, 9.8, 10.1, 9.9, 10, 10.05, 9.95, 10.1, 9.9], "lsl": 9, "usl": 11}"#,
        r#"{"analysis": "anova", "data": {"A": [1, 2, 3], "B": [4, 5, 6], "C": [7, 8, 9]}}"#,
        r#"{"analysis": "pareto", "data": {"A": 40, "B": 30, "C": 20, "D": 10}, "threshold": 0.8}"#,
        r#"{"analysis": "probability_plot", "data": [1, 2, 3, 4, 5], "distribution": "normal"}"#,
        r#"{"analysis": "process_analysis", "data": [1, 2, 3, 4, 5]}"#,
    ];
    for (json, kind) in requests.iter().zip(AnalysisKind::ALL) {
        let report = run_json(json).unwrap_or_else(|e| panic!("{kind}: {e}"));
        assert_eq!(report["analysis"], kind.name());
        assert!(report["result"]["interpretation"].is_string(), "{kind}");
    }
}

#[test]
fn dispatcher_reports_stable_error_codes() {
    let cases = [
        (r#"{"analysis": "i_chart", "data": [1, null]}"#, codes::INSUFFICIENT_DATA),
        (r#"{"analysis": "i_chart", "data": "abc"}"#, codes::SCHEMA),
        (r#"{"analysis": "anova", "data": {"A": [1, 2]}}"#, codes::INSUFFICIENT_GROUPS),
        (r#"{"analysis": "pareto", "data": {"A": 1}}"#, codes::INSUFFICIENT_CATEGORIES),
        (
            r#"{"analysis": "capability", "data": [1, 2, 3], "lsl": 2, "usl": 1}"#,
            codes::INVALID_SPECIFICATION,
        ),
        (
            r#"{"analysis": "probability_plot", "data": [1, 0, 2], "distribution": "weibull"}"#,
            codes::DOMAIN,
        ),
        (r#"{"analysis": "probability_plot", "data": [3, 3, 3]}"#, codes::DEGENERATE),
    ];
    for (json, code) in cases {
        let err = run_json(json).expect_err(json);
        assert_eq!(err.code(), code, "{json}: {err}");
    }
}

#[test]
fn label_named_data_is_an_ordinary_category() {
    let json = run_json(r#"{"analysis": "pareto", "data": {"data": 5, "other": 3}}"#)
        .expect("pareto");
    assert_eq!(json["result"]["ranking"][0]["category"], "data");
    assert_eq!(json["result"]["ranking"].as_array().map(Vec::len), Some(2));

    let json = run_json(
        r#"{"analysis": "anova", "data": {"data": [1, 2, 3], "other": [4, 5, 6]}}"#,
    )
    .expect("anova");
    assert_eq!(json["result"]["groups"][0]["label"], "data");
}

#[test]
fn identical_groups_report_unbounded_f() {
    let json = run_json(r#"{"analysis": "anova", "data": {"A": [4, 4], "B": [4, 4]}}"#)
        .expect("anova");
    assert_eq!(json["result"]["f_statistic"], "+inf");
    assert_eq!(json["result"]["p_value"], 0.0);
    assert_eq!(json["result"]["eta_squared"], 0.0);
}
