use chrono::NaiveDate;
use scenario_forecast::data::PriceSeries;
use scenario_forecast::metrics::{evaluate_model, EvaluationMetrics};
use scenario_forecast::models::AdditiveDecomposition;
use scenario_forecast::ForecastError;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
}

#[test]
fn test_linear_series_scores_perfectly() {
    // value = day index
    let values: Vec<f64> = (0..60).map(|i| i as f64).collect();
    let series = PriceSeries::from_values("LIN", start(), &values).unwrap();

    let report = evaluate_model(&AdditiveDecomposition::default(), &series, 0.8).unwrap();

    assert_eq!(report.train_len, 48);
    assert_eq!(report.test_len, 12);
    assert!(report.metrics.mae < 1e-6, "{}", report.metrics);
    assert!(report.metrics.rmse < 1e-6, "{}", report.metrics);
    assert!((report.metrics.r2.unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn test_one_to_hundred_split() {
    let values: Vec<f64> = (1..=100).map(f64::from).collect();
    let series = PriceSeries::from_values("HUN", start(), &values).unwrap();

    let report = evaluate_model(&AdditiveDecomposition::default(), &series, 0.8).unwrap();

    assert_eq!(report.train_len, 80);
    assert_eq!(report.test_len, 20);
    assert_eq!(report.test.values()[0], 81.0);
    assert_eq!(report.forecast.horizon(), 20);
    assert!(report.metrics.r2.unwrap() > 0.9);
}

#[test]
fn test_constant_series_has_undefined_r2() {
    let series = PriceSeries::from_values("FLAT", start(), &[42.0; 20]).unwrap();

    let report = evaluate_model(&AdditiveDecomposition::default(), &series, 0.8).unwrap();

    assert_eq!(report.test_len, 4);
    assert_eq!(report.metrics.r2, None);
    assert!(report.metrics.mae.is_finite());
    assert!(report.metrics.to_string().contains("undefined"));
}

#[test]
fn test_empty_inputs_are_rejected() {
    let empty = PriceSeries::from_values("NONE", start(), &[]).unwrap();
    assert!(matches!(
        evaluate_model(&AdditiveDecomposition::default(), &empty, 0.8),
        Err(ForecastError::InsufficientData(_))
    ));

    assert!(matches!(
        EvaluationMetrics::compute(&[], &[]),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[test]
fn test_series_too_short_to_train() {
    // floor(2 * 0.8) = 1 training point
    let series = PriceSeries::from_values("SHORT", start(), &[1.0, 2.0]).unwrap();
    assert!(matches!(
        evaluate_model(&AdditiveDecomposition::default(), &series, 0.8),
        Err(ForecastError::InsufficientData(_))
    ));
}
