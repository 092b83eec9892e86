use approx::assert_relative_eq;
use chrono::{Days, NaiveDate};
use scenario_forecast::data::PriceSeries;
use scenario_forecast::models::{
    AdditiveDecomposition, DecompositionConfig, ForecastModel, SeasonalityToggle, TrainedForecastModel,
};
use scenario_forecast::ForecastError;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 4).unwrap()
}

fn seasonal_series(days: usize) -> PriceSeries {
    let values: Vec<f64> = (0..days)
        .map(|i| {
            let t = i as f64;
            200.0 + 0.3 * t + 5.0 * (2.0 * std::f64::consts::PI * t / 7.0).sin() + ((i * 7919) % 13) as f64 * 0.2
        })
        .collect();
    PriceSeries::from_values("SEAS", start(), &values).unwrap()
}

#[test]
fn test_rejects_fewer_than_two_points() {
    let model = AdditiveDecomposition::default();
    let single = PriceSeries::from_values("ONE", start(), &[10.0]).unwrap();
    let empty = PriceSeries::from_values("NONE", start(), &[]).unwrap();

    assert!(matches!(model.train(&single), Err(ForecastError::InsufficientData(_))));
    assert!(matches!(model.train(&empty), Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_two_points_fit_a_line() {
    let series = PriceSeries::from_values("TWO", start(), &[10.0, 12.0]).unwrap();
    let trained = AdditiveDecomposition::default().train(&series).unwrap();

    let forecast = trained.forecast(2).unwrap();
    let predicted = forecast.predicted_values();
    assert_relative_eq!(predicted[0], 10.0, epsilon = 1e-9);
    assert_relative_eq!(predicted[1], 12.0, epsilon = 1e-9);
    assert_relative_eq!(predicted[3], 16.0, epsilon = 1e-9);
}

#[test]
fn test_forecast_covers_history_and_horizon() {
    let series = seasonal_series(120);
    let trained = AdditiveDecomposition::default().train(&series).unwrap();
    let forecast = trained.forecast(30).unwrap();

    assert_eq!(forecast.len(), 150);
    assert_eq!(forecast.history().len(), 120);
    assert_eq!(forecast.horizon(), 30);

    let last = *series.dates().last().unwrap();
    for (i, row) in forecast.future().iter().enumerate() {
        assert_eq!(row.date, last + Days::new(i as u64 + 1));
    }
    for row in forecast.rows() {
        assert!(row.lower <= row.predicted, "{:?}", row);
        assert!(row.predicted <= row.upper, "{:?}", row);
        assert!(row.predicted.is_finite());
    }
}

#[test]
fn test_future_intervals_widen() {
    // Zigzag trend: the fitted changepoints are large, so future trend
    // uncertainty dominates the noise far out
    let values: Vec<f64> = (0..200)
        .map(|i| {
            let phase = (i % 40) as f64;
            100.0 + if phase < 20.0 { phase } else { 40.0 - phase }
        })
        .collect();
    let series = PriceSeries::from_values("ZIG", start(), &values).unwrap();
    let forecast = AdditiveDecomposition::default()
        .train(&series)
        .unwrap()
        .forecast(90)
        .unwrap();

    let width = |i: usize| forecast.future()[i].upper - forecast.future()[i].lower;
    assert!(width(89) > width(0));
}

#[test]
fn test_weekly_pattern_is_captured() {
    let series = seasonal_series(140);
    let trained = AdditiveDecomposition::default().train(&series).unwrap();
    let fitted = trained.predict(&series.dates()).unwrap();

    let ssr: f64 = fitted.iter().zip(series.values()).map(|(f, a)| (f - a).powi(2)).sum();
    let rmse = (ssr / series.len() as f64).sqrt();
    // Residual noise has a spread of about 0.75; the weekly swing is 5
    assert!(rmse < 2.0, "rmse {}", rmse);

    let without_weekly = AdditiveDecomposition::new(DecompositionConfig {
        weekly: SeasonalityToggle::Disabled,
        ..DecompositionConfig::default()
    })
    .unwrap()
    .train(&series)
    .unwrap();
    assert_eq!(without_weekly.seasonal_terms(), 0);
    assert!(trained.residual_std() < without_weekly.residual_std());
}

#[test]
fn test_forecast_is_seeded() {
    let series = seasonal_series(60);
    let config = DecompositionConfig {
        seed: 11,
        uncertainty_samples: 200,
        ..DecompositionConfig::default()
    };
    let model = AdditiveDecomposition::new(config).unwrap();

    let a = model.train(&series).unwrap().forecast(15).unwrap();
    let b = model.train(&series).unwrap().forecast(15).unwrap();
    assert_eq!(a, b);
    assert_eq!(model.name(), "Additive Decomposition");
}
