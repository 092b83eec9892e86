use approx::assert_relative_eq;
use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use scenario_forecast::cleaning::{clean, forward_fill, forward_fill_column, remove_outliers};
use scenario_forecast::data::{Bar, PriceSeries};
use scenario_forecast::features::{DerivedSeries, FeatureWindows};
use scenario_forecast::frame::{CombinedFrame, FrameField};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()
}

fn frame_with(name: &str, values: Vec<Option<f64>>) -> CombinedFrame {
    let dates = (0..values.len() as u64).map(|i| start() + Days::new(i)).collect();
    let mut frame = CombinedFrame::new(dates).unwrap();
    frame.push_column(name, values).unwrap();
    frame
}

#[test]
fn test_moving_average_defined_count_and_values() {
    let closes: Vec<f64> = (0..75).map(|i| 50.0 + (i as f64 * 0.37).sin() * 4.0 + i as f64 * 0.1).collect();
    let series = PriceSeries::from_values("T", start(), &closes).unwrap();
    let derived = DerivedSeries::build(&series, FeatureWindows::default()).unwrap();

    let ma = derived.moving_avg_short();
    assert_eq!(ma.iter().filter(|v| v.is_some()).count(), closes.len() - 29);
    assert!(ma[..29].iter().all(Option::is_none));

    for i in 29..closes.len() {
        let manual = closes[i - 29..=i].iter().sum::<f64>() / 30.0;
        assert_relative_eq!(ma[i].unwrap(), manual, epsilon = 1e-9);
    }

    // Shorter than the long window: never defined
    assert!(derived.moving_avg_long().iter().all(Option::is_none));
}

#[test]
fn test_daily_returns_alignment() {
    let series = PriceSeries::from_values("T", start(), &[100.0, 110.0, 99.0]).unwrap();
    let derived = DerivedSeries::build(&series, FeatureWindows { short: 2, long: 3 }).unwrap();
    let returns = derived.daily_returns();

    assert_eq!(returns[0], None);
    assert_relative_eq!(returns[1].unwrap(), 0.1, epsilon = 1e-12);
    assert_relative_eq!(returns[2].unwrap(), -0.1, epsilon = 1e-12);
}

#[test]
fn test_forward_fill_single_gap() {
    let filled = forward_fill_column(&[None, Some(1.5), Some(2.25), None, Some(3.0)]);
    assert_eq!(filled, vec![None, Some(1.5), Some(2.25), Some(2.25), Some(3.0)]);

    let frame = frame_with("X_Close", vec![Some(4.0), None, None]);
    let filled = forward_fill(&frame);
    assert_eq!(filled.column("X_Close").unwrap(), &[Some(4.0), Some(4.0), Some(4.0)]);
}

#[test]
fn test_outlier_row_is_exactly_the_one_removed() {
    let mut values: Vec<Option<f64>> = (0..100)
        .map(|i| Some(if i % 2 == 0 { 99.0 } else { 101.0 }))
        .collect();
    values.insert(57, Some(110.0));
    let frame = frame_with("X_Close", values);

    let report = remove_outliers(&frame, 3.0).unwrap();

    assert_eq!(report.dropped, vec![start() + Days::new(57)]);
    assert_eq!(report.cleaned.len(), 100);
    assert!(report
        .cleaned
        .column("X_Close")
        .unwrap()
        .iter()
        .all(|v| matches!(v, Some(x) if *x < 105.0)));
}

#[test]
fn test_constant_and_undefined_cells_never_flag() {
    let frame = frame_with("X_Close", vec![None, Some(5.0), Some(5.0), Some(5.0), None]);
    let report = clean(&frame, 3.0).unwrap();

    assert!(report.dropped.is_empty());
    assert_eq!(report.cleaned.len(), 5);
}

#[test]
fn test_combined_frame_outer_join() {
    let bar = |day: u64, close: f64| Bar {
        date: start() + Days::new(day),
        open: close,
        high: close,
        low: close,
        close,
        volume: 10.0,
    };
    let histories = vec![
        ("AAA".to_string(), vec![bar(0, 1.0), bar(1, 2.0), bar(3, 4.0)]),
        ("BBB".to_string(), vec![bar(1, 20.0), bar(2, 30.0)]),
    ];
    let frame = CombinedFrame::from_histories(&histories, FeatureWindows { short: 2, long: 3 }).unwrap();

    assert_eq!(frame.len(), 4);
    assert_eq!(frame.tickers(), vec!["AAA".to_string(), "BBB".to_string()]);
    assert_eq!(
        &frame.column_names()[..8],
        &[
            "AAA_Open", "AAA_High", "AAA_Low", "AAA_Close", "AAA_Volume", "AAA_2MA", "AAA_3MA",
            "AAA_Returns"
        ]
    );
    assert_eq!(
        frame.field("AAA", FrameField::Close).unwrap(),
        &[Some(1.0), Some(2.0), None, Some(4.0)]
    );
    // Features follow AAA's own trading days, so day 3 averages days 1 and 3
    assert_eq!(
        frame.field("AAA", FrameField::MovingAverage(2)).unwrap(),
        &[None, Some(1.5), None, Some(3.0)]
    );
    assert_eq!(
        frame.field("BBB", FrameField::Close).unwrap(),
        &[None, Some(20.0), Some(30.0), None]
    );
}
