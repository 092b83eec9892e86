use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use scenario_forecast::data::Bar;
use scenario_forecast::features::FeatureWindows;
use scenario_forecast::frame::CombinedFrame;
use scenario_forecast::snapshot::{read_snapshot, write_snapshot};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn bars(offset: u64, closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: start + Days::new(offset + i as u64),
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.5,
            close,
            volume: 1000.0 + i as f64,
        })
        .collect()
}

#[test]
fn test_snapshot_round_trip_preserves_layout() {
    let histories = vec![
        ("AAPL".to_string(), bars(0, &[150.25, 151.5, 149.75, 152.0, 153.125])),
        ("TSLA".to_string(), bars(2, &[201.0, 199.5, 205.25])),
    ];
    let frame = CombinedFrame::from_histories(&histories, FeatureWindows { short: 2, long: 3 }).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("stock_data.csv");
    write_snapshot(&frame, &path).unwrap();

    let header = std::fs::read_to_string(&path).unwrap();
    let first_line = header.lines().next().unwrap();
    assert!(first_line.starts_with("Date,AAPL_Open,AAPL_High,AAPL_Low,AAPL_Close,AAPL_Volume,AAPL_2MA,AAPL_3MA,AAPL_Returns,TSLA_Open"));

    let loaded = read_snapshot(&path).unwrap();
    assert_eq!(loaded.dates(), frame.dates());
    assert_eq!(loaded.column_names(), frame.column_names());
    for (left, right) in loaded.columns().iter().zip(frame.columns()) {
        assert_eq!(left.values.len(), right.values.len());
        for (a, b) in left.values.iter().zip(&right.values) {
            match (a, b) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{}: {} vs {}", left.name, a, b),
                (None, None) => {}
                _ => panic!("{}: {:?} vs {:?}", left.name, a, b),
            }
        }
    }
}

#[test]
fn test_snapshot_with_extra_columns_and_timezones() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,MSFT_Close,MSFT_Dividends").unwrap();
    writeln!(file, "2023-01-03 00:00:00-05:00,239.58,0.0").unwrap();
    writeln!(file, "2023-01-04 00:00:00-05:00,,0.0").unwrap();

    let frame = read_snapshot(file.path()).unwrap();
    assert_eq!(frame.tickers(), vec!["MSFT".to_string()]);
    assert_eq!(frame.column("MSFT_Close").unwrap(), &[Some(239.58), None]);
    assert!(frame.column("MSFT_Dividends").is_some());
}

#[test]
fn test_missing_snapshot_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(read_snapshot(dir.path().join("absent.csv")).is_err());
}
