use chrono::NaiveDate;
use scenario_forecast::data::{DataLoader, PricePoint, PriceSeries};
use scenario_forecast::utils::{future_dates, train_test_split};
use scenario_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn test_data_loader_from_csv() {
    // Create a temporary CSV file
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    writeln!(file, "2023-01-03,100.0,105.0,98.0,103.0,1000").unwrap();
    writeln!(file, "2023-01-04,103.0,107.0,101.0,106.0,1200").unwrap();
    writeln!(file, "2023-01-05,106.0,110.0,104.0,108.0,1500").unwrap();

    let series = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.values(), vec![103.0, 106.0, 108.0]);
    assert_eq!(series.points()[0].date, date("2023-01-03"));
}

#[test]
fn test_data_loader_price_column_and_timezone_dates() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,price").unwrap();
    writeln!(file, "2023-01-03 00:00:00-05:00,100.5").unwrap();
    writeln!(file, "2023-01-04 00:00:00-05:00,101.5").unwrap();

    let series = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(series.dates(), vec![date("2023-01-03"), date("2023-01-04")]);
}

#[test]
fn test_data_loader_error_handling() {
    assert!(DataLoader::from_csv("nonexistent_file.csv").is_err());

    // No recognizable columns
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "alpha,beta").unwrap();
    writeln!(file, "1,2").unwrap();
    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_series_rejects_unordered_dates() {
    let points = vec![
        PricePoint { date: date("2023-01-04"), close: 1.0 },
        PricePoint { date: date("2023-01-03"), close: 2.0 },
    ];
    assert!(matches!(
        PriceSeries::new("T", points),
        Err(ForecastError::DataError(_))
    ));

    let duplicate = vec![
        PricePoint { date: date("2023-01-03"), close: 1.0 },
        PricePoint { date: date("2023-01-03"), close: 2.0 },
    ];
    assert!(PriceSeries::new("T", duplicate).is_err());
}

#[test]
fn test_train_test_split_is_positional() {
    let values: Vec<f64> = (1..=100).map(f64::from).collect();
    let series = PriceSeries::from_values("T", date("2020-01-01"), &values).unwrap();

    let (train, test) = train_test_split(&series, 0.8).unwrap();
    assert_eq!(train.len(), 80);
    assert_eq!(test.len(), 20);
    assert_eq!(train.values().last(), Some(&80.0));
    assert_eq!(test.values().first(), Some(&81.0));

    assert!(train_test_split(&series, 1.0).is_err());
}

#[test]
fn test_future_dates_are_consecutive_calendar_days() {
    // Friday: the weekend is included
    let dates = future_dates(date("2023-12-29"), 3).unwrap();
    assert_eq!(
        dates,
        vec![date("2023-12-30"), date("2023-12-31"), date("2024-01-01")]
    );
    assert!(future_dates(date("2023-12-29"), 0).unwrap().is_empty());
}
