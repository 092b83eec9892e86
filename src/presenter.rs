//! Text reports on stdout
//!
//! Each function renders one "chart" as a table. Undefined values print as `-`.

use prettytable::format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR;
use prettytable::{row, Cell, Row, Table};
use scenario_forecast::analysis::{CorrelationMatrix, MonthlyReturn, TickerSummary};
use scenario_forecast::features::FeatureWindows;
use scenario_forecast::frame::{CombinedFrame, FrameField};
use scenario_forecast::metrics::EvaluationReport;
use scenario_forecast::models::ForecastResult;
use scenario_forecast::scenario::Scenario;
use scenario_forecast::simulation::SimulatedPath;
use scenario_forecast::valuation::ValuationComparison;
use std::io::{self, Write};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_BORDER_LINE_SEPARATOR);
    table
}

fn heading<W: Write + ?Sized>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "== {} ==", title)
}

/// Latest close, moving averages, volatility and momentum per ticker
pub fn print_summaries<W: Write + ?Sized>(
    out: &mut W,
    summaries: &[TickerSummary],
    windows: FeatureWindows,
) -> io::Result<()> {
    heading(out, "Closing prices")?;
    let mut table = new_table();
    table.set_titles(row![
        "Ticker",
        "Date",
        "Close",
        format!("{}MA", windows.short),
        format!("{}MA", windows.long),
        "Ann. volatility",
        "Momentum"
    ]);
    for s in summaries {
        table.add_row(row![
            s.ticker,
            s.latest_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            cell(s.latest_close, 2),
            cell(s.moving_avg_short, 2),
            cell(s.moving_avg_long, 2),
            percent(s.annualized_volatility),
            cell(s.momentum, 2)
        ]);
    }
    table.print(out)?;
    Ok(())
}

/// Mean daily return per calendar month, one column per ticker
pub fn print_monthly_returns<W: Write + ?Sized>(
    out: &mut W,
    monthly: &[(String, Vec<MonthlyReturn>)],
) -> io::Result<()> {
    heading(out, "Monthly mean daily return")?;
    let mut table = new_table();

    let mut titles = vec![Cell::new("Month")];
    titles.extend(monthly.iter().map(|(ticker, _)| Cell::new(ticker)));
    table.set_titles(Row::new(titles));

    for (slot, name) in MONTHS.iter().enumerate() {
        let mut cells = vec![Cell::new(name)];
        for (_, months) in monthly {
            let value = months.get(slot).and_then(|m| m.mean_return);
            cells.push(Cell::new(&percent(value)));
        }
        table.add_row(Row::new(cells));
    }
    table.print(out)?;
    Ok(())
}

pub fn print_correlation<W: Write + ?Sized>(out: &mut W, matrix: &CorrelationMatrix) -> io::Result<()> {
    heading(out, "Closing price correlation")?;
    let mut table = new_table();

    let mut titles = vec![Cell::new("")];
    titles.extend(matrix.tickers.iter().map(|t| Cell::new(t)));
    table.set_titles(Row::new(titles));

    for (ticker, values) in matrix.tickers.iter().zip(&matrix.values) {
        let mut cells = vec![Cell::new(ticker)];
        cells.extend(values.iter().map(|v| Cell::new(&cell(*v, 3))));
        table.add_row(Row::new(cells));
    }
    table.print(out)?;
    Ok(())
}

pub fn print_valuation<W: Write + ?Sized>(out: &mut W, comparison: &ValuationComparison) -> io::Result<()> {
    heading(out, "P/E comparison")?;
    if !comparison.is_renderable() {
        writeln!(out, "Not enough P/E data to compare.")?;
        return Ok(());
    }

    let mut table = new_table();
    table.set_titles(row!["Ticker", "Trailing P/E", "Forward P/E"]);
    let mut tickers: Vec<&String> = comparison.trailing.iter().map(|(t, _)| t).collect();
    for (t, _) in &comparison.forward {
        if !tickers.contains(&t) {
            tickers.push(t);
        }
    }
    let lookup = |list: &[(String, f64)], ticker: &str| {
        list.iter().find(|(t, _)| t == ticker).map(|(_, v)| *v)
    };
    for ticker in tickers {
        table.add_row(row![
            ticker,
            cell(lookup(&comparison.trailing, ticker), 2),
            cell(lookup(&comparison.forward, ticker), 2)
        ]);
    }
    table.print(out)?;
    if !comparison.missing.is_empty() {
        writeln!(out, "Incomplete data: {}", comparison.missing.join(", "))?;
    }
    Ok(())
}

/// Latest `rows` rows of close and moving averages
pub fn print_moving_averages<W: Write + ?Sized>(
    out: &mut W,
    frame: &CombinedFrame,
    ticker: &str,
    windows: FeatureWindows,
    rows: usize,
) -> io::Result<()> {
    heading(out, &format!("{} close with moving averages", ticker))?;
    let (Ok(close), Ok(short), Ok(long)) = (
        frame.field(ticker, FrameField::Close),
        frame.field(ticker, FrameField::MovingAverage(windows.short)),
        frame.field(ticker, FrameField::MovingAverage(windows.long)),
    ) else {
        writeln!(out, "No moving averages for {} in the snapshot.", ticker)?;
        return Ok(());
    };

    let mut table = new_table();
    table.set_titles(row![
        "Date",
        "Close",
        format!("{}MA", windows.short),
        format!("{}MA", windows.long)
    ]);
    let start = frame.len().saturating_sub(rows);
    for i in start..frame.len() {
        table.add_row(row![
            frame.dates()[i],
            cell(close[i], 2),
            cell(short[i], 2),
            cell(long[i], 2)
        ]);
    }
    table.print(out)?;
    Ok(())
}

/// Future part of a scenario forecast, sampled to at most `max_rows` rows
pub fn print_forecast<W: Write + ?Sized>(
    out: &mut W,
    ticker: &str,
    scenario: Scenario,
    last_close: f64,
    forecast: &ForecastResult,
    max_rows: usize,
) -> io::Result<()> {
    heading(out, &format!("{} forecast, {} scenario", ticker, scenario))?;
    writeln!(
        out,
        "Last close {:.2}; series scaled by {}; {} days ahead",
        last_close,
        scenario.multiplier(),
        forecast.horizon()
    )?;

    let future = forecast.future();
    if future.is_empty() {
        return Ok(());
    }
    let step = (future.len() + max_rows.max(1) - 1) / max_rows.max(1);

    let mut table = new_table();
    table.set_titles(row!["Date", "Lower", "Predicted", "Upper"]);
    let mut picked: Vec<usize> = (step - 1..future.len()).step_by(step).collect();
    if picked.last() != Some(&(future.len() - 1)) {
        picked.push(future.len() - 1);
    }
    for i in picked {
        let r = &future[i];
        table.add_row(row![
            r.date,
            format!("{:.2}", r.lower),
            format!("{:.2}", r.predicted),
            format!("{:.2}", r.upper)
        ]);
    }
    table.print(out)?;
    Ok(())
}

pub fn print_evaluations<W: Write + ?Sized>(out: &mut W, reports: &[EvaluationReport]) -> io::Result<()> {
    heading(out, "Forecast evaluation")?;
    let mut table = new_table();
    table.set_titles(row!["Ticker", "Train", "Test", "MAE", "RMSE", "R²"]);
    for r in reports {
        table.add_row(row![
            r.ticker,
            r.train_len,
            r.test_len,
            format!("{:.4}", r.metrics.mae),
            format!("{:.4}", r.metrics.rmse),
            r.metrics
                .r2
                .map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "undefined".to_string())
        ]);
    }
    table.print(out)?;
    Ok(())
}

/// Terminal price of each simulated path against the starting close
pub fn print_simulation<W: Write + ?Sized>(
    out: &mut W,
    ticker: &str,
    last_close: f64,
    paths: &[SimulatedPath],
) -> io::Result<()> {
    heading(out, &format!("{} history-based scenarios", ticker))?;
    let mut table = new_table();
    table.set_titles(row!["Scenario", "Days", "End date", "End price", "Change"]);
    for path in paths {
        let end = path.points.last();
        let change = path.terminal_price().map(|p| p / last_close - 1.0);
        table.add_row(row![
            path.scenario,
            path.points.len(),
            end.map(|p| p.date.to_string()).unwrap_or_else(|| "-".to_string()),
            cell(path.terminal_price(), 2),
            percent(change)
        ]);
    }
    table.print(out)?;
    Ok(())
}
