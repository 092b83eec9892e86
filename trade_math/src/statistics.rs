//! Summary statistics over price and return columns

use crate::{MathError, Result};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Mean of an empty slice is undefined".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (n denominator)
pub fn population_std(values: &[f64]) -> Result<f64> {
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Sample standard deviation needs at least 2 values, have {}",
            values.len()
        )));
    }

    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Z-scores of a column with gaps.
///
/// Mean and population standard deviation come from the defined values only.
/// Undefined inputs stay undefined, and a column with zero spread yields no
/// scores at all.
pub fn z_scores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    let (mean, std) = match (mean(&defined), population_std(&defined)) {
        (Ok(mean), Ok(std)) if std > 0.0 => (mean, std),
        _ => return vec![None; values.len()],
    };

    values
        .iter()
        .map(|v| v.map(|x| (x - mean) / std))
        .collect()
}

/// Pearson correlation over rows where both columns are defined.
pub fn pearson_correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Columns differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }

    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < 2 {
        return Err(MathError::InsufficientData(
            "Correlation needs at least 2 complete rows".to_string(),
        ));
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Err(MathError::CalculationError(
            "Correlation is undefined for a constant column".to_string(),
        ));
    }

    Ok(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Linear-interpolated quantile of an already sorted slice, `q` in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(MathError::InsufficientData(
            "Quantile of an empty slice is undefined".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be within [0, 1], got {}",
            q
        )));
    }

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;

    Ok(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}
