//! Daily returns and return volatility

use crate::error::Result;

/// Trading days per year used for annualization
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple daily returns aligned with `prices`.
///
/// Position `i` is `(p[i] - p[i-1]) / p[i-1]`; position 0 is undefined, and
/// so is any step from a zero price.
pub fn daily_returns(prices: &[f64]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return returns;
    }

    returns.push(None);
    returns.extend(prices.windows(2).map(|w| {
        if w[0] == 0.0 {
            None
        } else {
            Some((w[1] - w[0]) / w[0])
        }
    }));

    returns
}

/// Rolling sample standard deviation of returns over `window` observations
pub fn return_volatility(returns: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    Ok(trade_math::rolling_std(returns, window)?)
}

/// Annualize a daily return standard deviation
pub fn annualize_daily_volatility(daily_std: f64) -> f64 {
    daily_std * TRADING_DAYS_PER_YEAR.sqrt()
}
