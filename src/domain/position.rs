//! Held positions and the operator position-line format.

use crate::domain::error::MonitorError;

/// A long position held by the operator.
///
/// `stop_price` is expected below `entry_price`; this is not enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub entry_price: f64,
    pub shares: f64,
    pub stop_price: f64,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares * (price - self.entry_price)
    }

    /// Percent move of `price` relative to entry: `(price / entry - 1) * 100`.
    pub fn percent_change(&self, price: f64) -> f64 {
        (price / self.entry_price - 1.0) * 100.0
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        price <= self.stop_price
    }
}

/// Parse one `SYMBOL,entry,shares,stop` line.
pub fn parse_position_line(line: &str) -> Result<Position, MonitorError> {
    let malformed = |reason: &str| MonitorError::MalformedInput {
        input: line.to_string(),
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [symbol, entry, shares, stop] = fields.as_slice() else {
        return Err(malformed("expected SYMBOL,entry,shares,stop"));
    };

    if symbol.is_empty() {
        return Err(malformed("empty symbol"));
    }

    let number = |field: &str, name: &str| -> Result<f64, MonitorError> {
        field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed(&format!("invalid {name} '{field}'")))
    };

    let entry_price = number(*entry, "entry price")?;
    let shares = number(*shares, "shares")?;
    let stop_price = number(*stop, "stop price")?;

    if entry_price <= 0.0 {
        return Err(malformed("entry price must be positive"));
    }
    if shares <= 0.0 {
        return Err(malformed("shares must be positive"));
    }

    Ok(Position {
        symbol: symbol.to_uppercase(),
        entry_price,
        shares,
        stop_price,
    })
}
