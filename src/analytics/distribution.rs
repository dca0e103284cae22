//! Chi-squared distribution tail probabilities (via statrs)

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{Error, Result};

/// `P(X > statistic)` for `X ~ χ²(dof)`.
///
/// Zero degrees of freedom, a non-positive or a NaN statistic give 1.0.
pub fn chi_squared_sf(statistic: f64, dof: usize) -> Result<f64> {
    if dof == 0 || statistic.is_nan() || statistic <= 0.0 {
        return Ok(1.0);
    }

    let distribution = ChiSquared::new(dof as f64)
        .map_err(|e| Error::Statistics(format!("chi-squared with {} dof: {}", dof, e)))?;

    Ok(distribution.sf(statistic).clamp(0.0, 1.0))
}
