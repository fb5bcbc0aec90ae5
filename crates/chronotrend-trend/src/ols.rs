//! Ordinary least-squares simple linear regression with a slope significance test.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::TrendError;
use crate::result::TrendResult;

/// Guards the t statistic against division by zero when `|r| == 1`.
const TINY: f64 = 1.0e-20;

/// Fit `y = slope * x + intercept` and test the slope against zero.
///
/// `x` and `y` must have equal length and hold only finite values; callers
/// validate both before reaching here.
///
/// Sums are taken over mean-centred deviations:
///
/// ```text
/// ss_xx = Σ(x - x̄)²    ss_yy = Σ(y - ȳ)²    ss_xy = Σ(x - x̄)(y - ȳ)
/// slope = ss_xy / ss_xx
/// r     = ss_xy / √(ss_xx · ss_yy)                (0 when ss_yy = 0)
/// t     = r · √(df / ((1 - r)(1 + r)))            df = n - 2
/// p     = 2 · sf_t(|t|, df)
/// se    = √((1 - r²) · ss_yy / ss_xx / df)
/// ```
///
/// With exactly two points the line is exact: `stderr` is zero and `pvalue`
/// is zero unless both `y` values are equal, in which case it is one.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TrendError::TooFewSamples`] | fewer than two points |
/// | [`TrendError::ZeroTimeVariance`] | every `x` is identical |
/// | [`TrendError::Distribution`] | Student-t construction fails |
pub(crate) fn fit(x: &[f64], y: &[f64]) -> Result<TrendResult, TrendError> {
    debug_assert_eq!(x.len(), y.len(), "x and y must be parallel");
    let n = x.len();
    if n < 2 {
        return Err(TrendError::TooFewSamples { n });
    }
    if x.iter().all(|&xi| xi == x[0]) {
        return Err(TrendError::ZeroTimeVariance { n });
    }

    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let (mut ss_xx, mut ss_yy, mut ss_xy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
        ss_xy += dx * dy;
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;
    let rvalue = if ss_yy == 0.0 {
        0.0
    } else {
        (ss_xy / (ss_xx * ss_yy).sqrt()).clamp(-1.0, 1.0)
    };

    let (pvalue, stderr) = if n == 2 {
        let pvalue = if y[0] == y[1] { 1.0 } else { 0.0 };
        (pvalue, 0.0)
    } else {
        let df = n_f - 2.0;
        let t = rvalue * (df / ((1.0 - rvalue + TINY) * (1.0 + rvalue + TINY))).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| TrendError::Distribution {
            reason: e.to_string(),
        })?;
        let pvalue = (2.0 * dist.sf(t.abs())).min(1.0);
        let stderr = ((1.0 - rvalue * rvalue) * ss_yy / ss_xx / df).sqrt();
        (pvalue, stderr)
    };

    Ok(TrendResult {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(matches!(fit(&[], &[]), Err(TrendError::TooFewSamples { n: 0 })));
    }

    #[test]
    fn rejects_single_point() {
        assert!(matches!(
            fit(&[3.0], &[1.0]),
            Err(TrendError::TooFewSamples { n: 1 })
        ));
    }

    #[test]
    fn rejects_constant_x() {
        assert!(matches!(
            fit(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]),
            Err(TrendError::ZeroTimeVariance { n: 3 })
        ));
    }

    #[test]
    fn exact_line_through_three_points() {
        let r = fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert!((r.slope - 2.0).abs() < 1e-12);
        assert!((r.intercept - 1.0).abs() < 1e-12);
        assert!((r.rvalue - 1.0).abs() < 1e-12);
        assert!(r.pvalue < 1e-9, "pvalue {}", r.pvalue);
        assert!(r.stderr.abs() < 1e-9);
    }

    #[test]
    fn decreasing_line_has_negative_r() {
        let r = fit(&[0.0, 1.0, 2.0, 3.0], &[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!((r.slope + 1.0).abs() < 1e-12);
        assert!((r.rvalue + 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_y_is_zero_slope_not_error() {
        let r = fit(&[0.0, 1.0, 2.0], &[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(r.slope, 0.0);
        assert_eq!(r.intercept, 5.0);
        assert_eq!(r.rvalue, 0.0);
        assert!((r.pvalue - 1.0).abs() < 1e-12);
        assert_eq!(r.stderr, 0.0);
    }

    #[test]
    fn two_equal_values_have_unit_pvalue() {
        let r = fit(&[0.0, 1.0], &[2.0, 2.0]).unwrap();
        assert_eq!(r.slope, 0.0);
        assert_eq!(r.pvalue, 1.0);
        assert_eq!(r.stderr, 0.0);
    }

    #[test]
    fn noisy_fit_matches_reference() {
        // x = 0..5, y = [1, 3, 2, 5, 4]
        // ss_xx = 10, ss_yy = 10, ss_xy = 8
        // slope = 0.8, intercept = 3 - 0.8 * 2 = 1.4, r = 0.8
        // stderr = sqrt(0.36 * 10 / 10 / 3) = sqrt(0.12)
        // t = 0.8 * sqrt(3 / 0.36) ≈ 2.3094, two-sided p with df = 3 ≈ 0.1041
        let r = fit(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 5.0, 4.0]).unwrap();
        assert!((r.slope - 0.8).abs() < 1e-12);
        assert!((r.intercept - 1.4).abs() < 1e-12);
        assert!((r.rvalue - 0.8).abs() < 1e-12);
        assert!((r.stderr - 0.12_f64.sqrt()).abs() < 1e-12);
        assert!((r.pvalue - 0.1041).abs() < 1e-3, "pvalue {}", r.pvalue);
    }
}
