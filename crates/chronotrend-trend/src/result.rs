//! Result type for linear trend estimation.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Outcome of an ordinary least-squares fit of value against the x axis.
///
/// The intercept is the fitted value at `x = 0`, which for the time-aware
/// estimator is the first sample's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendResult {
    /// Change in value per unit of x.
    pub slope: f64,
    /// Fitted value at `x = 0`.
    pub intercept: f64,
    /// Pearson correlation coefficient between x and value, in `[-1, 1]`.
    pub rvalue: f64,
    /// Two-sided p-value for the null hypothesis that the slope is zero.
    pub pvalue: f64,
    /// Standard error of the slope estimate.
    pub stderr: f64,
}

impl TrendResult {
    /// Return the field named by `attr`.
    #[must_use]
    pub fn get(&self, attr: TrendAttr) -> f64 {
        match attr {
            TrendAttr::Slope => self.slope,
            TrendAttr::Intercept => self.intercept,
            TrendAttr::Rvalue => self.rvalue,
            TrendAttr::Pvalue => self.pvalue,
            TrendAttr::Stderr => self.stderr,
        }
    }

    /// Iterate over `(attr, value)` pairs in [`TrendAttr::ALL`] order.
    pub fn attrs(&self) -> impl Iterator<Item = (TrendAttr, f64)> + '_ {
        TrendAttr::ALL.iter().map(move |&attr| (attr, self.get(attr)))
    }
}

/// Named field of a [`TrendResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrendAttr {
    Slope,
    Intercept,
    Rvalue,
    Pvalue,
    Stderr,
}

impl TrendAttr {
    /// Every attribute, in the order features are emitted.
    pub const ALL: [TrendAttr; 5] = [
        Self::Pvalue,
        Self::Rvalue,
        Self::Intercept,
        Self::Slope,
        Self::Stderr,
    ];

    /// Lowercase attribute name used in feature column names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Slope => "slope",
            Self::Intercept => "intercept",
            Self::Rvalue => "rvalue",
            Self::Pvalue => "pvalue",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for TrendAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrendAttr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.name() == s)
            .ok_or_else(|| format!("unknown trend attribute: {s}"))
    }
}
