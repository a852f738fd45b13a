//! Natural cubic interpolating spline.

use crate::error::{Error, Result};

/// Interpolating cubic spline with natural end conditions.
///
/// Evaluation outside the knot range returns the first or last knot value.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fits a spline through `(xs[i], ys[i])`.
    ///
    /// Needs at least three knots with strictly increasing, finite `xs`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        let n = xs.len();
        if n != ys.len() {
            return Err(Error::Smoothing(format!("{} stations but {} heights", n, ys.len())));
        }
        if n < 3 {
            return Err(Error::Smoothing(format!("need at least 3 knots, got {}", n)));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(Error::Smoothing("non-finite knot".to_string()));
        }
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        if let Some(i) = h.iter().position(|&d| d <= 0.0) {
            return Err(Error::Smoothing(format!(
                "stations not increasing at knot {} ({} -> {})",
                i,
                xs[i],
                xs[i + 1]
            )));
        }

        // Tridiagonal system for interior second derivatives, Thomas algorithm.
        let inner = n - 2;
        let mut diag = vec![0.0; inner];
        let mut upper = vec![0.0; inner];
        let mut rhs = vec![0.0; inner];
        for k in 0..inner {
            let i = k + 1;
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            upper[k] = h[i];
            rhs[k] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }
        for k in 1..inner {
            let lower = h[k];
            let w = lower / diag[k - 1];
            diag[k] -= w * upper[k - 1];
            rhs[k] -= w * rhs[k - 1];
        }
        let mut m = vec![0.0; n];
        for k in (0..inner).rev() {
            let next = if k + 1 < inner { m[k + 2] } else { 0.0 };
            m[k + 1] = (rhs[k] - upper[k] * next) / diag[k];
        }
        if m.iter().any(|v| !v.is_finite()) {
            return Err(Error::Smoothing("singular spline system".to_string()));
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    /// Value of the spline at `x`, held constant outside the knot range.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x.is_nan() || x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        let j = self.xs.partition_point(|&k| k <= x).clamp(1, n - 1);
        let i = j - 1;
        let h = self.xs[j] - self.xs[i];
        let a = self.xs[j] - x;
        let b = x - self.xs[i];
        self.m[i] * a.powi(3) / (6.0 * h)
            + self.m[j] * b.powi(3) / (6.0 * h)
            + (self.ys[i] / h - self.m[i] * h / 6.0) * a
            + (self.ys[j] / h - self.m[j] * h / 6.0) * b
    }
}
