//! One dimensional Gaussian low-pass filter.

use crate::error::{Error, Result};

/// Kernel half width in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Filter width for a sequence of `len` heights, kept within `[1, 5]`.
pub fn sigma_for_len(len: usize) -> f64 {
    (len as f64 / 100.0).clamp(1.0, 5.0)
}

/// Maps an out-of-range index back into `0..len` by mirroring about the
/// edges (`d c b a | a b c d | d c b a`).
fn reflect(mut idx: isize, len: isize) -> usize {
    loop {
        if idx < 0 {
            idx = -idx - 1;
        } else if idx >= len {
            idx = 2 * len - idx - 1;
        } else {
            return idx as usize;
        }
    }
}

/// Convolves `values` with a normalised Gaussian kernel of width `sigma`.
pub fn gaussian_filter(values: &[f64], sigma: f64) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(Error::Smoothing("empty sequence".to_string()));
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::Smoothing(format!("invalid filter width {}", sigma)));
    }
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= total);

    let len = values.len() as isize;
    let filtered: Vec<f64> = (0..len)
        .map(|i| {
            kernel
                .iter()
                .zip(-radius..=radius)
                .map(|(w, k)| w * values[reflect(i + k, len)])
                .sum::<f64>()
        })
        .collect();
    Ok(filtered)
}
