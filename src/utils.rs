//! Unit conversions, decay arithmetic and csv table readers.
use crate::errors::LoadResult;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Litres in one millimetre of water over one square kilometre.
pub const L_PER_MM_KM2: f64 = 1e6;
/// Cubic metres in one millimetre of water over one square kilometre.
pub const M3_PER_MM_KM2: f64 = 1e3;
/// Nanograms per kilogram.
pub const NG_PER_KG: f64 = 1e12;
/// Nanograms per litre in one kilogram per cubic metre.
pub const NG_L_PER_KG_M3: f64 = 1e9;

/// Apply one day of first-order decay to a mass.
///  - `mass` is the mass at the start of the day.
///  - `kd` is the decay rate (1/day).
///  - Returns the remaining mass, never below zero.
///
/// # Examples
///
/// ```rust
/// let m = loadings::utils::decay(10.0, 0.1);
/// assert!((m - 9.0).abs() < 1e-12);
/// ```
pub fn decay(mass: f64, kd: f64) -> f64 {
    (mass - kd * mass).max(0.0)
}

/// Decay rate (1/day) from a half-life in days.
pub fn decay_rate(half_life: f64) -> f64 {
    0.693 / half_life
}

/// Divide `num` by `den`, returning zero when the denominator is not positive.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Thickness-weighted average of layered soil properties.
///  - `depths` are cumulative layer bottom depths (mm), shallowest first.
///  - `params` are the layer values, one per depth.
///  - Returns zero for an empty profile.
///
/// # Examples
///
/// ```rust
/// let avg = loadings::utils::depth_weighted(&[100.0, 400.0], &[1.0, 2.0]);
/// assert!((avg - 1.75).abs() < 1e-12);
/// ```
pub fn depth_weighted(depths: &[f64], params: &[f64]) -> f64 {
    let mut current = 0.0;
    let mut total = 0.0;
    let mut weighted = 0.0;
    for (depth, param) in depths.iter().zip(params) {
        let thickness = depth - current;
        weighted += param * thickness;
        total += thickness;
        current = *depth;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Calculate the mean of a slice of f64 values.
///  - `numbers` is a reference to a slice of f64 values.
///  - Returns the mean of `numbers`, or zero for an empty slice.
///
/// # Examples
///
/// ```rust
/// let numbers = vec![1.0, 1.5, 2.0, 2.5, 3.0];
/// let mn = loadings::utils::mean(&numbers);
/// assert_eq!(2.0, mn);
/// ```
pub fn mean(numbers: &[f64]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    let sum: f64 = numbers.iter().sum();
    sum / numbers.len() as f64
}

/// Read every record of a csv table into a vector of `T`.
pub fn read_table<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> LoadResult<Vec<T>> {
    let mut dat = Vec::new();
    let var = std::fs::File::open(path.as_ref())?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(var);
    for result in rdr.deserialize() {
        let row: T = result?;
        dat.push(row);
    }
    Ok(dat)
}

/// Read a csv table if it exists, returning an empty vector when it does not.
pub fn read_optional<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> LoadResult<Vec<T>> {
    if path.as_ref().exists() {
        read_table(path)
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn decay_never_goes_negative() {
        assert_eq!(decay(5.0, 1.5), 0.0);
        assert_eq!(decay(0.0, 0.2), 0.0);
    }

    #[test]
    fn decay_rate_from_half_life() {
        assert_relative_eq!(decay_rate(6.93), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio_or_zero(3.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(3.0, -1.0), 0.0);
        assert_relative_eq!(ratio_or_zero(3.0, 2.0), 1.5);
    }

    #[test]
    fn depth_weighted_uses_layer_thickness() {
        let avg = depth_weighted(&[200.0, 300.0, 1000.0], &[1.2, 1.4, 1.6]);
        assert_relative_eq!(avg, (1.2 * 200.0 + 1.4 * 100.0 + 1.6 * 700.0) / 1000.0);
        assert_eq!(depth_weighted(&[], &[]), 0.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
