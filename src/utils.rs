//! Utility functions used across the library
use crate::{AbsolutePos, Scalar};

/// Binomial coefficient `n choose k`
pub(crate) fn binomial(n: usize, k: usize) -> Scalar {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as Scalar / (i + 1) as Scalar)
}

/// Evaluate bezier curve defined by control `points` at parameter `t` using
/// Bernstein polynomials
///
/// Reference: https://en.wikipedia.org/wiki/Bernstein_polynomial
pub(crate) fn bezier_point(t: Scalar, points: &[AbsolutePos]) -> AbsolutePos {
    let Some(degree) = points.len().checked_sub(1) else {
        return AbsolutePos::default();
    };
    points
        .iter()
        .enumerate()
        .fold(AbsolutePos::default(), |acc, (index, point)| {
            let coef = binomial(degree, index)
                * t.powi(index as i32)
                * (1.0 - t).powi((degree - index) as i32);
            acc + coef * *point
        })
}

/// Points of the cubic bezier curve sampled at `segments + 1` evenly spaced parameters
pub(crate) fn cubic_flatten(
    segments: usize,
    start: AbsolutePos,
    control1: AbsolutePos,
    control2: AbsolutePos,
    end: AbsolutePos,
) -> Vec<AbsolutePos> {
    let segments = segments.max(1);
    let points = [start, control1, control2, end];
    (0..=segments)
        .map(|index| match index {
            0 => start,
            index if index == segments => end,
            index => bezier_point(index as Scalar / segments as Scalar, &points),
        })
        .collect()
}
