//! Size-budget parameter search
//!
//! Pure and I/O free: callers hand in an encoder closure and get back the
//! best candidate.

/// Inclusive range of encoder parameters walked by [`search_parameter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSweep {
    /// First parameter tried
    pub start: i32,
    /// Added after every attempt; negative for quality, positive for effort
    pub step: i32,
    /// Last parameter that may be tried
    pub bound: i32,
}

impl ParameterSweep {
    /// JPEG quality from 95 down to 10
    pub const JPEG_QUALITY: Self = Self {
        start: 95,
        step: -5,
        bound: 10,
    };

    /// PNG effort from fast (0) to best (2)
    pub const PNG_EFFORT: Self = Self {
        start: 0,
        step: 1,
        bound: 2,
    };

    /// Parameters in the order they are tried
    ///
    /// A zero step yields `start` once.
    pub fn values(self) -> impl Iterator<Item = i32> {
        let mut next = Some(self.start);
        std::iter::from_fn(move || {
            let current = next?;
            let in_range = match self.step.signum() {
                -1 => current >= self.bound,
                1 => current <= self.bound,
                _ => true,
            };
            if !in_range {
                return None;
            }
            next = if self.step == 0 {
                None
            } else {
                current.checked_add(self.step)
            };
            Some(current)
        })
    }
}

/// Re-encodes until a candidate fits in `threshold` bytes
///
/// `original` is returned untouched when it already fits. Otherwise the
/// sweep is walked in order and stops at the first candidate at or under the
/// threshold. If none fits, the smallest candidate seen (original included)
/// is returned; running out of range is not an error.
///
/// # Examples
///
/// ```
/// use issue_mirror::core::media::compress::{search_parameter, ParameterSweep};
///
/// let original = vec![0u8; 1000];
/// let best = search_parameter(original, ParameterSweep::JPEG_QUALITY, 400, |quality| {
///     Ok::<_, std::convert::Infallible>(vec![0u8; quality as usize * 5])
/// })
/// .unwrap();
/// assert_eq!(best.len(), 400);
/// ```
pub fn search_parameter<F, E>(
    original: Vec<u8>,
    sweep: ParameterSweep,
    threshold: u64,
    mut encode: F,
) -> Result<Vec<u8>, E>
where
    F: FnMut(i32) -> Result<Vec<u8>, E>,
{
    if original.len() as u64 <= threshold {
        return Ok(original);
    }

    let mut best = original;
    for param in sweep.values() {
        let candidate = encode(param)?;
        let fits = candidate.len() as u64 <= threshold;

        tracing::trace!(param, size = candidate.len(), threshold, "Compression attempt");

        if candidate.len() < best.len() {
            best = candidate;
        }
        if fits {
            break;
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn test_sweep_values_descending() {
        let values: Vec<i32> = ParameterSweep::JPEG_QUALITY.values().collect();
        assert_eq!(values.first(), Some(&95));
        assert_eq!(values.last(), Some(&10));
        assert_eq!(values.len(), 18);
    }

    #[test]
    fn test_sweep_values_ascending() {
        let values: Vec<i32> = ParameterSweep::PNG_EFFORT.values().collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn test_sweep_values_step_overshoots_bound() {
        let sweep = ParameterSweep {
            start: 10,
            step: -4,
            bound: 1,
        };
        assert_eq!(sweep.values().collect::<Vec<_>>(), vec![10, 6, 2]);
    }

    #[test]
    fn test_sweep_zero_step_yields_start_once() {
        let sweep = ParameterSweep {
            start: 5,
            step: 0,
            bound: 0,
        };
        assert_eq!(sweep.values().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_sweep_start_outside_bound_is_empty() {
        let sweep = ParameterSweep {
            start: 5,
            step: -1,
            bound: 10,
        };
        assert_eq!(sweep.values().count(), 0);
    }

    #[test]
    fn test_original_under_threshold_is_not_reencoded() {
        let mut calls = 0;
        let result = search_parameter(vec![1u8; 10], ParameterSweep::JPEG_QUALITY, 10, |_| {
            calls += 1;
            Ok::<_, Infallible>(vec![])
        })
        .unwrap();
        assert_eq!(result.len(), 10);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_stops_at_first_fitting_candidate() {
        let mut tried = Vec::new();
        let result = search_parameter(vec![0u8; 2000], ParameterSweep::JPEG_QUALITY, 700, |q| {
            tried.push(q);
            Ok::<_, Infallible>(vec![0u8; q as usize * 10])
        })
        .unwrap();
        assert_eq!(result.len(), 700);
        assert_eq!(tried, vec![95, 90, 85, 80, 75, 70]);
    }

    #[test]
    fn test_strictly_decreasing_encoder_terminates_within_range() {
        let sweep = ParameterSweep::JPEG_QUALITY;
        let range_len = sweep.values().count();
        let mut calls = 0;
        let result = search_parameter(vec![0u8; 5000], sweep, 150, |q| {
            calls += 1;
            Ok::<_, Infallible>(vec![0u8; q as usize * 10])
        })
        .unwrap();
        assert!(result.len() as u64 <= 150);
        assert!(calls <= range_len);
    }

    #[test]
    fn test_unreachable_threshold_returns_smallest() {
        let mut calls = 0;
        let result = search_parameter(vec![0u8; 5000], ParameterSweep::JPEG_QUALITY, 1, |q| {
            calls += 1;
            Ok::<_, Infallible>(vec![0u8; q as usize * 10])
        })
        .unwrap();
        assert_eq!(result.len(), 100);
        assert_eq!(calls, 18);
    }

    #[test]
    fn test_larger_candidates_keep_original() {
        let result = search_parameter(vec![0u8; 50], ParameterSweep::PNG_EFFORT, 10, |_| {
            Ok::<_, Infallible>(vec![0u8; 80])
        })
        .unwrap();
        assert_eq!(result.len(), 50);
    }

    #[test]
    fn test_encoder_error_propagates() {
        let result = search_parameter(vec![0u8; 50], ParameterSweep::PNG_EFFORT, 10, |_| {
            Err::<Vec<u8>, _>("encoder failed")
        });
        assert_eq!(result, Err("encoder failed"));
    }
}
