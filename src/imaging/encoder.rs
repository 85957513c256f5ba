//! Size-budgeted JPEG encoding.
//!
//! Encoding is the expensive step of the pipeline, so the quality search is
//! capped at [`MAX_ENCODE_ATTEMPTS`] encodes per image. The budget is best
//! effort: when the cap is hit the last artifact is returned with
//! [`EncodedArtifact::budget_met`] set to `false`, and callers decide what to
//! do with an oversize file.

use super::params::Quality;

/// Upper bound on encode calls per image.
pub const MAX_ENCODE_ATTEMPTS: u32 = 10;

/// Result of a size-budgeted encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub quality_used: Quality,
    /// Number of encode calls made (1..=[`MAX_ENCODE_ATTEMPTS`]).
    pub attempts: u32,
    pub budget_met: bool,
}

impl EncodedArtifact {
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Search JPEG quality so the encoded size stays within `max_bytes`.
///
/// Bisects `[0.1, 1.0]` starting at `initial_quality`. The search stops as
/// soon as an encode fits, when quality reaches [`Quality::FLOOR`], or after
/// [`MAX_ENCODE_ATTEMPTS`] encodes. `encode` errors propagate unchanged.
pub fn encode_within_budget<E>(
    initial_quality: Quality,
    max_bytes: u64,
    mut encode: impl FnMut(Quality) -> Result<Vec<u8>, E>,
) -> Result<EncodedArtifact, E> {
    let lower = Quality::FLOOR.value();
    let mut quality = initial_quality;
    let mut attempts = 0;

    loop {
        let bytes = encode(quality)?;
        attempts += 1;

        let fits = bytes.len() as u64 <= max_bytes;
        if fits || quality <= Quality::FLOOR || attempts >= MAX_ENCODE_ATTEMPTS {
            return Ok(EncodedArtifact {
                bytes,
                quality_used: quality,
                attempts,
                budget_met: fits,
            });
        }

        // Over budget: the current quality becomes the new upper bound. A fit
        // always ends the search, so the lower bound never moves off the floor.
        quality = Quality::new((lower + quality.value()) / 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// Simulated encoder: size grows linearly with quality.
    fn linear(max_size: usize) -> impl FnMut(Quality) -> Result<Vec<u8>, Infallible> {
        move |q| Ok(vec![0; (q.value() * max_size as f32) as usize])
    }

    #[test]
    fn fits_on_first_try_returns_immediately() {
        let mut calls = Vec::new();
        let artifact = encode_within_budget(Quality::CEILING, 1000, |q| {
            calls.push(q);
            Ok::<_, Infallible>(vec![0; 800])
        })
        .unwrap();

        assert_eq!(calls, vec![Quality::CEILING]);
        assert_eq!(artifact.attempts, 1);
        assert_eq!(artifact.quality_used, Quality::CEILING);
        assert_eq!(artifact.byte_size(), 800);
        assert!(artifact.budget_met);
    }

    #[test]
    fn over_budget_bisects_toward_floor() {
        let mut calls = Vec::new();
        let artifact = encode_within_budget(Quality::new(0.9), 500, |q| {
            calls.push(q.value());
            Ok::<_, Infallible>(vec![0; (q.value() * 1000.0) as usize])
        })
        .unwrap();

        // 0.9 → 900 bytes, 0.5 → 500 bytes fits
        assert_eq!(calls.len(), 2);
        assert!((calls[1] - 0.5).abs() < 1e-6);
        assert!(artifact.budget_met);
        assert!(artifact.byte_size() <= 500);
    }

    #[test]
    fn never_exceeds_attempt_cap() {
        let mut count = 0;
        let artifact = encode_within_budget(Quality::new(0.9), 10, |_| {
            count += 1;
            Ok::<_, Infallible>(vec![0; 1_000_000])
        })
        .unwrap();

        assert_eq!(count, MAX_ENCODE_ATTEMPTS);
        assert_eq!(artifact.attempts, MAX_ENCODE_ATTEMPTS);
        assert!(!artifact.budget_met);
        assert_eq!(artifact.byte_size(), 1_000_000);
    }

    #[test]
    fn starting_at_floor_stops_after_one_encode() {
        let artifact = encode_within_budget(Quality::FLOOR, 1, linear(100_000)).unwrap();
        assert_eq!(artifact.attempts, 1);
        assert_eq!(artifact.quality_used, Quality::FLOOR);
        assert!(!artifact.budget_met);
    }

    #[test]
    fn quality_stays_within_search_range() {
        for &initial in &[0.0, 0.05, 0.1, 0.33, 0.75, 1.0, 2.0] {
            for &budget in &[0, 10, 5_000, 50_000, 1_000_000] {
                let mut seen = Vec::new();
                let artifact = encode_within_budget(Quality::new(initial), budget, |q| {
                    seen.push(q.value());
                    Ok::<_, Infallible>(vec![0; (q.value() * 100_000.0) as usize])
                })
                .unwrap();

                assert!(seen.len() as u32 <= MAX_ENCODE_ATTEMPTS);
                for q in seen {
                    assert!((0.1..=1.0).contains(&q), "quality {q} out of range");
                }
                let used = artifact.quality_used.value();
                assert!((0.1..=1.0).contains(&used));
            }
        }
    }

    #[test]
    fn encode_error_propagates() {
        let mut count = 0;
        let result = encode_within_budget(Quality::default(), 100, |_| {
            count += 1;
            if count == 2 {
                Err("encoder broke")
            } else {
                Ok(vec![0; 1000])
            }
        });
        assert_eq!(result, Err("encoder broke"));
        assert_eq!(count, 2);
    }
}
