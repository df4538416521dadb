use std::time::Duration;

use rand::Rng;

/// Jitter applied around every non-zero step, in milliseconds.
const JITTER_MS: i64 = 500;

/// A back-off strategy described by a sequence of delays in whole seconds.
///
/// Attempt `n` (1-indexed) waits `seq[n-1]` seconds, attempts past the end
/// of the sequence keep waiting for the last step. Every non-zero step is
/// jittered by up to +-500ms. An empty sequence never waits, which is how
/// tests switch the back-off off.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Backoff {
    seq: Vec<u64>,
}

impl Backoff {
    pub fn new(seq: impl Into<Vec<u64>>) -> Self {
        Self { seq: seq.into() }
    }

    /// Never waits.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Used while waiting for the cluster to become active.
    pub fn cluster() -> Self {
        Self::new([1, 2, 4, 8, 16, 32, 64])
    }

    /// Used while waiting for the membership tag to show up on the instance.
    pub fn membership_tag() -> Self {
        Self::new([1, 1, 2])
    }

    pub fn duration(&self, attempt: u32) -> Duration {
        let Some(last) = self.seq.last() else {
            return Duration::ZERO;
        };
        let idx = attempt.saturating_sub(1) as usize;
        jittered(*self.seq.get(idx).unwrap_or(last))
    }
}

fn jittered(secs: u64) -> Duration {
    if secs == 0 {
        return Duration::ZERO;
    }
    let base = secs as i64 * 1000;
    let jitter = rand::rng().random_range(-JITTER_MS..JITTER_MS);
    Duration::from_millis((base + jitter).max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(d: Duration, secs: u64) -> bool {
        let ms = d.as_millis() as i64;
        let base = secs as i64 * 1000;
        ms >= base - JITTER_MS && ms <= base + JITTER_MS
    }

    #[test]
    fn empty_backoff_never_waits() {
        let b = Backoff::disabled();
        for attempt in [1, 2, 3, 10, 1000, u32::MAX] {
            assert_eq!(b.duration(attempt), Duration::ZERO);
        }
    }

    #[test]
    fn steps_follow_the_sequence() {
        let b = Backoff::new([1, 5, 10]);
        assert!(within(b.duration(1), 1));
        assert!(within(b.duration(2), 5));
        assert!(within(b.duration(3), 10));
    }

    #[test]
    fn attempts_past_the_end_clamp_to_last_step() {
        let b = Backoff::new([1, 2, 4]);
        for attempt in 4..50 {
            assert!(within(b.duration(attempt), 4), "attempt {attempt}");
        }
    }

    #[test]
    fn zero_step_is_never_jittered() {
        let b = Backoff::new([0, 0, 3]);
        assert_eq!(b.duration(1), Duration::ZERO);
        assert_eq!(b.duration(2), Duration::ZERO);
        assert!(within(b.duration(3), 3));
    }

    #[test]
    fn jitter_varies_between_calls() {
        let b = Backoff::new([2]);
        let draws: Vec<Duration> = (0..20).map(|_| b.duration(1)).collect();
        assert!(draws.iter().all(|d| within(*d, 2)));
        // 20 identical draws out of 1000 possible values won't happen by chance
        assert!(draws.iter().any(|d| *d != draws[0]));
    }

    #[test]
    fn attempt_zero_is_treated_as_first() {
        let b = Backoff::new([0, 7]);
        assert_eq!(b.duration(0), Duration::ZERO);
    }
}
