//! Pacing scheduler — deliberate randomized delays between outbound actions.
//!
//! Correctness here is pacing, not throughput: every returned delay is a
//! mandatory blocking wait, never advisory. Callers must `pause` for the
//! full duration before the next action. The random source is seeded
//! through config so tests can assert distribution bounds deterministically.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Delay ranges and retry bounds.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Wait after each successful outbound action, uniform in this range.
    pub inter_target_min: Duration,
    pub inter_target_max: Duration,
    /// Wait between affiliation batches, uniform in this range.
    pub inter_batch_min: Duration,
    pub inter_batch_max: Duration,
    /// Exponential backoff base for retries.
    pub retry_base: Duration,
    /// Hard cap on the exponential component.
    pub retry_max: Duration,
    /// Maximum attempts per outbound action.
    pub max_attempts: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_target_min: Duration::from_secs(45),
            inter_target_max: Duration::from_secs(90),
            inter_batch_min: Duration::from_secs(60),
            inter_batch_max: Duration::from_secs(180),
            retry_base: Duration::from_secs(30),
            retry_max: Duration::from_secs(150),
            max_attempts: 3,
        }
    }
}

impl PacingConfig {
    /// A zero-delay config for tests and simulations.
    pub fn instant() -> Self {
        Self {
            inter_target_min: Duration::ZERO,
            inter_target_max: Duration::ZERO,
            inter_batch_min: Duration::ZERO,
            inter_batch_max: Duration::ZERO,
            retry_base: Duration::ZERO,
            retry_max: Duration::ZERO,
            max_attempts: 3,
        }
    }
}

/// Computes delays and owns the run's random source.
///
/// Shuffling and pool sampling also draw from this source so that the
/// whole run is reproducible from one seed.
pub struct PacingScheduler {
    config: PacingConfig,
    rng: Mutex<StdRng>,
}

impl PacingScheduler {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic scheduler for tests and reproducible dry runs.
    pub fn seeded(config: PacingConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Delay applied after a successful outbound action. Skips and
    /// exhausted failures get no delay — total wall clock stays bounded.
    pub fn inter_target_delay(&self) -> Duration {
        self.uniform(self.config.inter_target_min, self.config.inter_target_max)
    }

    /// Delay applied between affiliation batches.
    pub fn inter_batch_delay(&self) -> Duration {
        self.uniform(self.config.inter_batch_min, self.config.inter_batch_max)
    }

    /// Backoff before retry `attempt` (1-based): the exponential component
    /// `base * 2^attempt` capped at `retry_max`, plus jitter uniform in
    /// `[0, base)` so concurrent failures never retry in lockstep.
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let base = self.config.retry_base.as_millis() as u64;
        let cap = self.config.retry_max.as_millis() as u64;
        if base == 0 {
            return Duration::ZERO;
        }
        let exponential = base
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(cap);
        let jitter = self.rng.lock().unwrap().gen_range(0..base);
        Duration::from_millis(exponential + jitter)
    }

    /// Block for `delay`. This is the engine's only suspension point.
    pub async fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        trace!(delay_ms = delay.as_millis() as u64, "Pacing wait");
        tokio::time::sleep(delay).await;
    }

    /// Shuffle a batch in place — no positional bias in target order.
    pub fn shuffle<T>(&self, items: &mut [T]) {
        items.shuffle(&mut *self.rng.lock().unwrap());
    }

    /// Randomized bounded sample of a pool — selection order must not be
    /// a detectable fixed pattern across runs.
    pub fn sample<T: Clone>(&self, pool: &[T], count: usize) -> Vec<T> {
        let count = count.min(pool.len());
        pool.choose_multiple(&mut *self.rng.lock().unwrap(), count)
            .cloned()
            .collect()
    }

    fn uniform(&self, min: Duration, max: Duration) -> Duration {
        let lo = min.as_millis() as u64;
        let hi = max.as_millis() as u64;
        if hi <= lo {
            return min;
        }
        let ms = self.rng.lock().unwrap().gen_range(lo..=hi);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn inter_target_delay_stays_in_range() {
        let scheduler = PacingScheduler::seeded(PacingConfig::default(), 7);
        for _ in 0..200 {
            let d = scheduler.inter_target_delay();
            assert!(d >= seconds(45) && d <= seconds(90), "out of range: {d:?}");
        }
    }

    #[test]
    fn inter_batch_delay_stays_in_range() {
        let scheduler = PacingScheduler::seeded(PacingConfig::default(), 7);
        for _ in 0..200 {
            let d = scheduler.inter_batch_delay();
            assert!(d >= seconds(60) && d <= seconds(180), "out of range: {d:?}");
        }
    }

    #[test]
    fn retry_backoff_bounds_per_attempt() {
        let scheduler = PacingScheduler::seeded(PacingConfig::default(), 11);
        let base = seconds(30);
        let cap = seconds(150);
        for attempt in 1..=5u32 {
            for _ in 0..50 {
                let d = scheduler.retry_backoff(attempt);
                let exponential = std::cmp::min(base * 2u32.pow(attempt), cap);
                assert!(d >= exponential, "attempt {attempt}: {d:?} < {exponential:?}");
                assert!(
                    d < exponential + base,
                    "attempt {attempt}: jitter exceeded base: {d:?}"
                );
            }
        }
    }

    #[test]
    fn retry_backoff_exponential_until_cap() {
        let scheduler = PacingScheduler::seeded(PacingConfig::default(), 3);
        // Floor of the backoff (the capped exponential component) is
        // non-decreasing in the attempt number.
        let floors: Vec<Duration> = (1..=5)
            .map(|n| std::cmp::min(seconds(30) * 2u32.pow(n), seconds(150)))
            .collect();
        for window in floors.windows(2) {
            assert!(window[0] <= window[1]);
        }
        // Attempts 3+ hit the cap: every sample lands in [cap, cap + base).
        for _ in 0..50 {
            let d = scheduler.retry_backoff(4);
            assert!(d >= seconds(150) && d < seconds(180));
        }
    }

    #[test]
    fn instant_config_produces_zero_delays() {
        let scheduler = PacingScheduler::seeded(PacingConfig::instant(), 1);
        assert_eq!(scheduler.inter_target_delay(), Duration::ZERO);
        assert_eq!(scheduler.inter_batch_delay(), Duration::ZERO);
        assert_eq!(scheduler.retry_backoff(1), Duration::ZERO);
        assert_eq!(scheduler.retry_backoff(5), Duration::ZERO);
    }

    #[test]
    fn seeded_schedulers_are_reproducible() {
        let a = PacingScheduler::seeded(PacingConfig::default(), 42);
        let b = PacingScheduler::seeded(PacingConfig::default(), 42);
        for _ in 0..20 {
            assert_eq!(a.inter_target_delay(), b.inter_target_delay());
        }
    }

    #[test]
    fn sample_is_bounded_and_drawn_from_pool() {
        let scheduler = PacingScheduler::seeded(PacingConfig::default(), 9);
        let pool: Vec<u32> = (0..10).collect();
        let picked = scheduler.sample(&pool, 3);
        assert_eq!(picked.len(), 3);
        for item in &picked {
            assert!(pool.contains(item));
        }
        // Asking for more than the pool holds returns the whole pool.
        assert_eq!(scheduler.sample(&pool, 99).len(), 10);
    }

    #[test]
    fn shuffle_preserves_elements() {
        let scheduler = PacingScheduler::seeded(PacingConfig::default(), 5);
        let mut items: Vec<u32> = (0..20).collect();
        scheduler.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
