use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::ClientOptions;

/// Jitter-free backoff: `min(base * 2^attempt, max)`.
pub(crate) fn exponential_delay_ms(attempt: usize, base_ms: u64, max_ms: u64) -> u64 {
    let exp = attempt.min(32) as u32;
    base_ms.saturating_mul(1u64 << exp).min(max_ms)
}

/// Exponential backoff for the attempt that just failed, plus uniform jitter.
pub(crate) fn compute_backoff(attempt: usize, options: &ClientOptions) -> Duration {
    let delay_ms = exponential_delay_ms(
        attempt,
        options.retry_base_delay_ms,
        options.retry_max_delay_ms,
    );
    let jitter_ms = if options.retry_jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..options.retry_jitter_ms)
    };
    Duration::from_millis(delay_ms.saturating_add(jitter_ms))
}

/// Delay before the next attempt. A server `retry-after` hint replaces the
/// computed backoff, clamped to `max_retry_after_ms`.
pub(crate) fn retry_delay(
    attempt: usize,
    retry_after: Option<u64>,
    options: &ClientOptions,
) -> Duration {
    match retry_after {
        Some(seconds) => Duration::from_millis(
            seconds
                .saturating_mul(1_000)
                .min(options.max_retry_after_ms),
        ),
        None => compute_backoff(attempt, options),
    }
}

/// Reads `retry-after` as whole seconds. HTTP-date values are ignored.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
