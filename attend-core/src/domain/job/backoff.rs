/// `base * 2^(attempt-1)` capped at `max`; attempt 0 and 1 both yield `base`.
pub fn exponential_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let shift = attempt.saturating_sub(1).min(32);
    base_ms.saturating_mul(1u64 << shift).min(max_ms)
}
