use std::sync::OnceLock;
use std::time::Instant;

use crate::types::Micros;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Instant the clock was first read in this process.
pub fn epoch() -> Instant {
    *EPOCH.get_or_init(Instant::now)
}

/// Microseconds elapsed since [`epoch`].
pub fn now_us() -> Micros {
    elapsed_us(epoch())
}

/// Microseconds elapsed since `start`, saturating at [`Micros::MAX`].
pub fn elapsed_us(start: Instant) -> Micros {
    start.elapsed().as_micros().min(Micros::MAX as u128) as Micros
}
