use std::time::Instant;

use crate::primitives::clock::elapsed_us;

use super::Recorder;

/// RAII helper that records the time it was alive when dropped.
///
/// The clock is only read when the target recorder is enabled, so a guard on
/// a disabled recorder costs a branch.
#[must_use = "dropping the guard immediately records ~0us; bind it with `let _scope = ...`"]
pub struct ProfileScope<'a> {
    recorder: &'a Recorder,
    category: &'a str,
    name: &'a str,
    start: Option<Instant>,
}

impl<'a> ProfileScope<'a> {
    /// Times a region into [`Recorder::global`].
    pub fn new(category: &'a str, name: &'a str) -> Self {
        Self::on(Recorder::global(), category, name)
    }

    /// Times a region into `recorder`.
    pub fn on(recorder: &'a Recorder, category: &'a str, name: &'a str) -> Self {
        Self {
            recorder,
            category,
            name,
            start: recorder.is_enabled().then(Instant::now),
        }
    }
}

impl Drop for ProfileScope<'_> {
    fn drop(&mut self) {
        if let Some(start) = self.start.take() {
            self.recorder
                .record(self.category, self.name, elapsed_us(start));
        }
    }
}
