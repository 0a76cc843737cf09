use ai_core::DeterministicRng;
use ai_tools::{TraceEvent, TraceSink};

/// Per-call context threaded through `query`/`update`.
///
/// Carries the elapsed time, the shared random source used by random composites, and the trace
/// sink. The manager builds one per tree per phase.
pub struct TickContext<'a> {
    pub tick: u64,
    pub dt: f32,
    pub rng: &'a mut dyn DeterministicRng,
    pub trace: &'a mut dyn TraceSink,
}

impl<'a> TickContext<'a> {
    pub fn new(
        tick: u64,
        dt: f32,
        rng: &'a mut dyn DeterministicRng,
        trace: &'a mut dyn TraceSink,
    ) -> Self {
        Self {
            tick,
            dt,
            rng,
            trace,
        }
    }

    pub(crate) fn emit(&mut self, tag: &'static str, a: u64, b: u64) {
        self.trace
            .emit(TraceEvent::new(self.tick, tag).with_a(a).with_b(b));
    }
}
