//! The diagnostic monitor loop.
//!
//! Single sequential thread: sample, evaluate, drive the indicator, report,
//! then sleep out the period. The sleep is sliced so the polled USB device
//! stack keeps getting serviced between reports. Runs forever; the only way
//! out is reset or power-cycle.

use core::fmt;

use embedded_hal::blocking::delay::DelayMs;

use crate::board::BoardVariant;
use crate::indicator::Indicator;
use crate::report;
use crate::signals::SignalSource;
use crate::verdict::usb_connected;

/// Time between diagnostic lines.
pub const REPORT_PERIOD_MS: u32 = 1_000;

/// Granularity of the idle sleep; the signal source is serviced once per
/// slice so the device stack never starves for a full period.
const IDLE_SLICE_MS: u32 = 1;

pub struct Monitor<S, I, C, D> {
    variant: BoardVariant,
    source: S,
    indicator: Option<I>,
    console: C,
    delay: D,
}

impl<S, I, C, D> Monitor<S, I, C, D>
where
    S: SignalSource,
    I: Indicator,
    C: fmt::Write,
    D: DelayMs<u32>,
{
    /// Boards without an indicator pass `None` and skip that step.
    pub fn new(variant: BoardVariant, source: S, indicator: Option<I>, console: C, delay: D) -> Self {
        Self {
            variant,
            source,
            indicator,
            console,
            delay,
        }
    }

    /// Emits the one-time startup message.
    pub fn announce(&mut self) {
        let _ = report::announce(&mut self.console);
    }

    /// One iteration: sample, evaluate, drive the indicator, report.
    /// Returns the verdict so callers can observe it.
    pub fn tick(&mut self) -> bool {
        let signals = self.source.sample();
        let connected = usb_connected(&signals);
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.set_state(connected);
        }
        let _ = report::status_line(&mut self.console, self.variant, &signals);
        connected
    }

    fn idle(&mut self) {
        let mut remaining = REPORT_PERIOD_MS;
        while remaining > 0 {
            self.source.service();
            self.delay.delay_ms(IDLE_SLICE_MS);
            remaining -= IDLE_SLICE_MS;
        }
    }

    /// Runs the monitor forever. No exit condition, no error states.
    pub fn run(&mut self) -> ! {
        self.announce();
        loop {
            self.tick();
            self.idle();
        }
    }

    /// Bounded variant of [`run`](Self::run) for test harnesses.
    pub fn run_for(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.tick();
            self.idle();
        }
    }

    /// Hands the collaborators back, mainly so tests can inspect them.
    pub fn into_parts(self) -> (S, Option<I>, C, D) {
        (self.source, self.indicator, self.console, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::RawSignals;

    /// Replays a scripted signal sequence, holding the last entry once the
    /// script runs out.
    struct ScriptedSource {
        script: Vec<(bool, bool, bool)>, // (suspended, vbus, ready)
        step: usize,
        services: usize,
    }

    impl ScriptedSource {
        fn new(script: Vec<(bool, bool, bool)>) -> Self {
            Self {
                script,
                step: 0,
                services: 0,
            }
        }

        fn current(&self) -> (bool, bool, bool) {
            let idx = self.step.min(self.script.len().saturating_sub(1));
            self.script.get(idx).copied().unwrap_or((true, false, false))
        }
    }

    impl SignalSource for ScriptedSource {
        fn bus_status(&mut self) -> u32 {
            let (suspended, _, _) = self.current();
            RawSignals::from_flags(suspended, false, false).sie_status
        }

        fn vbus_present(&mut self) -> bool {
            self.current().1
        }

        fn host_session_ready(&mut self) -> bool {
            self.current().2
        }

        fn service(&mut self) {
            self.services += 1;
        }

        fn sample(&mut self) -> RawSignals {
            let (suspended, vbus, ready) = self.current();
            self.step += 1;
            RawSignals::from_flags(suspended, vbus, ready)
        }
    }

    struct RecordingIndicator {
        states: Vec<bool>,
    }

    impl Indicator for RecordingIndicator {
        fn set_state(&mut self, on: bool) {
            self.states.push(on);
        }
    }

    struct CountingDelay {
        slept_ms: u32,
    }

    impl DelayMs<u32> for CountingDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.slept_ms += ms;
        }
    }

    fn monitor(
        script: Vec<(bool, bool, bool)>,
    ) -> Monitor<ScriptedSource, RecordingIndicator, String, CountingDelay> {
        Monitor::new(
            BoardVariant::Pico,
            ScriptedSource::new(script),
            Some(RecordingIndicator { states: Vec::new() }),
            String::new(),
            CountingDelay { slept_ms: 0 },
        )
    }

    #[test]
    fn announce_prints_the_startup_message_once() {
        let mut m = monitor(vec![(true, false, false)]);
        m.announce();
        let (_, _, console, _) = m.into_parts();
        assert_eq!(console, "Waiting for USB connection\n");
    }

    #[test]
    fn one_line_per_iteration_and_full_period_slept() {
        let mut m = monitor(vec![(false, true, true)]);
        m.run_for(3);

        let (source, _, console, delay) = m.into_parts();
        assert_eq!(console.lines().count(), 3);
        assert_eq!(delay.slept_ms, 3 * REPORT_PERIOD_MS);
        // Serviced once per idle slice.
        assert_eq!(source.services as u32, 3 * REPORT_PERIOD_MS);
    }

    #[test]
    fn indicator_follows_the_verdict() {
        let mut m = monitor(vec![
            (false, true, true),  // connected
            (true, true, true),   // suspended
            (false, false, true), // no vbus
            (false, true, false), // stack not ready
            (false, true, true),  // connected again
        ]);
        m.run_for(5);

        let (_, indicator, _, _) = m.into_parts();
        assert_eq!(
            indicator.unwrap().states,
            vec![true, false, false, false, true]
        );
    }

    #[test]
    fn verdict_is_recomputed_from_each_fresh_snapshot() {
        let mut m = monitor(vec![(false, true, true), (true, true, true)]);
        assert!(m.tick());
        assert!(!m.tick());
    }

    #[test]
    fn monitor_without_indicator_skips_that_step() {
        let mut m: Monitor<_, RecordingIndicator, _, _> = Monitor::new(
            BoardVariant::Pico,
            ScriptedSource::new(vec![(false, true, true)]),
            None,
            String::new(),
            CountingDelay { slept_ms: 0 },
        );
        assert!(m.tick());
    }

    #[test]
    fn loop_stays_live_for_any_input_sequence() {
        let mut m = monitor(vec![
            (true, false, false),
            (false, true, true),
            (true, true, false),
        ]);
        m.run_for(50);
        let (_, _, console, delay) = m.into_parts();
        assert_eq!(console.lines().count(), 50);
        assert_eq!(delay.slept_ms, 50 * REPORT_PERIOD_MS);
    }
}
