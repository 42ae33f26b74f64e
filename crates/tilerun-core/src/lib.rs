pub mod game_trait;
pub mod geometry;
pub mod input;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{SessionOutcome, Simulation};
    use crate::input::{DirectionalInput, InputState};

    /// One display frame at 60 Hz, in milliseconds.
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Run N ticks with a constant input, returning all accumulated events.
    pub fn run_ticks<S: Simulation>(
        sim: &mut S,
        n: usize,
        delta_ms: f64,
        input: &dyn DirectionalInput,
    ) -> Vec<S::Event> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.tick(delta_ms, input));
        }
        all_events
    }

    /// Run one tick per entry of `script`.
    pub fn run_script<S: Simulation>(
        sim: &mut S,
        script: &[InputState],
        delta_ms: f64,
    ) -> Vec<S::Event> {
        let mut all_events = Vec::new();
        for input in script {
            all_events.extend(sim.tick(delta_ms, input));
        }
        all_events
    }

    // ================================================================
    // Simulation Contract Tests
    // ================================================================
    // Generic checks every Simulation implementation must pass. Game crates
    // call them from their own #[cfg(test)] modules with a fresh session.

    /// tick() with delta>0 must advance the session clock.
    pub fn contract_tick_advances_time<S: Simulation>(sim: &mut S) {
        let before = sim.elapsed_ms();
        sim.tick(FRAME_MS, &InputState::NONE);
        assert!(
            sim.elapsed_ms() > before,
            "tick(delta>0) must advance elapsed time"
        );
    }

    /// end() must freeze the render frame and the clock.
    pub fn contract_end_freezes_simulation<S: Simulation>(sim: &mut S) {
        sim.end(true);
        assert!(sim.is_ended(), "end() must mark the session ended");
        assert_eq!(sim.outcome(), Some(SessionOutcome::Won));

        let before = sim.serialize_frame().expect("frame must encode");
        let elapsed = sim.elapsed_ms();
        run_ticks(sim, 10, FRAME_MS, &InputState::RIGHT);
        let after = sim.serialize_frame().expect("frame must encode");
        assert_eq!(before, after, "Frame must not change while ended");
        assert_eq!(elapsed, sim.elapsed_ms(), "Clock must not run while ended");
    }

    /// restart() after end() must reset the clock and resume updates.
    pub fn contract_restart_resumes<S: Simulation>(sim: &mut S) {
        sim.tick(FRAME_MS, &InputState::NONE);
        sim.end(true);
        sim.restart();
        assert!(!sim.is_ended(), "restart() must clear ended");
        assert_eq!(sim.outcome(), None, "restart() must clear the outcome");
        assert_eq!(sim.elapsed_ms(), 0.0, "restart() must reset the clock");

        sim.tick(FRAME_MS, &InputState::NONE);
        assert!(
            sim.elapsed_ms() > 0.0,
            "Simulation must resume on the tick after restart()"
        );
    }

    /// The encoded frame must be non-empty.
    pub fn contract_frame_encodes<S: Simulation>(sim: &S) {
        let bytes = sim.serialize_frame().expect("frame must encode");
        assert!(!bytes.is_empty(), "serialize_frame() must produce bytes");
    }
}
