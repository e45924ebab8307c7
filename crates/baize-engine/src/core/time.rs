/// Fixed timestep accumulator.
///
/// The shot lifecycle is tick-driven: callers feed in variable frame deltas
/// and run the simulation a whole number of fixed steps, so settle detection
/// and turn resolution see the same event ordering regardless of frame rate.
pub struct FixedTimestep {
    dt: f32,
    carry: f32,
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            carry: 0.0,
            max_steps: 10,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps
    /// to run. The carry is clamped so a long stall cannot snowball.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.carry += frame_dt;
        self.carry = self.carry.min(self.dt * self.max_steps as f32);
        let steps = (self.carry / self.dt) as u32;
        self.carry -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.advance(1.0 / 60.0), 1);
    }

    #[test]
    fn carries_partial_frames() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.advance(0.008), 0);
        assert_eq!(ts.advance(0.010), 1);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.advance(2.0), 10);
    }
}
