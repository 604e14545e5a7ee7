// Piecewise-linear regenerative braking ramp

use libm::fabsf;

use crate::params::RampParameters;

/// Regenerative braking current ramp.
///
/// Maps a signed motor speed to a signed braking current: zero below
/// `start_ratio * erpm_threshold`, rising linearly to `current_at_threshold`
/// at `erpm_threshold`, always opposing the direction of rotation.
///
/// The runaway cap is an explicit policy: with `Some(cap)`, any speed beyond
/// the cap saturates the ramp at `current_at_threshold`. With `None` the ramp
/// extrapolates linearly past the threshold, so the commanded magnitude can
/// exceed `current_at_threshold` (the sink still enforces hardware limits).
#[derive(Debug, Clone, Copy)]
pub struct RampBrake {
    params: RampParameters,
    runaway_cap: Option<f32>,
}

impl RampBrake {
    /// Create a ramp from a validated parameter set.
    ///
    /// Precondition: `params.validate()` has passed, in particular
    /// `start_ratio < 1.0` (the normalization divides by `1 - start_ratio`).
    pub const fn new(params: RampParameters, runaway_cap: Option<f32>) -> Self {
        Self {
            params,
            runaway_cap,
        }
    }

    /// Unsigned braking current [A] for a signed speed [eRPM].
    pub fn magnitude(&self, erpm: f32) -> f32 {
        let speed = fabsf(erpm);

        // Speed normalized to the threshold; saturated when the runaway cap
        // is exceeded so the command can never pass current_at_threshold.
        let rel = match self.runaway_cap {
            Some(cap) if speed > cap => 1.0,
            _ => speed / self.params.erpm_threshold,
        };

        // No braking below start_ratio * erpm_threshold.
        let excess = rel - self.params.start_ratio;
        if excess < 0.0 {
            return 0.0;
        }

        // Rescale the [start_ratio, 1.0] window to [0, 1] so that 100 % of
        // the configured current is reached at the threshold speed.
        let normalized = excess / (1.0 - self.params.start_ratio);

        normalized * self.params.current_at_threshold
    }

    /// Signed braking current [A] for a signed speed [eRPM].
    ///
    /// Braking opposes motion: positive current for reverse rotation,
    /// negative for forward. At standstill the magnitude is zero, so no
    /// torque is applied at rest.
    pub fn braking_current(&self, erpm: f32) -> f32 {
        let magnitude = self.magnitude(erpm);
        if erpm < 0.0 {
            magnitude
        } else {
            -magnitude
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RampParameters {
        RampParameters {
            erpm_threshold: 5000.0,
            current_at_threshold: 0.2,
            start_ratio: 0.90,
        }
    }

    #[test]
    fn no_braking_below_start_threshold() {
        let brake = RampBrake::new(params(), None);
        assert_eq!(brake.braking_current(0.0), 0.0);
        assert_eq!(brake.braking_current(1000.0), 0.0);
        // Exactly at the start of the ramp window.
        assert_eq!(brake.braking_current(4500.0), 0.0);
        assert_eq!(brake.braking_current(-4500.0), 0.0);
    }

    #[test]
    fn full_current_at_threshold() {
        let brake = RampBrake::new(params(), None);
        assert_eq!(brake.magnitude(5000.0), 0.2);
        assert_eq!(brake.braking_current(5000.0), -0.2);
        assert_eq!(brake.braking_current(-5000.0), 0.2);
    }

    #[test]
    fn half_ramp_point() {
        // rel = 0.95, excess = 0.05, normalized = 0.5 -> 0.1 A, opposing.
        let brake = RampBrake::new(params(), None);
        let current = brake.braking_current(4750.0);
        assert!((current + 0.1).abs() < 1e-6, "current = {current}");
    }

    #[test]
    fn monotonic_within_ramp_band() {
        let brake = RampBrake::new(params(), None);
        let mut previous = 0.0;
        let mut erpm = 4500.0;
        while erpm <= 5000.0 {
            let magnitude = brake.magnitude(erpm);
            assert!(magnitude >= previous, "not monotonic at {erpm} eRPM");
            previous = magnitude;
            erpm += 10.0;
        }
    }

    #[test]
    fn sign_opposes_motion() {
        let brake = RampBrake::new(params(), None);
        for erpm in [100.0_f32, 4600.0, 4999.0, 8000.0] {
            assert!(brake.braking_current(erpm) <= 0.0);
            assert!(brake.braking_current(-erpm) >= 0.0);
        }
        assert_eq!(brake.braking_current(0.0), 0.0);
    }

    #[test]
    fn runaway_cap_saturates_ramp() {
        let brake = RampBrake::new(params(), Some(10_000.0));
        assert_eq!(brake.magnitude(20_000.0), 0.2);
        assert_eq!(brake.braking_current(20_000.0), -0.2);
        assert_eq!(brake.braking_current(-20_000.0), 0.2);
    }

    #[test]
    fn uncapped_ramp_extrapolates_past_threshold() {
        // rel = 2.0 -> (2.0 - 0.9) / 0.1 * 0.2 = 2.2 A.
        let brake = RampBrake::new(params(), None);
        let magnitude = brake.magnitude(10_000.0);
        assert!(magnitude > params().current_at_threshold);
        assert!((magnitude - 2.2).abs() < 1e-5, "magnitude = {magnitude}");
    }
}
