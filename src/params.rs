//! Ramp parameter set, validation and per-cycle parameter sources.

use crate::config::{
    DEFAULT_CURRENT_AT_THRESHOLD, DEFAULT_ERPM_THRESHOLD, DEFAULT_START_RATIO, MAX_START_RATIO,
};

/// Parameters of the piecewise-linear braking ramp.
///
/// Braking starts at `start_ratio * erpm_threshold` and increases linearly
/// so that `current_at_threshold` is reached at `erpm_threshold`.
/// (Downstream motor/battery current limits are still respected by the
/// current sink, not by this controller.)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampParameters {
    /// Speed at which the full braking current is commanded [eRPM], > 0.
    pub erpm_threshold: f32,
    /// Braking current commanded at `erpm_threshold` [A], > 0.
    pub current_at_threshold: f32,
    /// Ratio of `erpm_threshold` at which braking starts, in (0, 1).
    pub start_ratio: f32,
}

/// Configuration misuse detected at `configure`/`start` time.
///
/// The ramp math itself cannot fail; everything here is rejected at the
/// control-surface boundary so it can never surface mid-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// `erpm_threshold` must be positive.
    ThresholdNotPositive,
    /// `current_at_threshold` must be positive.
    CurrentNotPositive,
    /// `start_ratio` must lie in (0, 1); 1.0 would divide by zero in the
    /// ramp normalization.
    StartRatioOutOfRange,
}

impl RampParameters {
    /// Check the parameter domain.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.erpm_threshold > 0.0) {
            return Err(ParamError::ThresholdNotPositive);
        }
        if !(self.current_at_threshold > 0.0) {
            return Err(ParamError::CurrentNotPositive);
        }
        if !(self.start_ratio > 0.0 && self.start_ratio < 1.0) {
            return Err(ParamError::StartRatioOutOfRange);
        }
        Ok(())
    }
}

impl Default for RampParameters {
    fn default() -> Self {
        Self {
            erpm_threshold: DEFAULT_ERPM_THRESHOLD,
            current_at_threshold: DEFAULT_CURRENT_AT_THRESHOLD,
            start_ratio: DEFAULT_START_RATIO,
        }
    }
}

/// Where the control loop gets its ramp parameters each cycle.
///
/// One implementation wraps a fixed, validated set; another recomputes the
/// set from live analog inputs. The ramp algorithm is shared by both.
pub trait ParameterSource {
    /// Sample the current parameter set. Called once per control cycle.
    fn sample(&self) -> RampParameters;
}

/// A constant parameter set, captured at start time.
#[derive(Debug, Clone, Copy)]
pub struct FixedParameters(RampParameters);

impl FixedParameters {
    pub const fn new(params: RampParameters) -> Self {
        Self(params)
    }
}

impl ParameterSource for FixedParameters {
    fn sample(&self) -> RampParameters {
        self.0
    }
}

/// Parameters recomputed each cycle from two analog readers:
/// the first yields the braking current [A], the second the start ratio.
///
/// A live source has no configuration-time rejection point, so samples are
/// clamped into the valid domain instead: the current is clamped below at
/// zero (braking disabled) and the start ratio to `[0, MAX_START_RATIO]`.
pub struct AnalogParameters<F> {
    erpm_threshold: f32,
    read: F,
}

impl<F> AnalogParameters<F>
where
    F: Fn() -> (f32, f32),
{
    /// `read` returns `(current_at_threshold, start_ratio)` raw samples.
    pub const fn new(erpm_threshold: f32, read: F) -> Self {
        Self {
            erpm_threshold,
            read,
        }
    }
}

impl<F> ParameterSource for AnalogParameters<F>
where
    F: Fn() -> (f32, f32),
{
    fn sample(&self) -> RampParameters {
        let (current, ratio) = (self.read)();
        RampParameters {
            erpm_threshold: self.erpm_threshold,
            current_at_threshold: if current > 0.0 { current } else { 0.0 },
            start_ratio: ratio.clamp(0.0, MAX_START_RATIO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_valid() {
        assert_eq!(RampParameters::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_domain_parameters() {
        let mut p = RampParameters::default();
        p.erpm_threshold = 0.0;
        assert_eq!(p.validate(), Err(ParamError::ThresholdNotPositive));

        let mut p = RampParameters::default();
        p.current_at_threshold = -1.0;
        assert_eq!(p.validate(), Err(ParamError::CurrentNotPositive));

        let mut p = RampParameters::default();
        p.start_ratio = 1.0;
        assert_eq!(p.validate(), Err(ParamError::StartRatioOutOfRange));

        p.start_ratio = 0.0;
        assert_eq!(p.validate(), Err(ParamError::StartRatioOutOfRange));
    }

    #[test]
    fn fixed_source_returns_captured_set() {
        let params = RampParameters::default();
        let source = FixedParameters::new(params);
        assert_eq!(source.sample(), params);
    }

    #[test]
    fn analog_source_maps_readers() {
        let source = AnalogParameters::new(5000.0, || (3.0, 0.85));
        let p = source.sample();
        assert_eq!(p.erpm_threshold, 5000.0);
        assert_eq!(p.current_at_threshold, 3.0);
        assert_eq!(p.start_ratio, 0.85);
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn analog_source_clamps_into_valid_domain() {
        // Pot railed high: start ratio would hit the divide-by-zero point.
        let source = AnalogParameters::new(5000.0, || (0.5, 1.5));
        let p = source.sample();
        assert_eq!(p.start_ratio, MAX_START_RATIO);

        // Disconnected/negative readers: braking disabled, ratio floored.
        let source = AnalogParameters::new(5000.0, || (-1.0, -0.2));
        let p = source.sample();
        assert_eq!(p.current_at_threshold, 0.0);
        assert_eq!(p.start_ratio, 0.0);
    }
}
