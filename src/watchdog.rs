//! Liveness watchdog consumed by the braking task.

/// Reset handle for an external safety watchdog.
///
/// The braking task resets it once per completed cycle. If the reset window
/// elapses without a reset, the surrounding safety system cuts motor power,
/// so the control period must stay well under that window.
pub trait Watchdog {
    fn reset(&self);
}
