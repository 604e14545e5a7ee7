//! Motor-control interface consumed by the braking task.

/// The slice of the motor-control layer this controller drives.
///
/// Both calls happen once per control cycle. Implementations are expected to
/// be cheap and non-blocking; hardware safety clamping (max motor current,
/// max battery current) and fault handling belong to the implementation, not
/// to the braking controller.
pub trait MotorInterface {
    /// Signed electrical speed of the motor [eRPM].
    fn rpm(&self) -> f32;

    /// Command a signed motor current [A]. Fire-and-forget.
    fn set_current(&self, amps: f32);
}
