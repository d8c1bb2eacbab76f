use std::time::Duration;

/// Cooperative clock driving the frame pump.
///
/// Every suspension point of a compression run goes through this trait:
/// waiting for metadata, animation-frame ticks, the grace delay, and the
/// encoder finalize wait.
pub trait FrameScheduler: Send {
    /// Yield until the next animation frame. Returns the time since the scheduler's origin.
    fn next_frame(&mut self) -> Duration;

    /// Yield for a fixed delay.
    fn sleep(&mut self, duration: Duration);

    /// Time since the scheduler's origin.
    fn now(&self) -> Duration;
}
