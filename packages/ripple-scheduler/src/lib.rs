pub mod cancel;
pub mod immediate;
pub mod time;
pub mod virtual_time;

pub use cancel::Cancellable;
pub use immediate::ImmediateScheduler;
pub use time::{SchedulerStride, SchedulerTime};
pub use virtual_time::VirtualScheduler;

/// A unit of work handed to a scheduler.
pub type Task = Box<dyn FnOnce()>;

/// A unit of work a repeating schedule keeps invoking until cancelled.
pub type RepeatingTask = Box<dyn FnMut()>;

/// The stride type belonging to a scheduler's time type.
pub type StrideOf<S> = <<S as Scheduler>::Time as SchedulerTime>::Stride;

/// Options for backends that accept no configuration. The type has no
/// inhabitants, so the only value a caller can pass is `None`.
pub enum NoOptions {}

/// The core scheduler contract every execution backend implements.
/// Backends decide when and on what context work runs; callers only decide
/// what runs.
pub trait Scheduler {
    /// The backend's virtual-time instant type.
    type Time: SchedulerTime;

    /// Backend-defined configuration accepted by the schedule operations.
    type Options;

    /// The current virtual-time instant. Pure observation, callable at any
    /// time.
    fn now(&self) -> Self::Time;

    /// The smallest scheduling slack this backend can guarantee.
    fn minimum_tolerance(&self) -> StrideOf<Self>;

    /// Run `action` as soon as possible under this backend's concurrency
    /// model. Never skipped, and never reordered behind `schedule` calls
    /// issued later on the same instance unless the backend documents
    /// otherwise.
    fn schedule(&self, options: Option<Self::Options>, action: Task);

    /// Run `action` no earlier than `after`, within `tolerance` slack.
    ///
    /// A backend that structurally cannot defer panics rather than run the
    /// action at the wrong time or drop it.
    fn schedule_after(
        &self,
        after: Self::Time,
        tolerance: StrideOf<Self>,
        options: Option<Self::Options>,
        action: Task,
    );

    /// Run `action` repeatedly, starting at or after `after` and spaced by
    /// `interval`, until the returned handle is cancelled or the scheduler
    /// is torn down. The handle is returned synchronously, before the first
    /// invocation.
    ///
    /// A zero or negative `interval` is backend-defined; each backend
    /// documents its behavior. A `tolerance` greater than `interval` is
    /// permitted and simply grants the backend more freedom.
    fn schedule_repeating(
        &self,
        after: Self::Time,
        interval: StrideOf<Self>,
        tolerance: StrideOf<Self>,
        options: Option<Self::Options>,
        action: RepeatingTask,
    ) -> Cancellable;
}
