use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use crate::cancel::Cancellable;
use crate::time::{InexactStride, SchedulerStride, SchedulerTime};
use crate::{NoOptions, RepeatingTask, Scheduler, Task};

/// An instant of the immediate scheduler. The backend has no notion of
/// "later", so all instants are equivalent and every distance is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImmediateTime;

/// Stride of [`ImmediateTime`]: a signed magnitude with ordinary integer
/// arithmetic. The named unit constructors all collapse to the zero stride;
/// time units carry no meaning on this backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImmediateStride(i64);

impl Add for ImmediateStride {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for ImmediateStride {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for ImmediateStride {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl AddAssign for ImmediateStride {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for ImmediateStride {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl MulAssign for ImmediateStride {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 *= rhs.0;
    }
}

impl From<i64> for ImmediateStride {
    fn from(magnitude: i64) -> Self {
        Self(magnitude)
    }
}

impl TryFrom<i128> for ImmediateStride {
    type Error = InexactStride;

    fn try_from(magnitude: i128) -> Result<Self, Self::Error> {
        i64::try_from(magnitude).map(Self).map_err(|_| InexactStride(magnitude))
    }
}

impl SchedulerStride for ImmediateStride {
    const ZERO: Self = Self(0);

    fn seconds(_value: i64) -> Self {
        Self::ZERO
    }

    fn milliseconds(_value: i64) -> Self {
        Self::ZERO
    }

    fn microseconds(_value: i64) -> Self {
        Self::ZERO
    }

    fn nanoseconds(_value: i64) -> Self {
        Self::ZERO
    }
}

impl SchedulerTime for ImmediateTime {
    type Stride = ImmediateStride;

    fn distance_to(self, _other: Self) -> ImmediateStride {
        ImmediateStride::ZERO
    }

    fn advanced_by(self, _stride: ImmediateStride) -> Self {
        ImmediateTime
    }
}

const DEFER_UNSUPPORTED: &str = "attempted to schedule something in the future \
    on a scheduler that only supports immediate execution";

/// The degenerate backend: every task runs synchronously on the calling
/// context, before `schedule` returns. Requests to defer are a programming
/// error and abort the calling path.
pub struct ImmediateScheduler {
    _private: (),
}

static SHARED: ImmediateScheduler = ImmediateScheduler { _private: () };

impl ImmediateScheduler {
    /// The one process-wide instance. The backend is stateless, so sharing
    /// it carries no synchronization concerns.
    pub fn shared() -> &'static ImmediateScheduler {
        &SHARED
    }
}

impl Scheduler for ImmediateScheduler {
    type Time = ImmediateTime;
    type Options = NoOptions;

    fn now(&self) -> ImmediateTime {
        ImmediateTime
    }

    fn minimum_tolerance(&self) -> ImmediateStride {
        ImmediateStride::ZERO
    }

    /// Invokes `action` in the calling context. No queuing, no thread
    /// hand-off: actions run in the exact order `schedule` is called.
    fn schedule(&self, _options: Option<NoOptions>, action: Task) {
        tracing::trace!("running scheduled action inline");
        action();
    }

    /// Always panics: this backend cannot represent "later". Running the
    /// action now, or dropping it, would be a wrong-but-quiet result.
    fn schedule_after(
        &self,
        _after: ImmediateTime,
        _tolerance: ImmediateStride,
        _options: Option<NoOptions>,
        _action: Task,
    ) {
        panic!("{}", DEFER_UNSUPPORTED);
    }

    /// Always panics, for the same reason as `schedule_after`: a backend
    /// that cannot represent "later" cannot represent "repeatedly, later"
    /// either.
    fn schedule_repeating(
        &self,
        _after: ImmediateTime,
        _interval: ImmediateStride,
        _tolerance: ImmediateStride,
        _options: Option<NoOptions>,
        _action: RepeatingTask,
    ) -> Cancellable {
        panic!("{}", DEFER_UNSUPPORTED);
    }
}
