use std::cell::{Cell, RefCell};
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::cancel::{CancelToken, Cancellable};
use crate::time::{InexactStride, SchedulerStride, SchedulerTime};
use crate::{NoOptions, RepeatingTask, Scheduler, Task};

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// An instant on a [`VirtualScheduler`]'s clock: nanoseconds since the
/// owning scheduler's epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtualTime(i64);

impl VirtualTime {
    /// The instant a fresh scheduler's clock starts at.
    pub const EPOCH: Self = Self(0);
}

/// Stride of [`VirtualTime`]: a signed nanosecond count. Unlike the
/// immediate backend's stride, the unit constructors convert faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtualStride(i64);

impl Add for VirtualStride {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for VirtualStride {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for VirtualStride {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl AddAssign for VirtualStride {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for VirtualStride {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl MulAssign for VirtualStride {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 *= rhs.0;
    }
}

/// Integer-literal construction, in the backend's own unit (nanoseconds).
impl From<i64> for VirtualStride {
    fn from(magnitude: i64) -> Self {
        Self(magnitude)
    }
}

impl TryFrom<i128> for VirtualStride {
    type Error = InexactStride;

    fn try_from(magnitude: i128) -> Result<Self, Self::Error> {
        i64::try_from(magnitude).map(Self).map_err(|_| InexactStride(magnitude))
    }
}

impl SchedulerStride for VirtualStride {
    const ZERO: Self = Self(0);

    fn seconds(value: i64) -> Self {
        Self(value * NANOS_PER_SEC)
    }

    fn milliseconds(value: i64) -> Self {
        Self(value * NANOS_PER_MILLI)
    }

    fn microseconds(value: i64) -> Self {
        Self(value * NANOS_PER_MICRO)
    }

    fn nanoseconds(value: i64) -> Self {
        Self(value)
    }
}

impl SchedulerTime for VirtualTime {
    type Stride = VirtualStride;

    fn distance_to(self, other: Self) -> VirtualStride {
        VirtualStride(other.0 - self.0)
    }

    fn advanced_by(self, stride: VirtualStride) -> Self {
        Self(self.0 + stride.0)
    }
}

new_key_type! {
    struct TimerKey;
}

enum Work {
    Once(Task),
    Repeating {
        action: RepeatingTask,
        interval: VirtualStride,
        token: CancelToken,
    },
}

struct TimerEntry {
    due: VirtualTime,
    seq: u64,
    work: Work,
}

/// A deterministic backend with a caller-driven logical clock.
///
/// Nothing runs until the clock is advanced; advancing runs every due entry
/// in (due instant, submission order) order. Single-threaded, like the
/// runtime's local scheduler.
pub struct VirtualScheduler {
    now: Cell<VirtualTime>,
    next_seq: Cell<u64>,
    timers: RefCell<SlotMap<TimerKey, TimerEntry>>,
}

impl VirtualScheduler {
    /// A fresh scheduler with its clock at [`VirtualTime::EPOCH`] and an
    /// empty queue. Instances are independent.
    pub fn new() -> Self {
        Self {
            now: Cell::new(VirtualTime::EPOCH),
            next_seq: Cell::new(0),
            timers: RefCell::new(SlotMap::with_key()),
        }
    }

    /// Advance the clock by `stride`, running everything that comes due.
    ///
    /// Panics if `stride` is negative; the clock only moves forward.
    pub fn advance_by(&self, stride: VirtualStride) {
        self.advance_to(self.now.get().advanced_by(stride));
    }

    /// Advance the clock to `target`, running everything that comes due.
    ///
    /// The clock observes each entry's due instant on the way, so actions
    /// see `now()` equal to their requested time. Work scheduled during a
    /// firing at an already-reached instant runs within the same call.
    ///
    /// Panics if `target` is before `now`.
    pub fn advance_to(&self, target: VirtualTime) {
        assert!(
            self.now.get() <= target,
            "cannot advance a virtual clock backwards (now {:?}, target {:?})",
            self.now.get(),
            target,
        );
        tracing::trace!("advancing virtual clock to {:?}", target);

        while let Some(due) = self.next_due(target) {
            // Entries scheduled in the past fire immediately, without
            // rewinding the clock.
            if due > self.now.get() {
                self.now.set(due);
            }
            for key in self.batch_at(due) {
                self.fire(key);
            }
        }

        self.now.set(target);
    }

    fn insert(&self, due: VirtualTime, work: Work) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().insert(TimerEntry { due, seq, work });
    }

    fn next_due(&self, target: VirtualTime) -> Option<VirtualTime> {
        self.timers
            .borrow()
            .values()
            .map(|entry| entry.due)
            .min()
            .filter(|due| *due <= target)
    }

    /// Keys due exactly at `due`, in submission order.
    fn batch_at(&self, due: VirtualTime) -> SmallVec<[TimerKey; 4]> {
        let timers = self.timers.borrow();
        let mut batch: SmallVec<[TimerKey; 4]> = timers
            .iter()
            .filter(|(_, entry)| entry.due == due)
            .map(|(key, _)| key)
            .collect();
        batch.sort_by_key(|key| timers[*key].seq);
        batch
    }

    fn fire(&self, key: TimerKey) {
        // Take the entry out before running it, so the action can schedule
        // more work on this scheduler.
        let Some(entry) = self.timers.borrow_mut().remove(key) else {
            return;
        };
        match entry.work {
            Work::Once(action) => action(),
            Work::Repeating { mut action, interval, token } => {
                if token.is_cancelled() {
                    return;
                }
                action();
                // Re-arm unless the action cancelled itself.
                if !token.is_cancelled() {
                    self.insert(
                        entry.due.advanced_by(interval),
                        Work::Repeating { action, interval, token },
                    );
                }
            }
        }
    }
}

impl Scheduler for VirtualScheduler {
    type Time = VirtualTime;
    type Options = NoOptions;

    fn now(&self) -> VirtualTime {
        self.now.get()
    }

    fn minimum_tolerance(&self) -> VirtualStride {
        VirtualStride::ZERO
    }

    /// Enqueue `action` at the current instant. It runs on the next advance,
    /// even one of zero length.
    fn schedule(&self, _options: Option<NoOptions>, action: Task) {
        self.insert(self.now.get(), Work::Once(action));
    }

    /// Tolerance is accepted for contract compatibility and unused: logical
    /// time is exact.
    fn schedule_after(
        &self,
        after: VirtualTime,
        _tolerance: VirtualStride,
        _options: Option<NoOptions>,
        action: Task,
    ) {
        self.insert(after, Work::Once(action));
    }

    /// Panics if `interval` is not positive: a non-positive interval would
    /// re-arm at the same instant forever.
    fn schedule_repeating(
        &self,
        after: VirtualTime,
        interval: VirtualStride,
        _tolerance: VirtualStride,
        _options: Option<NoOptions>,
        action: RepeatingTask,
    ) -> Cancellable {
        assert!(
            interval > VirtualStride::ZERO,
            "repeating schedule requires a positive interval"
        );
        tracing::trace!("arming repeating schedule at {:?} every {:?}", after, interval);
        let (handle, token) = Cancellable::new();
        self.insert(after, Work::Repeating { action, interval, token });
        handle
    }
}
