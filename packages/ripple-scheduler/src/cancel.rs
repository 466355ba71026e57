use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Capability to stop future invocations of a repeating schedule.
///
/// Dropping the handle does not cancel anything; only an explicit [`cancel`]
/// call does. Callers that intend to cancel later must retain it.
///
/// [`cancel`]: Cancellable::cancel
#[derive(Clone)]
pub struct Cancellable {
    flag: Arc<AtomicBool>,
}

/// Backend-side view of the cancellation flag. Backends hold the token and
/// check it before each invocation of the repeating action, so that once
/// [`Cancellable::cancel`] runs, no further invocation begins.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl Cancellable {
    /// Create a handle/token pair sharing one flag. The backend keeps the
    /// token, the caller receives the handle.
    pub fn new() -> (Cancellable, CancelToken) {
        let flag = Arc::new(AtomicBool::new(false));
        (Cancellable { flag: flag.clone() }, CancelToken { flag })
    }

    /// Stop future invocations. An invocation already in progress may still
    /// run to completion.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
