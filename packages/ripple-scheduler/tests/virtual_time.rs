use ripple_scheduler::virtual_time::{VirtualScheduler, VirtualStride, VirtualTime};
use ripple_scheduler::{Cancellable, Scheduler, SchedulerStride, SchedulerTime};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn test_nothing_runs_before_its_due_instant() {
    let scheduler = VirtualScheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    {
        let log = log.clone();
        scheduler.schedule(None, Box::new(move || log.borrow_mut().push("now")));
    }
    {
        let log = log.clone();
        scheduler.schedule_after(
            scheduler.now().advanced_by(VirtualStride::milliseconds(5)),
            VirtualStride::ZERO,
            None,
            Box::new(move || log.borrow_mut().push("later")),
        );
    }

    // The clock has not moved yet.
    assert!(log.borrow().is_empty());

    scheduler.advance_by(VirtualStride::ZERO);
    assert_eq!(*log.borrow(), vec!["now"]);

    scheduler.advance_by(VirtualStride::milliseconds(4));
    assert_eq!(*log.borrow(), vec!["now"]);

    scheduler.advance_by(VirtualStride::milliseconds(1));
    assert_eq!(*log.borrow(), vec!["now", "later"]);
}

#[test]
fn test_same_instant_runs_in_submission_order() {
    let scheduler = VirtualScheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let due = scheduler.now().advanced_by(VirtualStride::milliseconds(2));

    for name in ["first", "second", "third"] {
        let log = log.clone();
        scheduler.schedule_after(
            due,
            VirtualStride::ZERO,
            None,
            Box::new(move || log.borrow_mut().push(name)),
        );
    }

    scheduler.advance_by(VirtualStride::milliseconds(2));
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_clock_observes_each_due_instant() {
    let scheduler = Rc::new(VirtualScheduler::new());
    let observed = Rc::new(RefCell::new(Vec::new()));

    for ms in [10, 20] {
        let observed = observed.clone();
        let sch = scheduler.clone();
        scheduler.schedule_after(
            scheduler.now().advanced_by(VirtualStride::milliseconds(ms)),
            VirtualStride::ZERO,
            None,
            Box::new(move || observed.borrow_mut().push(sch.now())),
        );
    }

    scheduler.advance_by(VirtualStride::milliseconds(50));

    let epoch = VirtualTime::EPOCH;
    assert_eq!(
        *observed.borrow(),
        vec![
            epoch.advanced_by(VirtualStride::milliseconds(10)),
            epoch.advanced_by(VirtualStride::milliseconds(20)),
        ]
    );
    // The clock lands on the target, not on the last firing.
    assert_eq!(
        scheduler.now(),
        epoch.advanced_by(VirtualStride::milliseconds(50))
    );
}

#[test]
fn test_work_scheduled_during_a_firing_runs_in_the_same_advance() {
    let scheduler = Rc::new(VirtualScheduler::new());
    let log = Rc::new(RefCell::new(Vec::new()));

    {
        let log = log.clone();
        let sch = scheduler.clone();
        scheduler.schedule(
            None,
            Box::new(move || {
                log.borrow_mut().push("outer");
                let log = log.clone();
                sch.schedule(None, Box::new(move || log.borrow_mut().push("inner")));
            }),
        );
    }

    scheduler.advance_by(VirtualStride::ZERO);
    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
}

#[test]
fn test_repeating_fires_at_interval_multiples_until_cancelled() {
    let scheduler = VirtualScheduler::new();
    let count = Rc::new(Cell::new(0));

    let handle = {
        let count = count.clone();
        scheduler.schedule_repeating(
            scheduler.now().advanced_by(VirtualStride::seconds(1)),
            VirtualStride::seconds(1),
            VirtualStride::ZERO,
            None,
            Box::new(move || count.set(count.get() + 1)),
        )
    };

    scheduler.advance_by(VirtualStride::seconds(3));
    assert_eq!(count.get(), 3);

    handle.cancel();
    scheduler.advance_by(VirtualStride::seconds(5));
    assert_eq!(count.get(), 3);
}

#[test]
fn test_cancel_from_inside_the_action() {
    let scheduler = VirtualScheduler::new();
    let count = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<Cancellable>>> = Rc::new(RefCell::new(None));

    let handle = {
        let count = count.clone();
        let slot = slot.clone();
        scheduler.schedule_repeating(
            scheduler.now().advanced_by(VirtualStride::milliseconds(1)),
            VirtualStride::milliseconds(1),
            VirtualStride::ZERO,
            None,
            Box::new(move || {
                count.set(count.get() + 1);
                if count.get() == 2 {
                    if let Some(handle) = slot.borrow().as_ref() {
                        handle.cancel();
                    }
                }
            }),
        )
    };
    *slot.borrow_mut() = Some(handle);

    scheduler.advance_by(VirtualStride::milliseconds(10));
    assert_eq!(count.get(), 2);
}

#[test]
fn test_dropping_the_handle_does_not_cancel() {
    let scheduler = VirtualScheduler::new();
    let count = Rc::new(Cell::new(0));

    {
        let count = count.clone();
        let handle = scheduler.schedule_repeating(
            scheduler.now().advanced_by(VirtualStride::seconds(1)),
            VirtualStride::seconds(1),
            VirtualStride::ZERO,
            None,
            Box::new(move || count.set(count.get() + 1)),
        );
        drop(handle);
    }

    scheduler.advance_by(VirtualStride::seconds(2));
    assert_eq!(count.get(), 2);
}

#[test]
fn test_tolerance_larger_than_interval_is_permitted() {
    let scheduler = VirtualScheduler::new();
    let count = Rc::new(Cell::new(0));

    let _handle = {
        let count = count.clone();
        scheduler.schedule_repeating(
            scheduler.now().advanced_by(VirtualStride::milliseconds(1)),
            VirtualStride::milliseconds(1),
            VirtualStride::seconds(1),
            None,
            Box::new(move || count.set(count.get() + 1)),
        )
    };

    scheduler.advance_by(VirtualStride::milliseconds(3));
    assert_eq!(count.get(), 3);
}

#[test]
fn test_past_due_entries_fire_without_rewinding_the_clock() {
    let scheduler = Rc::new(VirtualScheduler::new());
    let early = scheduler.now().advanced_by(VirtualStride::milliseconds(3));

    scheduler.advance_by(VirtualStride::milliseconds(10));

    let observed = Rc::new(RefCell::new(None));
    {
        let observed = observed.clone();
        let sch = scheduler.clone();
        scheduler.schedule_after(
            early,
            VirtualStride::ZERO,
            None,
            Box::new(move || *observed.borrow_mut() = Some(sch.now())),
        );
    }

    scheduler.advance_by(VirtualStride::ZERO);
    assert_eq!(
        *observed.borrow(),
        Some(VirtualTime::EPOCH.advanced_by(VirtualStride::milliseconds(10)))
    );
}

#[test]
fn test_minimum_tolerance_is_zero() {
    let scheduler = VirtualScheduler::new();
    assert_eq!(scheduler.minimum_tolerance(), VirtualStride::ZERO);
}

#[test]
fn test_stride_units_convert_faithfully() {
    assert_eq!(VirtualStride::seconds(1), VirtualStride::milliseconds(1_000));
    assert_eq!(
        VirtualStride::milliseconds(1),
        VirtualStride::microseconds(1_000)
    );
    assert_eq!(
        VirtualStride::microseconds(1),
        VirtualStride::nanoseconds(1_000)
    );
    assert_eq!(
        VirtualStride::seconds(-2),
        VirtualStride::nanoseconds(-2_000_000_000)
    );
    assert_eq!(VirtualStride::from(25), VirtualStride::nanoseconds(25));
}

#[test]
fn test_time_distance_and_advance_agree() {
    let a = VirtualTime::EPOCH.advanced_by(VirtualStride::seconds(2));
    let b = a.advanced_by(VirtualStride::milliseconds(250));

    assert!(a < b);
    assert_eq!(a.distance_to(b), VirtualStride::milliseconds(250));
    assert_eq!(b.distance_to(a), VirtualStride::milliseconds(-250));
}

#[test]
#[should_panic(expected = "cannot advance a virtual clock backwards")]
fn test_advancing_backwards_panics() {
    let scheduler = VirtualScheduler::new();
    scheduler.advance_by(VirtualStride::milliseconds(-1));
}

#[test]
#[should_panic(expected = "positive interval")]
fn test_non_positive_repeat_interval_panics() {
    let scheduler = VirtualScheduler::new();
    let _handle = scheduler.schedule_repeating(
        scheduler.now(),
        VirtualStride::ZERO,
        VirtualStride::ZERO,
        None,
        Box::new(|| {}),
    );
}
