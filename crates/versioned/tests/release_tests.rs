//! Owned storage is allocated once and released once
//!
//! A `Copy` record has no drop glue to count, so this binary installs an
//! allocator that tracks live heap blocks per thread instead.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use pretty_assertions::assert_eq;
use versioned::{versioned, Versioned};

struct Counting;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = LIVE.try_with(|live| live.set(live.get() + 1));
        // SAFETY: forwarded unchanged from the caller
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let _ = LIVE.try_with(|live| live.set(live.get() - 1));
        // SAFETY: `ptr` came from `alloc` above, which is `System`
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static ALLOCATOR: Counting = Counting;

fn live() -> isize {
    LIVE.with(Cell::get)
}

#[versioned]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub celsius: i64,
    pub sensor: u32,
}

fn reading() -> Reading {
    Reading {
        celsius: 21,
        sensor: 7,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Wrapper
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_owned_storage_is_released_on_drop() {
    let before = live();

    let mut tracked = Versioned::owned(reading());
    assert_eq!(live(), before + 1);

    tracked.update(|r| r.celsius += 1);
    tracked.then(|r| r.sensor = 8).then(|r| r.celsius -= 4);
    assert_eq!(live(), before + 1);

    drop(tracked);
    assert_eq!(live(), before);
}

#[test]
fn test_into_value_releases_storage() {
    let before = live();

    let mut tracked = Versioned::owned(reading());
    tracked.update(|r| r.celsius = 30);
    let value = tracked.into_value();

    assert_eq!(live(), before);
    assert_eq!(value.celsius, 30);
}

#[test]
fn test_bound_storage_is_never_allocated_or_freed() {
    let mut raw = reading();
    let before = live();
    {
        let mut tracked = Versioned::bind(&mut raw);
        tracked.update(|r| r.sensor = 9);
        assert_eq!(live(), before);
    }
    assert_eq!(live(), before);
    assert_eq!(raw.sensor, 9);
}

// ═══════════════════════════════════════════════════════════════════════
// Companion
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_companion_releases_its_storage_once() {
    let before = live();
    {
        let mut owned = V_Reading::from_value(reading());
        owned.set_celsius(19);
        assert_eq!(live(), before + 1);
    }
    assert_eq!(live(), before);

    let mut raw = reading();
    {
        let mut adopted = V_Reading::adopt(&mut raw);
        adopted.set_sensor(3);
        assert_eq!(live(), before);
    }
    assert_eq!(live(), before);
    assert_eq!(raw.sensor, 3);
}
