//! Companions generated in place by `#[versioned]`

use std::cell::Cell;

use pretty_assertions::assert_eq;
use versioned::{versioned, Versioned};

#[versioned]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stock {
    pub quantity: i32,
    pub unit_weight: i32,
}

#[versioned]
impl Stock {
    pub fn new(quantity: i32, unit_weight: i32) -> Self {
        Self {
            quantity,
            unit_weight,
        }
    }

    pub fn total_weight(&self) -> i32 {
        self.quantity * self.unit_weight
    }
}

#[versioned]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub a: u32,
    b: u32,
    c: u32,
}

#[versioned]
impl Surface {
    pub fn empty() -> Surface {
        Surface { a: 0, b: 7, c: 0 }
    }

    pub fn b(&self) -> u32 {
        self.b
    }

    pub fn set_c(&mut self, c: u32) {
        self.c = c;
    }
}

#[versioned]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[versioned]
impl Point {
    pub fn mirrored(other: Self) -> Self {
        Self {
            x: -other.x,
            y: -other.y,
        }
    }

    pub fn doubled(&self) -> Self {
        Self {
            x: self.x * 2,
            y: self.y * 2,
        }
    }

    pub fn set_anchor(&mut self, anchor: Self) {
        *self = anchor;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// End-to-end
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_stock_end_to_end() {
    let mut stock = V_Stock::new(0, 4);

    stock.set_quantity(10);
    stock.set_quantity(stock.quantity() - 2);
    stock.set_quantity(stock.quantity() - 3);

    assert_eq!(stock.quantity(), 5);
    assert_eq!(stock.version(), 3);
    assert_eq!(stock.total_weight(), 20);
    assert_eq!(stock.versioned().peek().total_weight(), 5 * stock.unit_weight());
}

#[test]
fn test_getters_do_not_count() {
    let stock = V_Stock::new(1, 1);
    let _ = stock.quantity();
    let _ = stock.total_weight();
    assert_eq!(stock.version(), 0);
}

// ═══════════════════════════════════════════════════════════════════════
// Public Surface
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_surface_accessors() {
    let mut surface = V_Surface::empty();

    surface.set_a(1);
    assert_eq!(surface.a(), 1);

    assert_eq!(surface.b(), 7);

    surface.set_c(9);
    assert_eq!(surface.versioned().peek().c, 9);
    assert_eq!(surface.version(), 2);
}

#[test]
fn test_self_typed_accessors_use_the_record() {
    let mut point = V_Point::mirrored(Point { x: 1, y: -2 });
    assert_eq!(point.doubled(), Point { x: -2, y: 4 });

    point.set_anchor(Point { x: 5, y: 5 });
    assert_eq!(point.doubled(), Point { x: 10, y: 10 });
    assert_eq!(point.version(), 1);
}

// ═══════════════════════════════════════════════════════════════════════
// Storage Ownership
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_adopted_storage_is_never_owned() {
    let mut raw = Stock::new(2, 3);
    {
        let mut stock = V_Stock::adopt(&mut raw);
        assert!(!stock.owns_storage());
        stock.set_unit_weight(6);
    }
    assert_eq!(raw, Stock::new(2, 6));
}

#[test]
fn test_constructed_storage_is_owned() {
    assert!(V_Stock::new(1, 1).owns_storage());
    assert!(V_Stock::from_value(Stock::new(1, 1)).owns_storage());
}

#[test]
fn test_from_versioned_keeps_counter() {
    let mut inner = Versioned::owned(Stock::new(1, 1));
    inner.update(|s| s.quantity = 2);

    let mut stock = V_Stock::from_versioned(inner);
    stock.set_quantity(3);
    assert_eq!(stock.version(), 2);
}

#[test]
fn test_companions_alias_shared_cell() {
    let shelf = Cell::new(Stock::new(0, 1));
    let mut left = V_Stock::from_versioned(Versioned::bind_cell(&shelf));
    let mut right = V_Stock::from_versioned(Versioned::bind_cell(&shelf));

    left.set_quantity(4);
    right.set_unit_weight(2);

    assert_eq!(left.total_weight(), 8);
    assert_eq!(right.total_weight(), 8);
    assert_eq!((left.version(), right.version()), (1, 1));
}
