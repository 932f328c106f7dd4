//! Stock keeping records

use versioned::record;

#[record]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stock {
    pub quantity: i32,
    pub unit_weight: i32,
}

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

#[record]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

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

pub mod warehouse {
    #[versioned::record]
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Bin {
        pub slot: u16,
        label: char,
    }

    impl Bin {
        pub fn labelled(slot: u16, label: char) -> Bin {
            Bin { slot, label }
        }

        pub fn label(&self) -> char {
            self.label
        }

        pub fn set_label(&mut self, label: char) {
            self.label = label;
        }
    }
}
