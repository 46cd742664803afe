//! The value cell: the uniform typed container every script-visible datum
//! lives in.
//!
//! A `ValueCell` owns its payload. Cloning a string-variant cell deep-copies
//! the bytes; cloning a handle-variant cell copies the integer only — a
//! handle is a non-owning reference into the object manager, never the
//! object itself.

use crate::object::Handle;
use std::cmp::Ordering;
use std::fmt;

/// Tagged variant holding one scalar or an object handle.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueCell {
    Null,
    Number(f64),
    Boolean(bool),
    String(String),
    Handle(Handle),
}

impl Default for ValueCell {
    fn default() -> Self {
        ValueCell::Null
    }
}

impl ValueCell {
    pub fn null() -> Self {
        ValueCell::Null
    }

    pub fn number(n: f64) -> Self {
        ValueCell::Number(n)
    }

    pub fn boolean(b: bool) -> Self {
        ValueCell::Boolean(b)
    }

    pub fn string(s: impl Into<String>) -> Self {
        ValueCell::String(s.into())
    }

    pub fn handle(h: Handle) -> Self {
        ValueCell::Handle(h)
    }

    /// Releases any owned string, then deep-copies `src` into `self`.
    pub fn copy_from(&mut self, src: &ValueCell) {
        *self = src.clone();
    }

    /// In-place exchange without allocation.
    pub fn swap(a: &mut ValueCell, b: &mut ValueCell) {
        std::mem::swap(a, b);
    }

    pub fn set_null(&mut self) {
        *self = ValueCell::Null;
    }

    pub fn set_number(&mut self, n: f64) {
        *self = ValueCell::Number(n);
    }

    pub fn set_boolean(&mut self, b: bool) {
        *self = ValueCell::Boolean(b);
    }

    pub fn set_string(&mut self, s: impl Into<String>) {
        *self = ValueCell::String(s.into());
    }

    pub fn set_objecthandle(&mut self, h: Handle) {
        *self = ValueCell::Handle(h);
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ValueCell::Null)
    }

    /// Cross-variant coercion to a number. A string that does not parse as
    /// a float yields NaN rather than panicking.
    pub fn get_number(&self) -> f64 {
        match self {
            ValueCell::Number(n) => *n,
            ValueCell::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            ValueCell::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            ValueCell::Null => 0.0,
            ValueCell::Handle(h) => h.as_u32() as f64,
        }
    }

    /// Cross-variant coercion to a string. Numbers format with the shortest
    /// decimal representation that parses back to the same `f64`; Rust's
    /// `f64` `Display` already produces that representation, so no
    /// formatting crate is needed here.
    pub fn get_string(&self) -> String {
        match self {
            ValueCell::String(s) => s.clone(),
            ValueCell::Number(n) => format!("{n}"),
            ValueCell::Boolean(b) => b.to_string(),
            ValueCell::Null => "null".to_string(),
            ValueCell::Handle(h) => format!("object#{}", h.as_u32()),
        }
    }

    pub fn get_boolean(&self) -> bool {
        match self {
            ValueCell::Boolean(b) => *b,
            ValueCell::Number(n) => *n != 0.0,
            ValueCell::String(s) => !s.is_empty(),
            ValueCell::Null => false,
            ValueCell::Handle(h) => !h.is_null(),
        }
    }

    pub fn get_objecthandle(&self) -> Handle {
        match self {
            ValueCell::Handle(h) => *h,
            _ => Handle::NULL,
        }
    }

    /// Same-variant comparisons use natural ordering; cross-variant
    /// comparisons coerce toward number, then string.
    pub fn compare(&self, other: &ValueCell) -> Ordering {
        use ValueCell::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Number(a), Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Handle(a), Handle(b)) => a.as_u32().cmp(&b.as_u32()),
            _ => {
                let (a_num, b_num) = (self.get_number(), other.get_number());
                if !a_num.is_nan() && !b_num.is_nan() {
                    a_num.partial_cmp(&b_num).unwrap_or(Ordering::Equal)
                } else {
                    self.get_string().cmp(&other.get_string())
                }
            }
        }
    }
}

impl fmt::Display for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_deep_copies_strings() {
        let a = ValueCell::string("hello");
        let mut b = a.clone();
        b.set_string("world");
        assert_eq!(a.get_string(), "hello");
        assert_eq!(b.get_string(), "world");
    }

    #[test]
    fn clone_of_handle_is_shallow_copy_of_the_integer() {
        let a = ValueCell::handle(Handle::from_u32(7));
        let b = a.clone();
        assert_eq!(a.get_objecthandle(), b.get_objecthandle());
    }

    #[test]
    fn get_number_on_unparseable_string_is_nan() {
        let v = ValueCell::string("not a number");
        assert!(v.get_number().is_nan());
    }

    #[test]
    fn get_string_formats_integral_floats_without_trailing_zero() {
        assert_eq!(ValueCell::number(3.0).get_string(), "3");
        assert_eq!(ValueCell::number(3.5).get_string(), "3.5");
    }

    #[test]
    fn compare_same_variant_uses_natural_order() {
        assert_eq!(
            ValueCell::number(1.0).compare(&ValueCell::number(2.0)),
            Ordering::Less
        );
        assert_eq!(
            ValueCell::boolean(false).compare(&ValueCell::boolean(true)),
            Ordering::Less
        );
    }

    #[test]
    fn compare_cross_variant_coerces_through_number() {
        assert_eq!(
            ValueCell::string("10").compare(&ValueCell::number(10.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn swap_exchanges_in_place() {
        let mut a = ValueCell::number(1.0);
        let mut b = ValueCell::string("x");
        ValueCell::swap(&mut a, &mut b);
        assert_eq!(a.get_string(), "x");
        assert_eq!(b.get_number(), 1.0);
    }
}
