//! Measurement value specializations.
//!
//! Instruments declare their numeric representation once, at registration
//! ([`ValueType`]), and the core resolves it into one of the two
//! [`MeasurementValue`] implementations. Everything downstream — aggregators,
//! points, exemplars — carries the tagged [`NumberValue`] payload, so no
//! per-value type inspection happens on the export path.

use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::descriptor::ValueType;

/// Tagged numeric payload carried by points and exemplars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    /// 64-bit signed integer payload
    Long(i64),
    /// 64-bit floating point payload
    Double(f64),
}

impl NumberValue {
    /// The payload widened to `f64` (lossy for very large integers).
    pub fn as_f64(self) -> f64 {
        match self {
            NumberValue::Long(v) => v as f64,
            NumberValue::Double(v) => v,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

/// A numeric type measurements can be recorded with.
///
/// Sealed: implemented exactly for `i64` (long instruments) and `f64` (double
/// instruments). Each implementation names the lock-free cell sum aggregation
/// accumulates into — `i64` uses [`AtomicI64`] directly, `f64` packs its bit
/// pattern into an [`AtomicU64`] and adds through a compare-exchange loop.
pub trait MeasurementValue:
    sealed::Sealed
    + Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// The [`ValueType`] this implementation corresponds to.
    const VALUE_TYPE: ValueType;

    /// Lock-free accumulation cell for this value type, zero-initialized by
    /// `Default`.
    type Atomic: Send + Sync + Default;

    /// Atomically add `value` to the cell.
    fn atomic_add(cell: &Self::Atomic, value: Self);

    /// Read the cell.
    fn atomic_load(cell: &Self::Atomic) -> Self;

    /// Replace the cell's value, returning the previous one.
    fn atomic_swap(cell: &Self::Atomic, value: Self) -> Self;

    /// The additive identity.
    fn zero() -> Self;

    /// Whether the value is a finite number (`true` for every `i64`).
    fn is_finite(self) -> bool;

    /// Whether the value is strictly negative.
    fn is_negative(self) -> bool;

    /// The value as a tagged [`NumberValue`].
    fn to_number(self) -> NumberValue;

    /// The value widened to `f64` for bucket-boundary comparison.
    fn as_f64(self) -> f64;
}

impl MeasurementValue for i64 {
    const VALUE_TYPE: ValueType = ValueType::Long;

    type Atomic = AtomicI64;

    fn atomic_add(cell: &AtomicI64, value: i64) {
        cell.fetch_add(value, Ordering::Relaxed);
    }

    fn atomic_load(cell: &AtomicI64) -> i64 {
        cell.load(Ordering::Relaxed)
    }

    fn atomic_swap(cell: &AtomicI64, value: i64) -> i64 {
        cell.swap(value, Ordering::Relaxed)
    }

    fn zero() -> i64 {
        0
    }

    fn is_finite(self) -> bool {
        true
    }

    fn is_negative(self) -> bool {
        self < 0
    }

    fn to_number(self) -> NumberValue {
        NumberValue::Long(self)
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl MeasurementValue for f64 {
    const VALUE_TYPE: ValueType = ValueType::Double;

    type Atomic = AtomicU64;

    fn atomic_add(cell: &AtomicU64, value: f64) {
        let mut current = cell.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match cell.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    fn atomic_load(cell: &AtomicU64) -> f64 {
        f64::from_bits(cell.load(Ordering::Relaxed))
    }

    fn atomic_swap(cell: &AtomicU64, value: f64) -> f64 {
        f64::from_bits(cell.swap(value.to_bits(), Ordering::Relaxed))
    }

    fn zero() -> f64 {
        0.0
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    fn is_negative(self) -> bool {
        self < 0.0
    }

    fn to_number(self) -> NumberValue {
        NumberValue::Double(self)
    }

    fn as_f64(self) -> f64 {
        self
    }
}
