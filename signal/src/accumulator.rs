//! Accumulator policies for signal emission
//!
//! An accumulator receives the return value of every invoked callback, in
//! order, and decides whether delivery continues. When delivery ends (all
//! callbacks ran, or the accumulator asked to stop) `finalize` produces the
//! result of the emission.

/// Strategy that folds callback return values into an emission result
///
/// # Example
///
/// ```rust
/// use signal::{Accumulator, Signal};
///
/// /// Sums values until the running total reaches a limit
/// struct SumUntil { limit: u32, total: u32 }
///
/// impl Accumulator<u32> for SumUntil {
///     type Output = u32;
///
///     fn accumulate(&mut self, value: u32) -> bool {
///         self.total += value;
///         self.total < self.limit
///     }
///
///     fn finalize(self) -> u32 {
///         self.total
///     }
/// }
///
/// let signal = Signal::<(), u32>::new();
/// signal.connect(|_: &()| 3);
/// signal.connect(|_: &()| 4);
/// signal.connect(|_: &()| 5);
///
/// assert_eq!(signal.emit_with(&(), SumUntil { limit: 7, total: 0 }), 7);
/// ```
pub trait Accumulator<R> {
    /// Result returned from the emission
    type Output;

    /// Feed one callback result; return `false` to stop delivery
    fn accumulate(&mut self, value: R) -> bool;

    /// Produce the emission result
    fn finalize(self) -> Self::Output;
}

/// Default policy: always continue, yields nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl<R> Accumulator<R> for Discard {
    type Output = ();

    fn accumulate(&mut self, _value: R) -> bool {
        true
    }

    fn finalize(self) -> Self::Output {}
}

/// Collects every callback result in delivery order
#[derive(Debug, Clone)]
pub struct Collect<R> {
    values: Vec<R>,
}

impl<R> Default for Collect<R> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<R> Accumulator<R> for Collect<R> {
    type Output = Vec<R>;

    fn accumulate(&mut self, value: R) -> bool {
        self.values.push(value);
        true
    }

    fn finalize(self) -> Self::Output {
        self.values
    }
}

/// Stops at the first callback returning `true`
///
/// Finalizes to whether any callback returned `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UntilTrue {
    seen: bool,
}

impl Accumulator<bool> for UntilTrue {
    type Output = bool;

    fn accumulate(&mut self, value: bool) -> bool {
        self.seen = value;
        !value
    }

    fn finalize(self) -> Self::Output {
        self.seen
    }
}
