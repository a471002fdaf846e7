use std::{cell::Cell, fmt};

/// Counting policy for reference-counted objects.
///
/// Methods take `&self` since counters live inside shared pointees and
/// control blocks. Implementations are not expected to be thread-safe.
pub trait Counter: Default
{
    /// Increment, returning the new count.
    fn inc_ref(&self) -> usize;

    /// Decrement, returning the new count. Never goes below zero.
    fn dec_ref(&self) -> usize;

    /// Current count.
    fn ref_count(&self) -> usize;
}

/// A bare non-negative counter.
#[derive(Default)]
pub struct SimpleCounter
{
    count: Cell<usize>,
}

impl SimpleCounter
{
    pub const fn new() -> Self { SimpleCounter { count: Cell::new(0) } }

    pub(crate) const fn starting_at(count: usize) -> Self
    {
        SimpleCounter {
            count: Cell::new(count),
        }
    }
}

impl Counter for SimpleCounter
{
    fn inc_ref(&self) -> usize
    {
        let count = self.count.get() + 1;
        self.count.set(count);
        count
    }

    fn dec_ref(&self) -> usize
    {
        let count = self.count.get().saturating_sub(1);
        self.count.set(count);
        count
    }

    fn ref_count(&self) -> usize { self.count.get() }
}

impl fmt::Debug for SimpleCounter
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_tuple("SimpleCounter").field(&self.count.get()).finish()
    }
}
