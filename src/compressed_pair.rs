use std::mem;

/// Storage for two values, typically a pointer and its deleter.
///
/// Zero-sized members occupy no space, so a pair of a pointer and a
/// stateless deleter is exactly as large as the pointer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompressedPair<F, S>
{
    first: F,
    second: S,
}

impl<F, S> CompressedPair<F, S>
{
    pub const fn new(first: F, second: S) -> Self { CompressedPair { first, second } }

    pub fn first(&self) -> &F { &self.first }

    pub fn first_mut(&mut self) -> &mut F { &mut self.first }

    pub fn second(&self) -> &S { &self.second }

    pub fn second_mut(&mut self) -> &mut S { &mut self.second }

    /// Both members at once, for when one is needed to act on the other.
    pub fn both_mut(&mut self) -> (&mut F, &mut S) { (&mut self.first, &mut self.second) }

    pub fn swap(&mut self, other: &mut Self) { mem::swap(self, other) }

    pub fn into_parts(self) -> (F, S) { (self.first, self.second) }
}
