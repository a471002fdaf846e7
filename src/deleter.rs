use std::ptr::NonNull;

/// Destruction policy for a pointee that a handle owns.
///
/// Shared by the intrusive pointer, the unique pointer and the adopting
/// control block of the shared pointer.
pub trait Deleter<T: ?Sized>
{
    /// Destroy the pointee and release its memory.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for whatever this deleter does to it, and must not
    /// be used again afterwards. `delete` runs at most once per pointee.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

/// Frees pointees that were allocated through `Box`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultDelete;

impl<T: ?Sized> Deleter<T> for DefaultDelete
{
    unsafe fn delete(&mut self, ptr: NonNull<T>) { drop(Box::from_raw(ptr.as_ptr())); }
}

impl<T: ?Sized, F> Deleter<T> for F
where
    F: FnMut(NonNull<T>),
{
    unsafe fn delete(&mut self, ptr: NonNull<T>) { (self)(ptr) }
}
