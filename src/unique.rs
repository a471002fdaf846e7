use std::{
    fmt,
    marker::PhantomData,
    mem,
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

use crate::{
    compressed_pair::CompressedPair,
    deleter::{DefaultDelete, Deleter},
    error::Error,
};

/// Exclusive ownership of a pointee, destroyed through a deleter policy.
///
/// No counting is involved. The pointer and deleter share a
/// `CompressedPair`, so with a stateless deleter the handle is one pointer
/// wide. Slices are supported: `UniquePtr<[T]>` indexes through `Deref`.
pub struct UniquePtr<T: ?Sized, D: Deleter<T> = DefaultDelete>
{
    pair: CompressedPair<Option<NonNull<T>>, D>,
    _phantom: PhantomData<T>,
}

unsafe impl<T: ?Sized + Send, D: Deleter<T> + Send> Send for UniquePtr<T, D> {}
unsafe impl<T: ?Sized + Sync, D: Deleter<T> + Sync> Sync for UniquePtr<T, D> {}

impl<T> UniquePtr<T>
{
    pub fn new(value: T) -> Self { Self::from_box(Box::new(value)) }
}

impl<T: ?Sized> UniquePtr<T>
{
    pub fn from_box(it: Box<T>) -> Self { unsafe { Self::from_raw(Box::into_raw(it)) } }

    /// Release the current pointee and take ownership of `it`.
    pub fn reset_with(&mut self, it: Box<T>) { unsafe { self.reset_raw(Box::into_raw(it)) } }
}

impl<T: ?Sized, D: Deleter<T> + Default> UniquePtr<T, D>
{
    /// Own `ptr`, which a default `D` will destroy.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or valid for `D::delete`, and owned by nothing
    /// else.
    pub unsafe fn from_raw(ptr: *mut T) -> Self { Self::from_raw_with_deleter(ptr, D::default()) }
}

impl<T: ?Sized, D: Deleter<T>> UniquePtr<T, D>
{
    /// Own `ptr`, which `deleter` will destroy.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or valid for `deleter`, and owned by nothing else.
    pub unsafe fn from_raw_with_deleter(ptr: *mut T, deleter: D) -> Self
    {
        UniquePtr {
            pair: CompressedPair::new(NonNull::new(ptr), deleter),
            _phantom: PhantomData,
        }
    }

    /// Give up ownership without destroying the pointee.
    pub fn release(&mut self) -> Option<NonNull<T>> { self.pair.first_mut().take() }

    /// Destroy the pointee, if any, and become null.
    pub fn reset(&mut self)
    {
        let (ptr, deleter) = self.pair.both_mut();
        if let Some(old) = ptr.take() {
            unsafe { deleter.delete(old) }
        }
    }

    /// Destroy the pointee, if any, and own `ptr` instead.
    ///
    /// # Safety
    ///
    /// Same contract as [`UniquePtr::from_raw_with_deleter`], for the
    /// deleter this handle already holds.
    pub unsafe fn reset_raw(&mut self, ptr: *mut T)
    {
        let (slot, deleter) = self.pair.both_mut();
        if let Some(old) = mem::replace(slot, NonNull::new(ptr)) {
            deleter.delete(old);
        }
    }

    /// Exchange pointees and deleters.
    pub fn swap(&mut self, other: &mut Self) { self.pair.swap(&mut other.pair) }

    pub fn get(&self) -> Option<&T> { self.pair.first().map(|ptr| unsafe { &*ptr.as_ptr() }) }

    pub fn get_mut(&mut self) -> Option<&mut T>
    {
        self.pair.first().map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    pub fn deleter(&self) -> &D { self.pair.second() }

    pub fn deleter_mut(&mut self) -> &mut D { self.pair.second_mut() }

    pub fn is_null(&self) -> bool { self.pair.first().is_none() }
}

impl<T: ?Sized, D: Deleter<T>> Drop for UniquePtr<T, D>
{
    fn drop(&mut self) { self.reset() }
}

impl<T: ?Sized, D: Deleter<T> + Default> Default for UniquePtr<T, D>
{
    fn default() -> Self
    {
        UniquePtr {
            pair: CompressedPair::new(None, D::default()),
            _phantom: PhantomData,
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> Deref for UniquePtr<T, D>
{
    type Target = T;

    fn deref(&self) -> &Self::Target
    {
        match self.get() {
            Some(it) => it,
            None => panic!("{}", Error::NullDereference),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> DerefMut for UniquePtr<T, D>
{
    fn deref_mut(&mut self) -> &mut Self::Target
    {
        match self.get_mut() {
            Some(it) => it,
            None => panic!("{}", Error::NullDereference),
        }
    }
}

impl<T: ?Sized> From<Box<T>> for UniquePtr<T>
{
    fn from(it: Box<T>) -> Self { Self::from_box(it) }
}

impl<T: ?Sized, D: Deleter<T>> fmt::Debug for UniquePtr<T, D>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("UniquePtr")
            .field("ptr", self.pair.first())
            .finish()
    }
}
