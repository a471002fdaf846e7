use std::{
    fmt,
    marker::PhantomData,
    mem,
    ptr::{self, NonNull},
};

use crate::{
    control_block::{self, BlockPtr},
    shared::SharedPtr,
};

/// Weak reference to a shared pointee.
///
/// Holds a unit of the control block's weak count, which keeps the block in
/// memory but never the pointee. Whether the pointee is still alive can be
/// asked at any time, and a live pointee can be promoted back to a
/// `SharedPtr`.
pub struct WeakPtr<T: ?Sized + 'static>
{
    pub(crate) ptr: Option<NonNull<T>>,
    pub(crate) cb: Option<BlockPtr>,
    _phantom: PhantomData<T>,
}

impl<T: 'static> WeakPtr<T>
{
    /// The observed address. May dangle once expired.
    pub fn as_ptr(&self) -> *const T { self.ptr.map_or(ptr::null(), |ptr| ptr.as_ptr()) }
}

impl<T: ?Sized + 'static> WeakPtr<T>
{
    /// A weak handle observing nothing. Always expired.
    pub const fn new() -> Self
    {
        WeakPtr {
            ptr: None,
            cb: None,
            _phantom: PhantomData,
        }
    }

    /// Whether the pointee is gone, or there never was one.
    pub fn expired(&self) -> bool { self.cb.map_or(true, control_block::is_expired) }

    /// Number of strong handles keeping the pointee alive.
    pub fn use_count(&self) -> usize { self.cb.map_or(0, control_block::strong_count) }

    /// Number of weak handles, this one included.
    pub fn weak_count(&self) -> usize { self.cb.map_or(0, control_block::weak_count) }

    /// Strong handle to the pointee, or a null handle if it has expired.
    pub fn lock(&self) -> SharedPtr<T> { SharedPtr::from_weak(self).unwrap_or_default() }

    /// Strong handle to the pointee, or `None` if it has expired.
    pub fn upgrade(&self) -> Option<SharedPtr<T>> { SharedPtr::from_weak(self).ok() }

    pub fn reset(&mut self) { drop(mem::take(self)) }

    pub fn swap(&mut self, other: &mut Self) { mem::swap(self, other) }

    fn addr(&self) -> *const () { self.ptr.map_or(ptr::null(), |ptr| ptr.as_ptr() as *const ()) }
}

impl<T: ?Sized + 'static> From<&SharedPtr<T>> for WeakPtr<T>
{
    fn from(it: &SharedPtr<T>) -> Self
    {
        if let Some(cb) = it.cb {
            unsafe { control_block::inc_weak(cb) }
        }
        WeakPtr {
            ptr: it.ptr,
            cb: it.cb,
            _phantom: PhantomData,
        }
    }
}

impl<T: ?Sized + 'static> Clone for WeakPtr<T>
{
    fn clone(&self) -> Self
    {
        if let Some(cb) = self.cb {
            unsafe { control_block::inc_weak(cb) }
        }
        WeakPtr {
            ptr: self.ptr,
            cb: self.cb,
            _phantom: PhantomData,
        }
    }
}

impl<T: ?Sized + 'static> Drop for WeakPtr<T>
{
    fn drop(&mut self)
    {
        if let Some(cb) = self.cb.take() {
            unsafe { control_block::dec_weak(cb) }
        }
    }
}

impl<T: ?Sized + 'static> Default for WeakPtr<T>
{
    fn default() -> Self { Self::new() }
}

impl<T: ?Sized + 'static> fmt::Debug for WeakPtr<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("WeakPtr")
            .field("ptr", &self.addr())
            .field("expired", &self.expired())
            .finish()
    }
}
