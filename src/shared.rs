use std::{
    fmt,
    marker::PhantomData,
    mem,
    ops::Deref,
    ptr::{self, NonNull},
};

use crate::{
    control_block::{self, BlockPtr, ControlBlockOwning, ControlBlockPointer},
    deleter::{DefaultDelete, Deleter},
    error::{Error, Result},
    weak::WeakPtr,
};

/// Shared ownership of a pointee.
///
/// A handle pairs an access address with an optional control block. The two
/// are independent: an aliasing handle exposes some other object while its
/// lifetime follows the block's own pointee. Every handle holding a block
/// owns one unit of its strong count; the pointee is destroyed when the last
/// unit is released.
///
/// The pointee may be unsized. A `SharedPtr<dyn Trait>` comes from adopting
/// a `Box<dyn Trait>`, or from projecting a concrete handle with
/// [`SharedPtr::map`]; either way the concrete type's destructor runs.
///
/// Counting is not atomic, so handles are neither `Send` nor `Sync`.
pub struct SharedPtr<T: ?Sized + 'static>
{
    pub(crate) ptr: Option<NonNull<T>>,
    pub(crate) cb: Option<BlockPtr>,
    _phantom: PhantomData<T>,
}

/// Allocate `value` together with its control block in one heap allocation.
pub fn make_shared<T: 'static>(value: T) -> SharedPtr<T> { SharedPtr::new(value) }

impl<T: 'static> SharedPtr<T>
{
    /// Allocate `value` embedded in its control block, with a strong count
    /// of one.
    pub fn new(value: T) -> Self
    {
        let (cb, data) = ControlBlockOwning::allocate(value);
        SharedPtr {
            ptr: Some(data),
            cb: Some(cb),
            _phantom: PhantomData,
        }
    }

    /// The access address, null for a null handle.
    pub fn as_ptr(&self) -> *const T { self.ptr.map_or(ptr::null(), |ptr| ptr.as_ptr()) }
}

impl<T: ?Sized + 'static> SharedPtr<T>
{
    /// A handle that owns nothing and points nowhere.
    pub const fn null() -> Self
    {
        SharedPtr {
            ptr: None,
            cb: None,
            _phantom: PhantomData,
        }
    }

    /// Adopt a boxed pointee. Allocates a separate control block.
    pub fn from_box(it: Box<T>) -> Self { unsafe { Self::from_raw(Box::into_raw(it)) } }

    /// Adopt a pointee obtained from `Box::into_raw`. A null `ptr` gives a
    /// null handle.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from `Box::into_raw`, and must not be owned
    /// by anything else.
    pub unsafe fn from_raw(ptr: *mut T) -> Self { Self::from_raw_with_deleter(ptr, DefaultDelete) }

    /// Adopt `ptr`, destroying it through `deleter` once the strong count
    /// reaches zero. A null `ptr` gives a null handle and drops `deleter`
    /// unused.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or valid until `deleter` is invoked on it, and
    /// `deleter` must be sound to invoke on it exactly once.
    pub unsafe fn from_raw_with_deleter<D>(ptr: *mut T, deleter: D) -> Self
    where
        D: Deleter<T> + 'static,
    {
        match NonNull::new(ptr) {
            None => Self::null(),
            Some(ptr) => SharedPtr {
                ptr: Some(ptr),
                cb: Some(ControlBlockPointer::allocate(ptr, deleter)),
                _phantom: PhantomData,
            },
        }
    }

    /// Share the control block of `owner` while exposing `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or stay valid for as long as the pointee of
    /// `owner` is alive.
    pub unsafe fn aliasing<U: ?Sized + 'static>(owner: &SharedPtr<U>, ptr: *const T) -> Self
    {
        if let Some(cb) = owner.cb {
            control_block::inc_strong(cb);
        }
        SharedPtr {
            ptr: NonNull::new(ptr as *mut T),
            cb: owner.cb,
            _phantom: PhantomData,
        }
    }

    /// Aliasing handle to a part of the pointee, e.g. a field, or to the
    /// pointee under another type, e.g. `map::<dyn Trait>(|x| x)`.
    ///
    /// A null handle maps to a null handle.
    pub fn map<U: ?Sized + 'static>(&self, f: impl FnOnce(&T) -> &U) -> SharedPtr<U>
    {
        match self.get() {
            None => SharedPtr::null(),
            Some(it) => {
                let part: *const U = f(it);
                unsafe { SharedPtr::aliasing(self, part) }
            }
        }
    }

    /// Promote `weak`, failing with `BadWeakReference` if its pointee has
    /// already been destroyed.
    pub fn from_weak(weak: &WeakPtr<T>) -> Result<Self>
    {
        match weak.cb {
            Some(cb) if !control_block::is_expired(cb) => {
                unsafe { control_block::inc_strong(cb) };
                Ok(SharedPtr {
                    ptr: weak.ptr,
                    cb: Some(cb),
                    _phantom: PhantomData,
                })
            }
            _ => Err(Error::BadWeakReference),
        }
    }

    /// Weak handle observing the same pointee.
    pub fn downgrade(&self) -> WeakPtr<T> { WeakPtr::from(self) }

    /// Release ownership and become null.
    pub fn reset(&mut self) { drop(self.take()) }

    /// Release ownership and adopt `it` instead.
    pub fn reset_with(&mut self, it: Box<T>) { *self = Self::from_box(it) }

    pub fn swap(&mut self, other: &mut Self) { mem::swap(self, other) }

    /// Move out of this handle, leaving it null. Counts are unchanged.
    pub fn take(&mut self) -> Self { mem::take(self) }

    pub fn get(&self) -> Option<&T> { self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() }) }

    /// Mutable access, given this is the only handle, strong or weak, to its
    /// control block, and it exposes the block's own pointee.
    ///
    /// Aliasing handles to anything but the pointee's start address get
    /// `None`: what they expose is not known to be owned by the block.
    pub fn get_mut(&mut self) -> Option<&mut T>
    {
        match (self.ptr, self.cb) {
            (Some(ptr), Some(cb))
                if control_block::strong_count(cb) == 1
                    && control_block::weak_count(cb) == 0
                    && control_block::pointee_addr(cb) == Some(ptr.cast::<()>()) =>
            {
                Some(unsafe { &mut *ptr.as_ptr() })
            }
            _ => None,
        }
    }

    fn addr(&self) -> *const () { self.ptr.map_or(ptr::null(), |ptr| ptr.as_ptr() as *const ()) }

    /// Number of strong handles sharing the control block; zero without one.
    pub fn use_count(&self) -> usize { self.cb.map_or(0, control_block::strong_count) }

    /// Number of weak handles observing the control block.
    pub fn weak_count(&self) -> usize { self.cb.map_or(0, control_block::weak_count) }

    pub fn is_null(&self) -> bool { self.ptr.is_none() }

    /// Whether both handles expose the same address.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool { ptr::eq(this.addr(), other.addr()) }

    /// Whether both handles share one control block, whatever they expose.
    pub fn owner_eq<U: ?Sized + 'static>(this: &Self, other: &SharedPtr<U>) -> bool
    {
        match (this.cb, other.cb) {
            (Some(a), Some(b)) => a.cast::<()>() == b.cast::<()>(),
            _ => false,
        }
    }
}

impl<T: ?Sized + 'static> Clone for SharedPtr<T>
{
    fn clone(&self) -> Self
    {
        if let Some(cb) = self.cb {
            unsafe { control_block::inc_strong(cb) }
        }
        SharedPtr {
            ptr: self.ptr,
            cb: self.cb,
            _phantom: PhantomData,
        }
    }
}

impl<T: ?Sized + 'static> Drop for SharedPtr<T>
{
    fn drop(&mut self)
    {
        if let Some(cb) = self.cb.take() {
            unsafe { control_block::dec_strong(cb) }
        }
    }
}

impl<T: ?Sized + 'static> Default for SharedPtr<T>
{
    fn default() -> Self { Self::null() }
}

impl<T: ?Sized + 'static> Deref for SharedPtr<T>
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

impl<T: ?Sized + 'static> From<Box<T>> for SharedPtr<T>
{
    fn from(it: Box<T>) -> Self { Self::from_box(it) }
}

impl<'a, T: ?Sized + 'static> TryFrom<&'a WeakPtr<T>> for SharedPtr<T>
{
    type Error = Error;

    fn try_from(value: &'a WeakPtr<T>) -> Result<Self> { Self::from_weak(value) }
}

impl<T: ?Sized + 'static> fmt::Debug for SharedPtr<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SharedPtr")
            .field("ptr", &self.addr())
            .field("use_count", &self.use_count())
            .finish()
    }
}
