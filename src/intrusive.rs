use std::{
    fmt,
    mem,
    ops::Deref,
    ptr::{self, NonNull},
};

use crate::{
    counter::Counter,
    deleter::Deleter,
    error::Error,
};

/// Objects that carry their own reference count.
///
/// ```
/// use ownptr::{make_intrusive, DefaultDelete, RefCounted, SimpleCounter};
///
/// #[derive(Default)]
/// struct Texture
/// {
///     refs: SimpleCounter,
///     id: u32,
/// }
///
/// unsafe impl RefCounted for Texture
/// {
///     type Counter = SimpleCounter;
///     type Deleter = DefaultDelete;
///
///     fn counter(&self) -> &SimpleCounter { &self.refs }
/// }
///
/// let a = make_intrusive(Texture { id: 7, ..Default::default() });
/// let b = a.clone();
/// assert_eq!(b.use_count(), 2);
/// assert_eq!(b.id, 7);
/// ```
///
/// # Safety
///
/// `counter` must return the same counter for the whole life of the object,
/// and nothing but `IntrusivePtr` may change it.
pub unsafe trait RefCounted: Sized + 'static
{
    type Counter: Counter;

    /// Policy run once the count returns to zero.
    type Deleter: Deleter<Self> + Default;

    fn counter(&self) -> &Self::Counter;

    /// Number of `IntrusivePtr`s to this object.
    fn ref_count(&self) -> usize { self.counter().ref_count() }
}

/// Strong pointer to an object counting its own references.
///
/// There is no control block and no weak observation: the count lives in
/// the pointee, so any raw pointer to it can be turned back into an owning
/// handle.
pub struct IntrusivePtr<T: RefCounted>
{
    ptr: Option<NonNull<T>>,
}

/// Box `value` and take the first reference to it.
pub fn make_intrusive<T: RefCounted>(value: T) -> IntrusivePtr<T> { IntrusivePtr::new(value) }

impl<T: RefCounted> IntrusivePtr<T>
{
    pub const fn null() -> Self { IntrusivePtr { ptr: None } }

    /// Box `value` and take the first reference to it.
    ///
    /// `T::Deleter` must be able to release a `Box` allocation.
    pub fn new(value: T) -> Self { Self::from_box(Box::new(value)) }

    pub fn from_box(it: Box<T>) -> Self { unsafe { Self::from_raw(Box::into_raw(it)) } }

    /// Take a new reference to `ptr`, which may already be referenced by
    /// other `IntrusivePtr`s.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live object that `T::Deleter` can
    /// destroy.
    pub unsafe fn from_raw(ptr: *mut T) -> Self
    {
        let ptr = NonNull::new(ptr);
        if let Some(it) = ptr {
            it.as_ref().counter().inc_ref();
        }
        IntrusivePtr { ptr }
    }

    pub fn reset(&mut self) { drop(mem::take(self)) }

    pub fn reset_with(&mut self, it: Box<T>) { *self = Self::from_box(it) }

    pub fn swap(&mut self, other: &mut Self) { mem::swap(self, other) }

    pub fn get(&self) -> Option<&T> { self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() }) }

    pub fn as_ptr(&self) -> *const T { self.ptr.map_or(ptr::null(), |ptr| ptr.as_ptr()) }

    pub fn use_count(&self) -> usize { self.get().map_or(0, T::ref_count) }

    pub fn is_null(&self) -> bool { self.ptr.is_none() }
}

impl<T: RefCounted> Clone for IntrusivePtr<T>
{
    fn clone(&self) -> Self { unsafe { Self::from_raw(self.as_ptr() as *mut T) } }
}

impl<T: RefCounted> Drop for IntrusivePtr<T>
{
    fn drop(&mut self)
    {
        if let Some(ptr) = self.ptr.take() {
            let last = unsafe { ptr.as_ref() }.counter().dec_ref() == 0;
            if last {
                dbg_println!("destroy intrusive pointee {:p}", ptr);
                unsafe { T::Deleter::default().delete(ptr) }
            }
        }
    }
}

impl<T: RefCounted> Default for IntrusivePtr<T>
{
    fn default() -> Self { Self::null() }
}

impl<T: RefCounted> Deref for IntrusivePtr<T>
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

impl<T: RefCounted> From<Box<T>> for IntrusivePtr<T>
{
    fn from(it: Box<T>) -> Self { Self::from_box(it) }
}

impl<T: RefCounted> fmt::Debug for IntrusivePtr<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("IntrusivePtr")
            .field("ptr", &self.as_ptr())
            .field("use_count", &self.use_count())
            .finish()
    }
}
