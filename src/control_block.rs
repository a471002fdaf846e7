use std::{
    any::type_name,
    cell::{Cell, UnsafeCell},
    fmt,
    mem::MaybeUninit,
    ptr::NonNull,
};

use crate::{
    counter::{Counter, SimpleCounter},
    deleter::Deleter,
    error::Error,
    stats,
};

/// Strong and weak counts of a control block.
///
/// A fresh block starts with one strong unit, owned by the handle that
/// allocated it. `releasing` is set while the last strong release destroys
/// the pointee, and keeps weak releases from freeing the block meanwhile.
pub(crate) struct Counts
{
    strong: SimpleCounter,
    weak: SimpleCounter,
    releasing: Cell<bool>,
}

impl Counts
{
    fn new() -> Self
    {
        Counts {
            strong: SimpleCounter::starting_at(1),
            weak: SimpleCounter::new(),
            releasing: Cell::new(false),
        }
    }
}

impl fmt::Debug for Counts
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Counts")
            .field("strong", &self.strong.ref_count())
            .field("weak", &self.weak.ref_count())
            .finish()
    }
}

/// Metadata shared by every shared and weak handle derived from one origin.
///
/// The block decides how its pointee is destroyed. Memory of the block itself
/// is always a `Box` and is released by [`dec_strong`]/[`dec_weak`].
pub(crate) trait ControlBlock
{
    fn counts(&self) -> &Counts;

    /// Destroy the pointee. Only the first call has an effect.
    ///
    /// # Safety
    ///
    /// No handle may access the pointee afterwards.
    unsafe fn destroy_pointee(&self);

    /// Whether the pointee has been destroyed.
    fn is_expired(&self) -> bool;

    /// Address of the pointee while it is alive.
    fn pointee_addr(&self) -> Option<NonNull<()>>;
}

pub(crate) type BlockPtr = NonNull<dyn ControlBlock>;

/// Control block with the pointee embedded in its own storage.
pub(crate) struct ControlBlockOwning<T: 'static>
{
    counts: Counts,
    alive: Cell<bool>,
    storage: UnsafeCell<MaybeUninit<T>>,
}

impl<T: 'static> ControlBlockOwning<T>
{
    /// Allocate a block holding `value` in a single heap allocation.
    ///
    /// Returns the type-erased block and the address of the embedded pointee.
    pub(crate) fn allocate(value: T) -> (BlockPtr, NonNull<T>)
    {
        let block = NonNull::from(Box::leak(Box::new(ControlBlockOwning {
            counts: Counts::new(),
            alive: Cell::new(true),
            storage: UnsafeCell::new(MaybeUninit::new(value)),
        })));
        let data = unsafe { NonNull::new_unchecked(block.as_ref().storage.get().cast::<T>()) };
        dbg_println!(
            "allocate ControlBlockOwning<{}> at {:p}",
            type_name::<T>(),
            block
        );
        stats::block_allocated(true);
        let cb: BlockPtr = block;
        (cb, data)
    }
}

impl<T: 'static> ControlBlock for ControlBlockOwning<T>
{
    fn counts(&self) -> &Counts { &self.counts }

    unsafe fn destroy_pointee(&self)
    {
        if self.alive.replace(false) {
            (*self.storage.get()).assume_init_drop();
        }
    }

    fn is_expired(&self) -> bool { !self.alive.get() }

    fn pointee_addr(&self) -> Option<NonNull<()>>
    {
        if self.alive.get() {
            NonNull::new(self.storage.get().cast::<()>())
        } else {
            None
        }
    }
}

impl<T: 'static> Drop for ControlBlockOwning<T>
{
    fn drop(&mut self) { unsafe { self.destroy_pointee() } }
}

/// Control block for a pointee allocated independently of it.
///
/// The pointee may be unsized, e.g. a trait object adopted from a `Box`; the
/// deleter is chosen for the concrete type the block was created with.
pub(crate) struct ControlBlockPointer<T: ?Sized + 'static, D: Deleter<T> + 'static>
{
    counts: Counts,
    ptr: Cell<Option<NonNull<T>>>,
    deleter: UnsafeCell<D>,
}

impl<T: ?Sized + 'static, D: Deleter<T> + 'static> ControlBlockPointer<T, D>
{
    /// Allocate a block adopting `ptr`, which `deleter` destroys once the
    /// strong count reaches zero.
    pub(crate) fn allocate(ptr: NonNull<T>, deleter: D) -> BlockPtr
    {
        let block = NonNull::from(Box::leak(Box::new(ControlBlockPointer {
            counts: Counts::new(),
            ptr: Cell::new(Some(ptr)),
            deleter: UnsafeCell::new(deleter),
        })));
        dbg_println!(
            "allocate ControlBlockPointer<{}, {}> at {:p} adopting {:p}",
            type_name::<T>(),
            type_name::<D>(),
            block,
            ptr
        );
        stats::block_allocated(false);
        block
    }
}

impl<T: ?Sized + 'static, D: Deleter<T> + 'static> ControlBlock for ControlBlockPointer<T, D>
{
    fn counts(&self) -> &Counts { &self.counts }

    unsafe fn destroy_pointee(&self)
    {
        if let Some(ptr) = self.ptr.take() {
            (*self.deleter.get()).delete(ptr);
        }
    }

    fn is_expired(&self) -> bool { self.ptr.get().is_none() }

    fn pointee_addr(&self) -> Option<NonNull<()>> { self.ptr.get().map(|ptr| ptr.cast::<()>()) }
}

impl<T: ?Sized + 'static, D: Deleter<T> + 'static> Drop for ControlBlockPointer<T, D>
{
    fn drop(&mut self) { unsafe { self.destroy_pointee() } }
}

pub(crate) fn strong_count(cb: BlockPtr) -> usize
{
    unsafe { cb.as_ref().counts().strong.ref_count() }
}

pub(crate) fn weak_count(cb: BlockPtr) -> usize { unsafe { cb.as_ref().counts().weak.ref_count() } }

pub(crate) fn is_expired(cb: BlockPtr) -> bool { unsafe { cb.as_ref().is_expired() } }

pub(crate) fn pointee_addr(cb: BlockPtr) -> Option<NonNull<()>>
{
    unsafe { cb.as_ref().pointee_addr() }
}

/// # Safety
///
/// `cb` must be a live block on which the caller holds a strong or weak unit.
pub(crate) unsafe fn inc_strong(cb: BlockPtr) { cb.as_ref().counts().strong.inc_ref(); }

/// Release one strong unit.
///
/// The last strong unit destroys the pointee with the block marked as
/// releasing, so the pointee's destructor may drop weak handles to its own
/// block. The block is freed afterwards if no weak handle is left, also when
/// the destructor unwinds.
///
/// # Safety
///
/// The caller must own the strong unit it releases, and must not touch `cb`
/// afterwards.
pub(crate) unsafe fn dec_strong(cb: BlockPtr)
{
    let counts = cb.as_ref().counts();
    debug_assert!(counts.strong.ref_count() > 0, "{}", Error::UseAfterRelease);
    if counts.strong.dec_ref() == 0 {
        dbg_call!("destroy_pointee({:p})", cb);
        counts.releasing.set(true);
        let _release = Release(cb);
        cb.as_ref().destroy_pointee();
        dbg_return!();
    }
}

/// Ends the last strong release of a block, on return or unwind.
struct Release(BlockPtr);

impl Drop for Release
{
    fn drop(&mut self)
    {
        stats::pointee_destroyed();
        let last = unsafe {
            let counts = self.0.as_ref().counts();
            counts.releasing.set(false);
            counts.weak.ref_count() == 0
        };
        if last {
            unsafe { free(self.0) }
        }
    }
}

/// # Safety
///
/// `cb` must be a live block on which the caller holds a strong or weak unit.
pub(crate) unsafe fn inc_weak(cb: BlockPtr) { cb.as_ref().counts().weak.inc_ref(); }

/// Release one weak unit, freeing the block when both counts are zero.
///
/// # Safety
///
/// The caller must own the weak unit it releases, and must not touch `cb`
/// afterwards.
pub(crate) unsafe fn dec_weak(cb: BlockPtr)
{
    let last = {
        let counts = cb.as_ref().counts();
        debug_assert!(counts.weak.ref_count() > 0, "{}", Error::UseAfterRelease);
        counts.weak.dec_ref() == 0 && counts.strong.ref_count() == 0 && !counts.releasing.get()
    };
    if last {
        free(cb);
    }
}

unsafe fn free(cb: BlockPtr)
{
    dbg_println!("free control block {:p}", cb);
    drop(Box::from_raw(cb.as_ptr()));
    stats::block_freed();
}
