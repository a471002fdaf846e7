use std::{cell::RefCell, fmt};

use crate::{error::Result, shared::SharedPtr, weak::WeakPtr};

/// Weak back-reference a pointee embeds to hand out handles to itself.
///
/// Only [`make_shared_from_this`] registers the back-reference. A pointee
/// adopted from a `Box` or built any other way has no control block at
/// construction time and stays unregistered.
pub struct EnableSharedFromThis<T: 'static>
{
    weak_this: RefCell<WeakPtr<T>>,
}

impl<T: 'static> EnableSharedFromThis<T>
{
    pub const fn new() -> Self
    {
        EnableSharedFromThis {
            weak_this: RefCell::new(WeakPtr::new()),
        }
    }

    fn register(&self, this: &SharedPtr<T>) { *self.weak_this.borrow_mut() = this.downgrade(); }
}

impl<T: 'static> Default for EnableSharedFromThis<T>
{
    fn default() -> Self { Self::new() }
}

impl<T: 'static> fmt::Debug for EnableSharedFromThis<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("EnableSharedFromThis")
            .field("weak_this", &self.weak_this.borrow())
            .finish()
    }
}

/// Pointee types that can obtain shared and weak handles to themselves.
///
/// ```
/// use ownptr::{make_shared_from_this, EnableSharedFromThis, SharedFromThis};
///
/// struct Node
/// {
///     this: EnableSharedFromThis<Node>,
/// }
///
/// impl SharedFromThis for Node
/// {
///     fn enable_shared_from_this(&self) -> &EnableSharedFromThis<Self> { &self.this }
/// }
///
/// let node = make_shared_from_this(Node { this: EnableSharedFromThis::new() });
/// let again = node.shared_from_this().unwrap();
/// assert_eq!(node.use_count(), 2);
/// assert_eq!(again.as_ptr(), node.as_ptr());
/// ```
pub trait SharedFromThis: Sized + 'static
{
    fn enable_shared_from_this(&self) -> &EnableSharedFromThis<Self>;

    /// Strong handle to `self`, failing with `BadWeakReference` if `self`
    /// was never registered or is being destroyed.
    fn shared_from_this(&self) -> Result<SharedPtr<Self>>
    {
        SharedPtr::from_weak(&self.enable_shared_from_this().weak_this.borrow())
    }

    /// Weak handle to `self`; observes nothing if `self` was never
    /// registered.
    fn weak_from_this(&self) -> WeakPtr<Self>
    {
        self.enable_shared_from_this().weak_this.borrow().clone()
    }
}

/// Allocate `value` through the single-allocation factory and register its
/// weak back-reference before handing out the first handle.
pub fn make_shared_from_this<T: SharedFromThis>(value: T) -> SharedPtr<T>
{
    let res = SharedPtr::new(value);
    if let Some(it) = res.get() {
        it.enable_shared_from_this().register(&res);
    }
    res
}
