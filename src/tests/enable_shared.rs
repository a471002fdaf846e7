use std::{cell::Cell, rc::Rc};

use pretty_assertions::assert_eq;

use super::{DropCounter, Probe};
use crate::{
    make_shared_from_this, stats::thread_local_stats, EnableSharedFromThis, Error,
    SharedFromThis, SharedPtr,
};

struct Session
{
    this: EnableSharedFromThis<Session>,
    probe: Probe,
    locked_in_drop: Rc<Cell<Option<bool>>>,
}

impl SharedFromThis for Session
{
    fn enable_shared_from_this(&self) -> &EnableSharedFromThis<Self> { &self.this }
}

impl Drop for Session
{
    fn drop(&mut self)
    {
        self.locked_in_drop
            .set(Some(self.weak_from_this().lock().is_null()));
    }
}

fn session(drops: &DropCounter) -> (Session, Rc<Cell<Option<bool>>>)
{
    let flag = Rc::new(Cell::new(None));
    let it = Session {
        this: EnableSharedFromThis::new(),
        probe: drops.probe(1),
        locked_in_drop: flag.clone(),
    };
    (it, flag)
}

#[test]
fn shared_from_this_joins_existing_owners()
{
    let drops = DropCounter::default();
    let (it, _) = session(&drops);
    let s = make_shared_from_this(it);
    assert_eq!(s.use_count(), 1);
    assert_eq!(s.weak_count(), 1);

    let again = s.shared_from_this();
    assert_eq!(again.as_ref().map(SharedPtr::use_count), Ok(2));
    assert_eq!(again.map(|a| a.as_ptr()), Ok(s.as_ptr()));

    let w = s.weak_from_this();
    assert_eq!(w.as_ptr(), s.as_ptr());
    assert_eq!(s.probe.value, 1);
}

#[test]
fn back_reference_does_not_keep_pointee_alive()
{
    let drops = DropCounter::default();
    let before = thread_local_stats();
    let (it, flag) = session(&drops);

    let s = make_shared_from_this(it);
    let w = s.weak_from_this();
    std::mem::drop(s);

    assert_eq!(drops.get(), 1);
    assert_eq!(flag.get(), Some(true));
    assert!(w.expired());
    assert_eq!(thread_local_stats().live_blocks(), before.live_blocks() + 1);

    std::mem::drop(w);
    assert_eq!(thread_local_stats().live_blocks(), before.live_blocks());
}

#[test]
fn adopted_pointee_is_not_registered()
{
    let drops = DropCounter::default();
    let (it, _) = session(&drops);
    let s = SharedPtr::from_box(Box::new(it));

    assert_eq!(s.shared_from_this().err(), Some(Error::BadWeakReference));
    assert!(s.weak_from_this().expired());
    assert_eq!(s.use_count(), 1);
}

#[test]
fn unmanaged_pointee_is_not_registered()
{
    let drops = DropCounter::default();
    let (it, _) = session(&drops);
    assert!(it.shared_from_this().is_err());
    assert!(it.weak_from_this().lock().is_null());
}
