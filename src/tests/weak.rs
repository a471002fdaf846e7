use pretty_assertions::assert_eq;

use super::DropCounter;
use crate::{make_shared, stats::thread_local_stats, Error, SharedPtr, WeakPtr};

#[test]
fn default_weak_is_expired()
{
    let w: WeakPtr<i32> = WeakPtr::default();
    assert!(w.expired());
    assert_eq!(w.use_count(), 0);
    assert!(w.lock().is_null());
    assert_eq!(SharedPtr::from_weak(&w).err(), Some(Error::BadWeakReference));
}

#[test]
fn expires_exactly_when_strong_count_hits_zero()
{
    let drops = DropCounter::default();
    let a = SharedPtr::new(drops.probe(0));
    let b = a.clone();
    let weaks: Vec<WeakPtr<_>> = (0..4).map(|_| a.downgrade()).collect();
    assert_eq!(a.weak_count(), 4);

    std::mem::drop(a);
    assert!(weaks.iter().all(|w| !w.expired()));

    std::mem::drop(b);
    assert!(weaks.iter().all(WeakPtr::expired));
    assert_eq!(drops.get(), 1);
    assert_eq!(weaks[0].weak_count(), 4);
}

#[test]
fn lock_adds_exactly_one_strong_unit()
{
    let s = make_shared(String::from("alive"));
    let w = s.downgrade();
    let before = w.use_count();

    let locked = w.lock();
    assert!(!locked.is_null());
    assert_eq!(locked.use_count(), before + 1);
    assert_eq!(*locked, "alive");
}

#[test]
fn lock_after_expiry_is_null()
{
    let s = make_shared(1);
    let w = s.downgrade();
    std::mem::drop(s);

    let locked = w.lock();
    assert!(locked.is_null());
    assert_eq!(locked.use_count(), 0);
    assert!(w.upgrade().is_none());
}

#[test]
fn explicit_promotion_fails_iff_expired()
{
    let s = make_shared(7);
    let w = s.downgrade();

    let promoted = SharedPtr::try_from(&w);
    assert_eq!(w.expired(), promoted.is_err());
    assert_eq!(promoted.map(|p| p.use_count()), Ok(2));

    std::mem::drop(s);

    let promoted = SharedPtr::from_weak(&w);
    assert_eq!(w.expired(), promoted.is_err());
    assert_eq!(promoted.err(), Some(Error::BadWeakReference));
}

#[test]
fn lock_round_trips_the_address()
{
    let s = make_shared([1u8, 2, 3]);
    let w = WeakPtr::from(&s);
    assert_eq!(w.lock().as_ptr(), s.as_ptr());
    assert_eq!(w.as_ptr(), s.as_ptr());

    let adopted = SharedPtr::from_box(Box::new(5i64));
    assert_eq!(adopted.downgrade().lock().as_ptr(), adopted.as_ptr());
}

#[test]
fn block_outlives_pointee_until_last_weak()
{
    let before = thread_local_stats();

    let s = make_shared(vec![0u32; 16]);
    let w = s.downgrade();
    let w2 = w.clone();
    std::mem::drop(s);

    let mid = thread_local_stats();
    assert_eq!(mid.pointees_destroyed, before.pointees_destroyed + 1);
    assert_eq!(mid.live_blocks(), before.live_blocks() + 1);

    std::mem::drop(w);
    assert_eq!(thread_local_stats().live_blocks(), before.live_blocks() + 1);

    std::mem::drop(w2);
    assert_eq!(thread_local_stats().live_blocks(), before.live_blocks());
}

#[test]
fn reset_and_swap()
{
    let a = make_shared('a');
    let b = make_shared('b');
    let mut wa = a.downgrade();
    let mut wb = b.downgrade();

    wa.swap(&mut wb);
    assert_eq!(*wa.lock(), 'b');
    assert_eq!(*wb.lock(), 'a');
    assert_eq!(a.weak_count(), 1);

    wb.reset();
    assert!(wb.expired());
    assert_eq!(a.weak_count(), 0);
    assert_eq!(b.weak_count(), 1);
}

#[test]
fn weak_of_aliasing_handle_locks_the_alias()
{
    let owner = make_shared((10, 20));
    let second = owner.map(|p| &p.1);
    let w = second.downgrade();

    std::mem::drop(second);
    assert!(!w.expired());
    assert_eq!(*w.lock(), 20);

    std::mem::drop(owner);
    assert!(w.expired());
}
