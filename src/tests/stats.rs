use pretty_assertions::assert_eq;

use crate::{make_shared, stats::thread_local_stats, SharedPtr};

#[test]
fn stress_test()
{
    let n = 500;
    let before = thread_local_stats();

    for _ in 0..n {
        let outer = make_shared(Vec::<SharedPtr<usize>>::new());
        let weak = outer.downgrade();
        for j in 0..n {
            if let Some(v) = weak.lock().get() {
                let _ = v.len();
            }
            let inner = SharedPtr::from_box(Box::new(j));
            let _alias = inner.map(|x| x);
        }
    }

    let after = thread_local_stats();
    assert_eq!(after.blocks_allocated, before.blocks_allocated + n + n * n);
    assert_eq!(after.single_allocations, before.single_allocations + n);
    assert_eq!(after.pointees_destroyed, before.pointees_destroyed + n + n * n);
    assert_eq!(after.live_blocks(), before.live_blocks());
}

#[test]
fn nested_ownership_leaves_nothing_behind()
{
    let before = thread_local_stats();
    let n = 10;
    {
        let root = make_shared(std::cell::RefCell::new(Vec::new()));
        for i in 0..n {
            let child = make_shared(std::cell::RefCell::new(Vec::new()));
            for j in 0..n {
                child.borrow_mut().push(make_shared(i * n + j));
            }
            root.borrow_mut().push(child);
        }
        assert_eq!(thread_local_stats().live_blocks(), before.live_blocks() + 1 + n + n * n);
    }
    assert_eq!(thread_local_stats().live_blocks(), before.live_blocks());
}

#[cfg(feature = "global")]
#[test]
fn exited_threads_merge_into_global_ledger()
{
    use crate::stats::global_stats;

    let before = global_stats();
    std::thread::spawn(|| {
        let a = make_shared(1);
        let _b = a.downgrade();
        let _c = SharedPtr::from_box(Box::new(2));
        let _d = make_shared(3);
    })
    .join()
    .unwrap();

    let after = global_stats();
    assert!(after.blocks_allocated >= before.blocks_allocated + 3);
    assert!(after.blocks_freed >= before.blocks_freed + 3);
}

#[test]
fn live_pointees_drop_before_live_blocks()
{
    let before = thread_local_stats();

    let s = make_shared(7);
    let w = s.downgrade();
    let mid = thread_local_stats();
    assert_eq!(mid.live_pointees(), before.live_pointees() + 1);
    assert_eq!(mid.live_blocks(), before.live_blocks() + 1);

    std::mem::drop(s);
    let expired = thread_local_stats();
    assert_eq!(expired.live_pointees(), before.live_pointees());
    assert_eq!(expired.live_blocks(), before.live_blocks() + 1);

    std::mem::drop(w);
    assert_eq!(thread_local_stats().live_blocks(), before.live_blocks());
}
