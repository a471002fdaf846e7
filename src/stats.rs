use std::cell::RefCell;

#[cfg(feature = "global")]
use lazy_static::lazy_static;

/// Control block statistics, for diagnosing leaks and the like.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats
{
    /// Control blocks allocated, of either kind.
    pub blocks_allocated: usize,

    /// Control blocks released.
    pub blocks_freed: usize,

    /// Pointees whose destructor has run because their strong count reached
    /// zero.
    pub pointees_destroyed: usize,

    /// Control blocks that embed their pointee, i.e. one heap allocation
    /// instead of two.
    pub single_allocations: usize,
}

#[allow(dead_code)]
impl Stats
{
    /// Control blocks still in memory.
    pub fn live_blocks(&self) -> usize { self.blocks_allocated - self.blocks_freed }

    /// Pointees not yet destroyed.
    pub fn live_pointees(&self) -> usize { self.blocks_allocated - self.pointees_destroyed }

    fn merge(&mut self, other: &Stats)
    {
        self.blocks_allocated += other.blocks_allocated;
        self.blocks_freed += other.blocks_freed;
        self.pointees_destroyed += other.pointees_destroyed;
        self.single_allocations += other.single_allocations;
    }
}

#[cfg(feature = "global")]
lazy_static! {
    static ref GLOBAL_LEDGER: parking_lot::Mutex<Stats> = parking_lot::Mutex::new(Stats::default());
}

#[cfg(feature = "global")]
fn lock_global() -> lock_api::MutexGuard<'static, parking_lot::RawMutex, Stats>
{
    GLOBAL_LEDGER.lock()
}

struct LocalLedger(Stats);

thread_local! {
    static LOCAL_LEDGER: RefCell<LocalLedger> = RefCell::new(LocalLedger(Stats::default()));
}

impl Drop for LocalLedger
{
    fn drop(&mut self)
    {
        #[cfg(feature = "global")]
        lock_global().merge(&self.0);
    }
}

fn record(f: impl FnOnce(&mut Stats))
{
    // Blocks released while the thread's ledger is being torn down go
    // unrecorded.
    let _ = LOCAL_LEDGER.try_with(|l| {
        if let Ok(mut l) = l.try_borrow_mut() {
            f(&mut l.0)
        }
    });
}

pub(crate) fn block_allocated(single_allocation: bool)
{
    record(|s| {
        s.blocks_allocated += 1;
        if single_allocation {
            s.single_allocations += 1;
        }
    })
}

pub(crate) fn pointee_destroyed() { record(|s| s.pointees_destroyed += 1) }

pub(crate) fn block_freed() { record(|s| s.blocks_freed += 1) }

/// Snapshot of the calling thread's ledger.
pub fn thread_local_stats() -> Stats
{
    LOCAL_LEDGER
        .try_with(|l| l.borrow().0)
        .unwrap_or_default()
}

/// Ledgers of every exited thread, plus the calling thread's.
#[cfg(feature = "global")]
pub fn global_stats() -> Stats
{
    let mut res = *lock_global();
    res.merge(&thread_local_stats());
    res
}
