//! 宿主机上的单处理器模拟，仅用于测试
//!
//! 每个 std 线程扮演一个内核线程。互斥区是一个“处理器所有权”：
//! 同一时刻只有一个线程持有，`sleep` 在交出所有权前先把调用者挂到等待通道上。

use crate::hal::{IntrMasking, SplLevel};
use crate::task::{Scheduler, Tid, WaitChannel};
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::sync::Arc;
use core::cell::Cell;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

static NEXT_TID: AtomicUsize = AtomicUsize::new(1);

std::thread_local! {
    static CURRENT_TID: Cell<Option<Tid>> = const { Cell::new(None) };
}

fn current() -> Tid {
    CURRENT_TID.with(|cell| match cell.get() {
        Some(tid) => tid,
        None => {
            let tid = Tid(NEXT_TID.fetch_add(1, Ordering::Relaxed));
            cell.set(Some(tid));
            tid
        }
    })
}

#[derive(Default)]
struct CpuState {
    /// 当前持有互斥区的线程
    owner: Option<Tid>,
    sleepers: BTreeMap<WaitChannel, VecDeque<Tid>>,
    in_interrupt: BTreeSet<Tid>,
}

impl CpuState {
    fn is_sleeping(&self, chan: WaitChannel, tid: Tid) -> bool {
        self.sleepers
            .get(&chan)
            .is_some_and(|queue| queue.contains(&tid))
    }
}

pub(crate) struct TestKernel {
    state: Mutex<CpuState>,
    changed: Condvar,
}

impl TestKernel {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(CpuState::default()),
            changed: Condvar::new(),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, CpuState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_changed<'a>(&self, state: MutexGuard<'a, CpuState>) -> MutexGuard<'a, CpuState> {
        self.changed
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// 将当前线程标记为处于（或离开）中断上下文
    pub(crate) fn set_in_interrupt(&self, flag: bool) {
        let tid = current();
        let mut state = self.lock_state();
        if flag {
            state.in_interrupt.insert(tid);
        } else {
            state.in_interrupt.remove(&tid);
        }
    }

    pub(crate) fn sleepers(&self, chan: WaitChannel) -> usize {
        self.lock_state().sleepers.get(&chan).map_or(0, VecDeque::len)
    }

    /// 阻塞直到 `chan` 上至少有 `n` 个睡眠线程
    pub(crate) fn wait_for_sleepers(&self, chan: WaitChannel, n: usize) {
        let mut state = self.lock_state();
        while state.sleepers.get(&chan).map_or(0, VecDeque::len) < n {
            state = self.wait_changed(state);
        }
    }
}

impl IntrMasking for TestKernel {
    fn in_interrupt(&self) -> bool {
        self.lock_state().in_interrupt.contains(&current())
    }

    fn enter(&self) -> SplLevel {
        let me = current();
        let mut state = self.lock_state();
        if state.owner == Some(me) {
            return SplLevel::Masked;
        }
        while state.owner.is_some() {
            state = self.wait_changed(state);
        }
        state.owner = Some(me);
        SplLevel::Enabled
    }

    fn exit(&self, prev: SplLevel) {
        let mut state = self.lock_state();
        assert_eq!(state.owner, Some(current()), "exit without holding the region");
        if prev == SplLevel::Enabled {
            state.owner = None;
            self.changed.notify_all();
        }
    }
}

impl Scheduler for TestKernel {
    fn current_tid(&self) -> Tid {
        current()
    }

    fn sleep(&self, chan: WaitChannel) {
        let me = current();
        let mut state = self.lock_state();
        assert_eq!(state.owner, Some(me), "sleep without holding the region");
        state.sleepers.entry(chan).or_default().push_back(me);
        state.owner = None;
        self.changed.notify_all();
        while state.is_sleeping(chan, me) || state.owner.is_some() {
            state = self.wait_changed(state);
        }
        state.owner = Some(me);
    }

    fn wakeup_one(&self, chan: WaitChannel) -> bool {
        let mut state = self.lock_state();
        let woken = state
            .sleepers
            .get_mut(&chan)
            .and_then(VecDeque::pop_front)
            .is_some();
        if state.sleepers.get(&chan).is_some_and(VecDeque::is_empty) {
            state.sleepers.remove(&chan);
        }
        self.changed.notify_all();
        woken
    }

    fn wakeup_all(&self, chan: WaitChannel) -> usize {
        let mut state = self.lock_state();
        let woken = state.sleepers.remove(&chan).map_or(0, |queue| queue.len());
        self.changed.notify_all();
        woken
    }

    fn has_sleepers(&self, chan: WaitChannel) -> bool {
        self.lock_state()
            .sleepers
            .get(&chan)
            .is_some_and(|queue| !queue.is_empty())
    }
}
