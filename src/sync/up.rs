//! # 单处理器互斥区封装
//!
//! ## Overview
//! 同步原语的所有内部逻辑都运行在“关中断”互斥区中。本模块提供两件工具：
//! - `IntrGuard`：RAII 形式的互斥区，构造时屏蔽中断，Drop 时恢复
//! - `IntrCell`：只有在持有 `IntrGuard` 时才能访问的内部可变状态
//!
//! ## Assumptions
//! - 单处理器，同一时刻只有一个线程位于互斥区内
//! - `Scheduler::sleep` 会原子地让出互斥区，并在返回前重新持有
//!
//! ## Invariants
//! - `IntrGuard` 存活期间，当前线程持有互斥区
//! - 无论正常返回、提前返回还是 panic 展开，`IntrGuard` 都会恢复进入前的级别
//! - `IntrCell` 的借用只存在于 `session` 闭包内，不会跨越睡眠
//!
//! ## Behavior
//! - 在中断上下文中构造 `IntrGuard` 直接 panic（中断中不能阻塞）
//! - `IntrCell` 的借用冲突直接 panic（与 `RefCell` 语义一致）

use crate::hal::SplLevel;
use crate::task::{Kernel, WaitChannel};
use spin::Mutex;

/// 互斥区守卫
pub struct IntrGuard<'a> {
    kernel: &'a dyn Kernel,
    /// 进入前的屏蔽级别
    prev: SplLevel,
}

impl<'a> IntrGuard<'a> {
    /// 进入互斥区
    ///
    /// ## Panics
    /// - 处于中断上下文时
    pub fn new(kernel: &'a dyn Kernel) -> Self {
        assert!(
            !kernel.in_interrupt(),
            "sync primitive used from interrupt context"
        );
        let prev = kernel.enter();
        Self { kernel, prev }
    }

    /// 在 `chan` 上睡眠，返回时仍持有互斥区
    pub fn sleep(&self, chan: WaitChannel) {
        self.kernel.sleep(chan);
    }

    pub fn wakeup_one(&self, chan: WaitChannel) -> bool {
        self.kernel.wakeup_one(chan)
    }

    pub fn wakeup_all(&self, chan: WaitChannel) -> usize {
        self.kernel.wakeup_all(chan)
    }

    pub fn has_sleepers(&self, chan: WaitChannel) -> bool {
        self.kernel.has_sleepers(chan)
    }
}

impl Drop for IntrGuard<'_> {
    fn drop(&mut self) {
        self.kernel.exit(self.prev);
    }
}

/// 受互斥区保护的内部可变状态
///
/// ## Overview
/// 内部使用 `spin::Mutex` 仅作借用检查：持有互斥区时它永远不会被争用，
/// 一旦 `try_lock` 失败就说明同一状态被重入借用。
pub struct IntrCell<T> {
    inner: Mutex<T>,
}

impl<T> IntrCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// 在互斥区内访问内部状态
    ///
    /// ## Panics
    /// - 状态已被借用（重入）
    pub fn session<F, V>(&self, _guard: &IntrGuard<'_>, f: F) -> V
    where
        F: FnOnce(&mut T) -> V,
    {
        let mut inner = match self.inner.try_lock() {
            Some(inner) => inner,
            None => panic!("IntrCell already borrowed"),
        };
        f(&mut inner)
    }
}
