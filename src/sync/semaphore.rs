//! # 信号量（Semaphore）同步原语模块
//!
//! ## Overview
//! 计数型信号量，用于管理对有限数量共享资源的访问，
//! 支持经典的 `P / V` 操作。
//!
//! ## Invariants
//! - `count` 永不为负（类型上即为 `usize`）
//! - `count` 只在成功的 `P` 中减少，只在 `V` 中增加
//!
//! ## Behavior
//! - `P`：
//!   - 计数为 0 时在自身通道上睡眠，醒来后重新检查
//! - `V`：
//!   - 计数加一并唤醒 **全部** 等待者
//!   - 等待者在互斥区内逐个重新检查计数，只有计数允许的数量能够继续，
//!     其余重新睡眠

use crate::sync::{kstrdup, IntrCell, IntrGuard};
use crate::task::{Kernel, WaitChannel};
use alloc::string::String;
use alloc::sync::Arc;

/// 信号量
pub struct Semaphore {
    name: String,
    chan: WaitChannel,
    kernel: Arc<dyn Kernel>,
    /// 当前可用资源数，由互斥区保护
    count: IntrCell<usize>,
}

impl Semaphore {
    /// 创建信号量
    ///
    /// ## Returns
    /// - 名称分配失败时返回 `None`
    pub fn create(kernel: &Arc<dyn Kernel>, name: &str, initial_count: usize) -> Option<Self> {
        let name = kstrdup(name)?;
        log::trace!("sem {}: created with count {}", name, initial_count);
        Some(Self {
            name,
            chan: WaitChannel::alloc(),
            kernel: Arc::clone(kernel),
            count: IntrCell::new(initial_count),
        })
    }

    /// P 操作
    ///
    /// ## Panics
    /// - 在中断上下文中调用（即使无需阻塞也会检查）
    pub fn p(&self) {
        let guard = IntrGuard::new(&*self.kernel);
        loop {
            let taken = self.count.session(&guard, |count| {
                if *count == 0 {
                    false
                } else {
                    *count -= 1;
                    true
                }
            });
            if taken {
                return;
            }
            log::debug!("sem {}: blocking", self.name);
            guard.sleep(self.chan);
        }
    }

    /// V 操作
    ///
    /// ## Panics
    /// - 计数溢出
    pub fn v(&self) {
        let guard = IntrGuard::new(&*self.kernel);
        self.count.session(&guard, |count| {
            *count = match count.checked_add(1) {
                Some(next) => next,
                None => panic!("sem {}: count overflow", self.name),
            };
        });
        let woken = guard.wakeup_all(self.chan);
        if woken > 0 {
            log::debug!("sem {}: woke {} waiter(s)", self.name, woken);
        }
    }

    /// 当前计数
    pub fn count(&self) -> usize {
        let guard = IntrGuard::new(&*self.kernel);
        self.count.session(&guard, |count| *count)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> WaitChannel {
        self.chan
    }

    /// 是否有线程阻塞在该信号量上
    pub fn has_waiters(&self) -> bool {
        let guard = IntrGuard::new(&*self.kernel);
        guard.has_sleepers(self.chan)
    }

    /// 检查没有线程阻塞在该信号量上
    ///
    /// ## Panics
    /// - 存在等待者
    pub fn assert_idle(&self) {
        let guard = IntrGuard::new(&*self.kernel);
        assert!(
            !guard.has_sleepers(self.chan),
            "sem {}: destroyed with threads blocked on it",
            self.name
        );
    }

    /// 销毁信号量
    pub fn destroy(self) {
        self.assert_idle();
        log::trace!("sem {}: destroyed", self.name);
    }
}
