//! # 互斥锁（Lock）同步原语模块
//!
//! ## Overview
//! 单持有者的阻塞互斥锁，记录当前持有者，用于：
//! - 检测自身重复加锁（非递归锁，直接 panic）
//! - 检测非持有者释放
//! - 提供 `holds` 查询，供条件变量与调用者断言持锁
//!
//! ## Invariants
//! - `owner.is_some()` 即表示锁被持有
//! - 任意时刻最多一个线程是 `owner`
//!
//! ## Behavior
//! - `acquire`：
//!   - 锁空闲时在互斥区内直接取得所有权
//!   - 否则在自身通道上睡眠，醒来后重新完整检查一遍
//! - `release`：
//!   - 清除持有者并唤醒 **全部** 等待者
//!   - 等待者在互斥区内重新竞争，检查与取得所有权是同一个互斥区步骤，
//!     因此恰好一个能成功
//! - `destroy`：
//!   - 只断言锁空闲且无等待者，绝不代为释放

use crate::sync::{kstrdup, IntrCell, IntrGuard};
use crate::task::{Kernel, Tid, WaitChannel};
use alloc::string::String;
use alloc::sync::Arc;

/// 互斥锁
pub struct Lock {
    name: String,
    chan: WaitChannel,
    kernel: Arc<dyn Kernel>,
    /// 当前持有者，由互斥区保护
    owner: IntrCell<Option<Tid>>,
}

impl Lock {
    /// 创建互斥锁，初始为空闲
    pub fn create(kernel: &Arc<dyn Kernel>, name: &str) -> Option<Self> {
        let name = kstrdup(name)?;
        log::trace!("lock {}: created", name);
        Some(Self {
            name,
            chan: WaitChannel::alloc(),
            kernel: Arc::clone(kernel),
            owner: IntrCell::new(None),
        })
    }

    /// 获取互斥锁，必要时阻塞
    ///
    /// ## Panics
    /// - 在中断上下文中调用
    /// - 当前线程已持有该锁
    pub fn acquire(&self) {
        let guard = IntrGuard::new(&*self.kernel);
        let me = self.kernel.current_tid();
        loop {
            let acquired = self.owner.session(&guard, |owner| match *owner {
                None => {
                    *owner = Some(me);
                    true
                }
                Some(holder) => {
                    assert!(holder != me, "lock {}: already held by {:?}", self.name, me);
                    false
                }
            });
            if acquired {
                return;
            }
            log::debug!("lock {}: {:?} blocking", self.name, me);
            guard.sleep(self.chan);
        }
    }

    /// 释放互斥锁
    ///
    /// ## Panics
    /// - 当前线程不是持有者
    pub fn release(&self) {
        let guard = IntrGuard::new(&*self.kernel);
        let me = self.kernel.current_tid();
        self.owner.session(&guard, |owner| {
            assert!(
                *owner == Some(me),
                "lock {}: released by {:?}, owner is {:?}",
                self.name,
                me,
                *owner
            );
            *owner = None;
        });
        guard.wakeup_all(self.chan);
    }

    /// 当前线程是否持有该锁
    pub fn holds(&self) -> bool {
        let guard = IntrGuard::new(&*self.kernel);
        let me = self.kernel.current_tid();
        self.owner.session(&guard, |owner| *owner == Some(me))
    }

    /// 是否有任何线程持有该锁
    pub fn is_held(&self) -> bool {
        let guard = IntrGuard::new(&*self.kernel);
        self.owner.session(&guard, |owner| owner.is_some())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> WaitChannel {
        self.chan
    }

    /// 是否有线程阻塞在该锁上
    pub fn has_waiters(&self) -> bool {
        let guard = IntrGuard::new(&*self.kernel);
        guard.has_sleepers(self.chan)
    }

    /// 检查锁空闲且无等待者
    ///
    /// ## Panics
    /// - 锁仍被持有，或有线程阻塞在该锁上
    pub fn assert_idle(&self) {
        let guard = IntrGuard::new(&*self.kernel);
        self.owner.session(&guard, |owner| {
            assert!(
                owner.is_none(),
                "lock {}: destroyed while held by {:?}",
                self.name,
                *owner
            );
        });
        assert!(
            !guard.has_sleepers(self.chan),
            "lock {}: destroyed with threads blocked on it",
            self.name
        );
    }

    /// 销毁互斥锁
    pub fn destroy(self) {
        self.assert_idle();
        log::trace!("lock {}: destroyed", self.name);
    }
}
