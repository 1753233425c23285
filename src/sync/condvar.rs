//! # 条件变量（Condvar）同步原语模块
//!
//! ## Overview
//! 条件变量本身 **不保存任何条件状态**，只是一个等待通道；
//! 被等待的条件由调用者提供的 `Lock` 保护。
//!
//! ## Safety
//! - `wait` 的“释放锁 + 睡眠”整段都处于同一个互斥区中：
//!   其他线程在等待者真正进入等待队列之前无法执行 `signal`，
//!   因此不会丢失唤醒
//!
//! ## Behavior
//! 采用 Mesa 语义：被唤醒只说明条件 **可能** 已成立，
//! 调用者必须在持锁状态下循环检查：
//!
//! ```text
//! lock.acquire()
//! while !condition {
//!     cv.wait(&lock)
//! }
//! lock.release()
//! ```

use crate::sync::{kstrdup, IntrGuard, Lock};
use crate::task::{Kernel, WaitChannel};
use alloc::string::String;
use alloc::sync::Arc;

/// 条件变量
pub struct Condvar {
    name: String,
    chan: WaitChannel,
    kernel: Arc<dyn Kernel>,
}

impl Condvar {
    pub fn create(kernel: &Arc<dyn Kernel>, name: &str) -> Option<Self> {
        let name = kstrdup(name)?;
        log::trace!("cv {}: created", name);
        Some(Self {
            name,
            chan: WaitChannel::alloc(),
            kernel: Arc::clone(kernel),
        })
    }

    /// 释放 `lock` 并等待，被唤醒后重新获取 `lock`
    ///
    /// ## Panics
    /// - 调用者未持有 `lock`
    /// - 在中断上下文中调用
    pub fn wait(&self, lock: &Lock) {
        let guard = IntrGuard::new(&*self.kernel);
        assert!(
            lock.holds(),
            "cv {}: wait without holding lock {}",
            self.name,
            lock.name()
        );
        lock.release();
        guard.sleep(self.chan);
        lock.acquire();
    }

    /// 唤醒一个等待者（若存在）
    pub fn signal(&self, lock: &Lock) {
        let guard = IntrGuard::new(&*self.kernel);
        self.assert_caller_holds(lock);
        if guard.wakeup_one(self.chan) {
            log::debug!("cv {}: signal woke 1 waiter", self.name);
        }
    }

    /// 唤醒全部等待者
    pub fn broadcast(&self, lock: &Lock) {
        let guard = IntrGuard::new(&*self.kernel);
        self.assert_caller_holds(lock);
        let woken = guard.wakeup_all(self.chan);
        log::debug!("cv {}: broadcast woke {} waiter(s)", self.name, woken);
    }

    fn assert_caller_holds(&self, lock: &Lock) {
        assert!(
            lock.holds(),
            "cv {}: notify without holding lock {}",
            self.name,
            lock.name()
        );
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> WaitChannel {
        self.chan
    }

    /// 是否有线程阻塞在该条件变量上
    pub fn has_waiters(&self) -> bool {
        let guard = IntrGuard::new(&*self.kernel);
        guard.has_sleepers(self.chan)
    }

    /// 检查没有线程在该条件变量上等待
    pub fn assert_idle(&self) {
        let guard = IntrGuard::new(&*self.kernel);
        assert!(
            !guard.has_sleepers(self.chan),
            "cv {}: destroyed with threads blocked on it",
            self.name
        );
    }

    pub fn destroy(self) {
        self.assert_idle();
        log::trace!("cv {}: destroyed", self.name);
    }
}
