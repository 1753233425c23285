//! # 内核同步原语模块（sync）
//!
//! ## Overview
//! 本模块是内核基础同步原语的统一入口：
//! - `semaphore`：计数型信号量
//! - `lock`：带持有者记录的阻塞互斥锁
//! - `condvar`：条件变量
//! - `up`：单处理器互斥区与受保护状态
//!
//! ## Assumptions
//! - 所有原语都只依赖 `IntrGuard` 提供的互斥区与 `Scheduler` 的睡眠 / 唤醒
//! - 原语实例由创建它的子系统持有，生命周期覆盖所有可能引用它的线程
//!
//! ## Invariants
//! - 原语内部状态只在互斥区内读写
//! - 原语只会在自己的等待通道上睡眠
//! - 被唤醒只是提示，所有等待循环在醒来后都重新检查条件
//!
//! ## Behavior
//! - `create` 在分配失败时返回 `None`
//! - 违反使用约定（销毁仍有等待者的原语、非持有者释放锁、
//!   在中断上下文中调用等）直接 panic

mod condvar;
mod lock;
mod semaphore;
mod up;

pub use condvar::Condvar;
pub use lock::Lock;
pub use semaphore::Semaphore;
pub use up::{IntrCell, IntrGuard};

use alloc::string::String;

/// 复制原语名称
///
/// 分配失败时返回 `None`，而不是中止内核。
pub(crate) fn kstrdup(name: &str) -> Option<String> {
    let mut dup = String::new();
    dup.try_reserve_exact(name.len()).ok()?;
    dup.push_str(name);
    Some(dup)
}
