//! # 线程标识与等待队列接口
//!
//! ## Overview
//! 同步原语依赖调度器提供两类能力：
//! - 识别当前正在运行的线程（`Tid`）
//! - 以等待通道（`WaitChannel`）为键睡眠与唤醒线程
//!
//! 调度与就绪队列本身不在本 crate 中实现。
//!
//! ## Assumptions
//! - `sleep` 只会在持有互斥区时调用
//! - 被唤醒的线程重新获得互斥区后才从 `sleep` 返回

use crate::hal::IntrMasking;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

/// 线程标识
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tid(pub usize);

/// 等待通道
///
/// 每个同步原语在创建时分配一个唯一的通道，
/// 作为其在等待队列中的键，原语的值被移动后依然有效。
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitChannel(usize);

static NEXT_CHANNEL: AtomicUsize = AtomicUsize::new(1);

impl WaitChannel {
    /// 分配一个新的等待通道
    pub fn alloc() -> Self {
        Self(NEXT_CHANNEL.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for WaitChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chan#{}", self.0)
    }
}

/// 调度器提供的等待队列接口
pub trait Scheduler: Send + Sync {
    /// 当前正在运行的线程
    fn current_tid(&self) -> Tid;

    /// 在 `chan` 上睡眠
    ///
    /// ## Behavior
    /// - 原子地让出互斥区与处理器
    /// - 被唤醒后重新持有互斥区再返回
    fn sleep(&self, chan: WaitChannel);

    /// 唤醒 `chan` 上的一个线程，返回是否有线程被唤醒
    fn wakeup_one(&self, chan: WaitChannel) -> bool;

    /// 唤醒 `chan` 上的全部线程，返回被唤醒的数量
    fn wakeup_all(&self, chan: WaitChannel) -> usize;

    /// `chan` 上是否有线程在睡眠
    fn has_sleepers(&self, chan: WaitChannel) -> bool;
}

/// 同步原语所需的全部内核服务
pub trait Kernel: IntrMasking + Scheduler {}

impl<T: IntrMasking + Scheduler + ?Sized> Kernel for T {}
