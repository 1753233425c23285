//! # 中断屏蔽抽象
//!
//! ## Overview
//! 内核在单处理器上通过提升执行优先级（关中断）来构造互斥区，
//! 本模块只描述该机制的接口，由具体架构实现。
//!
//! ## Invariants
//! - `enter` 可以嵌套，只有最外层的 `enter` 真正占有互斥区
//! - `exit` 必须与 `enter` 成对出现，并传回 `enter` 的返回值

/// 进入互斥区之前的屏蔽级别
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplLevel {
    /// 进入前未屏蔽，`exit` 时交还互斥区
    Enabled,
    /// 嵌套进入，`exit` 时保持屏蔽
    Masked,
}

/// 中断屏蔽接口
///
/// ## Safety
/// - 实现者需保证：在某线程持有互斥区期间，其他线程无法进入任何互斥区
/// - 持有互斥区的线程调用 `Scheduler::sleep` 后，互斥区随处理器一起让出，
///   线程恢复运行时重新持有
pub trait IntrMasking: Send + Sync {
    /// 当前是否处于中断处理上下文
    fn in_interrupt(&self) -> bool;
    /// 屏蔽中断，返回进入前的级别
    fn enter(&self) -> SplLevel;
    /// 恢复到 `prev` 级别
    fn exit(&self, prev: SplLevel);
}
