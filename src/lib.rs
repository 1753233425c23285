//! # 内核同步核心（synch）
//!
//! ## Overview
//! 为单地址空间、默认非抢占的内核提供基础互斥与通知原语：
//! - `Semaphore`：计数型信号量（P / V）
//! - `Lock`：带持有者记录的非递归互斥锁
//! - `Condvar`：Mesa 语义的条件变量，与外部提供的 `Lock` 配合使用
//!
//! 调度器、等待队列与中断屏蔽均为外部协作者，仅以 trait 形式出现：
//! - `hal::IntrMasking`：中断屏蔽（互斥区）
//! - `task::Scheduler`：当前线程标识、睡眠 / 唤醒
//!
//! `syscall` 模块在此之上提供按进程编号管理的同步对象表。

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod console;
pub mod error;
pub mod hal;
pub mod sync;
pub mod syscall;
pub mod task;

#[cfg(test)]
mod test_kernel;

pub use error::SyncError;
pub use hal::{IntrMasking, SplLevel};
pub use sync::{Condvar, IntrCell, IntrGuard, Lock, Semaphore};
pub use task::{Kernel, Scheduler, Tid, WaitChannel};
