//! # 同步对象表的错误类型
//!
//! ## Overview
//! 只有对象表（按编号访问同步对象）存在可恢复错误；
//! 原语本身的误用一律 panic，分配失败由 `create` 返回 `None` 表示；
//! 用户进程经由对象表造成的同类误用在表层被拦截并以错误码返回。

use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// 编号不存在或对象已被销毁
    NoSuchObject,
    /// 对象表已满
    TableFull,
    /// 创建对象时分配失败
    OutOfMemory,
    /// 调用者未持有该互斥锁
    NotOwner,
    /// 对象仍被持有或仍有线程阻塞在其上
    Busy,
    /// 调用者已持有该互斥锁，再次加锁会自锁
    WouldDeadlock,
}

impl SyncError {
    /// 系统调用返回值
    pub fn errno(self) -> isize {
        match self {
            SyncError::NoSuchObject => -1,
            SyncError::TableFull => -2,
            SyncError::OutOfMemory => -3,
            SyncError::NotOwner => -4,
            SyncError::Busy => -5,
            SyncError::WouldDeadlock => -6,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NoSuchObject => write!(f, "no such sync object"),
            SyncError::TableFull => write!(f, "sync object table is full"),
            SyncError::OutOfMemory => write!(f, "out of memory"),
            SyncError::NotOwner => write!(f, "mutex not held by caller"),
            SyncError::Busy => write!(f, "sync object is in use"),
            SyncError::WouldDeadlock => write!(f, "mutex already held by caller"),
        }
    }
}

impl From<SyncError> for isize {
    fn from(err: SyncError) -> isize {
        err.errno()
    }
}
