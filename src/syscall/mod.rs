//! 面向用户进程的同步对象系统调用层

mod sync;

pub use sync::SyncTable;
