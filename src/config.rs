//! 编译期配置常量

/// 每个进程每类同步对象（信号量 / 互斥锁 / 条件变量）的最大数量
pub const MAX_SYNC_OBJECTS: usize = 128;
