//! # 同步对象系统调用模块
//!
//! ## Overview
//! 以 **进程私有资源表** 的形式向用户进程提供同步原语：
//! - 信号量的创建、P/V 操作与销毁
//! - 互斥锁的创建、加锁、解锁与销毁
//! - 条件变量的创建、等待、唤醒与销毁
//!
//! 每个进程持有一个 `SyncTable`，对象以表内下标作为 ID 返回给用户态。
//!
//! ## Safety
//! - 对资源表的访问都在互斥区内完成
//! - 在调用可能阻塞的操作（`down` / `lock` / `wait`）前，
//!   先克隆出 `Arc` 并退出资源表的互斥区
//!
//! ## Invariants
//! - 表项 `Some(Arc<T>)` 表示已分配对象，`None` 表示可复用的空槽位
//! - 每类对象最多 `MAX_SYNC_OBJECTS` 个
//!
//! ## Behavior
//! - 非法或已销毁的 ID 返回 `SyncError::NoSuchObject`
//! - 用户进程的持锁误用在调用原语之前被拦截，不会触发原语的 panic：
//!   - 解锁 / 等待 / 唤醒时未持有互斥锁：`SyncError::NotOwner`
//!   - 重复加锁：`SyncError::WouldDeadlock`
//!   - 销毁仍被持有或仍有等待者的对象：`SyncError::Busy`

use crate::config::MAX_SYNC_OBJECTS;
use crate::error::SyncError;
use crate::sync::{Condvar, IntrCell, IntrGuard, Lock, Semaphore};
use crate::task::Kernel;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// 进程私有的同步对象表
pub struct SyncTable {
    kernel: Arc<dyn Kernel>,
    inner: IntrCell<SyncTableInner>,
}

struct SyncTableInner {
    semaphore_list: Vec<Option<Arc<Semaphore>>>,
    mutex_list: Vec<Option<Arc<Lock>>>,
    condvar_list: Vec<Option<Arc<Condvar>>>,
}

/// 在第一个空槽位（或表尾）放入新对象，返回其 ID
fn insert<T, F>(list: &mut Vec<Option<Arc<T>>>, make: F) -> Result<usize, SyncError>
where
    F: FnOnce(usize) -> Option<T>,
{
    let id = list
        .iter()
        .position(Option::is_none)
        .unwrap_or(list.len());
    if id >= MAX_SYNC_OBJECTS {
        return Err(SyncError::TableFull);
    }
    let object = Arc::new(make(id).ok_or(SyncError::OutOfMemory)?);
    if id == list.len() {
        list.push(Some(object));
    } else {
        list[id] = Some(object);
    }
    Ok(id)
}

fn lookup<T>(list: &[Option<Arc<T>>], id: usize) -> Result<Arc<T>, SyncError> {
    list.get(id)
        .and_then(Option::as_ref)
        .map(Arc::clone)
        .ok_or(SyncError::NoSuchObject)
}

/// 对象空闲时将其移出表
///
/// 检查与移除在同一个互斥区会话中完成，其间不会有线程开始等待。
fn take_idle<T, F>(list: &mut [Option<Arc<T>>], id: usize, busy: F) -> Result<Arc<T>, SyncError>
where
    F: FnOnce(&T) -> bool,
{
    let object = lookup(list, id)?;
    if busy(&*object) {
        return Err(SyncError::Busy);
    }
    list.get_mut(id)
        .and_then(Option::take)
        .ok_or(SyncError::NoSuchObject)
}

impl SyncTable {
    pub fn new(kernel: &Arc<dyn Kernel>) -> Self {
        Self {
            kernel: Arc::clone(kernel),
            inner: IntrCell::new(SyncTableInner {
                semaphore_list: Vec::new(),
                mutex_list: Vec::new(),
                condvar_list: Vec::new(),
            }),
        }
    }

    /// 在互斥区内访问资源表，返回前退出互斥区
    fn inner_session<F, V>(&self, f: F) -> V
    where
        F: FnOnce(&mut SyncTableInner) -> V,
    {
        let guard = IntrGuard::new(&*self.kernel);
        self.inner.session(&guard, f)
    }

    /// 创建一个信号量
    ///
    /// ## Returns
    /// - 信号量在表中的 ID
    pub fn semaphore_create(&self, res_count: usize) -> Result<usize, SyncError> {
        let kernel = &self.kernel;
        self.inner_session(|inner| {
            insert(&mut inner.semaphore_list, |id| {
                Semaphore::create(kernel, &format!("sem#{}", id), res_count)
            })
        })
    }

    /// V 操作
    pub fn semaphore_up(&self, sem_id: usize) -> Result<(), SyncError> {
        let sem = self.inner_session(|inner| lookup(&inner.semaphore_list, sem_id))?;
        sem.v();
        Ok(())
    }

    /// P 操作，资源不足时阻塞
    pub fn semaphore_down(&self, sem_id: usize) -> Result<(), SyncError> {
        let sem = self.inner_session(|inner| lookup(&inner.semaphore_list, sem_id))?;
        sem.p();
        Ok(())
    }

    /// 销毁信号量，仍有线程阻塞时返回 `Busy`
    pub fn semaphore_destroy(&self, sem_id: usize) -> Result<(), SyncError> {
        let sem = self.inner_session(|inner| {
            take_idle(&mut inner.semaphore_list, sem_id, Semaphore::has_waiters)
        })?;
        log::trace!("sem {}: removed from table", sem.name());
        Ok(())
    }

    /// 创建一个互斥锁
    pub fn mutex_create(&self) -> Result<usize, SyncError> {
        let kernel = &self.kernel;
        self.inner_session(|inner| {
            insert(&mut inner.mutex_list, |id| {
                Lock::create(kernel, &format!("lock#{}", id))
            })
        })
    }

    /// 加锁，锁被占用时阻塞
    pub fn mutex_lock(&self, mutex_id: usize) -> Result<(), SyncError> {
        let mutex = self.inner_session(|inner| lookup(&inner.mutex_list, mutex_id))?;
        // 只有调用者自己能改变 holds() 的结果，检查后直接加锁即可
        if mutex.holds() {
            return Err(SyncError::WouldDeadlock);
        }
        mutex.acquire();
        Ok(())
    }

    /// 解锁，调用者不是持有者时返回 `NotOwner`
    pub fn mutex_unlock(&self, mutex_id: usize) -> Result<(), SyncError> {
        let mutex = self.inner_session(|inner| lookup(&inner.mutex_list, mutex_id))?;
        if !mutex.holds() {
            return Err(SyncError::NotOwner);
        }
        mutex.release();
        Ok(())
    }

    /// 销毁互斥锁，锁仍被持有或有等待者时返回 `Busy`
    pub fn mutex_destroy(&self, mutex_id: usize) -> Result<(), SyncError> {
        let mutex = self.inner_session(|inner| {
            take_idle(&mut inner.mutex_list, mutex_id, |mutex: &Lock| {
                mutex.is_held() || mutex.has_waiters()
            })
        })?;
        log::trace!("lock {}: removed from table", mutex.name());
        Ok(())
    }

    /// 创建一个条件变量
    pub fn condvar_create(&self) -> Result<usize, SyncError> {
        let kernel = &self.kernel;
        self.inner_session(|inner| {
            insert(&mut inner.condvar_list, |id| {
                Condvar::create(kernel, &format!("cv#{}", id))
            })
        })
    }

    /// 唤醒一个等待者
    pub fn condvar_signal(&self, condvar_id: usize, mutex_id: usize) -> Result<(), SyncError> {
        let (condvar, mutex) = self.condvar_pair(condvar_id, mutex_id)?;
        condvar.signal(&mutex);
        Ok(())
    }

    /// 唤醒全部等待者
    pub fn condvar_broadcast(&self, condvar_id: usize, mutex_id: usize) -> Result<(), SyncError> {
        let (condvar, mutex) = self.condvar_pair(condvar_id, mutex_id)?;
        condvar.broadcast(&mutex);
        Ok(())
    }

    /// 释放互斥锁并在条件变量上等待，被唤醒后重新加锁
    pub fn condvar_wait(&self, condvar_id: usize, mutex_id: usize) -> Result<(), SyncError> {
        let (condvar, mutex) = self.condvar_pair(condvar_id, mutex_id)?;
        condvar.wait(&mutex);
        Ok(())
    }

    pub fn condvar_destroy(&self, condvar_id: usize) -> Result<(), SyncError> {
        let condvar = self.inner_session(|inner| {
            take_idle(&mut inner.condvar_list, condvar_id, Condvar::has_waiters)
        })?;
        log::trace!("cv {}: removed from table", condvar.name());
        Ok(())
    }

    /// 取出条件变量与互斥锁，调用者未持有互斥锁时返回 `NotOwner`
    fn condvar_pair(
        &self,
        condvar_id: usize,
        mutex_id: usize,
    ) -> Result<(Arc<Condvar>, Arc<Lock>), SyncError> {
        let (condvar, mutex) = self.inner_session(|inner| {
            Ok::<_, SyncError>((
                lookup(&inner.condvar_list, condvar_id)?,
                lookup(&inner.mutex_list, mutex_id)?,
            ))
        })?;
        if !mutex.holds() {
            return Err(SyncError::NotOwner);
        }
        Ok((condvar, mutex))
    }
}
