use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info};

use hax_core::{HaxError, HaxResult, RuntimeFacade};

/// 后端运行时的单线程接管权
///
/// 同一时刻只允许一个线程持有接管权。[`ThreadAffinity::adopt`] 返回的
/// 守卫不能跨线程移动，析构时（包括panic展开）自动注销线程。
pub struct ThreadAffinity {
    runtime: Arc<dyn RuntimeFacade>,
    holder: Mutex<Option<String>>,
}

impl ThreadAffinity {
    pub fn new(runtime: Arc<dyn RuntimeFacade>) -> Self {
        Self {
            runtime,
            holder: Mutex::new(None),
        }
    }

    /// 将当前线程注册为后端线程
    pub fn adopt(&self) -> HaxResult<AdoptedRuntime<'_>> {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = holder.as_ref() {
            return Err(HaxError::ThreadAlreadyAdopted {
                holder: current.clone(),
            });
        }

        self.runtime.adopt_thread()?;

        let thread_name = current_thread_label();
        info!("线程 {} 已接管后端运行时", thread_name);
        *holder = Some(thread_name);

        Ok(AdoptedRuntime {
            affinity: self,
            _not_send: PhantomData,
        })
    }

    /// 当前持有接管权的线程
    pub fn holder(&self) -> Option<String> {
        self.holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_adopted(&self) -> bool {
        self.holder().is_some()
    }

    fn release(&self) {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);

        if let Err(e) = self.runtime.release_thread() {
            error!("注销后端线程失败: {}", e);
        }

        if let Some(thread_name) = holder.take() {
            info!("线程 {} 已释放后端运行时", thread_name);
        }
    }
}

/// 已接管的后端运行时
pub struct AdoptedRuntime<'a> {
    affinity: &'a ThreadAffinity,
    _not_send: PhantomData<*const ()>,
}

impl AdoptedRuntime<'_> {
    pub fn runtime(&self) -> &(dyn RuntimeFacade + 'static) {
        self.affinity.runtime.as_ref()
    }
}

impl Deref for AdoptedRuntime<'_> {
    type Target = dyn RuntimeFacade;

    fn deref(&self) -> &Self::Target {
        self.runtime()
    }
}

impl Drop for AdoptedRuntime<'_> {
    fn drop(&mut self) {
        self.affinity.release();
    }
}

fn current_thread_label() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hax_testing_utils::MockRuntime;

    #[test]
    fn test_adopt_and_release() {
        let runtime = Arc::new(MockRuntime::new());
        let affinity = ThreadAffinity::new(runtime.clone());

        {
            let adopted = affinity.adopt().unwrap();
            assert!(affinity.is_adopted());
            assert_eq!(runtime.adopt_count(), 1);
            adopted.start_repair(&hax_core::Fid::new(1, 1)).unwrap();
        }

        assert!(!affinity.is_adopted());
        assert_eq!(runtime.release_count(), 1);
    }

    #[test]
    fn test_guard_hands_out_runtime_reference() {
        fn pause(runtime: &dyn RuntimeFacade, key: u64) {
            runtime.pause_rebalance(&hax_core::Fid::new(0x6f, key)).unwrap();
        }

        let runtime = Arc::new(MockRuntime::new());
        let affinity = ThreadAffinity::new(runtime.clone());
        let adopted = affinity.adopt().unwrap();

        pause(&*adopted, 1);
        pause(adopted.runtime(), 2);
        drop(adopted);

        assert_eq!(
            runtime.calls(),
            vec![
                hax_testing_utils::RuntimeCall::PauseRebalance(hax_core::Fid::new(0x6f, 1)),
                hax_testing_utils::RuntimeCall::PauseRebalance(hax_core::Fid::new(0x6f, 2)),
            ]
        );
        assert_eq!(runtime.release_count(), 1);
    }

    #[test]
    fn test_second_adopt_is_rejected() {
        let runtime = Arc::new(MockRuntime::new());
        let affinity = ThreadAffinity::new(runtime.clone());

        let _adopted = affinity.adopt().unwrap();
        match affinity.adopt() {
            Err(HaxError::ThreadAlreadyAdopted { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("second adopt must fail"),
        }
        assert_eq!(runtime.adopt_count(), 1);
    }

    #[test]
    fn test_release_on_panic() {
        let runtime = Arc::new(MockRuntime::new());
        let affinity = ThreadAffinity::new(runtime.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _adopted = affinity.adopt().unwrap();
            panic!("handler blew up");
        }));

        assert!(result.is_err());
        assert!(!affinity.is_adopted());
        assert_eq!(runtime.release_count(), 1);
    }

    #[test]
    fn test_failed_adopt_leaves_no_holder() {
        let runtime = Arc::new(MockRuntime::new());
        runtime.fail_adopt();
        let affinity = ThreadAffinity::new(runtime.clone());

        assert!(affinity.adopt().is_err());
        assert!(!affinity.is_adopted());
        assert_eq!(runtime.release_count(), 0);
    }
}
