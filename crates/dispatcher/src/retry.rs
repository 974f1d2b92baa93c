use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use hax_config::RetryConfig;
use hax_core::{HaxError, HaxResult};

use crate::stats::DispatcherStats;

/// 重试策略配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 两次尝试之间的固定间隔
    pub delay: Duration,
    /// 最大尝试次数，`None` 表示一直重试到成功
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// 不限次数的固定间隔重试
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            delay: config.delay(),
            max_attempts: config.max_attempts,
        }
    }
}

/// 一次被包装调用的结果
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Completed { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: HaxError },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Completed { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RetryOutcome::Completed { .. })
    }

    /// 耗尽重试时转换为 `RetryExhausted`
    pub fn into_result(self, operation: &str) -> HaxResult<T> {
        match self {
            RetryOutcome::Completed { value, .. } => Ok(value),
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(HaxError::RetryExhausted {
                operation: operation.to_string(),
                attempts,
                last_error: last_error.to_string(),
            }),
        }
    }
}

/// 固定间隔重试包装器
///
/// 失败只记录日志，不会传给调用方。调用在分发线程上同步执行，
/// 重试期间会阻塞后续命令。
#[derive(Debug, Clone, Default)]
pub struct RetryWrapper {
    policy: RetryPolicy,
    stats: Option<Arc<DispatcherStats>>,
}

impl RetryWrapper {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            stats: None,
        }
    }

    /// 每次失败的尝试都记入统计
    pub fn with_stats(policy: RetryPolicy, stats: Arc<DispatcherStats>) -> Self {
        Self {
            policy,
            stats: Some(stats),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// 执行 `call`，失败后等待固定间隔再次执行
    pub fn run<T, F>(&self, operation: &str, mut call: F) -> RetryOutcome<T>
    where
        F: FnMut() -> HaxResult<T>,
    {
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            match call() {
                Ok(value) => {
                    if attempts > 1 {
                        info!("{} 在第 {} 次尝试后成功", operation, attempts);
                    }
                    return RetryOutcome::Completed { value, attempts };
                }
                Err(e) => {
                    if let Some(stats) = &self.stats {
                        stats.record_retry(operation);
                    }

                    if let Some(max_attempts) = self.policy.max_attempts {
                        if attempts >= max_attempts {
                            error!(
                                "{} 在 {} 次尝试后仍然失败，放弃重试: {}",
                                operation, attempts, e
                            );
                            if let Some(stats) = &self.stats {
                                stats.record_retry_exhausted(operation);
                            }
                            return RetryOutcome::Exhausted {
                                attempts,
                                last_error: e,
                            };
                        }
                    }

                    warn!(
                        "{} 第 {} 次尝试失败: {}，{:?} 后重试",
                        operation, attempts, e, self.policy.delay
                    );
                    std::thread::sleep(self.policy.delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use std::time::Instant;

    /// 收集日志输出的写入端
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines_with(&self, level: &str) -> usize {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes)
                .lines()
                .filter(|line| line.contains(level))
                .count()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, logs)
    }

    fn failing_times(failures: u32) -> impl FnMut() -> HaxResult<u32> {
        let mut calls = 0;
        move || {
            calls += 1;
            if calls <= failures {
                Err(HaxError::coordination("consul unavailable"))
            } else {
                Ok(calls)
            }
        }
    }

    #[test]
    fn test_succeeds_after_failures_with_fixed_delay() {
        let stats = Arc::new(DispatcherStats::new());
        let wrapper = RetryWrapper::with_stats(
            RetryPolicy::new(Duration::from_millis(20)),
            Arc::clone(&stats),
        );

        let started = Instant::now();
        let outcome = wrapper.run("process_event", failing_times(3));

        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(outcome.attempts(), 4);
        assert_eq!(outcome.into_result("process_event").unwrap(), 4);
        assert_eq!(stats.snapshot().retries, 3);
        assert_eq!(stats.snapshot().retry_exhausted, 0);
    }

    #[test]
    fn test_each_failed_attempt_is_logged_before_retrying() {
        let wrapper = RetryWrapper::new(RetryPolicy::new(Duration::from_millis(1)));

        let (outcome, logs) =
            with_captured_logs(|| wrapper.run("ha_nvec_get", failing_times(5)));

        assert_eq!(outcome.attempts(), 6);
        assert_eq!(logs.lines_with("WARN"), 5);
        assert_eq!(logs.lines_with("ERROR"), 0);
        assert_eq!(logs.lines_with("第 6 次尝试后成功"), 1);
    }

    #[test]
    fn test_exhaustion_is_logged_as_error() {
        let wrapper =
            RetryWrapper::new(RetryPolicy::new(Duration::from_millis(1)).with_max_attempts(2));

        let (outcome, logs) =
            with_captured_logs(|| wrapper.run("process_event", failing_times(10)));

        assert!(!outcome.is_completed());
        // 最后一次失败不再重试，只记错误
        assert_eq!(logs.lines_with("WARN"), 1);
        assert_eq!(logs.lines_with("ERROR"), 1);
    }

    #[test]
    fn test_first_attempt_success_does_not_sleep() {
        let wrapper = RetryWrapper::new(RetryPolicy::new(Duration::from_secs(60)));
        let started = Instant::now();
        let outcome = wrapper.run("ha_nvec_get", || Ok::<_, HaxError>("ok"));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(outcome.is_completed());
        assert_eq!(outcome.attempts(), 1);
    }

    #[test]
    fn test_bounded_policy_exhausts() {
        let stats = Arc::new(DispatcherStats::new());
        let wrapper = RetryWrapper::with_stats(
            RetryPolicy::new(Duration::from_millis(1)).with_max_attempts(3),
            Arc::clone(&stats),
        );

        let outcome = wrapper.run("process_event", failing_times(10));
        assert!(!outcome.is_completed());
        assert_eq!(outcome.attempts(), 3);

        match outcome.into_result("process_event") {
            Err(HaxError::RetryExhausted {
                operation,
                attempts,
                last_error,
            }) => {
                assert_eq!(operation, "process_event");
                assert_eq!(attempts, 3);
                assert!(last_error.contains("consul unavailable"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.retries, 3);
        assert_eq!(snapshot.retry_exhausted, 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            delay_seconds: 7,
            max_attempts: Some(2),
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.delay, Duration::from_secs(7));
        assert_eq!(policy.max_attempts, Some(2));
        assert!(RetryPolicy::default().is_unbounded());
    }
}
