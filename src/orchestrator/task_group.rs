//! 任务组 - 编排层
//!
//! 一个阶段内的"全部派发，再全部汇合"：
//! - 每个任务一个 tokio 任务，Semaphore 限制同时运行的数量
//! - 每个任务可选超时（等待许可的时间不计入）
//! - 汇合时等待所有任务结束，即使已有任务失败；失败逐个记录日志，
//!   按派发顺序返回第一个错误

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::orchestrator::phase::Phase;
use crate::utils::logging;

/// 任务组
pub struct TaskGroup<T> {
    phase: Phase,
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
    handles: Vec<(String, JoinHandle<AppResult<T>>)>,
    started: Instant,
}

impl<T: Send + 'static> TaskGroup<T> {
    /// 创建任务组
    ///
    /// # 参数
    /// - `phase`: 所属阶段（用于日志）
    /// - `max_concurrent`: 同时运行的任务上限（至少为 1）
    /// - `timeout`: 单个任务的超时
    pub fn new(phase: Phase, max_concurrent: usize, timeout: Option<Duration>) -> Self {
        Self {
            phase,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
            handles: Vec::new(),
            started: Instant::now(),
        }
    }

    /// 派发一个任务
    pub fn spawn<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        let label = label.into();
        let task_label = label.clone();
        let semaphore = self.semaphore.clone();
        let timeout = self.timeout;

        let handle = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| AppError::TaskPanicked {
                    task: task_label.clone(),
                    reason: e.to_string(),
                })?;

            match timeout {
                Some(limit) => tokio::time::timeout(limit, task)
                    .await
                    .map_err(|_| AppError::Timeout {
                        task: task_label,
                        limit,
                    })?,
                None => task.await,
            }
        });

        self.handles.push((label, handle));
    }

    /// 等待全部任务结束
    ///
    /// 全部成功时按派发顺序返回结果；否则返回第一个失败任务的错误。
    pub async fn join_all(self) -> AppResult<Vec<T>> {
        let total = self.handles.len();
        let (labels, handles): (Vec<_>, Vec<_>) = self.handles.into_iter().unzip();
        let results = futures::future::join_all(handles).await;

        let mut outputs = Vec::with_capacity(total);
        let mut first_error = None;
        let mut failed = 0;

        for (label, joined) in labels.into_iter().zip(results) {
            let result = joined.unwrap_or_else(|e| {
                Err(AppError::TaskPanicked {
                    task: label.clone(),
                    reason: e.to_string(),
                })
            });

            match result {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    failed += 1;
                    error!("[{}] ❌ {} 失败: {}", self.phase, label, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        logging::log_phase_complete(self.phase, total - failed, total, self.started.elapsed());

        match first_error {
            Some(e) => Err(e),
            None => Ok(outputs),
        }
    }
}
