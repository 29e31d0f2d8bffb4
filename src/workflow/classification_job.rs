//! 分类任务 - 流程层
//!
//! 核心职责：用一个模型处理一个集合中的每条记录
//!
//! 任务只读共享的文本快照并产出标签列表，不直接持有记录；
//! 全部任务汇合之后，由编排层调用 [`JobOutput::apply`] 把标签写回各自的字段。
//! 任务按 (集合, 模型) 划分，因此每个 (记录, 字段) 只有一个写入者。
//!
//! 在阻塞线程池中运行时，外层 future 被丢弃（超时、放弃）会置位取消标记，
//! 逐条预测在记录之间检查该标记并提前结束。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::TextClassifier;
use crate::models::{Collection, ModelKind};
use crate::utils::logging::truncate_text;
use crate::workflow::job_ctx::JobCtx;

/// 分类任务
pub struct ClassificationJob {
    ctx: JobCtx,
    texts: Arc<[String]>,
    model: Arc<dyn TextClassifier>,
    cancelled: Arc<AtomicBool>,
}

impl ClassificationJob {
    /// 创建新的分类任务
    pub fn new(ctx: JobCtx, texts: Arc<[String]>, model: Arc<dyn TextClassifier>) -> Self {
        Self {
            ctx,
            texts,
            model,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 逐条预测（阻塞）
    ///
    /// 任一记录预测失败即终止整个任务，错误中带有集合、模型与记录序号。
    /// 取消标记在每条记录之前检查。
    pub fn run(self) -> AppResult<JobOutput> {
        let started = Instant::now();
        let mut labels = Vec::with_capacity(self.texts.len());

        for (index, text) in self.texts.iter().enumerate() {
            if self.cancelled.load(Ordering::Acquire) {
                warn!("{} 已取消，停止于第 {} 条", self.ctx, index);
                return Err(AppError::Cancelled {
                    task: self.ctx.to_string(),
                });
            }

            let prediction = self.model.predict(text).map_err(|source| AppError::Inference {
                collection: self.ctx.collection.clone(),
                kind: self.ctx.kind,
                index,
                source,
            })?;

            debug!(
                "{} #{} {} → {}",
                self.ctx,
                index,
                truncate_text(text, 40),
                prediction.label
            );
            labels.push(prediction.label);
        }

        info!(
            "{} ✓ 完成 {} 条，耗时 {:.1}s",
            self.ctx,
            labels.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(JobOutput {
            collection: self.ctx.collection,
            kind: self.ctx.kind,
            labels,
        })
    }

    /// 在阻塞线程池中运行
    ///
    /// 返回的 future 在完成前被丢弃时，剩余记录不再预测。
    pub async fn run_blocking(self) -> AppResult<JobOutput> {
        let task = self.ctx.to_string();
        let _cancel = CancelOnDrop(Arc::clone(&self.cancelled));

        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|e| AppError::TaskPanicked {
                task,
                reason: e.to_string(),
            })?
    }
}

/// 离开作用域时置位取消标记
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// 分类任务的产出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutput {
    pub collection: String,
    pub kind: ModelKind,
    pub labels: Vec<String>,
}

impl JobOutput {
    /// 把标签写回集合中对应的字段
    pub fn apply(self, collection: &mut Collection) -> AppResult<()> {
        if collection.name != self.collection || collection.len() != self.labels.len() {
            return Err(AppError::TaskPanicked {
                task: format!("写回 {} / {}", self.collection, self.kind),
                reason: format!(
                    "结果与集合 {} 不匹配 ({} 条标签, {} 条记录)",
                    collection.name,
                    self.labels.len(),
                    collection.len()
                ),
            });
        }

        let slot = self.kind.slot();
        for (index, (record, label)) in collection.records.iter_mut().zip(self.labels).enumerate() {
            if !record.fill(slot, label) {
                return Err(AppError::TaskPanicked {
                    task: format!("写回 {} / {}", self.collection, self.kind),
                    reason: format!("第 {} 条记录的字段已被写入", index),
                });
            }
        }
        Ok(())
    }
}
