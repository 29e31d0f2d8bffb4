//! 分类任务上下文
//!
//! 封装"我正在用哪个模型处理哪个集合"这一信息

use std::fmt::Display;

use crate::models::{JobSpec, ModelKind};

/// 分类任务上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCtx {
    /// 集合名称
    pub collection: String,

    /// 模型类型
    pub kind: ModelKind,

    /// 任务序号（从1开始，仅用于日志显示）
    pub job_index: usize,
}

impl JobCtx {
    /// 创建新的任务上下文
    pub fn new(collection: impl Into<String>, kind: ModelKind, job_index: usize) -> Self {
        Self {
            collection: collection.into(),
            kind,
            job_index,
        }
    }

    /// 从任务计划条目创建
    pub fn from_spec(spec: &JobSpec, job_index: usize) -> Self {
        Self::new(spec.collection.clone(), spec.kind, job_index)
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务#{} 集合 {} 模型 {}]",
            self.job_index, self.collection, self.kind
        )
    }
}
