//! 模型能力接口 - 基础设施层
//!
//! 预训练模型本身对系统不透明，只暴露"加载"和"预测"两种能力。
//! 两者都是阻塞调用，调用方负责把它们放到阻塞线程池上执行。

use std::sync::Arc;

use anyhow::Result;

use crate::models::{LoadOptions, ModelKind};

/// 单条预测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub label: String,
}

impl Prediction {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// 已加载的文本分类模型
pub trait TextClassifier: Send + Sync {
    /// 对单条文本做预测（阻塞）
    fn predict(&self, text: &str) -> Result<Prediction>;
}

/// 模型加载器
pub trait ModelLoader: Send + Sync {
    /// 加载指定类型的模型（阻塞，通常耗时较长）
    fn load(&self, kind: ModelKind, options: &LoadOptions) -> Result<Arc<dyn TextClassifier>>;
}
