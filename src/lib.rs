//! # NLP Runner
//!
//! 并发文本分类编排器：一次性加载话题、情感、仇恨言论三种预训练模型，
//! 并发地应用到多个命名的文本集合上，输出一个合并的 JSON 结果。
//! 另附一个推文抓取工具，为分类器准备输入。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 模型本身不透明，只暴露能力
//! - `ModelLoader` / `TextClassifier` - 加载与预测能力
//! - `HttpModelLoader` - 基于推理服务的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ModelCache` - 每种模型只加载一次
//! - `OutputWriter` - 合并输出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个集合 × 一个模型"的处理流程
//! - `JobCtx` - 上下文封装（集合 + 模型）
//! - `ClassificationJob` - 逐条预测，产出标签
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/task_group` - 阶段内的派发与汇合
//! - `orchestrator/pipeline` - 加载 → 分类 → 完成
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod scraper;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{HttpModelLoader, ModelLoader, Prediction, TextClassifier};
pub use models::{Collection, Collections, JobPlan, ModelKind, TextRecord};
pub use orchestrator::{Limits, Phase, Pipeline};
pub use workflow::{ClassificationJob, JobCtx};
