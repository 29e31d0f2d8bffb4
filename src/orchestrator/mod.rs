//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责阶段调度与并发控制，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `task_group` - 任务组
//! - 一个阶段内全部派发、全部汇合
//! - 控制并发数量（Semaphore）与单任务超时
//! - 失败不打断同阶段的其他任务，汇合后统一上报
//!
//! ### `pipeline` - 分类流水线
//! - 加载阶段：每种模型一个加载任务
//! - 分类阶段：每个 (集合, 模型) 一个分类任务
//! - 阶段用类型区分，汇合之前无法读取记录
//!
//! ## 层次关系
//!
//! ```text
//! pipeline (加载 → 分类 → 完成)
//!     ↓
//! task_group (派发 / 汇合)
//!     ↓
//! workflow::ClassificationJob (处理一个集合 × 一个模型)
//!     ↓
//! services (能力层：model_cache / output_writer)
//!     ↓
//! infrastructure (基础设施：ModelLoader / TextClassifier)
//! ```

pub mod phase;
pub mod pipeline;
pub mod task_group;

// 重新导出主要类型
pub use phase::Phase;
pub use pipeline::{run, Classifying, Done, Limits, Loading, Pipeline};
pub use task_group::TaskGroup;
