use crate::models::ModelKind;
use thiserror::Error;

/// 应用程序错误类型
///
/// 覆盖输入、配置、模型加载、推理、I/O、任务调度以及抓取几类错误，
/// 每一类对应一个固定的进程退出码（见 [`AppError::exit_code`]）。
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入文件缺失或格式错误
    #[error("输入错误 ({location}): {reason}")]
    Input { location: String, reason: String },

    /// 配置错误（任务计划文件、环境变量等）
    #[error("配置错误: {reason}")]
    Config { reason: String },

    /// 模型加载失败
    #[error("模型 {kind} 加载失败: {source}")]
    ModelLoad {
        kind: ModelKind,
        #[source]
        source: anyhow::Error,
    },

    /// 推理失败
    #[error("推理失败 [集合 {collection} | 模型 {kind} | 第 {index} 条]: {source}")]
    Inference {
        collection: String,
        kind: ModelKind,
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    /// 文件读写失败
    #[error("文件错误 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 任务超时
    #[error("任务 {task} 超时 ({limit:?})")]
    Timeout {
        task: String,
        limit: std::time::Duration,
    },

    /// 任务被取消（所在任务已超时或被放弃）
    #[error("任务 {task} 已取消")]
    Cancelled { task: String },

    /// 任务异常退出（panic 或被取消）
    #[error("任务 {task} 异常退出: {reason}")]
    TaskPanicked { task: String, reason: String },

    /// 推文抓取失败
    #[error("抓取失败 (查询: {query}): {source}")]
    Scrape {
        query: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// 进程退出码
    ///
    /// 0 保留给成功；每一类错误有独立的退出码，调用方可据此区分失败原因。
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Input { .. } => 2,
            AppError::Config { .. } => 3,
            AppError::ModelLoad { .. } => 4,
            AppError::Inference { .. } => 5,
            AppError::Io { .. } => 6,
            AppError::Timeout { .. } | AppError::Cancelled { .. } | AppError::TaskPanicked { .. } => {
                7
            }
            AppError::Scrape { .. } => 8,
        }
    }

    // ========== 便捷构造函数 ==========

    /// 创建输入错误
    pub fn input(location: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Input {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// 创建配置错误
    pub fn config(reason: impl Into<String>) -> Self {
        AppError::Config {
            reason: reason.into(),
        }
    }

    /// 创建文件读写错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 创建模型加载错误
    pub fn model_load(kind: ModelKind, source: impl Into<anyhow::Error>) -> Self {
        AppError::ModelLoad {
            kind,
            source: source.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
