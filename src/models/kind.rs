use serde::{Deserialize, Serialize};

/// 模型类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// 话题分类
    #[serde(rename = "topic_classification")]
    TopicClassification,
    /// 情感分析
    #[serde(rename = "sentiment")]
    Sentiment,
    /// 仇恨言论检测
    #[serde(rename = "hate")]
    Hate,
}

impl ModelKind {
    /// 全部模型类型（默认任务计划使用的顺序）
    pub const ALL: [ModelKind; 3] = [
        ModelKind::TopicClassification,
        ModelKind::Sentiment,
        ModelKind::Hate,
    ];

    /// 获取模型名称
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::TopicClassification => "topic_classification",
            ModelKind::Sentiment => "sentiment",
            ModelKind::Hate => "hate",
        }
    }

    /// 从名称解析模型类型（精确匹配）
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "topic_classification" => Some(ModelKind::TopicClassification),
            "sentiment" => Some(ModelKind::Sentiment),
            "hate" => Some(ModelKind::Hate),
            _ => None,
        }
    }

    /// 该模型写入的记录字段
    pub fn slot(self) -> Slot {
        match self {
            ModelKind::TopicClassification => Slot::Topic,
            ModelKind::Sentiment => Slot::Sentiment,
            ModelKind::Hate => Slot::Hate,
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 记录上的分类字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Topic,
    Sentiment,
    Hate,
}

/// 模型加载选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadOptions {
    /// 是否多标签输出（仅话题分类模型使用）
    #[serde(default)]
    pub multi_label: bool,
}
