//! 任务计划
//!
//! 描述"哪些集合用哪些模型分类"。任务集合 = 集合 × 适用于该集合的模型类型，
//! 默认对所有集合应用全部三种模型，也允许通过计划文件配置不对称的矩阵。

use std::collections::{HashMap, HashSet};

use crate::error::{AppError, AppResult};
use crate::models::kind::{LoadOptions, ModelKind};

/// 单个集合的计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPlan {
    pub name: String,
    pub output_name: String,
    pub kinds: Vec<ModelKind>,
}

impl CollectionPlan {
    /// 对集合应用全部模型
    pub fn all_kinds(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            output_name: name.clone(),
            name,
            kinds: ModelKind::ALL.to_vec(),
        }
    }
}

/// 一个分类任务：一个集合 × 一种模型
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobSpec {
    pub collection: String,
    pub kind: ModelKind,
}

/// 完整的任务计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    collections: Vec<CollectionPlan>,
    options: HashMap<ModelKind, LoadOptions>,
}

impl JobPlan {
    /// 创建并校验任务计划
    ///
    /// `options` 中未出现的模型使用默认加载选项。
    pub fn new(
        collections: Vec<CollectionPlan>,
        options: HashMap<ModelKind, LoadOptions>,
    ) -> AppResult<Self> {
        let mut names = HashSet::new();
        let mut output_names = HashSet::new();

        for plan in &collections {
            if !names.insert(plan.name.as_str()) {
                return Err(AppError::config(format!("集合 {} 重复定义", plan.name)));
            }
            if !output_names.insert(plan.output_name.as_str()) {
                return Err(AppError::config(format!(
                    "输出字段 {} 重复定义",
                    plan.output_name
                )));
            }

            let mut kinds = HashSet::new();
            for kind in &plan.kinds {
                if !kinds.insert(*kind) {
                    return Err(AppError::config(format!(
                        "集合 {} 中模型 {} 重复",
                        plan.name, kind
                    )));
                }
            }
        }

        let mut merged = Self::default_options();
        merged.extend(options);

        Ok(Self {
            collections,
            options: merged,
        })
    }

    /// 对称计划：每个集合应用全部三种模型
    pub fn symmetric<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: names.into_iter().map(CollectionPlan::all_kinds).collect(),
            options: Self::default_options(),
        }
    }

    /// 默认加载选项：话题分类关闭多标签
    pub fn default_options() -> HashMap<ModelKind, LoadOptions> {
        HashMap::from([(
            ModelKind::TopicClassification,
            LoadOptions { multi_label: false },
        )])
    }

    pub fn collections(&self) -> &[CollectionPlan] {
        &self.collections
    }

    /// 查找集合计划
    pub fn collection(&self, name: &str) -> Option<&CollectionPlan> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// 计划需要加载的模型（去重，保持首次出现的顺序）
    pub fn required_kinds(&self) -> Vec<ModelKind> {
        let mut seen = HashSet::new();
        self.collections
            .iter()
            .flat_map(|c| c.kinds.iter().copied())
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// 某模型的加载选项
    pub fn options_for(&self, kind: ModelKind) -> LoadOptions {
        self.options.get(&kind).copied().unwrap_or_default()
    }

    /// 展开为任务列表（集合 × 模型）
    pub fn jobs(&self) -> Vec<JobSpec> {
        self.collections
            .iter()
            .flat_map(|c| {
                c.kinds.iter().map(move |kind| JobSpec {
                    collection: c.name.clone(),
                    kind: *kind,
                })
            })
            .collect()
    }
}
