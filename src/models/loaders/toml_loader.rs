use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::{AppError, AppResult};
use crate::models::kind::{LoadOptions, ModelKind};
use crate::models::plan::{CollectionPlan, JobPlan};

/// 计划文件的原始结构
#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default)]
    model_options: HashMap<String, LoadOptions>,
    collections: Vec<CollectionEntry>,
}

#[derive(Debug, Deserialize)]
struct CollectionEntry {
    name: String,
    output_name: Option<String>,
    /// 省略时应用全部模型
    kinds: Option<Vec<String>>,
}

/// 从 TOML 文件加载任务计划
pub async fn load_job_plan(path: &Path) -> AppResult<JobPlan> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(path.display().to_string(), e))?;

    let plan = parse_job_plan(&content)?;
    tracing::info!(
        "已加载任务计划: {} ({} 个集合, {} 个任务)",
        path.display(),
        plan.collections().len(),
        plan.jobs().len()
    );
    Ok(plan)
}

/// 解析任务计划
pub fn parse_job_plan(content: &str) -> AppResult<JobPlan> {
    let file: PlanFile = toml::from_str(content)
        .map_err(|e| AppError::config(format!("无法解析任务计划: {}", e)))?;

    let mut options = HashMap::new();
    for (name, opts) in file.model_options {
        options.insert(parse_kind(&name)?, opts);
    }

    let collections = file
        .collections
        .into_iter()
        .map(|entry| {
            let kinds = match entry.kinds {
                Some(names) => names
                    .iter()
                    .map(|n| parse_kind(n))
                    .collect::<AppResult<Vec<_>>>()?,
                None => ModelKind::ALL.to_vec(),
            };
            Ok(CollectionPlan {
                output_name: entry.output_name.unwrap_or_else(|| entry.name.clone()),
                name: entry.name,
                kinds,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    JobPlan::new(collections, options)
}

fn parse_kind(name: &str) -> AppResult<ModelKind> {
    ModelKind::from_name(name).ok_or_else(|| AppError::config(format!("未知的模型类型: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_COLLECTIONS: &str = r#"
[model_options.topic_classification]
multi_label = false

[[collections]]
name = "articles"

[[collections]]
name = "targetTweets"
output_name = "target_tweets"
kinds = ["topic_classification", "sentiment", "hate"]

[[collections]]
name = "tweetsAboutTarget"
output_name = "tweets_about_target"
kinds = ["sentiment"]
"#;

    #[test]
    fn test_parse_plan_with_renames_and_asymmetric_kinds() {
        let plan = parse_job_plan(THREE_COLLECTIONS).unwrap();

        assert_eq!(plan.collections().len(), 3);
        assert_eq!(plan.collection("articles").unwrap().kinds, ModelKind::ALL.to_vec());
        assert_eq!(
            plan.collection("targetTweets").unwrap().output_name,
            "target_tweets"
        );
        assert_eq!(
            plan.collection("tweetsAboutTarget").unwrap().kinds,
            vec![ModelKind::Sentiment]
        );
        assert_eq!(plan.jobs().len(), 7);
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let content = r#"
[[collections]]
name = "articles"
kinds = ["emotion"]
"#;
        assert!(matches!(
            parse_job_plan(content),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn test_unknown_model_option_is_config_error() {
        let content = r#"
[model_options.irony]
multi_label = true

[[collections]]
name = "articles"
"#;
        assert!(matches!(
            parse_job_plan(content),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            parse_job_plan("collections = 3"),
            Err(AppError::Config { .. })
        ));
    }
}
