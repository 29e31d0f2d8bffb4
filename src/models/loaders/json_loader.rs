use std::path::Path;

use serde_json::Value;
use tokio::fs;

use crate::error::{AppError, AppResult};
use crate::models::collection::{Collection, Collections};
use crate::models::plan::JobPlan;

/// 从 JSON 文件加载输入文本并转换为集合
///
/// 未提供任务计划时，文档中每个字段都是一个集合，并对其应用全部模型。
pub async fn load_input(path: &Path, plan: Option<JobPlan>) -> AppResult<(Collections, JobPlan)> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(path.display().to_string(), e))?;

    parse_input(&content, &path.display().to_string(), plan)
}

/// 解析输入文档
///
/// # 参数
/// - `content`: JSON 文本
/// - `source`: 来源描述（仅用于错误信息）
/// - `plan`: 任务计划（可选）
pub fn parse_input(
    content: &str,
    source: &str,
    plan: Option<JobPlan>,
) -> AppResult<(Collections, JobPlan)> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| AppError::input(source, format!("无法解析 JSON: {}", e)))?;

    let Value::Object(fields) = document else {
        return Err(AppError::input(source, "顶层必须是 JSON 对象"));
    };

    match plan {
        Some(plan) => {
            let mut items = Vec::with_capacity(plan.collections().len());
            for entry in plan.collections() {
                let value = fields.get(&entry.name).ok_or_else(|| {
                    AppError::input(format!("{}#{}", source, entry.name), "缺少字段")
                })?;
                let texts = string_array(value, source, &entry.name)?;
                items.push(Collection::new(&entry.name, texts).with_output_name(&entry.output_name));
            }
            Ok((Collections::new(items), plan))
        }
        None => {
            let mut items = Vec::with_capacity(fields.len());
            for (name, value) in &fields {
                let texts = string_array(value, source, name)?;
                items.push(Collection::new(name, texts));
            }
            let plan = JobPlan::symmetric(items.iter().map(|c| c.name.clone()));
            Ok((Collections::new(items), plan))
        }
    }
}

/// 将字段转换为字符串数组
fn string_array(value: &Value, source: &str, field: &str) -> AppResult<Vec<String>> {
    let location = || format!("{}#{}", source, field);

    let Value::Array(items) = value else {
        return Err(AppError::input(location(), "字段必须是字符串数组"));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(AppError::input(location(), format!("第 {} 项不是字符串", i))),
        })
        .collect()
}
