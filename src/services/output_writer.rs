//! 结果输出服务 - 业务能力层
//!
//! 只负责"把分类完成的集合写成一个 JSON 文档"，不关心流程。

use std::io::Write;

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Collections;

/// 结果输出服务
///
/// 每个集合对应输出文档中的一个字段（字段名为集合的输出名），
/// 值为记录列表 `{text, topic, sentiment, hate}`，顺序与输入一致。
pub struct OutputWriter {
    pretty: bool,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// 使用缩进格式输出
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// 构建合并后的 JSON 文档
    pub fn build(&self, collections: &Collections) -> AppResult<JsonValue> {
        let mut combined = Map::with_capacity(collections.len());
        for collection in collections.iter() {
            let records = serde_json::to_value(&collection.records).map_err(|e| {
                AppError::input(&collection.name, format!("无法序列化集合: {}", e))
            })?;
            combined.insert(collection.output_name.clone(), records);
        }
        Ok(JsonValue::Object(combined))
    }

    /// 将文档写入 `out`，末尾追加换行
    pub fn write<W: Write>(&self, collections: &Collections, mut out: W) -> AppResult<()> {
        let document = self.build(collections)?;
        debug!("输出 {} 个集合", collections.len());

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        }
        .map_err(|e| AppError::input("output", format!("无法序列化结果: {}", e)))?;

        out.write_all(rendered.as_bytes())
            .and_then(|_| out.write_all(b"\n"))
            .and_then(|_| out.flush())
            .map_err(|e| AppError::io("<stdout>", e))
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new()
    }
}
