//! HTTP 推理后端 - 基础设施层
//!
//! 通过推理服务加载模型并逐条预测：
//! - 加载: `POST {base}/models/{kind}/load`，请求体 `{"multi_label": bool}`，返回 `{"model_id": string}`
//! - 预测: `POST {base}/models/{model_id}/predict`，请求体 `{"text": string}`，返回 `{"label": string | [string]}`
//!
//! 内部使用异步 reqwest 客户端，通过创建时捕获的运行时句柄 `block_on`，
//! 因此 `load` / `predict` 只能在阻塞线程池（`spawn_blocking`）中调用。

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::Config;
use crate::infrastructure::classifier::{ModelLoader, Prediction, TextClassifier};
use crate::models::{LoadOptions, ModelKind};

#[derive(Debug, Deserialize)]
struct LoadResponse {
    model_id: String,
}

/// 基于 HTTP 推理服务的模型加载器
pub struct HttpModelLoader {
    client: Client,
    base_url: String,
    runtime: Handle,
}

impl HttpModelLoader {
    /// 创建新的加载器（必须在 tokio 运行时内调用）
    pub fn new(config: &Config) -> Result<Self> {
        let runtime = Handle::try_current().context("HTTP 推理后端需要在 tokio 运行时内创建")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            runtime,
        })
    }

    async fn request_load(&self, kind: ModelKind, options: &LoadOptions) -> Result<String> {
        let endpoint = format!("{}/models/{}/load", self.base_url, kind);
        debug!("请求加载模型: {} (multi_label={})", endpoint, options.multi_label);

        let body = post_json(
            &self.client,
            &endpoint,
            &json!({ "multi_label": options.multi_label }),
        )
        .await?;

        let loaded: LoadResponse = serde_json::from_value(body)
            .with_context(|| format!("无法解析加载响应: {}", endpoint))?;
        Ok(loaded.model_id)
    }
}

impl ModelLoader for HttpModelLoader {
    fn load(&self, kind: ModelKind, options: &LoadOptions) -> Result<Arc<dyn TextClassifier>> {
        let model_id = self.runtime.block_on(self.request_load(kind, options))?;
        debug!("模型 {} 已加载: {}", kind, model_id);

        Ok(Arc::new(HttpClassifier {
            client: self.client.clone(),
            endpoint: format!("{}/models/{}/predict", self.base_url, model_id),
            runtime: self.runtime.clone(),
        }))
    }
}

/// 推理服务上已加载的模型
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    runtime: Handle,
}

impl TextClassifier for HttpClassifier {
    fn predict(&self, text: &str) -> Result<Prediction> {
        let body = self.runtime.block_on(post_json(
            &self.client,
            &self.endpoint,
            &json!({ "text": text }),
        ))?;

        parse_label(&body).map(Prediction::new)
    }
}

/// 发送 JSON 请求并返回 JSON 响应，非 2xx 状态视为错误
async fn post_json(client: &Client, endpoint: &str, payload: &JsonValue) -> Result<JsonValue> {
    let response = client
        .post(endpoint)
        .json(payload)
        .send()
        .await
        .with_context(|| format!("请求失败: {}", endpoint))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("推理服务返回 {} ({}): {}", status, endpoint, body);
    }

    response
        .json()
        .await
        .with_context(|| format!("无法解析响应: {}", endpoint))
}

/// 从预测响应中提取标签
///
/// 单标签为字符串；多标签为字符串数组，以 `,` 连接。
fn parse_label(body: &JsonValue) -> Result<String> {
    match body.get("label") {
        Some(JsonValue::String(label)) => Ok(label.clone()),
        Some(JsonValue::Array(labels)) => {
            let labels = labels
                .iter()
                .map(|l| {
                    l.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| anyhow!("多标签中包含非字符串: {}", l))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(labels.join(","))
        }
        Some(other) => Err(anyhow!("label 类型不正确: {}", other)),
        None => Err(anyhow!("预测响应缺少 label 字段: {}", body)),
    }
}
