//! 推文来源 - 基础设施
//!
//! 只暴露"按查询分页搜索推文原文"的能力。

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;

/// 一页搜索结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub texts: Vec<String>,
    pub next_cursor: Option<String>,
}

/// 推文来源
pub trait TweetSource: Send + Sync {
    /// 获取一页结果，`cursor` 为空表示第一页
    fn search_page(
        &self,
        query: &str,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<SearchPage>> + Send;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tweets: Vec<Tweet>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    #[serde(rename = "rawContent")]
    raw_content: String,
}

/// 基于 HTTP 搜索接口的推文来源
///
/// `GET {search_url}?q=...&cursor=...` → `{"tweets": [{"rawContent": ...}], "next_cursor": ...}`
pub struct HttpTweetSource {
    client: Client,
    search_url: String,
}

impl HttpTweetSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            client,
            search_url: config.scraper_search_url.clone(),
        })
    }
}

impl TweetSource for HttpTweetSource {
    async fn search_page(&self, query: &str, cursor: Option<&str>) -> Result<SearchPage> {
        debug!("搜索: {} (cursor: {:?})", query, cursor);

        let mut params = vec![("q", query)];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }

        let response = self
            .client
            .get(&self.search_url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("请求失败: {}", self.search_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("搜索接口返回 {}: {}", status, body);
        }

        let page: SearchResponse = response.json().await.context("无法解析搜索响应")?;

        Ok(SearchPage {
            texts: page.tweets.into_iter().map(|t| t.raw_content).collect(),
            next_cursor: page.next_cursor,
        })
    }
}
