//! 抓取流程
//!
//! 对一个目标发出两次查询（本人发布的推文、提及目标的回复），
//! 两次查询并发进行，每次最多收集 `max_tweets` 条原文。

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::scraper::query::{normalize_handle, SearchWindow};
use crate::scraper::source::TweetSource;

/// 抓取结果，即分类器的输入格式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetsCollection {
    pub target_tweets: Vec<String>,
    pub tweets_about_target: Vec<String>,
}

/// 按顺序收集一个查询的结果，直到达到上限或没有更多结果
pub async fn scrape<S: TweetSource>(
    source: &S,
    query: &str,
    max_tweets: usize,
) -> AppResult<Vec<String>> {
    let mut texts = Vec::new();
    let mut cursor: Option<String> = None;

    while texts.len() < max_tweets {
        let page = source
            .search_page(query, cursor.as_deref())
            .await
            .map_err(|source| AppError::Scrape {
                query: query.to_string(),
                source,
            })?;

        if page.texts.is_empty() {
            break;
        }

        let remaining = max_tweets - texts.len();
        texts.extend(page.texts.into_iter().take(remaining));

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!("✓ 查询 \"{}\" 获得 {} 条推文", query, texts.len());
    Ok(texts)
}

/// 抓取一个目标的推文
///
/// # 参数
/// - `name`: 目标名称（用于搜索提及）
/// - `raw_handle`: 推特账号（可带 `@`，为空则跳过本人推文）
/// - `window`: 时间窗口
/// - `max_tweets`: 每个查询的上限
pub async fn scrape_target<S: TweetSource>(
    source: &S,
    name: &str,
    raw_handle: &str,
    window: SearchWindow,
    max_tweets: usize,
) -> AppResult<TweetsCollection> {
    let handle = normalize_handle(raw_handle)?;
    let replies_query = window.replies_query(name);

    let authored = async {
        match &handle {
            Some(handle) => scrape(source, &window.authored_query(handle), max_tweets).await,
            None => {
                info!("未提供推特账号，跳过本人推文");
                Ok(Vec::new())
            }
        }
    };
    let replies = scrape(source, &replies_query, max_tweets);

    let (target_tweets, tweets_about_target) = tokio::try_join!(authored, replies)?;

    Ok(TweetsCollection {
        target_tweets,
        tweets_about_target,
    })
}
