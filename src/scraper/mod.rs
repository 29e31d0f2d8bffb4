//! 推文抓取
//!
//! 为分类器准备输入：按目标账号与名称，在时间窗口内抓取推文原文。

pub mod query;
pub mod runner;
pub mod source;

pub use query::{normalize_handle, SearchWindow};
pub use runner::{scrape, scrape_target, TweetsCollection};
pub use source::{HttpTweetSource, SearchPage, TweetSource};
