//! 搜索窗口与查询构造

use chrono::{NaiveDate, TimeDelta};
use regex::Regex;

use crate::error::{AppError, AppResult};

/// 搜索时间窗口 `[since, until)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl SearchWindow {
    /// 以 `today` 为基准向前回溯 `lookback_days` 天，直到明天（不含）
    ///
    /// `lookback_days` 小于 1 时使用 `default_days`；超出日期范围时返回输入错误。
    pub fn new(today: NaiveDate, lookback_days: i64, default_days: i64) -> AppResult<Self> {
        let days = if lookback_days < 1 {
            default_days.max(1)
        } else {
            lookback_days
        };

        let since = TimeDelta::try_days(days)
            .and_then(|lookback| today.checked_sub_signed(lookback))
            .ok_or_else(|| AppError::input("lookback_days", format!("回溯天数超出范围: {}", days)))?;
        let until = today
            .succ_opt()
            .ok_or_else(|| AppError::input("lookback_days", format!("日期超出范围: {}", today)))?;

        Ok(Self { since, until })
    }

    /// 目标账号本人发布的推文
    pub fn authored_query(&self, handle: &str) -> String {
        format!(
            "from:{} since:{} until:{}",
            handle,
            self.since.format("%Y-%m-%d"),
            self.until.format("%Y-%m-%d")
        )
    }

    /// 提及目标名称的回复推文
    pub fn replies_query(&self, name: &str) -> String {
        format!(
            "{} since:{} until:{} filter:replies",
            name,
            self.since.format("%Y-%m-%d"),
            self.until.format("%Y-%m-%d")
        )
    }
}

/// 规范化推特账号：去掉所有 `@`，校验格式
///
/// 去掉 `@` 后为空时返回 `None`（不查询本人推文）。
pub fn normalize_handle(raw: &str) -> AppResult<Option<String>> {
    let pattern = Regex::new(r"^[A-Za-z0-9_]{1,15}$")
        .map_err(|e| AppError::config(format!("账号校验规则无效: {}", e)))?;

    let handle = raw.trim().replace('@', "");
    if handle.is_empty() {
        return Ok(None);
    }
    if !pattern.is_match(&handle) {
        return Err(AppError::input("handle", format!("无效的推特账号: {}", raw)));
    }
    Ok(Some(handle))
}
