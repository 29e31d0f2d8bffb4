use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 推理后端 ---
    /// 推理服务地址
    pub backend_url: String,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 编排 ---
    /// 任务计划文件（TOML），为空时对输入的所有集合应用全部模型
    pub jobs_file: Option<String>,
    /// 单个加载/分类任务的超时（秒），0 表示不限制
    pub job_timeout_secs: u64,
    /// 同一阶段内同时运行的任务数量
    pub max_concurrent_jobs: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 推文抓取 ---
    /// 推文搜索接口地址
    pub scraper_search_url: String,
    /// 每个查询最多抓取的推文数
    pub scraper_max_tweets: usize,
    /// 默认回溯天数
    pub scraper_default_lookback_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 120,
            jobs_file: None,
            job_timeout_secs: 600,
            max_concurrent_jobs: 16,
            verbose_logging: false,
            scraper_search_url: "http://127.0.0.1:8001/search".to_string(),
            scraper_max_tweets: 100,
            scraper_default_lookback_days: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            backend_url: std::env::var("NLP_BACKEND_URL").unwrap_or(default.backend_url),
            request_timeout_secs: env_parse("NLP_REQUEST_TIMEOUT_SECS", default.request_timeout_secs),
            jobs_file: std::env::var("NLP_JOBS_FILE").ok().filter(|v| !v.trim().is_empty()),
            job_timeout_secs: env_parse("NLP_JOB_TIMEOUT_SECS", default.job_timeout_secs),
            max_concurrent_jobs: env_parse("NLP_MAX_CONCURRENT_JOBS", default.max_concurrent_jobs).max(1),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging),
            scraper_search_url: std::env::var("SCRAPER_SEARCH_URL").unwrap_or(default.scraper_search_url),
            scraper_max_tweets: env_parse("SCRAPER_MAX_TWEETS", default.scraper_max_tweets),
            scraper_default_lookback_days: env_parse(
                "SCRAPER_DEFAULT_LOOKBACK_DAYS",
                default.scraper_default_lookback_days,
            ),
        }
    }

    /// 任务超时，`None` 表示不限制
    pub fn job_timeout(&self) -> Option<std::time::Duration> {
        (self.job_timeout_secs > 0).then(|| std::time::Duration::from_secs(self.job_timeout_secs))
    }
}

/// 读取并解析环境变量，缺失或解析失败时使用默认值
fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
