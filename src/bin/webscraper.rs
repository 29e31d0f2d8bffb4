//! 推文抓取命令行工具
//!
//! 抓取目标账号本人的推文与提及目标的回复，输出
//! `{"target_tweets": [...], "tweets_about_target": [...]}`，可直接作为分类器的输入。

use std::process::ExitCode;
use std::time::Duration;

use nlp_runner::scraper::{scrape_target, HttpTweetSource, SearchWindow};
use nlp_runner::utils::logging;
use nlp_runner::{AppError, AppResult, Config};
use pico_args::Arguments;
use tracing::error;

const HELP: &str = "\
Usage: webscraper [OPTIONS] NAME [HANDLE] [LOOKBACK_DAYS]

Arguments:
  NAME                 目标名称（搜索提及该名称的回复）
  HANDLE               目标推特账号，可带 @；为空则跳过本人推文
  LOOKBACK_DAYS        回溯天数，默认读取 SCRAPER_DEFAULT_LOOKBACK_DAYS (30)

Options:
  -h, --help           打印帮助
  -m, --max N          每个查询最多抓取的推文数，默认读取 SCRAPER_MAX_TWEETS (100)
";

#[derive(Debug)]
struct Args {
    help: bool,
    max: Option<usize>,
    name: Option<String>,
    handle: Option<String>,
    lookback_days: Option<i64>,
}

fn parse_args(mut pargs: Arguments) -> Result<Args, pico_args::Error> {

    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        max: pargs.opt_value_from_str(["-m", "--max"])?,
        name: pargs.opt_free_from_str()?,
        handle: pargs.opt_free_from_str()?,
        lookback_days: pargs.opt_free_from_str()?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("未知参数: {:?}", remaining),
        });
    }

    Ok(args)
}

fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let err = AppError::io("<runtime>", e);
            eprintln!("错误: {}", err);
            return ExitCode::from(err.exit_code());
        }
    };

    let code = runtime.block_on(async_main());
    runtime.shutdown_timeout(Duration::from_secs(5));
    code
}

async fn async_main() -> ExitCode {
    let args = match parse_args(Arguments::from_env()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("参数错误: {}\n\n{}", e, HELP);
            return ExitCode::from(AppError::input("argv", e.to_string()).exit_code());
        }
    };

    if args.help {
        println!("{}", HELP);
        return ExitCode::SUCCESS;
    }

    let config = Config::from_env();
    logging::init(config.verbose_logging);

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {}", e);
            eprintln!("错误: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args, config: Config) -> AppResult<()> {
    let name = args
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::input("argv", "缺少目标名称"))?;
    let handle = args.handle.unwrap_or_default();

    let today = chrono::Local::now().date_naive();
    let window = SearchWindow::new(
        today,
        args.lookback_days.unwrap_or(config.scraper_default_lookback_days),
        config.scraper_default_lookback_days,
    )?;
    let max_tweets = args.max.unwrap_or(config.scraper_max_tweets);

    let source = HttpTweetSource::new(&config).map_err(|e| AppError::config(format!("{:#}", e)))?;
    let tweets = scrape_target(&source, &name, &handle, window, max_tweets).await?;

    let rendered = serde_json::to_string(&tweets)
        .map_err(|e| AppError::input("output", format!("无法序列化结果: {}", e)))?;
    println!("{}", rendered);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Arguments {
        Arguments::from_vec(items.iter().map(Into::into).collect())
    }

    #[test]
    fn test_parse_positional_and_max() {
        let parsed = parse_args(args(&["--max", "20", "Jane Doe", "@janedoe", "7"])).unwrap();
        assert_eq!(parsed.max, Some(20));
        assert_eq!(parsed.name.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.handle.as_deref(), Some("@janedoe"));
        assert_eq!(parsed.lookback_days, Some(7));
    }

    #[test]
    fn test_unknown_and_extra_arguments_are_rejected() {
        assert!(parse_args(args(&["Jane", "jane", "7", "--bogus"])).is_err());
        assert!(parse_args(args(&["Jane", "jane", "7", "extra"])).is_err());
    }
}
