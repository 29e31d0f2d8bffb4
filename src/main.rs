//! 并发文本分类命令行工具
//!
//! 读取输入 JSON（每个字段一组文本），加载话题 / 情感 / 仇恨言论三种模型，
//! 并发分类后把合并结果以一个 JSON 文档输出到标准输出。

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nlp_runner::models::{load_input, load_job_plan};
use nlp_runner::orchestrator::{self, Limits, Phase};
use nlp_runner::services::OutputWriter;
use nlp_runner::utils::logging;
use nlp_runner::{AppError, AppResult, Config, HttpModelLoader};
use pico_args::Arguments;
use tracing::error;

const HELP: &str = "\
Usage: nlp_runner [OPTIONS] INPUT

Arguments:
  INPUT                输入 JSON 文件，每个字段是一个字符串数组

Options:
  -h, --help           打印帮助
  -j, --jobs PATH      任务计划文件（TOML），默认读取 NLP_JOBS_FILE
      --pretty         缩进输出 JSON
  -v, --verbose        详细日志
";

#[derive(Debug)]
struct Args {
    /// 打印帮助
    help: bool,

    /// 缩进输出
    pretty: bool,

    /// 详细日志
    verbose: bool,

    /// 任务计划文件
    jobs: Option<String>,

    /// 输入文件
    input: Option<PathBuf>,
}

fn parse_args(mut pargs: Arguments) -> Result<Args, pico_args::Error> {

    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        pretty: pargs.contains("--pretty"),
        verbose: pargs.contains(["-v", "--verbose"]),
        jobs: pargs.opt_value_from_str(["-j", "--jobs"])?,
        input: pargs.opt_free_from_str()?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("未知参数: {:?}", remaining),
        });
    }

    Ok(args)
}

/// 运行结束后等待阻塞任务退出的最长时间
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

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

    // 超时的加载可能仍卡在阻塞线程中，不再等待
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
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

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging || args.verbose);

    let started = Instant::now();
    match run(args, config).await {
        Ok((collections, records)) => {
            logging::print_final_stats(Phase::Done, collections, records, started.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ {}", e);
            logging::print_final_stats(Phase::Failed, 0, 0, started.elapsed());
            report(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// 运行分类，返回 (集合数, 文本数)
async fn run(args: Args, config: Config) -> AppResult<(usize, usize)> {
    let input = args
        .input
        .ok_or_else(|| AppError::input("argv", "缺少输入文件路径"))?;

    let plan = match args.jobs.or_else(|| config.jobs_file.clone()) {
        Some(path) => Some(load_job_plan(Path::new(&path)).await?),
        None => None,
    };

    let (collections, plan) = load_input(&input, plan).await?;
    logging::log_startup(&config, &collections);

    let loader = HttpModelLoader::new(&config).map_err(|e| AppError::config(format!("{:#}", e)))?;

    let collections = orchestrator::run(
        Arc::new(loader),
        collections,
        plan,
        Limits::from_config(&config),
    )
    .await?;

    OutputWriter::new()
        .pretty(args.pretty)
        .write(&collections, std::io::stdout().lock())?;

    Ok((collections.len(), collections.total_records()))
}

/// 输出诊断信息（含错误链）到标准错误
fn report(err: &AppError) {
    eprintln!("错误: {}", err);
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  原因: {}", cause);
        source = cause.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Arguments {
        Arguments::from_vec(items.iter().map(Into::into).collect())
    }

    #[test]
    fn test_parse_flags_and_input() {
        let parsed = parse_args(args(&["--pretty", "-j", "jobs.toml", "input.json"])).unwrap();
        assert!(parsed.pretty);
        assert_eq!(parsed.jobs.as_deref(), Some("jobs.toml"));
        assert_eq!(parsed.input, Some(PathBuf::from("input.json")));
    }

    #[test]
    fn test_unknown_arguments_are_rejected() {
        assert!(parse_args(args(&["--bogus", "input.json"])).is_err());
        assert!(parse_args(args(&["input.json", "extra.json"])).is_err());
    }
}
