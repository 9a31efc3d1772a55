//! rsfingerprint 命令行入口
//! 规则文件检查、离线匹配与单表达式调试，不做任何网络请求

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rsfingerprint::{expr, ConfigManager, Matcher, ResponseData, RuleLoader};

#[derive(Parser)]
#[command(
    name = "rsfingerprint",
    version,
    about = "基于布尔表达式 DSL 的 HTTP 服务指纹识别引擎"
)]
struct Cli {
    /// 输出详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 检查规则文件：统计编译成功与跳过的规则并展示分类结果
    Lint {
        /// 指纹规则文件路径（YAML 或 JSON）
        rules: PathBuf,
    },
    /// 用规则文件匹配一份已采集的响应数据
    Match {
        /// 指纹规则文件路径（YAML 或 JSON）
        rules: PathBuf,
        /// 已采集的响应数据文件（ResponseData 的 JSON 序列化）
        response: PathBuf,
    },
    /// 编译单条表达式并打印 AST，可选对响应数据求值
    Eval {
        /// 规则表达式文本
        expression: String,
        /// 已采集的响应数据文件，提供时对其求值
        #[arg(short, long)]
        response: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn load_response(path: &Path) -> Result<ResponseData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("读取响应数据文件 {} 失败", path.display()))?;
    serde_json::from_str(&raw).context("响应数据 JSON 解析失败")
}

fn run_lint(rules: PathBuf, verbose: bool) -> Result<()> {
    let config = ConfigManager::custom()
        .rule_path(rules)
        .verbose(verbose)
        .build();
    let loaded = RuleLoader::load_classified(&config)?;
    println!(
        "✅ 规则检查完成：请求 {} 条，编译成功 {} 条（通用 {} / 特殊 {}），跳过 {} 条",
        loaded.requested(),
        loaded.common.len() + loaded.special.len(),
        loaded.common.len(),
        loaded.special.len(),
        loaded.warnings.len()
    );
    for warning in &loaded.warnings {
        println!("{warning}");
    }
    Ok(())
}

fn run_match(rules: PathBuf, response: PathBuf) -> Result<()> {
    let (compiled, warnings) = RuleLoader::load_from_file(&rules)?;
    for warning in &warnings {
        println!("{warning}");
    }

    let data = load_response(&response)?;
    let matcher = Matcher::new(compiled);
    let matches = matcher.match_common(&data);

    if matches.is_empty() {
        println!("{} 未匹配到任何指纹规则", data.host);
    }
    for service in &matches {
        println!("{service}\n");
    }
    if !matcher.special_rules().is_empty() {
        println!(
            "另有 {} 条特殊规则需按其 path 单独采集响应后匹配",
            matcher.special_rules().len()
        );
    }
    Ok(())
}

fn run_eval(expression: String, response: Option<PathBuf>) -> Result<()> {
    let ast = expr::compile(&expression)?;
    println!("{ast:#?}");
    if let Some(path) = response {
        let data = load_response(&path)?;
        println!("求值结果: {}", ast.evaluate(&data));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Lint { rules } => run_lint(rules, cli.verbose),
        Command::Match { rules, response } => run_match(rules, response),
        Command::Eval {
            expression,
            response,
        } => run_eval(expression, response),
    }
}
