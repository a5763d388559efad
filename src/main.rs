use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use models_qa::config::{Config, DEFAULT_CONFIG_FILE};
use models_qa::{logger, App};

/// 用本地模型批量回答问题并记录耗时
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// 结果 CSV 路径（默认为当前目录下的 QA_<模型名>.csv）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(&cli.config)
        .with_context(|| format!("无法加载配置文件: {}", cli.config.display()))?;
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    App::new(config, cli.output).run()?;

    Ok(())
}
