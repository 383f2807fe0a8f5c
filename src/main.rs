use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use palette_hide::{
    cli::{Cli, Commands},
    handler::{handle_hide, handle_inspect, handle_recover},
};

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据指定的子命令
/// （`hide`、`recover` 或 `inspect`）将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 日志级别由 RUST_LOG 控制，默认只输出警告
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "palette_hide=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    // 解析命令行参数
    let cli = Cli::parse();

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Inspect(args) => handle_inspect(args),
    }
}
