use anyhow::Result;
use clap::Parser;
use colored::control as color_control;
use schemadoc::cli::command_context::CommandContext;
use schemadoc::cli::commands::check::{CheckCommand, CheckCommandHandler};
use schemadoc::cli::commands::doc::{DocCommand, DocCommandHandler};
use schemadoc::cli::{Cli, Commands};
use schemadoc::core::naming::{FALLBACK_LOG_ENV, LOG_ENV};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // CLIをパース
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run_command(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// ログ出力を初期化する（標準エラー出力）
///
/// フィルタは `SCHEMADOC_LOG`、次に `RUST_LOG` から読み、どちらもなければ既定レベルを使う。
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_env(FALLBACK_LOG_ENV))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// コマンドを実行する
fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    let context = CommandContext::load(project_path, config_path.as_deref())?;

    match cli.command {
        Commands::Doc {
            schema,
            additional,
            output,
        } => {
            let handler = DocCommandHandler::new();
            let command = DocCommand {
                context,
                schema,
                additional,
                output,
            };
            handler.execute(&command)
        }

        Commands::Check { schema, additional } => {
            let handler = CheckCommandHandler::new();
            let command = CheckCommand {
                context,
                schema,
                additional,
            };
            handler.execute(&command)
        }
    }
}
