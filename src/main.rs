use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use std::env;
use std::path::PathBuf;
use std::process;
use stratum_reconcile::cli::commands::automigrate::{
    AutomigrateCommand, AutomigrateCommandHandler,
};
use stratum_reconcile::cli::commands::autoupdate::{AutoupdateCommand, AutoupdateCommandHandler};
use stratum_reconcile::cli::commands::check::{CheckCommand, CheckCommandHandler};
use stratum_reconcile::cli::commands::discover::{DiscoverCommand, DiscoverCommandHandler};
use stratum_reconcile::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// コマンドの実行結果
struct CommandResult {
    output: String,
    success: bool,
}

impl From<String> for CommandResult {
    fn from(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.no_color);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(result) => {
            if !result.output.is_empty() {
                println!("{}", result.output);
            }
            if !result.success {
                process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` が優先され、未設定時は warn（--verbose で debug）。
fn init_tracing(verbose: bool, no_color: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<CommandResult> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    match cli.command {
        Commands::Automigrate { models } => {
            let handler = AutomigrateCommandHandler::new();
            let command = AutomigrateCommand {
                project_path,
                config_path,
                env: cli.env,
                models,
                format: cli.format,
            };
            handler.execute(&command).await.map(CommandResult::from)
        }

        Commands::Autoupdate { models, dry_run } => {
            let handler = AutoupdateCommandHandler::new();
            let command = AutoupdateCommand {
                project_path,
                config_path,
                env: cli.env,
                models,
                dry_run,
                format: cli.format,
            };
            handler.execute(&command).await.map(CommandResult::from)
        }

        Commands::Discover { table, schema } => {
            let handler = DiscoverCommandHandler::new();
            let command = DiscoverCommand {
                project_path,
                config_path,
                env: cli.env,
                table,
                schema,
                format: cli.format,
            };
            handler.execute(&command).await.map(CommandResult::from)
        }

        Commands::Check { models } => {
            let handler = CheckCommandHandler::new();
            let command = CheckCommand {
                project_path,
                config_path,
                env: cli.env,
                models,
                format: cli.format,
            };
            let result = handler.execute(&command).await?;
            Ok(CommandResult {
                output: result.output,
                success: result.all_actual,
            })
        }
    }
}
