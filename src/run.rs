//! Application run modes: logger init and command dispatch.

use std::io;

use clap::CommandFactory;

use plan_gate::core;
use plan_gate::core::cli::ToggleRequest;
use plan_gate::core::plan::PlanCache;

use crate::cli::{self, Args, Commands};

/// Initialize env_logger on stderr, so command output on stdout stays clean.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Run the parsed command.
pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Completions { shell } = &args.command {
        cli::generate(*shell, &mut Args::command(), core::app::NAME, &mut io::stdout());
        return Ok(());
    }

    let config = core::config::load(args.plan.as_deref())?;
    let mut plans = PlanCache::new();

    match &args.command {
        Commands::Plan { raw } => core::cli::run_plan(&config, raw.as_deref(), &mut plans)?,
        Commands::Models {
            content_type,
            query,
        } => core::cli::run_models(&config, &mut plans, *content_type, query.as_deref())?,
        Commands::Toggle {
            content_type,
            audio_category,
            replace,
            model_ids,
        } => core::cli::run_toggle(
            &config,
            &mut plans,
            ToggleRequest {
                content_type: *content_type,
                audio_category: *audio_category,
                replace: *replace,
                model_ids,
            },
        )?,
        Commands::Selection => core::cli::run_selection(&config)?,
        Commands::Favorite { model_id, off } => {
            core::cli::run_favorite(&config, model_id, !off)?
        }
        Commands::Config => core::cli::run_config(&config),
        Commands::Completions { .. } => {}
    }
    Ok(())
}
