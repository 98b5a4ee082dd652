//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use plan_gate::core::catalog::AudioCategory;
use plan_gate::core::plan::ContentType;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  plan-gate plan custom_chat_video_monthly      Decode a plan and show what it grants
  plan-gate models --content-type image         List image models and their access
  plan-gate toggle chat gpt-4o-mini llama-3.1-8b
                                                Toggle models and save the chat selection
  plan-gate toggle audio --audio-category stt whisper-small
                                                Pick the speech-to-text model
  plan-gate selection                           Show committed selections
  plan-gate --plan plus_yearly models           Run a command as another plan
  plan-gate completions bash                    Generate bash completions

ENVIRONMENT:
  PLAN_GATE_PLAN      Raw plan identifier (default: free)
  PLAN_GATE_CATALOG   Catalog JSON file (default: built-in catalog)
  PLAN_GATE_STORE     Selection store file (default: <config dir>/selections.json)
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Plan entitlements and model selection policy",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Plan identifier to act as (overrides PLAN_GATE_PLAN)
    #[arg(long, global = true, help = "Plan identifier, e.g. custom_chat_video_monthly")]
    pub plan: Option<String>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a plan identifier and show access tiers and caps per content type
    Plan {
        /// Plan identifier (defaults to the configured plan)
        raw: Option<String>,
    },
    /// List catalog models with their access status for the plan
    Models {
        /// Only list models of this content type (chat, image, audio, video)
        #[arg(long)]
        content_type: Option<ContentType>,
        /// Filter models by id or name
        #[arg(long)]
        query: Option<String>,
    },
    /// Toggle models in a content type's selection, then save it
    Toggle {
        /// Content type to edit (chat, image, audio, video)
        content_type: ContentType,
        /// Audio category to edit (tts, stt, ag); defaults to the last used one
        #[arg(long)]
        audio_category: Option<AudioCategory>,
        /// Start from an empty selection instead of the committed one
        #[arg(long)]
        replace: bool,
        /// Model ids to toggle, in order
        #[arg(required = true)]
        model_ids: Vec<String>,
    },
    /// Show committed selections
    Selection,
    /// Mark or unmark a model as favorite
    Favorite {
        /// Model id
        model_id: String,
        /// Remove the favorite instead of adding it
        #[arg(long)]
        off: bool,
    },
    /// Show config paths and plan source
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
