mod prompter;
mod run;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use waypoint_flows::{
    SetupCommand, SetupContext, SetupSection, SetupState, configure_flow, onboarding_flow,
};
use waypoint_wizard::WizardEngine;

use crate::prompter::TerminalPrompter;

#[derive(Parser)]
#[command(name = "waypoint", about = "Guided setup for waypoint agents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Custom config directory (overrides default ~/.config/waypoint/).
    #[arg(long, global = true, env = "WAYPOINT_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full onboarding wizard (default when no subcommand is given).
    Onboard {
        /// Workspace directory to propose instead of the configured one.
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Reconfigure selected parts of an existing setup.
    Configure {
        /// Section to configure (repeatable): identity, workspace, gateway.
        /// Without it the wizard asks.
        #[arg(long = "section")]
        sections: Vec<String>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(true),
        )
        .init();
}

fn parse_sections(names: &[String]) -> anyhow::Result<Vec<SetupSection>> {
    names
        .iter()
        .map(|name| {
            SetupSection::parse(name)
                .ok_or_else(|| anyhow::anyhow!("unknown section: {name} (expected identity, workspace, or gateway)"))
        })
        .collect()
}

async fn run_setup(
    command: SetupCommand,
    workspace: Option<String>,
    sections: Vec<SetupSection>,
) -> anyhow::Result<()> {
    let base = waypoint_config::discover_and_load();
    let mut state = SetupState::new(command, base, workspace, sections);
    let flow = match command {
        SetupCommand::Onboard => onboarding_flow()?,
        SetupCommand::Configure => configure_flow(&mut state)?,
    };
    let mut engine = WizardEngine::new(flow, state, SetupContext::file_backed());
    let mut prompter = TerminalPrompter::stdio();
    run::run_wizard(&mut engine, &mut prompter).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    if let Some(ref dir) = cli.config_dir {
        waypoint_config::set_config_dir(dir.clone());
    }
    info!(version = env!("CARGO_PKG_VERSION"), "waypoint starting");

    match cli.command.unwrap_or(Commands::Onboard { workspace: None }) {
        Commands::Onboard { workspace } => {
            run_setup(SetupCommand::Onboard, workspace, Vec::new()).await
        },
        Commands::Configure { sections } => {
            let sections = parse_sections(&sections)?;
            run_setup(SetupCommand::Configure, None, sections).await
        },
    }
}
