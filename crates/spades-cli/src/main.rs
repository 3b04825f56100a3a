use clap::Parser;
use spades_core::AppInfo;
use spades_core::game::match_state::MatchError;
use tracing::info;

use spades_cli::commands::{Cli, execute};
use spades_cli::config::CliConfig;
use spades_cli::logging::init_logging;
use spades_cli::prompt::CliGate;
use spades_cli::store::SnapshotStore;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(state) = cli.state {
        config.save_path = state;
    }
    if cli.yes {
        config.auto_confirm = true;
    }
    let default_variant = config.variant()?;

    let logging_guard = init_logging(&config.logging)?;
    info!(
        app = AppInfo::name(),
        version = AppInfo::version(),
        log_file = ?logging_guard.log_path(),
        "logging initialised"
    );

    let store = SnapshotStore::new(config.save_path.clone());
    let mut state = store.load_or_new(default_variant);
    let mut gate = CliGate::new(config.auto_confirm);

    info!(command = ?cli.command, path = %store.path().display(), "running command");
    let result = execute(cli.command, &mut state, &mut gate, default_variant);
    if matches!(&result, Ok(report) if report.changed) {
        store.save_or_warn(&state);
    }

    match result {
        Ok(report) => {
            print!("{}", report.text);
            Ok(())
        }
        Err(MatchError::Declined) => {
            println!("{}", MatchError::Declined);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
