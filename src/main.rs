use number_quest::cli::{Cli, CliInterface, parse_cli};
use number_quest::commentary::Commentator;
use number_quest::config::GeminiConfig;
use number_quest::error::AppError;
use number_quest::game_loop;
use number_quest::gemini::GeminiClient;
use number_quest::logging::init_logging;
use number_quest::tui::TuiInterface;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = parse_cli();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("number-quest: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    match init_logging(cli.log_file.as_deref()) {
        Ok(path) => log::info!("Logging to {}", path.display()),
        Err(e) => eprintln!("number-quest: {e}; continuing without a log file"),
    }

    let config = GeminiConfig::from_cli(cli);
    if !config.has_api_key() {
        log::warn!("No API key configured; the game master will use canned lines");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let wait_limit = config.wait_limit();
    let commentator = Commentator::new(Arc::new(GeminiClient::new(config)?));

    if cli.plain {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        game_loop(&mut interface, commentator, runtime.handle().clone(), wait_limit);
    } else {
        let mut interface = TuiInterface::new()?;
        game_loop(&mut interface, commentator, runtime.handle().clone(), wait_limit);
    }

    log::info!("Bye");
    Ok(())
}
