use std::error::Error;
use std::process::ExitCode;

use taskdeck::{cli, config::Config, logging};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let matches = cli::command().get_matches();

    if let Some(("init", _)) = matches.subcommand() {
        logging::setup_stderr()?;
        return cli::init(&matches);
    }

    let config = Config::resolve(cli::config_arg(&matches).as_deref())?;
    if matches.subcommand().is_none() {
        // The terminal UI owns the screen; without a log path, stay quiet.
        if let Some(path) = config.log_path() {
            logging::setup_file(&path)?;
        }
    } else {
        logging::setup_stderr()?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cli::run(&matches, config))
}
