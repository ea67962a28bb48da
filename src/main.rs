use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use penn_shredder::config::{Config, ConfigLoader};
use penn_shredder::error::ShellError;
use penn_shredder::repl::Repl;

#[derive(FromArgs)]
/// Minimal command interpreter that kills foreground commands running past a timeout.
struct Args {
    #[argh(positional)]
    /// seconds a command line may run before it is killed; 0 disables the timer
    timeout: Option<u64>,

    #[argh(option, short = 'c')]
    /// key=value config file with `prompt` and `timeout` entries
    config: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<Config, ShellError> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::default_config(),
    };
    if let Some(secs) = args.timeout {
        config.timeout = std::time::Duration::from_secs(secs);
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let result = load_config(&args).and_then(|config| Repl::new(&config)?.run());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("penn-shredder: {}", e);
            ExitCode::FAILURE
        }
    }
}
