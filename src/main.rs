use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use log::info;

use gamestats::{
    model::filter::DEFAULT_TOP_PERCENT,
    service::{
        data_manager::DataManager,
        statsapi::client::{ApiClient, DEFAULT_BASE_URL},
    },
    ui::{repl, route::Route},
};

/// Game statistics dashboard for the terminal
#[derive(Parser, Debug)]
#[command(name = "gamestats")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the statistics API
    #[arg(long = "api-url", env = "GAMESTATS_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "GAMESTATS_TIMEOUT_SECS", default_value_t = 30)]
    timeout: u64,

    /// Percentile of rankers used for the top player panels
    #[arg(
        long = "top-percent",
        env = "GAMESTATS_TOP_PERCENT",
        default_value_t = DEFAULT_TOP_PERCENT,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    top_percent: u32,

    /// Page opened on start: /, /ranking, /items or /skills
    #[arg(long, env = "GAMESTATS_PAGE", default_value = "/")]
    page: Route,

    /// Log destination, defaults to gamestats.log in the temp directory
    #[arg(long = "log-file", env = "GAMESTATS_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("gamestats.log"));
    if let Err(error) = init_logging(&log_file) {
        eprintln!("Cannot write log file {}:\n{}\n", log_file.display(), error);
        return ExitCode::FAILURE;
    }

    let client = match ApiClient::new(&args.api_url, Duration::from_secs(args.timeout)) {
        Ok(client) => client,
        Err(error) => {
            eprintln!("Error occured while initializing:\n{}\n", error);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Starting at {} against {} (timeout {}s, top {}%)",
        args.page,
        client.base_url(),
        args.timeout,
        args.top_percent
    );

    let manager = DataManager::new(Arc::new(client)).with_top_percent(args.top_percent);
    match repl::run(manager, args.page) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error occured while running REPL:\n{}\n", error);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["gamestats"]).unwrap();
        assert_eq!(args.timeout, 30);
        assert_eq!(args.top_percent, 10);
        assert_eq!(args.page, Route::Dashboard);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn page_and_percent_are_validated() {
        let args = Args::try_parse_from(["gamestats", "--page", "/skills", "--top-percent", "25"]).unwrap();
        assert_eq!(args.page, Route::Skills);
        assert_eq!(args.top_percent, 25);

        assert!(Args::try_parse_from(["gamestats", "--page", "/admin"]).is_err());
        assert!(Args::try_parse_from(["gamestats", "--top-percent", "0"]).is_err());
    }
}
