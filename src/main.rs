use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod dataset;
mod domain;
mod engine;
mod filter;
mod inputter;
mod model;
mod scheduler;
mod ui;

use controller::Controller;
use domain::{FvConfig, FvError};
use model::{Model, Status};

#[derive(Parser, Debug)]
#[command(name = "fv", version, about = "A tui based faceted data filter and viewer.")]
struct Cli {
    /// Data file to view (csv, parquet or arrow/ipc)
    file: String,

    /// Rows per table page
    #[arg(long, default_value_t = 100)]
    page_size: usize,

    /// Quiet window in ms before filter changes are recomputed
    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,

    /// Write logs to this file (filtered by FV_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), FvError> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let path = shellexpand::full(&cli.file)
        .map_err(|e| FvError::LoadingFailed(format!("Cannot expand path: {e}")))?
        .into_owned();

    let config = FvConfig::default()
        .with_page_size(cli.page_size)
        .with_debounce_ms(cli.debounce_ms);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(&config, size.width as usize, size.height as usize)?;
    model.load_data_file(PathBuf::from(path))?;

    let controller = Controller::new(&config);

    while model.status != Status::QUITTING {
        terminal.draw(|frame| ui::draw(frame, &model.uidata()))?;

        // Handle events and map them to a Message; the poll timeout keeps
        // the loop ticking so debounced filter runs dispatch and deliver.
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    Ok(())
}

fn init_tracing(log_file: Option<&std::path::Path>) -> Result<(), FvError> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    let filter = EnvFilter::try_from_env("FV_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::sync::Arc::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
