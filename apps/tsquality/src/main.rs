//! tsquality CLI
//!
//! Runs every `.csv` file given on the command line through the analysis
//! module and prints quality scores or chart data. Unreadable or invalid
//! files get a notice on stderr and are skipped.

mod cli;
mod report;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tsquality_bridge::testing::StubModule;
use tsquality_bridge::{
    analyse_files, AppConfig, Bridge, BridgeError, FileReport, ForeignModule, SharedLibraryModule,
};

use cli::{Cli, Format};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load_standard(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let reports = if cli.stub {
        let mut bridge = Bridge::new(StubModule::new(), config.bridge.clone())?;
        run(&mut bridge, &cli).await
    } else {
        let path = config
            .module
            .path
            .clone()
            .ok_or("no analysis module configured; pass --module or set module.path")?;
        let module = SharedLibraryModule::open(&path, &config.module)?;
        let mut bridge = Bridge::new(module, config.bridge.clone())?;
        run(&mut bridge, &cli).await
    };

    let reports = match reports {
        Ok(reports) => reports,
        Err(BridgeError::NoCsvFiles) => {
            eprintln!("{}", BridgeError::NoCsvFiles);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    for notice in report::notices(&reports) {
        eprintln!("{notice}");
    }

    match cli.format {
        Format::Summary => print!("{}", report::summary(&reports)),
        Format::Json => println!("{}", report::chart_json(&reports)?),
    }

    if reports.iter().any(FileReport::is_ok) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn run<M: ForeignModule>(
    bridge: &mut Bridge<M>,
    cli: &Cli,
) -> Result<Vec<FileReport>, BridgeError> {
    tracing::debug!(module = bridge.module().name(), "starting batch");
    analyse_files(bridge, cli.files.clone()).await
}
