mod cli;

use clap::Parser;
use cli::{Cli, SessionCommand};
use env_logger::Env;
use gfs_meteogram::{
    csv_bytes, error_report, json_bytes, FetchRequest, ForecastSeries, Meteogram, MeteogramChart,
    MeteogramError, StagedOutputs,
};
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let client = match cli.client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", error_report(&e));
            return ExitCode::FAILURE;
        }
    };

    if cli.interactive {
        run_session(&cli, &client).await;
        return ExitCode::SUCCESS;
    }

    match run_once(&cli, &client, &cli.request()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to fetch or process data: {}", error_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// One fetch, derive and render cycle. Nothing is written unless every step succeeds.
async fn run_once(
    cli: &Cli,
    client: &Meteogram,
    request: &FetchRequest,
) -> Result<(), MeteogramError> {
    let forecast = client.forecast(request).await?;
    let chart = MeteogramChart::new(&forecast, request);
    let frame = forecast.to_frame()?;
    let output = write_outputs(cli, &chart, &forecast, request)?;

    println!("{}", chart.title());
    println!("{frame}");
    println!("Chart written to {}", output.display());
    if cli.open {
        chart.show();
    }
    Ok(())
}

/// Encodes the chart and any requested exports, then commits them together.
/// Returns the chart path.
fn write_outputs(
    cli: &Cli,
    chart: &MeteogramChart,
    forecast: &ForecastSeries,
    request: &FetchRequest,
) -> Result<PathBuf, MeteogramError> {
    let output = cli.output_path(request);
    let mut outputs = StagedOutputs::new();
    outputs.add(&output, chart.to_html().into_bytes());
    if let Some(path) = &cli.csv {
        outputs.add(path, csv_bytes(forecast)?);
    }
    if let Some(path) = &cli.json {
        outputs.add(path, json_bytes(forecast)?);
    }
    for path in outputs.commit()? {
        info!("Wrote {}", path.display());
    }
    Ok(output)
}

async fn run_session(cli: &Cli, client: &Meteogram) {
    println!("Enter [YYYYMMDD [HH [LAT [LON]]]] to fetch a meteogram, 'quit' to exit.");
    let defaults = cli.request();
    println!(
        "Defaults: {} {} {:.2} {:.2}",
        defaults.date_code(),
        defaults.hour,
        defaults.location.latitude(),
        defaults.location.longitude()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        if let Err(e) = std::io::stdout().flush() {
            warn!("Failed to flush stdout: {}", e);
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                break;
            }
        };

        match cli.parse_session_line(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(SessionCommand::Fetch(request)) => {
                if let Err(e) = run_once(cli, client, &request).await {
                    eprintln!("Failed to fetch or process data: {}", error_report(&e));
                }
            }
            Err(e) => eprintln!("{}", error_report(&e)),
        }
    }
}
