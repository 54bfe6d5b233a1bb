use chrono::NaiveDate;
use clap::Parser;
use gfs_meteogram::{
    default_model_date, parse_model_date, FetchRequest, LatLon, Meteogram, MeteogramError,
    ModelHour, DEFAULT_BASE_URL, DEFAULT_LATITUDE, DEFAULT_LONGITUDE,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "meteogram",
    version,
    about = "Fetch a GFS 0.25° hourly point forecast from NOMADS and plot it as a meteogram",
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Model run date (YYYYMMDD). Defaults to yesterday (UTC)
    #[arg(long, value_parser = parse_model_date)]
    pub date: Option<NaiveDate>,

    /// Model run hour: 00, 06, 12 or 18
    #[arg(long, default_value = "00")]
    pub hour: ModelHour,

    /// Latitude in decimal degrees
    #[arg(long, default_value_t = DEFAULT_LATITUDE)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, default_value_t = DEFAULT_LONGITUDE)]
    pub lon: f64,

    /// Chart output path. Defaults to meteogram_{YYYYMMDD}_{HH}z.html
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also export the derived series as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Also export the derived series as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Open the chart in the default browser
    #[arg(long)]
    pub open: bool,

    /// Read requests from stdin, one per line: [YYYYMMDD [HH [LAT [LON]]]]
    #[arg(long, short)]
    pub interactive: bool,

    /// Root URL of the GFS 0.25° hourly datasets
    #[arg(long, env = "METEOGRAM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds. No timeout by default
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// What one line of an interactive session asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Fetch(FetchRequest),
    Quit,
}

impl Cli {
    pub fn client(&self) -> Result<Meteogram, MeteogramError> {
        Meteogram::configured()
            .base_url(self.base_url.clone())
            .maybe_timeout(self.timeout_secs.map(Duration::from_secs))
            .call()
    }

    /// The request described by the command-line flags.
    pub fn request(&self) -> FetchRequest {
        FetchRequest {
            date: self.date.unwrap_or_else(default_model_date),
            hour: self.hour,
            location: LatLon(self.lat, self.lon),
        }
    }

    pub fn output_path(&self, request: &FetchRequest) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "meteogram_{}_{}z.html",
                request.date_code(),
                request.hour
            ))
        })
    }

    /// Parses `[YYYYMMDD [HH [LAT [LON]]]]`. Omitted fields take the values given on
    /// the command line.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::InvalidRequest`] for unparseable fields or extra input.
    pub fn parse_session_line(&self, line: &str) -> Result<SessionCommand, MeteogramError> {
        let line = line.trim();
        if matches!(line.to_ascii_lowercase().as_str(), "quit" | "exit" | "q") {
            return Ok(SessionCommand::Quit);
        }

        let defaults = self.request();
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() > 4 {
            return Err(MeteogramError::InvalidRequest(format!(
                "expected at most 4 fields (YYYYMMDD HH LAT LON), got {}",
                fields.len()
            )));
        }

        let date = match fields.first() {
            Some(field) => parse_model_date(field)?,
            None => defaults.date,
        };
        let hour = match fields.get(1) {
            Some(field) => field.parse()?,
            None => defaults.hour,
        };
        let lat = match fields.get(2) {
            Some(field) => parse_degrees(field, "latitude")?,
            None => defaults.location.latitude(),
        };
        let lon = match fields.get(3) {
            Some(field) => parse_degrees(field, "longitude")?,
            None => defaults.location.longitude(),
        };

        Ok(SessionCommand::Fetch(FetchRequest {
            date,
            hour,
            location: LatLon(lat, lon),
        }))
    }
}

fn parse_degrees(field: &str, name: &str) -> Result<f64, MeteogramError> {
    field
        .parse()
        .map_err(|_| MeteogramError::InvalidRequest(format!("{name} must be a number (got '{field}')")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("meteogram").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        let before = default_model_date();
        let request = cli.request();
        let after = default_model_date();

        assert!(request.date == before || request.date == after);
        assert_eq!(request.hour, ModelHour::H00);
        assert_eq!(request.location, LatLon(-6.20, 106.80));
        assert!(!cli.interactive);
        assert!(cli.timeout_secs.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = parse(&[
            "--date", "20240201", "--hour", "18", "--lat", "-33.87", "--lon", "-151.2",
            "--csv", "out.csv", "--timeout-secs", "20",
        ]);
        let request = cli.request();
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(request.hour, ModelHour::H18);
        assert_eq!(request.location, LatLon(-33.87, -151.2));
        assert_eq!(cli.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.timeout_secs, Some(20));
        assert_eq!(
            cli.output_path(&request),
            PathBuf::from("meteogram_20240201_18z.html")
        );
    }

    #[test]
    fn test_invalid_flags_are_rejected() {
        let argv = |args: &[&'static str]| std::iter::once("meteogram").chain(args.iter().copied()).collect::<Vec<_>>();
        assert!(Cli::try_parse_from(argv(&["--date", "2024-02-01"])).is_err());
        assert!(Cli::try_parse_from(argv(&["--hour", "03"])).is_err());
        assert!(Cli::try_parse_from(argv(&["--lat", "north"])).is_err());
    }

    #[test]
    fn test_session_lines() -> Result<(), MeteogramError> {
        let cli = parse(&["--date", "20240201", "--hour", "06"]);

        assert_eq!(cli.parse_session_line("quit")?, SessionCommand::Quit);
        assert_eq!(cli.parse_session_line(" EXIT ")?, SessionCommand::Quit);
        assert_eq!(cli.parse_session_line("")?, SessionCommand::Fetch(cli.request()));

        match cli.parse_session_line("20231231 12 52.1 5.18")? {
            SessionCommand::Fetch(request) => {
                assert_eq!(request.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
                assert_eq!(request.hour, ModelHour::H12);
                assert_eq!(request.location, LatLon(52.1, 5.18));
            }
            other => panic!("unexpected {other:?}"),
        }

        match cli.parse_session_line("20240202")? {
            SessionCommand::Fetch(request) => {
                assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
                assert_eq!(request.hour, ModelHour::H06);
                assert_eq!(request.location, LatLon(-6.20, 106.80));
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_invalid_session_lines() {
        let cli = parse(&[]);
        for line in ["2024", "20240201 07", "20240201 00 abc", "20240201 00 1 2 3"] {
            assert!(
                matches!(cli.parse_session_line(line), Err(MeteogramError::InvalidRequest(_))),
                "expected '{line}' to be rejected"
            );
        }
    }
}
