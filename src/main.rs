use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stepsafe::api::{CheckRequest, CheckResult};
use stepsafe::models::{DailyHealthReport, UserInput, UserProfile};
use stepsafe::risk::WindowLevel;
use stepsafe::{
    AppState, LocationInput, LocationParser, StepSafeConfig, StepSafeError, telemetry, web,
};

#[derive(Debug, Parser)]
#[command(name = "stepsafe", version, about = "Climate-health risk checks and daily reports")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Risk dashboard, checklist, time windows and advisory for a location
    Check {
        /// City name or "lat,lon"
        #[arg(short, long)]
        location: String,
        /// Use deterministic offline data instead of Open-Meteo
        #[arg(long)]
        synthetic: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Daily health report for a profile stored as JSON
    Report {
        #[arg(short, long)]
        profile: PathBuf,
        #[arg(long)]
        synthetic: bool,
        #[arg(long)]
        json: bool,
    },
    /// Stored exposure records, newest first
    History {
        #[arg(short, long)]
        user: String,
    },
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        match error.downcast_ref::<StepSafeError>() {
            Some(app_error) => eprintln!("Error: {}", app_error.user_message()),
            None => eprintln!("Error: {error:#}"),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = StepSafeConfig::load_from_path(cli.config.clone())?;

    match &cli.command {
        Command::Check { synthetic: true, .. } | Command::Report { synthetic: true, .. } => {
            config.climate.provider = "synthetic".to_string();
        }
        Command::Serve { port: Some(port) } => config.server.port = *port,
        _ => {}
    }

    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;
    let state = Arc::new(AppState::from_config(&config)?);

    match cli.command {
        Command::Check { location, json, .. } => {
            let request = match LocationParser::parse(&location)? {
                LocationInput::Coordinates(lat, lon) => CheckRequest::Coordinates { lat, lon },
                LocationInput::Name(city) => CheckRequest::City(UserInput {
                    city,
                    age_group: None,
                    activity_level: None,
                }),
            };
            let result = state.check(request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_check(&result);
            }
        }
        Command::Report { profile, json, .. } => {
            let raw = std::fs::read_to_string(&profile)
                .with_context(|| format!("Failed to read profile {}", profile.display()))?;
            let profile: UserProfile = serde_json::from_str(&raw)
                .map_err(|e| StepSafeError::validation(format!("Invalid profile JSON: {e}")))?;
            let report = state.reports.generate(&profile).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::History { user } => {
            let records = state.history.list(&user).await?;
            if records.is_empty() {
                println!("No exposure records for {user}");
            }
            for record in records {
                println!(
                    "{}  score {:>3}  heat {:.0}°F  AQI {:.0}  UV {:.0}",
                    record.date,
                    record.personal_health_risk_score,
                    record.max_heat,
                    record.max_aqi,
                    record.max_uv
                );
            }
        }
        Command::Serve { .. } => web::run(&config.server, state).await?,
    }

    Ok(())
}

fn print_check(result: &CheckResult) {
    println!("{}", result.location.name);
    println!("{}", result.climate.summary());
    println!();

    let profile = &result.risk_profile;
    for risk in [
        &profile.heat_risk,
        &profile.uv_risk,
        &profile.aqi_risk,
        &profile.humidity_discomfort,
        &profile.rain_exposure,
    ] {
        println!("{:<20} {:<8} {}", risk.name, risk.level, risk.explanation);
    }

    println!("\nChecklist");
    for item in &result.checklist {
        println!("  - {}: {}", item.recommendation, item.details);
    }

    println!("\nTime windows");
    for window in &result.time_windows {
        let marker = match window.level {
            WindowLevel::Safer => "safer ",
            WindowLevel::Unsafe => "unsafe",
        };
        println!("  [{marker}] {:<20} {}", window.period, window.reason);
    }

    println!("\n{}", result.advisory);
}

fn print_report(report: &DailyHealthReport) {
    let summary = &report.daily_summary;
    println!(
        "Personal health risk: {} ({})",
        summary.personal_health_risk_score, summary.risk_description
    );
    println!("{}", summary.quick_insight);
    println!(
        "Since yesterday: {:+.0}°F, AQI {:+.0}",
        summary.what_changed.temp_change, summary.what_changed.aqi_change
    );

    println!("\nSafe windows");
    for window in &summary.safe_windows {
        let marker = if window.is_safe { "safe  " } else { "unsafe" };
        println!(
            "  [{marker}] {}-{}",
            window.start.format("%H:%M"),
            window.end.format("%H:%M")
        );
    }

    println!("\n{}", report.safety_advisory.advisory);

    for phase in &report.daily_guidance.phases {
        println!(
            "\n{} ({}-{})",
            phase.phase,
            phase.start_time.format("%H:%M"),
            phase.end_time.format("%H:%M")
        );
        println!("  {}", phase.summary);
        for recommendation in &phase.recommendations {
            println!("  - {recommendation}");
        }
    }
}
