//! trip-planner CLI entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{debug, info};

use trip_planner::cli::{Cli, Command};
use trip_planner::config::TripPlannerConfig;
use trip_planner::formatter::{self, ThemeMode};
use trip_planner::models::weather::weather_description;
use trip_planner::purpose::{self, PURPOSE_GROUPS};
use trip_planner::{Services, TripPlanner, logging, web};

struct PlanArgs {
    destination: String,
    pick: usize,
    start: NaiveDate,
    end: NaiveDate,
    purpose: String,
    query: Option<String>,
    output: Option<PathBuf>,
    theme: ThemeMode,
    html: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TripPlannerConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose);
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Plan {
            destination,
            pick,
            start,
            end,
            purpose,
            query,
            output,
            theme,
            html,
        } => {
            let args = PlanArgs {
                destination,
                pick,
                start,
                end,
                purpose,
                query,
                output,
                theme,
                html,
            };
            run_plan(&config, args).await
        }
        Command::Purposes => {
            print_purposes();
            Ok(())
        }
        Command::Serve { port } => {
            let mut web_config = config.web.clone();
            if let Some(port) = port {
                web_config.port = port;
            }
            let services = Services::from_config(&config.services)?;
            web::run(TripPlanner::new(services), &web_config).await
        }
    }
}

async fn run_plan(config: &TripPlannerConfig, args: PlanArgs) -> Result<()> {
    let services = Services::from_config(&config.services)?;
    let planner = TripPlanner::from_query_string(args.query.as_deref().unwrap_or_default(), services);
    planner.set_theme(args.theme);

    let found = planner
        .search_location(&args.destination)
        .await
        .with_context(|| format!("Searching for '{}'", args.destination))?;
    let location = planner.select_candidate(args.pick).with_context(|| {
        format!("Selecting result {} of {} for '{}'", args.pick, found, args.destination)
    })?;
    println!("📍 {} ({})", location.label(), location.format_coordinates());

    planner
        .confirm_date_range(args.start, args.end)?
        .await
        .context("Weather request task failed")?;
    planner.set_purpose(&args.purpose)?;

    let session = planner.snapshot();
    if let Some(label) = session.dates.label() {
        println!("📅 {} {}", label, session.dates.day_count_label());
    }
    println!("🎯 {}", purpose::label_for(&args.purpose));

    info!("Requesting packing list");
    planner.submit_plan()?.wait().await?;
    let session = planner.snapshot();

    if !session.weather.is_empty() {
        println!("\n🌦️ Weather ({})", weather_description(&session.weather));
        for day in &session.weather {
            println!("  {}", day.summary_line());
        }
    }

    if !session.places.is_empty() {
        println!("\n🏛️ Nearby places");
        for place in &session.places {
            println!("  • {} - {}", place.name, place.address);
        }
    }

    let text = session.plan_text().unwrap_or_default();
    println!("\n🧳 Suggested Packing List\n");
    println!("{}", formatter::flatten_plain_text(text));
    if args.html {
        println!("\n{}", formatter::render_html(&formatter::format_response(text), args.theme));
    }

    let dir = args.output.unwrap_or_else(|| config.export.output_dir.clone());
    let path = planner.export_pdf(&dir)?;
    println!("\n⬇️ Saved {}", path.display());
    println!("🔗 ?{}", planner.query_string());

    Ok(())
}

fn print_purposes() {
    for group in PURPOSE_GROUPS {
        println!("{}", group.label);
        for option in group.options {
            println!("  {:<24} {}", option.value, option.label);
        }
    }
}
