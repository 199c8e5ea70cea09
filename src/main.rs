use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

use coach::config::AppConfig;
use coach::error::CoachError;
use coach::export::{self, ExportFormat};
use coach::logging::init_logging;
use coach::training_plan::TrainingPlan;

/// coach - training plan workout export
///
/// Turns the workouts of a validated training plan into structured workout
/// files for training software.
#[derive(Parser)]
#[command(name = "coach")]
#[command(version)]
#[command(about = "Training plan workout export", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the workouts of a plan and whether they can be exported
    List {
        /// Training plan JSON file
        #[arg(short, long)]
        plan: PathBuf,
    },

    /// Print the exported document for one workout
    Preview {
        /// Training plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Workout ID
        #[arg(short, long)]
        workout: String,

        /// Export format (default from config)
        #[arg(short = 'f', long)]
        format: Option<String>,
    },

    /// Write workout files for one workout or a whole plan
    Export {
        /// Training plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Export only this workout
        #[arg(short, long)]
        workout: Option<String>,

        /// Output directory (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (default from config)
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Keep files that already exist
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (KEY=VALUE)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

#[derive(Tabled)]
struct WorkoutRow {
    #[tabled(rename = "Week")]
    week: u32,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Sport")]
    sport: String,
    #[tabled(rename = "Type")]
    workout_type: String,
    #[tabled(rename = "Minutes")]
    minutes: String,
    #[tabled(rename = "Structured")]
    structured: String,
    #[tabled(rename = "Export")]
    export: String,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CoachError>() {
            Some(coach_err) => {
                if coach_err.severity().to_tracing_level() == tracing::Level::WARN {
                    tracing::warn!(error = %coach_err, "Command failed");
                } else {
                    tracing::error!(error = %coach_err, severity = ?coach_err.severity(), "Command failed");
                }
                eprintln!("{} {}", "error:".red().bold(), coach_err.user_message());
            }
            None => eprintln!("{} {:#}", "error:".red().bold(), err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    match cli.command {
        Commands::List { plan } => {
            let plan = load_plan(&plan)?;
            let exporter = export::exporter_for(config.export.format, &config.export.author);

            let rows: Vec<WorkoutRow> = plan
                .schedule()
                .map(|entry| WorkoutRow {
                    week: entry.week_number,
                    date: entry.date.format("%Y-%m-%d").to_string(),
                    id: entry.workout.id.clone(),
                    sport: entry.workout.sport.to_string(),
                    workout_type: entry.workout.workout_type.clone(),
                    minutes: entry
                        .workout
                        .duration_minutes
                        .or_else(|| {
                            entry
                                .workout
                                .structure
                                .as_ref()
                                .map(|s| s.total_duration_seconds() / 60.0)
                                .filter(|m| *m > 0.0)
                        })
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    structured: if entry.workout.structure.is_some() { "yes" } else { "no" }
                        .to_string(),
                    export: if exporter.is_supported(entry.workout.sport) {
                        exporter.format().to_string()
                    } else {
                        "-".to_string()
                    },
                })
                .collect();

            println!(
                "{} {} ({} workouts)",
                "Plan:".bold(),
                plan.meta.event,
                rows.len()
            );
            println!("{}", Table::new(rows).with(Style::rounded()));
        }

        Commands::Preview {
            plan,
            workout,
            format,
        } => {
            let plan = load_plan(&plan)?;
            let format = resolve_format(format.as_deref(), &config)?;
            let exporter = export::exporter_for(format, &config.export.author);

            let workout = plan.find_workout(&workout).map_err(CoachError::from)?;
            let document = exporter.render(workout).map_err(CoachError::from)?;
            println!("{}", document);
        }

        Commands::Export {
            plan,
            workout,
            output,
            format,
            no_overwrite,
        } => {
            let plan = load_plan(&plan)?;
            let format = resolve_format(format.as_deref(), &config)?;
            let exporter = export::exporter_for(format, &config.export.author);
            let output_dir = output.unwrap_or_else(|| config.export.output_dir.clone());

            let mut options = config.export.options();
            if no_overwrite {
                options.overwrite = false;
            }

            match workout {
                Some(id) => {
                    let workout = plan.find_workout(&id).map_err(CoachError::from)?;
                    let path = export::export_workout(exporter.as_ref(), workout, &output_dir, &options)
                        .map_err(CoachError::from)?;
                    println!("{} {}", "✓ Exported".green(), path.display());
                }
                None => {
                    let progress = ProgressBar::new_spinner();
                    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
                    progress.set_message(format!("Exporting {} workouts...", format));
                    progress.enable_steady_tick(Duration::from_millis(100));

                    let summary = export::export_plan(exporter.as_ref(), &plan, &output_dir, &options)
                        .map_err(CoachError::from)?;
                    progress.finish_and_clear();

                    for path in &summary.written {
                        println!("  {} {}", "✓".green(), path.display());
                    }
                    for skipped in &summary.skipped {
                        println!(
                            "  {} {} ({})",
                            "-".yellow(),
                            skipped.workout_id,
                            skipped.reason
                        );
                    }
                    println!(
                        "{}",
                        format!(
                            "✓ Exported {} of {} workouts to {}",
                            summary.written.len(),
                            summary.total(),
                            output_dir.display()
                        )
                        .green()
                        .bold()
                    );
                }
            }
        }

        Commands::Config { list, set, get } => {
            if list {
                for (key, value) in config.entries() {
                    println!("{} = {}", key.cyan(), value);
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value.split_once('=').ok_or_else(|| {
                    CoachError::Configuration(format!("Expected KEY=VALUE, got {}", key_value))
                })?;
                config.set(key.trim(), value.trim())?;
                let path = config.save(cli.config.as_deref())?;
                println!("{} {} ({})", "✓ Set".green(), key.trim(), path.display());
            } else if let Some(key) = get {
                println!("{}", config.get(&key)?);
            } else {
                println!("Config file: {}", AppConfig::default_path().display());
            }
        }
    }

    Ok(())
}

fn load_plan(path: &Path) -> Result<TrainingPlan> {
    Ok(TrainingPlan::from_path(path).map_err(CoachError::from)?)
}

fn resolve_format(format: Option<&str>, config: &AppConfig) -> Result<ExportFormat> {
    match format {
        Some(name) => Ok(name.parse::<ExportFormat>().map_err(CoachError::from)?),
        None => Ok(config.export.format),
    }
}
