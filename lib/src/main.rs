//! sierpinski-gcode - Command-line interface for the sierpinski library
//!
//! Usage:
//!   sierpinski-gcode generate <config.json> [-o <output.gcode>]
//!   sierpinski-gcode generate <config.json> -o -
//!   sierpinski-gcode info <config.json>
//!   sierpinski-gcode section --order 3 --height 0.4

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{info, LevelFilter};
use sierpinski::config::{OutputTarget, PrintConfig};
use sierpinski::fractal::CrossSection;
use sierpinski::pipeline::PrintPipeline;
use std::path::{Path, PathBuf};

/// Print a Sierpinski pyramid straight from G-code, no slicer needed
#[derive(Parser, Debug)]
#[command(name = "sierpinski-gcode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate G-code for the pyramid described by a config file
    Generate {
        /// Print configuration file (JSON format)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output G-code file, or '-' for stdout (overrides the config file)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<String>,
    },

    /// Display the calculated print variables without generating G-code
    Info {
        /// Print configuration file (JSON format)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Dump one cross-section and its occlusion depth as JSON
    Section {
        /// Recursion order
        #[arg(long, default_value = "3")]
        order: u32,

        /// Height in pyramid units (0 to sqrt(2))
        #[arg(long)]
        height: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Generate { config, output } => cmd_generate(config, output),
        Commands::Info { config } => cmd_info(config),
        Commands::Section { order, height } => cmd_section(order, height),
    }
}

fn load_config(path: &Path) -> Result<PrintConfig> {
    info!("Loading config file: {}", path.display());
    PrintConfig::from_file(path)
        .with_context(|| format!("Failed to load config file {}", path.display()))
}

fn cmd_generate(config_path: PathBuf, output: Option<String>) -> Result<()> {
    let config = load_config(&config_path)?;

    // Command line beats the document, the document beats the default
    let target = output
        .map(|s| OutputTarget::parse(&s))
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| OutputTarget::beside(&config_path));

    let progress = ProgressBar::new(100);
    if target.is_stream() {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    }
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let pipeline = PrintPipeline::new(config);
    let stats = pipeline
        .process_to_target(&target, |stage, stage_progress| {
            let (base, range) = match stage {
                "layers" => (0, 20),
                "gcode" => (20, 80),
                _ => (0, 100),
            };
            progress.set_position(base + (stage_progress * range as f64) as u64);
            progress.set_message(match stage {
                "layers" => "Computing cross-sections...",
                "gcode" => "Generating G-code...",
                _ => "Processing...",
            });
        })
        .with_context(|| format!("Failed to generate G-code to {}", target))?;

    progress.set_position(100);
    progress.finish_with_message("Done!");

    if !target.is_stream() {
        println!();
        println!("Generation complete!");
        println!("  Output: {}", target);
        println!("  Layers: {}", stats.layer_count);
        println!("  Filament used: {:.2} m", stats.filament_used_meters());
        println!("  Estimated time: {}", stats.print_time_formatted());
    }
    info!("{}", stats);

    Ok(())
}

fn cmd_info(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)?;
    let pipeline = PrintPipeline::new(config);
    let params = pipeline.params().context("Invalid configuration")?;
    let layers = pipeline
        .layers(&params)
        .context("Failed to compute cross-sections")?;
    let filament = pipeline.estimated_filament(&params, &layers);

    println!("Pyramid Information:");
    println!("  File: {}", config_path.display());
    println!("{}", params);
    println!("  Vertices: {}", layers.iter().map(|l| l.len()).sum::<usize>());
    println!("  Estimated filament: {:.1} mm", filament);
    println!(
        "  Estimated print time: {:.0} s",
        params.estimated_print_time(filament)
    );

    Ok(())
}

fn cmd_section(order: u32, height: f64) -> Result<()> {
    let section = CrossSection::compute(order, height)
        .with_context(|| format!("Failed to compute order {} section at {}", order, height))?;
    println!("{}", serde_json::to_string_pretty(&section)?);
    Ok(())
}
