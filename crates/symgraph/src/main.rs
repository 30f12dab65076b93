use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use symgraph_core::model::Name;
use symgraph_core::prelude::{load_symbol_table, BuildOptions, BuildOutput, SymbolGraphBuilder};
use symgraph_utils::{info, init_build_log, init_logging, init_logging_with_level, LogFormat, LogLevel};

/// Turns the debug information of a compiled program into a namespaced reflection model.
#[derive(Parser, Debug)]
#[command(name = "symgraph")]
#[command(version)]
#[command(about = "Turns the debug information of a compiled program into a namespaced reflection model", long_about = None)]
struct Cli
{
    /// Log level (error, warn, info, debug, trace). Overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format (pretty or json). Overrides SYMGRAPH_LOG_FORMAT
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Build the reflection model of a binary and print its namespace tree
    Build
    {
        /// Path to an ELF or Mach-O file with DWARF debug information
        input: PathBuf,
        /// Write all logging to <input>.symgraph.log instead of the console
        #[arg(long, default_value_t = false)]
        build_log: bool,
        /// Name of the function whose overloads register reflected types
        #[arg(long)]
        registration_fn: Option<String>,
    },
    /// Build the reflection model of a binary and list every interned name with its hash
    Names
    {
        /// Path to an ELF or Mach-O file with DWARF debug information
        input: PathBuf,
        /// Name of the function whose overloads register reflected types
        #[arg(long)]
        registration_fn: Option<String>,
    },
}

fn main()
{
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>>
{
    if let Commands::Build {
        input, build_log: true, ..
    } = &cli.command
    {
        let path = init_build_log(input, cli.log_level)?;
        eprintln!("Logging to {}", path.display());
        return Ok(());
    }

    match (cli.log_level, cli.log_format) {
        (None, None) => init_logging()?,
        (level, format) => init_logging_with_level(level.unwrap_or(LogLevel::Info), format.unwrap_or_default())?,
    }
    Ok(())
}

fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    match cli.command {
        Commands::Build {
            input, registration_fn, ..
        } => {
            let output = build(&input, registration_fn)?;

            print!("{}", output.module.tree());

            if !output.diagnostics.is_empty() {
                println!();
                println!("Diagnostics:");
                for diagnostic in &output.diagnostics {
                    println!("  {}", diagnostic);
                }
            }

            let stats = output.stats;
            println!();
            println!(
                "{} registrations, {} types, {} template instances, {} fields, {} functions",
                stats.registrations, stats.types, stats.template_instances, stats.fields, stats.functions
            );
            if stats.dropped_fields > 0 || stats.dropped_functions > 0 {
                println!(
                    "Dropped {} fields and {} functions",
                    stats.dropped_fields, stats.dropped_functions
                );
            }
            println!(
                "{} warnings, {} errors",
                output.warnings().count(),
                output.errors().count()
            );
            Ok(())
        }
        Commands::Names { input, registration_fn } => {
            let output = build(&input, registration_fn)?;
            let names = output.module.names();

            let mut listed: Vec<&Name> = names.iter().collect();
            listed.sort_by(|a, b| a.text().cmp(b.text()));

            println!("{} names:", names.len());
            for name in listed {
                println!("  0x{:08x}  {}", name.hash(), name.text());
            }
            Ok(())
        }
    }
}

fn build(input: &Path, registration_fn: Option<String>) -> Result<BuildOutput, Box<dyn std::error::Error>>
{
    let mut options = BuildOptions::default();
    if let Some(name) = registration_fn {
        options = options.with_registration_fn(name);
    }

    info!("Reading debug information from {}", input.display());
    let table = load_symbol_table(input, &options)?;
    let output = SymbolGraphBuilder::new(&table, &options).build()?;
    Ok(output)
}
