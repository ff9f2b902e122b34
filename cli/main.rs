#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use ols::config::Settings;
use ols::regression::formula::Formula;
use ols::regression::model::SavedModel;
use ols::regression::ols::fit as fit_model;
use ols::regression::report::{render_coefficients, render_column, write_column_tsv};
use ols::regression::table::read_table;

#[derive(Parser)]
#[command(
    name = "ols",
    version,
    about = "Ordinary least squares regression on delimited tables",
    long_about = "Fits y = b0 + b1*x1 + ... + bk*xk by the normal equations, using a sparse \
                  matrix engine built from elementary row operations."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a model and print its coefficients
    Fit(FitArgs),
    /// Apply a saved model to new data
    Predict(PredictArgs),
}

#[derive(Args)]
struct FitArgs {
    /// Path to the input table (.csv, or .tsv for tab-separated)
    input: PathBuf,

    /// Formula such as `y ~ x1 + x2` (quote the `~`). When omitted, the first
    /// column is the response and every other column is explanatory.
    #[arg(value_name = "FORMULA")]
    formula: Vec<String>,

    /// Field delimiter; inferred from the file extension when omitted
    #[arg(long, value_name = "CHAR")]
    delimiter: Option<char>,

    /// TOML settings file with a [linalg] section
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also print the fitted value of every row
    #[arg(long)]
    fitted: bool,

    /// Write fitted values to this TSV file
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Save the fitted model to this TOML file
    #[arg(long, value_name = "PATH")]
    save_model: Option<String>,
}

#[derive(Args)]
struct PredictArgs {
    /// Path to the table holding the explanatory columns
    input: PathBuf,

    /// Path to a model saved with `ols fit --save-model`
    #[arg(long)]
    model: String,

    /// Field delimiter; inferred from the file extension when omitted
    #[arg(long, value_name = "CHAR")]
    delimiter: Option<char>,

    /// Write predictions to this TSV file instead of standard output
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn delimiter_byte(delimiter: Option<char>) -> Result<Option<u8>, String> {
    delimiter
        .map(|c| {
            u8::try_from(c)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| format!("Delimiter '{c}' must be a single ASCII character."))
        })
        .transpose()
}

fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            Ok(Settings::load(path)?)
        }
        None => Ok(Settings::default()),
    }
}

fn fit(args: FitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(args.config.as_deref())?;
    let table = read_table(&args.input, delimiter_byte(args.delimiter)?)?;
    let formula = Formula::resolve(args.formula.as_slice(), table.header())?;

    let model = fit_model(&table, &formula, &settings.linalg)?;
    print!("{}", render_coefficients(&model));

    if args.fitted {
        println!();
        print!("{}", render_column("fitted", model.fitted()));
    }

    if let Some(output) = &args.output {
        write_column_tsv(output, "fitted", model.fitted())?;
        println!("Fitted values saved to: {}", output.display());
    }

    if let Some(path) = &args.save_model {
        model.to_saved(settings.linalg).save(path)?;
        println!("Model saved to: {path}");
    }

    Ok(())
}

fn predict(args: PredictArgs) -> Result<(), Box<dyn std::error::Error>> {
    let model = SavedModel::load(&args.model)?;
    let table = read_table(&args.input, delimiter_byte(args.delimiter)?)?;
    let predicted = model.predict(&table)?;

    match &args.output {
        Some(output) => {
            write_column_tsv(output, "predicted", &predicted)?;
            println!("Predictions saved to: {}", output.display());
        }
        None => print!("{}", render_column("predicted", &predicted)),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Fit(args) => fit(args),
        Commands::Predict(args) => predict(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
