use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use eos_name_core::model::config::{GeneratorConfig, check_num};
use eos_name_core::model::sampler::SamplerKind;
use eos_name_core::{Error, Generator, ValidationErrors};
use log::{LevelFilter, debug};

/// Command-line interface to interact with `eos-name-generator`.
#[derive(Debug, Parser)]
#[command(name = "eos-name-generator", version)]
#[command(about = "Generate random names which suit the EOS account naming rules")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Commands for working with name generation
    #[command(subcommand)]
    Generate(GenerateCommand),
}

#[derive(Debug, Subcommand)]
enum GenerateCommand {
    /// Generate a random name
    Name(GenerateOptions),

    /// Generate a random list of names
    NamesList {
        /// Number of generated names
        #[arg(long, allow_negative_numbers = true)]
        num: i64,

        #[command(flatten)]
        options: GenerateOptions,
    },
}

#[derive(Debug, Args)]
struct GenerateOptions {
    /// Use `rand`'s weighted index as random provider instead of the shift sampler
    #[arg(long)]
    weighted_index_sampler: bool,

    /// The probability of occurrence of numbers in the generated name
    #[arg(long, allow_negative_numbers = true)]
    numbers_probabilities: Option<f64>,

    /// Path to the data based on which the name will be generated
    #[arg(long)]
    seed_data_path: Option<PathBuf>,

    /// Seed for the random number generator (reproducible output)
    #[arg(long)]
    seed: Option<u64>,
}

impl GenerateOptions {
    fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            numbers_probability: self.numbers_probabilities,
            seed_data_path: self.seed_data_path.clone(),
            sampler: self.weighted_index_sampler.then_some(SamplerKind::WeightedIndex),
            rng_seed: self.seed,
        }
    }
}

/// Validates every option at once, then builds the generator.
fn build_generator(options: &GenerateOptions, num: Option<i64>) -> Result<Generator, Error> {
    let config = options.config();

    let mut errors = ValidationErrors::new();
    if let Some(num) = num {
        check_num(num, &mut errors);
    }
    if let Err(config_errors) = config.validate() {
        errors.merge(config_errors);
    }
    errors.into_result()?;

    debug!("building generator with {config:?}");
    Generator::with_config(&config)
}

fn run(command: &Command) -> Result<String> {
    match command {
        Command::Generate(GenerateCommand::Name(options)) => {
            let mut generator = build_generator(options, None)?;
            Ok(generator.generate()?)
        }
        Command::Generate(GenerateCommand::NamesList { num, options }) => {
            let mut generator = build_generator(options, Some(*num))?;
            let num = usize::try_from(*num)?;
            Ok(generator.generate_many(num)?.join("\n"))
        }
    }
}

/// Field-tagged validation errors are rendered as pretty JSON,
/// anything else as its message.
fn render_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<Error>() {
        Some(Error::ConfigValidation(errors)) => {
            serde_json::to_string_pretty(errors).unwrap_or_else(|_| errors.to_string())
        }
        _ => error.to_string(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level.parse().unwrap_or(LevelFilter::Warn))
        .init();

    match run(&cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", render_error(&error));
            ExitCode::FAILURE
        }
    }
}
