use alko_core::presets::parse_custom_spec;
use alko_core::*;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "alkomat")]
#[command(about = "Blood-alcohol concentration estimator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the concentration curve of a drinking session
    Estimate {
        /// JSON input record (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Body weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Sex (male, female)
        #[arg(long)]
        sex: Option<String>,

        /// Preset drink as <preset>[:count], repeatable
        #[arg(long = "drink")]
        drinks: Vec<String>,

        /// Custom drink as <volumeMl>:<percent>[:count], repeatable
        #[arg(long = "custom")]
        custom: Vec<String>,

        /// Start of drinking (RFC 3339 or YYYY-MM-DDTHH:MM)
        #[arg(long)]
        start: Option<String>,

        /// End of drinking (RFC 3339 or YYYY-MM-DDTHH:MM)
        #[arg(long)]
        end: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the available drink presets
    Presets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON output record
    Json,
    /// Pretty-printed JSON output record
    JsonPretty,
    /// Human-readable report
    Text,
    /// Timeline as CSV
    Csv,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        alko_core::logging::init_with_level("debug");
    } else {
        alko_core::logging::init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.ensure_valid()?;

    match cli.command {
        Commands::Estimate {
            input,
            weight,
            sex,
            drinks,
            custom,
            start,
            end,
            format,
            output,
        } => {
            let overrides = Overrides {
                weight,
                sex,
                drinks,
                custom,
                start,
                end,
            };
            cmd_estimate(input.as_deref(), overrides, format, output.as_deref(), &config)
        }
        Commands::Presets { json } => cmd_presets(json, &config),
        Commands::Config { save } => cmd_config(save.as_deref(), &config),
    }
}

/// Values given on the command line, applied over the input record
struct Overrides {
    weight: Option<f64>,
    sex: Option<String>,
    drinks: Vec<String>,
    custom: Vec<String>,
    start: Option<String>,
    end: Option<String>,
}

fn cmd_estimate(
    input: Option<&Path>,
    overrides: Overrides,
    format: OutputFormat,
    output: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let catalog = PresetCatalog::with_custom(&config.presets.custom);
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Preset catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Preset("Invalid preset catalog".into()));
    }

    let mut raw = match input {
        Some(path) => read_input(path)?,
        // Same starting values as the form
        None => RawInput {
            weight_kg: 70.0,
            sex: "male".into(),
            ..Default::default()
        },
    };

    if let Some(weight) = overrides.weight {
        raw.weight_kg = weight;
    }
    if let Some(sex) = overrides.sex {
        raw.sex = sex;
    }
    if let Some(start) = overrides.start {
        raw.start_time = start;
    }
    if let Some(end) = overrides.end {
        raw.end_time = end;
    }
    for spec in &overrides.drinks {
        raw.drinks.push(catalog.resolve_spec(spec)?);
    }
    for spec in &overrides.custom {
        raw.drinks.push(parse_custom_spec(spec)?);
    }

    let estimate = estimate(&raw, &config.model);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut writer, &estimate)?;
            writeln!(writer)?;
        }
        OutputFormat::JsonPretty => {
            serde_json::to_writer_pretty(&mut writer, &estimate)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => display_estimate(&mut writer, &estimate, &config.model)?,
        OutputFormat::Csv => {
            write_timeline_csv(&estimate, &mut writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn read_input(path: &Path) -> Result<RawInput> {
    let contents = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)?
    };

    let raw: RawInput = serde_json::from_str(&contents)?;
    tracing::debug!("Read input record with {} drinks", raw.drinks.len());
    Ok(raw)
}

fn cmd_presets(json: bool, config: &Config) -> Result<()> {
    let catalog = PresetCatalog::with_custom(&config.presets.custom);
    let presets = catalog.sorted();

    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    for preset in presets {
        println!(
            "  {:<12} {:<32} {:>6} ml {:>5}%",
            preset.id, preset.label, preset.volume_ml, preset.percent
        );
    }
    Ok(())
}

fn cmd_config(save: Option<&Path>, config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);

    if let Some(path) = save {
        config.save_to(path)?;
        println!("\n✓ Saved config to {}", path.display());
    }
    Ok(())
}

fn display_estimate<W: Write>(out: &mut W, estimate: &Estimate, model: &ModelConfig) -> Result<()> {
    const BAR_WIDTH: f64 = 40.0;

    let heading = match estimate.status {
        Status::BelowThreshold => "BELOW THRESHOLD",
        Status::AboveThreshold => "ABOVE THRESHOLD",
    };

    writeln!(out, "\n╭─────────────────────────────────────────╮")?;
    writeln!(out, "│  {}", heading)?;
    writeln!(out, "╰─────────────────────────────────────────╯")?;
    writeln!(out)?;
    writeln!(out, "  {}", estimate.summary)?;
    writeln!(
        out,
        "  Peak: {:.2}‰ after {} min",
        estimate.peak_promiles, estimate.peak_minute
    )?;
    match estimate.below_threshold_minute {
        Some(minute) => writeln!(
            out,
            "  At or below {}‰ after {} min",
            model.threshold_promiles, minute
        )?,
        None => writeln!(
            out,
            "  Stays above {}‰ for the whole simulated window",
            model.threshold_promiles
        )?,
    }
    writeln!(out)?;

    let last_index = estimate.timeline.len().saturating_sub(1);
    for (index, point) in estimate.timeline.iter().enumerate() {
        if point.time % 60 != 0 && index != last_index {
            continue;
        }
        let bar = if estimate.peak_promiles > 0.0 {
            (point.promiles / estimate.peak_promiles * BAR_WIDTH).round() as usize
        } else {
            0
        };
        writeln!(
            out,
            "  {}  {:>7.3}‰ {}",
            point.clock,
            point.promiles,
            "█".repeat(bar)
        )?;
    }
    writeln!(out)?;

    Ok(())
}
