//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console_report::render_report;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::sample_data::sample_bars;
use crate::domain::catalog::{find_example, ExampleStrategy, EXAMPLE_STRATEGIES, SUPPORTED_PHRASES};
use crate::domain::config_validation::validate_run_config;
use crate::domain::error::PhraseTraderError;
use crate::domain::metrics::TradeStats;
use crate::domain::normalizer::normalize;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pipeline::{backtest_compiled, backtest_many, compile_dsl_text, compile_text};
use crate::domain::rule_eval::CompiledStrategy;
use crate::logging::{setup_logging, DEFAULT_LEVEL};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "phrasetrader",
    about = "Compile plain-English trading rules and backtest them"
)]
pub struct Cli {
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the DSL a sentence normalizes to and the compiled rule
    Translate { text: String },
    /// Run a backtest
    Backtest {
        #[arg(short, long, conflicts_with_all = ["text", "dsl", "data"])]
        config: Option<PathBuf>,
        /// Natural-language strategy
        #[arg(short, long, conflicts_with = "dsl")]
        text: Option<String>,
        /// Strategy written directly in DSL
        #[arg(long)]
        dsl: Option<String>,
        /// CSV file of bars; the built-in sample series is used when omitted
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Write a JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Omit the trade log from the console summary
        #[arg(long)]
        no_trades: bool,
    },
    /// List the built-in example strategies
    Examples {
        /// Backtest the listed examples against the sample series
        #[arg(long)]
        run: bool,
        /// Only this example (case-insensitive)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List the phrases the normalizer understands
    Phrases,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategySource {
    Text(String),
    Dsl(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Sample,
    Csv(PathBuf),
}

/// Everything a backtest run needs, from a config file or flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub strategy: StrategySource,
    pub data: DataSource,
    pub output: Option<PathBuf>,
    pub show_trades: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let json = cli.log_json;
    let level = cli.log_level;
    match cli.command {
        Command::Translate { text } => {
            init_logging(level.as_deref(), json);
            run_translate(&text)
        }
        Command::Backtest {
            config: Some(config),
            ..
        } => run_backtest_config(&config, level.as_deref(), json),
        Command::Backtest {
            config: None,
            text,
            dsl,
            data,
            output,
            no_trades,
        } => {
            init_logging(level.as_deref(), json);
            let strategy = match (text, dsl) {
                (Some(text), None) => StrategySource::Text(text),
                (None, Some(dsl)) => StrategySource::Dsl(dsl),
                _ => {
                    eprintln!("error: one of --config, --text or --dsl is required");
                    return ExitCode::from(2);
                }
            };
            let settings = RunSettings {
                strategy,
                data: data.map_or(DataSource::Sample, DataSource::Csv),
                output,
                show_trades: !no_trades,
            };
            run_backtest(&settings)
        }
        Command::Examples { run, name } => {
            init_logging(level.as_deref(), json);
            let examples = match select_examples(name.as_deref()) {
                Ok(e) => e,
                Err(code) => return code,
            };
            if run {
                run_examples(&examples)
            } else {
                print_examples(&examples);
                ExitCode::SUCCESS
            }
        }
        Command::Phrases => {
            print_phrases();
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(level: Option<&str>, json: bool) {
    setup_logging(level.unwrap_or(DEFAULT_LEVEL), json);
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Read and validate run settings from `[strategy]`, `[data]` and `[report]`.
pub fn build_run_settings(config: &dyn ConfigPort) -> Result<RunSettings, PhraseTraderError> {
    validate_run_config(config)?;

    let strategy = match config.get_string("strategy", "text").filter(|s| !s.trim().is_empty()) {
        Some(text) => StrategySource::Text(text),
        None => StrategySource::Dsl(config.get_string("strategy", "dsl").unwrap_or_default()),
    };
    let data = match config.get_string("data", "path").filter(|s| !s.trim().is_empty()) {
        Some(path) => DataSource::Csv(PathBuf::from(path.trim())),
        None => DataSource::Sample,
    };

    Ok(RunSettings {
        strategy,
        data,
        output: config
            .get_string("report", "output")
            .map(|p| PathBuf::from(p.trim())),
        show_trades: config.get_bool("report", "show_trades", true),
    })
}

fn run_backtest_config(config_path: &PathBuf, level: Option<&str>, json: bool) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config_level = adapter.get_string("logging", "level");
    let level = level
        .map(str::to_string)
        .or(config_level)
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    setup_logging(&level, json || adapter.get_bool("logging", "json", false));
    info!(config = %config_path.display(), "loaded config");

    match build_run_settings(&adapter) {
        Ok(settings) => run_backtest(&settings),
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Compile a strategy source, printing parse errors with a caret under the
/// offending DSL position.
fn compile_source(source: &StrategySource) -> Result<CompiledStrategy, ExitCode> {
    let result = match source {
        StrategySource::Text(text) => compile_text(text).map(|c| c.compiled),
        StrategySource::Dsl(dsl) => compile_dsl_text(dsl),
    };

    result.map_err(|e| {
        match &e {
            PhraseTraderError::Syntax(parse_err) => {
                let dsl = match source {
                    StrategySource::Text(text) => normalize(text).to_dsl(),
                    StrategySource::Dsl(dsl) => dsl.clone(),
                };
                eprintln!("error: failed to parse strategy:\n{}", parse_err.display_with_context(&dsl));
            }
            other => eprintln!("error: {other}"),
        }
        ExitCode::from(&e)
    })
}

fn load_bars(data: &DataSource) -> Result<Vec<OhlcvBar>, PhraseTraderError> {
    match data {
        DataSource::Sample => sample_bars(),
        DataSource::Csv(path) => CsvAdapter::default().fetch_ohlcv(&path.to_string_lossy()),
    }
}

pub fn run_backtest(settings: &RunSettings) -> ExitCode {
    let compiled = match compile_source(&settings.strategy) {
        Ok(c) => c,
        Err(code) => return code,
    };
    println!("Strategy: {}", compiled.strategy());

    let bars = match load_bars(&settings.data) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    info!(bars = bars.len(), "loaded price data");

    let report = match backtest_compiled(&compiled, &bars) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stats = TradeStats::compute(&report.trades);
    print!("\n{}", render_report(&report, &stats, settings.show_trades));

    if let Some(output) = &settings.output {
        let path = output.to_string_lossy();
        if let Err(e) = JsonReportAdapter::new().write(&report, compiled.strategy(), &path) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        println!("\nReport written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

fn run_translate(text: &str) -> ExitCode {
    let normalized = normalize(text);
    println!("Entry: {}", normalized.entry);
    println!("Exit:  {}", normalized.exit);
    if normalized.exit_synthesized {
        println!("       (no exit rule found)");
    }

    match compile_source(&StrategySource::Dsl(normalized.to_dsl())) {
        Ok(compiled) => {
            println!("\nCompiled: {}", compiled.strategy());
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

/// All examples, or the one matching `name`.
fn select_examples(name: Option<&str>) -> Result<Vec<&'static ExampleStrategy>, ExitCode> {
    match name {
        None => Ok(EXAMPLE_STRATEGIES.iter().collect()),
        Some(name) => match find_example(name) {
            Some(example) => Ok(vec![example]),
            None => {
                let known: Vec<&str> = EXAMPLE_STRATEGIES.iter().map(|e| e.name).collect();
                eprintln!("error: no example named '{}' (known: {})", name, known.join(", "));
                Err(ExitCode::from(2))
            }
        },
    }
}

fn print_examples(examples: &[&ExampleStrategy]) {
    println!("=== Example Strategies ===");
    for (i, example) in examples.iter().enumerate() {
        println!("\n{}. {}:", i + 1, example.name);
        println!("   {}", example.text);
    }
}

fn run_examples(examples: &[&ExampleStrategy]) -> ExitCode {
    let bars = match sample_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut compiled = Vec::with_capacity(examples.len());
    for example in examples {
        match compile_source(&StrategySource::Text(example.text.to_string())) {
            Ok(c) => compiled.push(c),
            Err(code) => return code,
        }
    }

    let results = backtest_many(&compiled, &bars);
    let mut exit = ExitCode::SUCCESS;
    for ((example, strategy), result) in examples.iter().zip(&compiled).zip(results) {
        println!("\n>>> {}", example.name);
        println!("Strategy: {}", strategy.strategy());
        match result {
            Ok(report) => {
                let stats = TradeStats::compute(&report.trades);
                print!("{}", render_report(&report, &stats, true));
            }
            Err(e) => {
                eprintln!("error: {e}");
                exit = (&e).into();
            }
        }
    }
    exit
}

fn print_phrases() {
    println!("=== Supported English Phrases ===");
    for group in SUPPORTED_PHRASES {
        println!("\n{}:", group.title);
        println!("  - {}", group.phrases.join(", "));
    }
}
