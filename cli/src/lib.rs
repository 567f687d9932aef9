mod cli;

pub use cli::Cli;
pub use cli::ResultFormat;

use owo_colors::OwoColorize;
use owo_colors::Style;
use testgen_core::AssumeYes;
use testgen_core::GenerationResult;
use testgen_core::PromptConfirmer;
use testgen_core::TestCaseGenerator;
use testgen_core::config::Config;
use testgen_core::config::ConfigOverrides;
use testgen_core::error::TestgenErr;
use testgen_core::error::get_error_message_ui;
use testgen_ollama::CliProgressReporter;
use testgen_ollama::PullProgressReporter;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Exit status for classified failures, including a declined download.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when the operator interrupts the run.
pub const EXIT_CANCELLED: i32 = 130;

/// Initialize the global logger once at startup based on the `--verbose` flag.
fn init_logger(verbose: u8, allow_ansi: bool) {
    // Map -v occurrences to explicit log levels:
    //   0 → warn (default)
    //   1 → info
    //   2 → debug
    //   ≥3 → trace
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "testgen=debug",
        _ => "testgen=trace",
    };

    // Logs go to stderr so that stdout only ever carries the test cases.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_ansi(allow_ansi)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run one invocation and return the process exit status.
pub async fn run_main(cli: Cli) -> anyhow::Result<i32> {
    init_logger(cli.verbose, !cli.no_ansi);
    let styles = Styles::new(!cli.no_ansi);

    let overrides = ConfigOverrides {
        model: cli.model.clone(),
        base_url: cli.base_url.clone(),
        manage_model: cli.skip_model_check.then_some(false),
    };
    let config = match Config::load_with_overrides(overrides) {
        Ok(config) => config,
        Err(err) => return Ok(report_failure(&err, &styles)),
    };
    tracing::debug!("effective config: {config:?}");

    eprintln!("Generating test cases for: {}", cli.feature);
    eprintln!("Using model: {}", config.model);
    eprintln!("Output format: {}", cli.format.as_str());
    eprintln!("Calling Ollama API...");

    let generator = TestCaseGenerator::new(&config);
    let mut reporter = CliProgressReporter::stderr(config.model.clone());

    let outcome = tokio::select! {
        res = generate(&generator, &cli.feature, cli.yes, &mut reporter) => res,
        Ok(()) = tokio::signal::ctrl_c() => Err(TestgenErr::Interrupted),
    };

    match outcome {
        Ok(result) => {
            print_result(&result, cli.format, &styles)?;
            Ok(0)
        }
        Err(err) => Ok(report_failure(&err, &styles)),
    }
}

async fn generate(
    generator: &TestCaseGenerator,
    feature: &str,
    assume_yes: bool,
    reporter: &mut dyn PullProgressReporter,
) -> testgen_core::error::Result<GenerationResult> {
    if assume_yes {
        generator.generate(feature, &mut AssumeYes, reporter).await
    } else {
        let mut confirmer =
            PromptConfirmer::new(BufReader::new(tokio::io::stdin()), std::io::stderr());
        generator.generate(feature, &mut confirmer, reporter).await
    }
}

fn print_result(
    result: &GenerationResult,
    format: ResultFormat,
    styles: &Styles,
) -> anyhow::Result<()> {
    eprintln!("\n{}", "Generated test cases:".style(styles.header));
    match format {
        ResultFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        ResultFormat::Text => {
            for (i, test_case) in result.test_cases.iter().enumerate() {
                println!("{}. {test_case}", i + 1);
            }
        }
    }
    Ok(())
}

fn report_failure(err: &TestgenErr, styles: &Styles) -> i32 {
    if err.is_interrupted() {
        eprintln!("\nOperation cancelled by user.");
        return EXIT_CANCELLED;
    }
    eprintln!("{}", get_error_message_ui(err).style(styles.error));
    if let Some(hint) = err.hint() {
        eprintln!("\n{}", hint.style(styles.hint));
    }
    EXIT_FAILURE
}

struct Styles {
    header: Style,
    error: Style,
    hint: Style,
}

impl Styles {
    fn new(allow_ansi: bool) -> Self {
        if allow_ansi {
            Self {
                header: Style::new().bold(),
                error: Style::new().red(),
                hint: Style::new().fg_rgb::<127, 127, 127>(),
            }
        } else {
            Self {
                header: Style::new(),
                error: Style::new(),
                hint: Style::new(),
            }
        }
    }
}
