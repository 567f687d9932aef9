use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;

/// Command‑line arguments.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate test cases from a feature description using a local Ollama model.",
    after_help = "Examples:\n  \
        testgen \"User login with email and password\"\n  \
        testgen \"Shopping cart add/remove items\" --format text\n  \
        testgen \"File upload with PDF validation\" --model llama3:latest\n  \
        testgen \"Payment processing\" --base-url http://localhost:11434"
)]
pub struct Cli {
    /// The feature description to generate test cases for.
    pub feature: String,

    /// Override the model from ~/.testgen/config.toml (default: codellama).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of the Ollama server (default: http://localhost:11434).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Output format for the generated test cases.
    #[arg(long, value_enum, default_value_t = ResultFormat::Json)]
    pub format: ResultFormat,

    /// Download a missing model without asking for confirmation.
    #[arg(short = 'y', long, default_value_t = false)]
    pub yes: bool,

    /// Skip checking whether the model is available (and never download it).
    #[arg(long, default_value_t = false)]
    pub skip_model_check: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// The flag may be passed up to three times. Without any -v the CLI only prints warnings and errors.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Don't use colored ansi output for logs and messages.
    #[arg(long)]
    pub no_ansi: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ResultFormat {
    #[default]
    Json,
    Text,
}

impl ResultFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultFormat::Json => "json",
            ResultFormat::Text => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["testgen", "User login"]).unwrap();
        assert_eq!(cli.feature, "User login");
        assert_eq!(cli.format, ResultFormat::Json);
        assert_eq!(cli.model, None);
        assert!(!cli.yes);
        assert!(!cli.skip_model_check);
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "testgen",
            "Cart",
            "-m",
            "llama3:8b",
            "--base-url",
            "http://gpu:11434",
            "--format",
            "text",
            "-y",
            "--skip-model-check",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("llama3:8b"));
        assert_eq!(cli.base_url.as_deref(), Some("http://gpu:11434"));
        assert_eq!(cli.format, ResultFormat::Text);
        assert!(cli.yes);
        assert!(cli.skip_model_check);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn feature_is_required() {
        assert!(Cli::try_parse_from(["testgen"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["testgen", "x", "--format", "yaml"]).is_err());
    }
}
