use clap::Parser;
use testgen_cli::Cli;
use testgen_cli::run_main;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let exit_code = run_main(cli).await?;

    // Exit directly: a pending stdin read would otherwise keep the runtime
    // from shutting down after a Ctrl-C at the confirmation prompt.
    std::process::exit(exit_code);
}
