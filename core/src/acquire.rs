//! Making sure the requested model is resident before generation.
//!
//! Per invocation the acquirer walks: check the catalog; if the model is
//! present stop there, otherwise describe it, ask the operator, and on "yes"
//! pull it while reporting progress. A pull failure is reported once and not
//! retried.

use std::future::Future;
use std::io::Write;

use testgen_ollama::ModelDescriptor;
use testgen_ollama::OllamaClient;
use testgen_ollama::PullProgressReporter;
use testgen_ollama::format_size;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tracing::info;

use crate::error::Result;
use crate::error::TestgenErr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// Already resident; nothing was downloaded.
    AlreadyPresent,
    /// Downloaded during this call.
    Acquired,
    /// The operator declined the download.
    Declined,
}

/// Asks the operator whether a missing model should be downloaded.
pub trait DownloadConfirmer {
    fn confirm(
        &mut self,
        model: &str,
        descriptor: Option<&ModelDescriptor>,
    ) -> impl Future<Output = Result<bool>>;
}

/// Confirms every download without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl DownloadConfirmer for AssumeYes {
    async fn confirm(&mut self, model: &str, _: Option<&ModelDescriptor>) -> Result<bool> {
        info!("downloading '{model}' without confirmation");
        Ok(true)
    }
}

/// Interactive yes/no prompt. Reads answers from `reader` and writes the
/// banner and questions to `writer`.
pub struct PromptConfirmer<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> PromptConfirmer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn print_banner(&mut self, model: &str, descriptor: Option<&ModelDescriptor>) -> Result<()> {
        let rule = "=".repeat(60);
        let w = &mut self.writer;
        writeln!(w, "\n{rule}")?;
        writeln!(w, "Model '{model}' is not available locally.")?;
        writeln!(w, "{rule}")?;
        match descriptor {
            Some(d) => {
                let unknown = "Unknown";
                writeln!(w, "Model Information:")?;
                writeln!(w, "  • Size: {}", format_size(d.size))?;
                writeln!(
                    w,
                    "  • Parameters: {}",
                    d.details.parameter_size.as_deref().unwrap_or(unknown)
                )?;
                writeln!(
                    w,
                    "  • Family: {}",
                    d.details.family.as_deref().unwrap_or(unknown)
                )?;
                writeln!(
                    w,
                    "  • Last Modified: {}",
                    d.modified_at.as_deref().unwrap_or(unknown)
                )?;
            }
            None => {
                writeln!(w, "Model Information: Not available locally")?;
                writeln!(w, "  • Will be downloaded from Ollama registry")?;
            }
        }
        writeln!(
            w,
            "\nThis will download the model to your local Ollama installation."
        )?;
        writeln!(
            w,
            "Download time depends on your internet connection and model size."
        )?;
        Ok(())
    }
}

impl<R, W> DownloadConfirmer for PromptConfirmer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    async fn confirm(&mut self, model: &str, descriptor: Option<&ModelDescriptor>) -> Result<bool> {
        self.print_banner(model, descriptor)?;
        let mut line = Vec::new();
        loop {
            write!(self.writer, "\nDo you want to download '{model}'? (y/n): ")?;
            self.writer.flush()?;

            line.clear();
            if self.reader.read_until(b'\n', &mut line).await? == 0 {
                return Err(TestgenErr::Interrupted);
            }
            match parse_answer(&String::from_utf8_lossy(&line)) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.writer, "Please enter 'y' for yes or 'n' for no.")?,
            }
        }
    }
}

fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ensure `model` is resident on the server, asking `confirmer` before
/// downloading it. Calling this for a resident model only costs one catalog
/// lookup.
pub async fn ensure_model_available<C>(
    client: &OllamaClient,
    model: &str,
    confirmer: &mut C,
    reporter: &mut dyn PullProgressReporter,
) -> Result<AcquisitionOutcome>
where
    C: DownloadConfirmer,
{
    if client.has_model(model).await? {
        info!("model '{model}' is available locally");
        return Ok(AcquisitionOutcome::AlreadyPresent);
    }

    info!("model '{model}' is not resident; checking model information");
    let descriptor = client.describe_model(model).await?;
    if !confirmer.confirm(model, descriptor.as_ref()).await? {
        info!("download of '{model}' declined");
        return Ok(AcquisitionOutcome::Declined);
    }

    client.pull_with_reporter(model, reporter).await?;
    Ok(AcquisitionOutcome::Acquired)
}
