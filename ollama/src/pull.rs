use std::io;
use std::io::Write;

use crate::models::format_size;

/// One decoded progress record from the pull stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    pub status: Option<String>,
    pub digest: Option<String>,
    pub completed: Option<u64>,
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Completion percentage, only when the total is known and non-zero.
    pub fn percent(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                Some(completed as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }
}

/// Events emitted while pulling a model from Ollama.
#[derive(Debug, Clone, PartialEq)]
pub enum PullEvent {
    /// A human-readable status message (e.g., "pulling manifest").
    Status(String),
    /// Byte-level progress update.
    Progress(DownloadProgress),
    /// The pull finished successfully.
    Success,
    /// The server reported an error inside the stream.
    Error(String),
}

/// Observer for pull progress events. Implementations decide how to render
/// progress.
pub trait PullProgressReporter {
    fn on_event(&mut self, event: &PullEvent) -> io::Result<()>;
}

/// Line-oriented reporter for terminals and logs.
pub struct CliProgressReporter<W: Write> {
    out: W,
    model: String,
    last_status: Option<String>,
}

impl CliProgressReporter<io::Stderr> {
    pub fn stderr(model: impl Into<String>) -> Self {
        Self::new(io::stderr(), model)
    }
}

impl<W: Write> CliProgressReporter<W> {
    /// `model` names the pull in the completion line.
    pub fn new(out: W, model: impl Into<String>) -> Self {
        Self {
            out,
            model: model.into(),
            last_status: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_status(&mut self, status: &str) -> io::Result<()> {
        if self.last_status.as_deref() == Some(status) {
            return Ok(());
        }
        self.last_status = Some(status.to_string());
        writeln!(self.out, "Status: {status}")
    }
}

impl<W: Write> PullProgressReporter for CliProgressReporter<W> {
    fn on_event(&mut self, event: &PullEvent) -> io::Result<()> {
        match event {
            PullEvent::Status(status) => self.print_status(status)?,
            PullEvent::Progress(progress) => {
                if let Some(status) = &progress.status {
                    self.print_status(status)?;
                }
                if let (Some(completed), Some(total), Some(percent)) =
                    (progress.completed, progress.total, progress.percent())
                {
                    writeln!(
                        self.out,
                        "Progress: {}/{} ({percent:.1}%)",
                        format_size(completed),
                        format_size(total)
                    )?;
                }
            }
            PullEvent::Success => {
                writeln!(self.out, "Successfully pulled model '{}'!", self.model)?
            }
            PullEvent::Error(message) => writeln!(self.out, "Error: {message}")?,
        }
        self.out.flush()
    }
}
