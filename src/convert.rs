//! PDF to Word conversion through an external renderer
//!
//! Layout conversion is not done in-process. [`DocumentConverter`] is the
//! seam; [`CommandConverter`] drives a command-line tool such as
//! `pdf2docx convert {input} {output}`.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Placeholder replaced by the input PDF path
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the expected DOCX path
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Turns PDF bytes into DOCX bytes
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Single attempt; any failure is final for the request.
    ///
    /// Dropping the returned future must abandon the conversion.
    async fn convert(&self, pdf: &[u8]) -> Result<Vec<u8>>;
}

/// Runs an external program once per conversion
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    /// Parse a whitespace separated command line containing the
    /// `{input}` and `{output}` placeholders.
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| Error::Config {
            key: "converter_command".to_string(),
            value: command.to_string(),
        })?;
        let args: Vec<String> = parts.collect();

        for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !args.iter().any(|arg| arg.contains(placeholder)) {
                return Err(Error::Config {
                    key: "converter_command".to_string(),
                    value: command.to_string(),
                });
            }
        }

        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_for(&self, input: &Path, output: &Path) -> Command {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();

        let mut command = Command::new(&self.program);
        command
            .args(self.args.iter().map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            }))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    async fn convert(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        let workdir = tempfile::Builder::new().prefix("convert-").tempdir()?;
        let input = workdir.path().join("input.pdf");
        let output = workdir.path().join("output.docx");
        tokio::fs::write(&input, pdf).await?;

        debug!(program = %self.program, "Running converter");
        // The child is killed if this future is dropped, e.g. on job timeout
        let result = self
            .command_for(&input, &output)
            .output()
            .await
            .map_err(|e| Error::Conversion {
                message: format!("failed to start {}: {}", self.program, e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::Conversion {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    result.status,
                    stderr.trim()
                ),
            });
        }

        let docx = tokio::fs::read(&output)
            .await
            .map_err(|e| Error::Conversion {
                message: format!("{} produced no output: {}", self.program, e),
            })?;

        info!(
            input_bytes = pdf.len(),
            output_bytes = docx.len(),
            "Converted PDF to DOCX"
        );
        Ok(docx)
    }
}
