//! External command source.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use scrapewire_framework::{RawSnapshot, RawValue, ScrapeError, Source, async_trait};

use crate::config::{CommandConfig, OutputFormat};

/// Runs `<interpreter> <script> [env_file]` on every pull and decodes its
/// standard output as a mapping.
pub struct CommandSource {
    interpreter: PathBuf,
    script: PathBuf,
    env_file: Option<PathBuf>,
    timeout: Option<Duration>,
    format: OutputFormat,
}

impl CommandSource {
    pub fn new(config: &CommandConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            script: config.script.clone(),
            env_file: config.env_file.clone(),
            timeout: match config.timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            format: config.format,
        }
    }

    fn command_line(&self) -> String {
        let mut line = format!("{} {}", self.interpreter.display(), self.script.display());
        if let Some(ref env_file) = self.env_file {
            line.push(' ');
            line.push_str(&env_file.display().to_string());
        }
        line
    }

    fn decode(&self, stdout: &[u8]) -> Result<RawSnapshot, ScrapeError> {
        let what = format!("output of {}", self.command_line());

        let value = match self.format {
            OutputFormat::Auto | OutputFormat::Yaml => {
                RawValue::from_yaml_slice(stdout).map_err(|e| ScrapeError::parse(&what, e))?
            }
            OutputFormat::Json => {
                RawValue::from_json_slice(stdout).map_err(|e| ScrapeError::parse(&what, e))?
            }
        };

        match value {
            RawValue::Object(_) => Ok(value),
            other => Err(ScrapeError::parse(
                what,
                format!("expected a mapping, got {}", other.type_name()),
            )),
        }
    }
}

#[async_trait]
impl Source for CommandSource {
    fn describe(&self) -> String {
        self.command_line()
    }

    async fn fetch(&mut self) -> Result<RawSnapshot, ScrapeError> {
        let mut command = Command::new(&self.interpreter);
        command
            .arg(&self.script)
            .args(self.env_file.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| ScrapeError::CommandSpawn {
            command: self.command_line(),
            message: e.to_string(),
        })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| ScrapeError::CommandTimeout {
                    command: self.command_line(),
                    timeout_secs: timeout.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| ScrapeError::CommandFailed {
            command: self.command_line(),
            code: None,
            stderr: e.to_string(),
        })?;

        debug!(
            command = %self.command_line(),
            status = %output.status,
            stdout = %String::from_utf8_lossy(&output.stdout),
            "Command finished"
        );

        if !output.status.success() {
            return Err(ScrapeError::CommandFailed {
                command: self.command_line(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        self.decode(&output.stdout)
    }
}
