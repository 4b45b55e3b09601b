//! Workflow-command channel used to talk to the GitHub Actions runner.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

pub struct ActionsChannel<W: Write> {
    out: W,
    output_file: Option<PathBuf>,
    on_runner: bool,
    failed: bool,
}

impl ActionsChannel<Stdout> {
    pub fn from_env() -> Self {
        let output_file = std::env::var_os("GITHUB_OUTPUT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let on_runner = std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");
        Self::new(io::stdout(), output_file, on_runner)
    }
}

impl<W: Write> ActionsChannel<W> {
    pub fn new(out: W, output_file: Option<PathBuf>, on_runner: bool) -> Self {
        Self {
            out,
            output_file,
            on_runner,
            failed: false,
        }
    }

    /// Publishes a step output. Multi-line values use the heredoc form.
    pub fn set_output(&mut self, name: &str, value: impl Display) -> Result<()> {
        let value = value.to_string();

        match &self.output_file {
            Some(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening GITHUB_OUTPUT file {}", path.display()))?;
                file.write_all(key_value_message(name, &value).as_bytes())
                    .with_context(|| format!("writing output {name}"))?;
            }
            None => {
                writeln!(self.out, "::set-output name={}::{}", name, escape_data(&value))?;
            }
        }

        if !self.on_runner {
            eprintln!("{} {}", format!("{name}:").bold(), value.cyan());
        }
        Ok(())
    }

    /// Reports a failure and marks the run as failed. Processing continues;
    /// callers decide whether to stop.
    pub fn set_failed(&mut self, message: impl Display) -> Result<()> {
        self.failed = true;
        let message = message.to_string();
        writeln!(self.out, "::error::{}", escape_data(&message))?;
        if !self.on_runner {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
        Ok(())
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn key_value_message(name: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    }
}

pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn outputs_append_to_github_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        fs::write(&path, "earlier=1\n").unwrap();

        let mut channel = ActionsChannel::new(Vec::new(), Some(path.clone()), true);
        channel.set_output("dependencyChanged", true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier=1\ndependencyChanged=true\n");
        assert!(channel.into_inner().is_empty());
    }

    #[test]
    fn multiline_outputs_use_a_delimiter() {
        let message = key_value_message("report", "a\nb");
        let mut lines = message.lines();
        let header = lines.next().unwrap();
        let delimiter = header.strip_prefix("report<<").unwrap();
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(lines.next(), Some("a"));
        assert_eq!(lines.next(), Some("b"));
        assert_eq!(lines.next(), Some(delimiter));
    }

    #[test]
    fn falls_back_to_set_output_command() {
        let mut channel = ActionsChannel::new(Vec::new(), None, true);
        channel.set_output("dependencyChanged", false).unwrap();
        let written = String::from_utf8(channel.into_inner()).unwrap();
        assert_eq!(written, "::set-output name=dependencyChanged::false\n");
    }

    #[test]
    fn failures_are_escaped_and_tracked() {
        let mut channel = ActionsChannel::new(Vec::new(), None, true);
        assert!(!channel.failed());
        channel.set_failed("100% broken\nsee log").unwrap();
        assert!(channel.failed());

        let written = String::from_utf8(channel.into_inner()).unwrap();
        assert_eq!(written, "::error::100%25 broken%0Asee log\n");
    }
}
