//! Output utilities for CLI tools.

use std::fs::File;
use std::io::Write;

use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

/// Where and how a command result is printed.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    pub fn new(format: OutputFormat, file: Option<String>) -> Self {
        Self { format, file }
    }

    /// JSON when `json` is set, YAML otherwise.
    pub fn from_flags(json: bool, file: Option<String>) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        };
        Self::new(format, file)
    }

    /// Renders `value` in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
        })
    }

    /// Writes `value` to the output file, or stdout when none is set.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;
        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(output.as_bytes())?;
            }
            None => print!("{}", output),
        }
        Ok(())
    }
}
