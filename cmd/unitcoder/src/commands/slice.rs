//! The slice command.

use std::path::PathBuf;

use clap::Args;
use unitcoder_audio::DEFAULT_SAMPLE_RATE;
use unitcoder_encode::slice_manifest;

use super::print_success;
use crate::Cli;

/// Cut utterances out of long recordings.
///
/// MANIFEST is a JSON array of [input_path, start_seconds,
/// duration_seconds, output_path] entries. Input paths are relative to
/// INPUT (".wav" is appended when missing); each utterance is written to
/// OUTPUT/<stem of output_path>.wav as 32-bit float mono.
#[derive(Args)]
pub struct SliceCommand {
    /// JSON manifest
    pub manifest: PathBuf,

    /// Root of the source recordings
    pub input: PathBuf,

    /// Directory for the sliced utterances
    pub output: PathBuf,

    /// Expected sample rate of the source recordings
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
}

impl SliceCommand {
    pub async fn run(&self, _cli: &Cli) -> anyhow::Result<()> {
        let (manifest, input, output, rate) = (
            self.manifest.clone(),
            self.input.clone(),
            self.output.clone(),
            self.sample_rate,
        );
        let n =
            tokio::task::spawn_blocking(move || slice_manifest(&manifest, &input, &output, rate))
                .await??;
        print_success(&format!(
            "{} utterances written to {}",
            n,
            self.output.display()
        ));
        Ok(())
    }
}
