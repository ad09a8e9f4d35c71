//! The encode command.

use std::path::PathBuf;

use clap::Args;
use unitcoder_artifact::ArtifactFormat;
use unitcoder_audio::DEFAULT_SAMPLE_RATE;
use unitcoder_cli::{load_document, Context, Output};
use unitcoder_encode::{
    BatchOptions, BatchReport, Encoder, EncoderSettings, ErrorPolicy, ExtractorProfile,
    ProfileName,
};
use unitcoder_units::ExtractorConfig;

use super::{cancel_on_ctrl_c, get_context};
use crate::Cli;

/// Encode every recording under a directory.
///
/// Writes, for each input file, the unit indices, the one-hot matrix and
/// the frame features under OUTPUT, plus the codebook as embedding.npy.
/// Flags override the values of the selected context.
#[derive(Args)]
pub struct EncodeCommand {
    /// Directory of input recordings (searched recursively)
    pub input: PathBuf,

    /// Output directory
    pub output: PathBuf,

    /// Artifact format: txt or npy
    #[arg(long)]
    pub format: Option<String>,

    /// Extractor profile: hubert or cpc
    #[arg(long)]
    pub profile: Option<String>,

    /// Codebook file (.npy or .json)
    #[arg(long)]
    pub codebook: Option<PathBuf>,

    /// Extractor config file (YAML or JSON); defaults to log mel filterbanks
    #[arg(long = "extractor-config")]
    pub extractor_config: Option<PathBuf>,

    /// Input file extension
    #[arg(long)]
    pub extension: Option<String>,

    /// Expected input sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Layer to quantize, overriding the profile (the built-in filterbank
    /// backend defaults to 0, log mel)
    #[arg(long)]
    pub layer: Option<usize>,

    /// Auxiliary layer, overriding the profile (the built-in filterbank
    /// backend defaults to 1, CMVN)
    #[arg(long = "aux-layer")]
    pub aux_layer: Option<usize>,

    /// Skip files whose artifacts already exist
    #[arg(long)]
    pub skip_existing: bool,

    /// Record failed files and keep going
    #[arg(long)]
    pub continue_on_error: bool,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Write the run report to this file instead of stdout
    #[arg(long)]
    pub report: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl EncodeCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let settings = self.settings(&ctx)?;
        let options = self.options(&ctx);
        let extension = self
            .extension
            .clone()
            .or_else(|| ctx.extension.clone())
            .unwrap_or_else(|| "wav".to_string());
        let input = self.input.clone();
        let cancel = cancel_on_ctrl_c();

        let report = tokio::task::spawn_blocking(move || -> anyhow::Result<BatchReport> {
            let encoder = Encoder::open(settings)?;
            let report = encoder
                .driver(options)
                .with_cancel(cancel)
                .run_dir(&input, &extension)?;
            Ok(report)
        })
        .await??;

        Output::from_flags(self.json, self.report.clone()).write(&report)?;

        if let Some(reason) = &report.aborted {
            anyhow::bail!("encoding aborted: {}", reason);
        }
        if report.cancelled {
            anyhow::bail!("encoding cancelled after {} files", report.processed());
        }
        if !report.failed.is_empty() {
            anyhow::bail!("{} files failed", report.failed.len());
        }
        Ok(())
    }

    fn settings(&self, ctx: &Context) -> anyhow::Result<EncoderSettings> {
        let codebook = self
            .codebook
            .clone()
            .or_else(|| ctx.codebook.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("codebook is required, use --codebook or set it in a context")
            })?;

        let extractor = match self.extractor_config.as_ref().or(ctx.extractor.as_ref()) {
            Some(path) => load_document::<ExtractorConfig>(path)
                .map_err(|e| anyhow::anyhow!("extractor config {}: {}", path.display(), e))?,
            None => ExtractorConfig::default(),
        };

        let profile_name = match &self.profile {
            Some(p) => p.parse()?,
            None => ctx.profile.unwrap_or(ProfileName::Hubert),
        };
        let profile = ExtractorProfile::by_name(profile_name)
            .for_extractor(&extractor)
            .with_layers(self.layer.or(ctx.layer), self.aux_layer.or(ctx.aux_layer));

        let format = match &self.format {
            Some(f) => f.parse()?,
            None => ctx.format.unwrap_or(ArtifactFormat::Text),
        };

        Ok(EncoderSettings {
            codebook,
            extractor,
            profile,
            sample_rate: self
                .sample_rate
                .or(ctx.sample_rate)
                .unwrap_or(DEFAULT_SAMPLE_RATE),
            output: self.output.clone(),
            format,
        })
    }

    fn options(&self, ctx: &Context) -> BatchOptions {
        let on_error = if self.continue_on_error {
            ErrorPolicy::Continue
        } else {
            ctx.on_error.unwrap_or_default()
        };
        BatchOptions {
            on_error,
            skip_existing: self.skip_existing || ctx.skip_existing,
            jobs: self.jobs.or(ctx.jobs).unwrap_or(1).max(1),
        }
    }
}
