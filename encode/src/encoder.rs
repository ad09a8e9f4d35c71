use std::path::PathBuf;

use unitcoder_artifact::{ArtifactFormat, ArtifactWriter};
use unitcoder_units::{load_extractor, Codebook, ExtractorConfig, FeatureExtractor};

use crate::{BatchDriver, BatchOptions, EncodeError, ExtractorProfile, Pipeline};

/// Settings for one encoding run.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub codebook: PathBuf,
    pub extractor: ExtractorConfig,
    pub profile: ExtractorProfile,
    pub sample_rate: u32,
    pub output: PathBuf,
    pub format: ArtifactFormat,
}

/// The long-lived state of a run: codebook, extractor and writer.
///
/// Opening an encoder performs every startup check, creates the output
/// directories and exports the codebook, so that no file is touched
/// when the configuration is broken.
pub struct Encoder {
    codebook: Codebook,
    extractor: Box<dyn FeatureExtractor>,
    profile: ExtractorProfile,
    sample_rate: u32,
    writer: ArtifactWriter,
}

impl Encoder {
    pub fn open(settings: EncoderSettings) -> Result<Self, EncodeError> {
        let codebook = Codebook::load(&settings.codebook)?;
        tracing::info!(
            path = %settings.codebook.display(),
            k = codebook.len(),
            d = codebook.dim(),
            "codebook loaded"
        );
        let extractor = load_extractor(&settings.extractor)?;
        let writer = ArtifactWriter::new(
            settings.output,
            settings.profile.layout.clone(),
            settings.format,
        );
        Self::from_parts(codebook, extractor, settings.profile, settings.sample_rate, writer)
    }

    /// Builds an encoder from already loaded parts.
    pub fn from_parts(
        codebook: Codebook,
        extractor: Box<dyn FeatureExtractor>,
        profile: ExtractorProfile,
        sample_rate: u32,
        writer: ArtifactWriter,
    ) -> Result<Self, EncodeError> {
        if extractor.dimension() != codebook.dim() {
            return Err(EncodeError::Config(format!(
                "extractor {} produces {}-dimensional frames but the codebook has dimension {}",
                extractor.name(),
                extractor.dimension(),
                codebook.dim()
            )));
        }
        if extractor.sample_rate() != sample_rate {
            return Err(EncodeError::Config(format!(
                "extractor {} expects {} Hz input, configured sample rate is {} Hz",
                extractor.name(),
                extractor.sample_rate(),
                sample_rate
            )));
        }
        if let Some(layer) = profile.layers().find(|l| !extractor.has_layer(*l)) {
            return Err(EncodeError::Config(format!(
                "extractor {} has no layer {layer} required by profile {}",
                extractor.name(),
                profile.name
            )));
        }

        writer.prepare()?;
        writer.export_codebook(&codebook)?;
        tracing::info!(
            extractor = extractor.name(),
            profile = %profile.name,
            output = %writer.root().display(),
            "encoder ready"
        );

        Ok(Self {
            codebook,
            extractor,
            profile,
            sample_rate,
            writer,
        })
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    pub fn profile(&self) -> &ExtractorProfile {
        &self.profile
    }

    pub fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }

    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(
            self.extractor.as_ref(),
            &self.codebook,
            &self.profile,
            self.sample_rate,
        )
    }

    pub fn driver(&self, options: BatchOptions) -> BatchDriver<'_> {
        BatchDriver::new(self.pipeline(), &self.writer, options)
    }
}
