//! Configuration management commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use unitcoder_artifact::ArtifactFormat;
use unitcoder_cli::Context as CliContext;
use unitcoder_encode::{ErrorPolicy, ProfileName};

use super::{get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts store encoder defaults (codebook, extractor, profile, format)
/// under a name, similar to kubectl's context management.
///
/// Configuration is stored in ~/.unitcoder/unitcoder/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add a new context, replacing any context of the same name
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// Codebook file (.npy or .json)
        #[arg(long)]
        codebook: Option<PathBuf>,
        /// Extractor config file (YAML or JSON)
        #[arg(long)]
        extractor: Option<PathBuf>,
        /// Extractor profile: hubert or cpc
        #[arg(long)]
        profile: Option<String>,
        /// Artifact format: txt or npy
        #[arg(long)]
        format: Option<String>,
        /// Input file extension
        #[arg(long)]
        extension: Option<String>,
        /// Expected input sample rate in Hz
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Layer to quantize
        #[arg(long)]
        layer: Option<usize>,
        /// Auxiliary layer
        #[arg(long = "aux-layer")]
        aux_layer: Option<usize>,
        /// Record failed files and keep going
        #[arg(long)]
        continue_on_error: bool,
        /// Skip files whose artifacts already exist
        #[arg(long)]
        skip_existing: bool,
        /// Number of worker threads
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                codebook,
                extractor,
                profile,
                format,
                extension,
                sample_rate,
                layer,
                aux_layer,
                continue_on_error,
                skip_existing,
                jobs,
            } => {
                let mut cfg = get_config(cli)?;

                let ctx = CliContext {
                    codebook: codebook.clone(),
                    extractor: extractor.clone(),
                    profile: profile.as_deref().map(str::parse::<ProfileName>).transpose()?,
                    format: format.as_deref().map(str::parse::<ArtifactFormat>).transpose()?,
                    extension: extension.clone(),
                    sample_rate: *sample_rate,
                    layer: *layer,
                    aux_layer: *aux_layer,
                    on_error: continue_on_error.then_some(ErrorPolicy::Continue),
                    skip_existing: *skip_existing,
                    jobs: *jobs,
                    ..Default::default()
                };

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!(
                    "{:<8} {:<20} {:<8} {:<6} {}",
                    "CURRENT", "NAME", "PROFILE", "FORMAT", "CODEBOOK"
                );
                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.get_context(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let profile = ctx.profile.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
                    let format = ctx.format.map(|f| f.to_string()).unwrap_or_else(|| "-".into());
                    let codebook = ctx
                        .codebook
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    println!(
                        "{:<8} {:<20} {:<8} {:<6} {}",
                        current, name, profile, format, codebook
                    );
                }

                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;

                println!("Config file: {}", cfg.path().display());
                println!("Current context: {}", cfg.current_context);
                println!("Contexts: {}", cfg.contexts.len());

                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.get_context(name) else {
                        continue;
                    };
                    println!("\n  {}:", name);
                    if let Some(p) = &ctx.codebook {
                        println!("    Codebook: {}", p.display());
                    }
                    if let Some(p) = &ctx.extractor {
                        println!("    Extractor: {}", p.display());
                    }
                    if let Some(p) = ctx.profile {
                        println!("    Profile: {}", p);
                    }
                    if let Some(f) = ctx.format {
                        println!("    Format: {}", f);
                    }
                    if let Some(ext) = &ctx.extension {
                        println!("    Extension: {}", ext);
                    }
                    if let Some(rate) = ctx.sample_rate {
                        println!("    Sample rate: {} Hz", rate);
                    }
                    if let Some(layer) = ctx.layer {
                        println!("    Layer: {}", layer);
                    }
                    if let Some(layer) = ctx.aux_layer {
                        println!("    Auxiliary layer: {}", layer);
                    }
                    if let Some(policy) = ctx.on_error {
                        println!("    On error: {:?}", policy);
                    }
                    if ctx.skip_existing {
                        println!("    Skip existing: yes");
                    }
                    if let Some(jobs) = ctx.jobs {
                        println!("    Jobs: {}", jobs);
                    }
                }

                Ok(())
            }
        }
    }
}
