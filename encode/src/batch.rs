use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use unitcoder_artifact::{ArtifactSet, ArtifactWriter};

use crate::discover::{discover, duplicate_stems, stem_of};
use crate::{BatchReport, EncodeError, FileFailure, Pipeline};

/// What to do when a single file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first failed file.
    #[default]
    Abort,
    /// Record the failure and move on. Fatal errors still stop the run.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub on_error: ErrorPolicy,
    /// Leave files alone whose full artifact set already exists.
    pub skip_existing: bool,
    /// Worker threads. 1 processes files one at a time.
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Abort,
            skip_existing: false,
            jobs: 1,
        }
    }
}

/// Result of one input file.
#[derive(Debug)]
pub enum FileOutcome {
    Written { frames: usize },
    Skipped,
    Failed(EncodeError),
}

/// Runs the pipeline over a list of input files and writes their
/// artifacts.
pub struct BatchDriver<'a> {
    pipeline: Pipeline<'a>,
    writer: &'a ArtifactWriter,
    options: BatchOptions,
    cancel: CancellationToken,
}

impl<'a> BatchDriver<'a> {
    pub fn new(pipeline: Pipeline<'a>, writer: &'a ArtifactWriter, options: BatchOptions) -> Self {
        Self {
            pipeline,
            writer,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to stop the run between files.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Discovers `extension` files under `root` and encodes them.
    pub fn run_dir(&self, root: &Path, extension: &str) -> Result<BatchReport, EncodeError> {
        let files = discover(root, extension)?;
        self.run(&files)
    }

    /// Encodes `files` in order.
    ///
    /// Returns an error only for problems found before the first file
    /// (duplicate output stems with several workers). Per-file failures,
    /// aborts and cancellation are recorded in the report.
    pub fn run(&self, files: &[PathBuf]) -> Result<BatchReport, EncodeError> {
        for (stem, first, second) in duplicate_stems(files) {
            if self.options.jobs > 1 {
                return Err(EncodeError::DuplicateStem {
                    stem,
                    first,
                    second,
                });
            }
            tracing::warn!(
                stem = %stem,
                first = %first.display(),
                second = %second.display(),
                "duplicate stem, the later file overwrites the earlier one"
            );
        }

        tracing::info!(
            files = files.len(),
            jobs = self.options.jobs,
            profile = %self.pipeline.profile().name,
            format = %self.writer.format(),
            "encoding"
        );

        let outcomes = self.run_workers(files);

        let mut report = BatchReport::new(files.len());
        report.cancelled = outcomes.cancelled;
        for (i, outcome) in outcomes.results {
            match outcome {
                FileOutcome::Written { .. } => report.succeeded += 1,
                FileOutcome::Skipped => report.skipped += 1,
                FileOutcome::Failed(e) => {
                    if report.aborted.is_none() && self.stops_run(&e) {
                        report.aborted = Some(format!("{}: {e}", files[i].display()));
                    }
                    report.failed.push(FileFailure {
                        path: files[i].clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report.log();
        Ok(report)
    }

    fn stops_run(&self, err: &EncodeError) -> bool {
        err.is_fatal() || self.options.on_error == ErrorPolicy::Abort
    }

    fn run_workers(&self, files: &[PathBuf]) -> WorkerResults {
        let next = AtomicUsize::new(0);
        let stop = AtomicBool::new(false);
        let cancelled = AtomicBool::new(false);
        let results = Mutex::new(Vec::with_capacity(files.len()));

        let worker = || {
            loop {
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                if self.cancel.is_cancelled() {
                    cancelled.store(true, Ordering::SeqCst);
                    break;
                }
                let i = next.fetch_add(1, Ordering::SeqCst);
                let Some(path) = files.get(i) else {
                    break;
                };
                let outcome = self.process(path);
                if let FileOutcome::Failed(e) = &outcome {
                    if self.stops_run(e) {
                        stop.store(true, Ordering::SeqCst);
                    }
                }
                if let Ok(mut r) = results.lock() {
                    r.push((i, outcome));
                }
            }
        };

        let workers = self.options.jobs.clamp(1, files.len().max(1));
        if workers == 1 {
            worker();
        } else {
            std::thread::scope(|s| {
                for _ in 0..workers {
                    s.spawn(&worker);
                }
            });
        }

        let mut results = results.into_inner().unwrap_or_else(|e| e.into_inner());
        results.sort_by_key(|(i, _)| *i);
        WorkerResults {
            results,
            cancelled: cancelled.into_inner(),
        }
    }

    /// Encodes and writes one file.
    pub fn process(&self, path: &Path) -> FileOutcome {
        let stem = stem_of(path);
        if self.options.skip_existing && self.writer.is_complete(&stem) {
            tracing::debug!(path = %path.display(), "artifacts exist, skipping");
            return FileOutcome::Skipped;
        }

        let result = self.pipeline.encode_file(path).and_then(|enc| {
            self.writer.write(&ArtifactSet {
                stem: &stem,
                units: &enc.units,
                one_hot: self.writer.layout().one_hot.as_ref().map(|_| &enc.one_hot),
                features: &enc.features,
                auxiliary: enc.auxiliary.as_ref(),
            })?;
            Ok(enc.units.len())
        });

        match result {
            Ok(frames) => {
                tracing::debug!(path = %path.display(), frames, "encoded");
                FileOutcome::Written { frames }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to encode");
                FileOutcome::Failed(e)
            }
        }
    }
}

struct WorkerResults {
    results: Vec<(usize, FileOutcome)>,
    cancelled: bool,
}
