//! The publish run.
//!
//! A run turns a [`RunConfig`] into a populated target tree (and, when
//! enabled, a delta tree). Steps, strictly in order:
//!
//! 1. Decide delta publishing ([`RunConfig::delta_trees`]), create the
//!    target layout and the bare delta root.
//! 2. Publish the static viewer bundle.
//! 3. Scan the source directory → progress `0`.
//! 4. Publish `pics/galerie.txt`.
//! 5. For every picture `i` of `n`: progress `floor(100·i/n)`, publish the
//!    full-size copy, publish the `tn_` thumbnail.
//! 6. Progress `100`.
//!
//! Any failure aborts the run on the spot. Files already written stay in
//! place; running again from scratch rewrites the target tree and
//! recomputes the delta tree, so a failed run leaves nothing to clean up.
//!
//! ## Threading
//!
//! [`Orchestrator::start`] runs the pipeline on a dedicated worker thread
//! and hands back a [`RunHandle`] whose channel delivers [`RunEvent`]s:
//! progress values, one event per published file, and exactly one
//! [`RunEvent::Finished`] at the end. Only one run may be active per
//! orchestrator; [`Orchestrator::is_running`] reports it and a second
//! `start` is refused. Runs can't be cancelled.
//!
//! ```text
//! caller                      worker
//!   │ start(config) ──────────▶ │ prepare, bundle, scan
//!   │ ◀──────── Progress(0)     │
//!   │ ◀──────── Published{..}   │ per file
//!   │ ◀──────── Progress(n)     │ per picture
//!   │ ◀──────── Finished(..)    │ exactly once
//! ```

use crate::assets::StaticBundle;
use crate::config::RunConfig;
use crate::delta::{DeltaError, DeltaOutcome, DeltaPublisher, PublishRequest, TreeDir};
use crate::imaging::{BackendError, ImageBackend, RustBackend, THUMBNAIL_MAX_EDGE, create_thumbnail};
use crate::manifest::{MANIFEST_FILE_NAME, Manifest};
use crate::scan::{self, PictureAsset, ScanError};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Prefix of every thumbnail file name.
pub const THUMBNAIL_PREFIX: &str = "tn_";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("{0}")]
    Delta(#[from] DeltaError),
    #[error("Image processing failed for {file}: {source}")]
    Imaging { file: String, source: BackendError },
    #[error("Failed to read picture {path}: {source}")]
    ReadPicture {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("A publish run is already in progress")]
    AlreadyRunning,
}

/// Progress notification delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Percent complete, 0–100, never decreasing within a run.
    Progress(u8),
    /// A file was written to the target tree.
    Published {
        /// Path relative to the tree root, e.g. `pics/tn_a.jpg`.
        path: String,
        outcome: DeltaOutcome,
    },
    /// The run ended. Always the last event.
    Finished(RunOutcome),
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded(RunSummary),
    Failed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded(_))
    }
}

/// Counts collected over a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pictures: usize,
    pub files_written: usize,
    pub delta_enabled: bool,
    pub staged: usize,
    pub pruned: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: DeltaOutcome) {
        self.files_written += 1;
        match outcome {
            DeltaOutcome::Staged => self.staged += 1,
            DeltaOutcome::UnchangedPruned => self.pruned += 1,
            DeltaOutcome::TargetOnly | DeltaOutcome::NotInReference | DeltaOutcome::Unchanged => {}
        }
    }
}

/// Sending half of the event channel. Sends never block and are dropped
/// silently once the caller stops listening.
struct Reporter<'a> {
    events: Option<&'a Sender<RunEvent>>,
}

impl Reporter<'_> {
    fn send(&self, event: RunEvent) {
        if let Some(tx) = self.events {
            tx.send(event).ok();
        }
    }

    fn progress(&self, percent: u8) {
        self.send(RunEvent::Progress(percent));
    }
}

/// Progress before picture `index` of `count`.
pub fn progress_percent(index: usize, count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    (100 * index / count).min(100) as u8
}

/// Run the whole pipeline on the current thread with the default backend.
pub fn publish(
    config: &RunConfig,
    events: Option<&Sender<RunEvent>>,
) -> Result<RunSummary, PublishError> {
    publish_with_backend(&RustBackend::new(), config, events)
}

/// Run the whole pipeline with a specific backend (allows testing with mock).
///
/// Sends [`RunEvent::Finished`] before returning, success or not.
pub fn publish_with_backend(
    backend: &impl ImageBackend,
    config: &RunConfig,
    events: Option<&Sender<RunEvent>>,
) -> Result<RunSummary, PublishError> {
    let reporter = Reporter { events };
    let result = run_pipeline(backend, config, &reporter);
    let outcome = match &result {
        Ok(summary) => RunOutcome::Succeeded(summary.clone()),
        Err(e) => RunOutcome::Failed(e.to_string()),
    };
    reporter.send(RunEvent::Finished(outcome));
    result
}

/// Target/delta writer that reports and counts every published file.
struct Writer<'a> {
    publisher: DeltaPublisher,
    reporter: &'a Reporter<'a>,
    summary: RunSummary,
}

impl Writer<'_> {
    fn write(&mut self, request: PublishRequest<'_>) -> Result<(), PublishError> {
        let outcome = self.publisher.publish(&request)?;
        self.summary.record(outcome);
        self.reporter.send(RunEvent::Published {
            path: request.dir.relative_path(request.file_name),
            outcome,
        });
        Ok(())
    }
}

fn run_pipeline(
    backend: &impl ImageBackend,
    config: &RunConfig,
    reporter: &Reporter<'_>,
) -> Result<RunSummary, PublishError> {
    let publisher = DeltaPublisher::new(&config.target, config.delta_trees());
    publisher.prepare()?;
    let mut writer = Writer {
        summary: RunSummary {
            delta_enabled: publisher.delta_enabled(),
            ..Default::default()
        },
        publisher,
        reporter,
    };

    let bundle = StaticBundle::load(config.assets_dir.as_deref())?;
    for file in &bundle.files {
        writer.write(PublishRequest::new(file.dir, file.name, &file.contents))?;
    }

    let assets = scan::scan(&config.source)?;
    reporter.progress(0);

    let manifest = Manifest::new(&config.title, &assets);
    writer.write(PublishRequest::new(
        TreeDir::Pictures,
        MANIFEST_FILE_NAME,
        &manifest.to_bytes(),
    ))?;

    for (index, asset) in assets.iter().enumerate() {
        reporter.progress(progress_percent(index, assets.len()));
        publish_picture(backend, asset, &mut writer)?;
    }

    reporter.progress(100);
    writer.summary.pictures = assets.len();
    Ok(writer.summary)
}

/// Publish one picture: the original bytes, then its thumbnail.
fn publish_picture(
    backend: &impl ImageBackend,
    asset: &PictureAsset,
    writer: &mut Writer<'_>,
) -> Result<(), PublishError> {
    let source = std::fs::read(&asset.source_path).map_err(|source| PublishError::ReadPicture {
        path: asset.source_path.clone(),
        source,
    })?;
    writer.write(PublishRequest::new(
        TreeDir::Pictures,
        &asset.file_name,
        &source,
    ))?;

    let thumbnail =
        create_thumbnail(backend, &source, asset.format, THUMBNAIL_MAX_EDGE).map_err(|source| {
            PublishError::Imaging {
                file: asset.file_name.clone(),
                source,
            }
        })?;
    let thumbnail_name = format!("{THUMBNAIL_PREFIX}{}", asset.file_name);
    writer.write(PublishRequest::new(
        TreeDir::Pictures,
        &thumbnail_name,
        &thumbnail.bytes,
    ))
}

/// Resets the run-state token when the worker ends, however it ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Admits at most one publish run at a time.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    running: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run started by this orchestrator is still in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start a run on a worker thread with the default backend.
    pub fn start(&self, config: RunConfig) -> Result<RunHandle, PublishError> {
        self.start_with_backend(RustBackend::new(), config)
    }

    /// Start a run on a worker thread with a specific backend.
    pub fn start_with_backend<B>(&self, backend: B, config: RunConfig) -> Result<RunHandle, PublishError>
    where
        B: ImageBackend + 'static,
    {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PublishError::AlreadyRunning)?;
        let guard = RunningGuard(Arc::clone(&self.running));

        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("galerie-publish".into())
            .spawn(move || {
                let _guard = guard;
                // The outcome already went out as RunEvent::Finished
                publish_with_backend(&backend, &config, Some(&tx)).ok();
            })?;

        Ok(RunHandle { events: rx, worker })
    }
}

/// The caller's side of a running publish.
pub struct RunHandle {
    events: Receiver<RunEvent>,
    worker: JoinHandle<()>,
}

impl RunHandle {
    /// Raw event stream, for callers that poll.
    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// Block until the run ends, passing every event to `on_event`.
    pub fn wait_with(self, mut on_event: impl FnMut(&RunEvent)) -> RunOutcome {
        let mut outcome = None;
        for event in self.events.iter() {
            on_event(&event);
            if let RunEvent::Finished(result) = event {
                outcome = Some(result);
                break;
            }
        }
        let joined = self.worker.join();
        match (outcome, joined) {
            (Some(outcome), _) => outcome,
            (None, Err(_)) => RunOutcome::Failed("publish worker panicked".into()),
            (None, Ok(())) => RunOutcome::Failed("publish worker exited without a result".into()),
        }
    }

    /// Block until the run ends.
    pub fn wait(self) -> RunOutcome {
        self.wait_with(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::scan::PictureFormat;
    use crate::test_helpers::{list_files, picture_dimensions, run_config, write_picture};
    use std::fs;
    use tempfile::TempDir;

    fn collect_events(rx: &Receiver<RunEvent>) -> Vec<RunEvent> {
        rx.try_iter().collect()
    }

    fn progress_values(events: &[RunEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // progress_percent
    // =========================================================================

    #[test]
    fn progress_is_floored() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(0, 0), 0);
    }

    // =========================================================================
    // Pipeline with mock backend
    // =========================================================================

    #[test]
    fn publishes_bundle_manifest_pictures_and_thumbnails() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Demo");
        fs::write(config.source.join("b.png"), b"png-bytes").unwrap();
        fs::write(config.source.join("a.jpg"), b"jpg-bytes").unwrap();
        fs::write(config.source.join("readme.txt"), b"skip me").unwrap();

        let backend = MockBackend::new();
        let summary = publish_with_backend(&backend, &config, None).unwrap();

        assert_eq!(summary.pictures, 2);
        assert_eq!(summary.files_written, 4 + 1 + 4);
        assert!(!summary.delta_enabled);
        assert_eq!(
            list_files(&config.target),
            vec![
                "content/galerie.css",
                "index.html",
                "pics/a.jpg",
                "pics/b.png",
                "pics/galerie.txt",
                "pics/tn_a.jpg",
                "pics/tn_b.png",
                "scripts/galerie-lib.js",
                "scripts/galerie.js",
            ]
        );
        assert_eq!(
            fs::read_to_string(config.target.join("pics/galerie.txt")).unwrap(),
            r#"{"title":"Demo","images":["a.jpg","b.png"]}"#
        );
        assert_eq!(
            fs::read(config.target.join("pics/a.jpg")).unwrap(),
            b"jpg-bytes"
        );
    }

    #[test]
    fn pictures_are_processed_in_manifest_order() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Order");
        fs::write(config.source.join("B.gif"), b"bb").unwrap();
        fs::write(config.source.join("a.bmp"), b"a").unwrap();

        let backend = MockBackend::new();
        publish_with_backend(&backend, &config, None).unwrap();

        let thumbnail_formats: Vec<_> = backend
            .get_operations()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Thumbnail { format, len, .. } => Some((format, len)),
                _ => None,
            })
            .collect();
        assert_eq!(
            thumbnail_formats,
            vec![(PictureFormat::Bmp, 1), (PictureFormat::Gif, 2)]
        );
    }

    #[test]
    fn event_sequence_for_two_pictures() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Demo");
        fs::write(config.source.join("a.jpg"), b"a").unwrap();
        fs::write(config.source.join("b.jpg"), b"b").unwrap();

        let (tx, rx) = mpsc::channel();
        publish_with_backend(&MockBackend::new(), &config, Some(&tx)).unwrap();
        let events = collect_events(&rx);

        assert_eq!(progress_values(&events), vec![0, 0, 50, 100]);
        assert!(matches!(
            events.last(),
            Some(RunEvent::Finished(RunOutcome::Succeeded(_)))
        ));
        let published: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Published { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            published,
            vec![
                "scripts/galerie-lib.js",
                "scripts/galerie.js",
                "content/galerie.css",
                "index.html",
                "pics/galerie.txt",
                "pics/a.jpg",
                "pics/tn_a.jpg",
                "pics/b.jpg",
                "pics/tn_b.jpg",
            ]
        );
    }

    #[test]
    fn empty_source_still_reports_zero_and_hundred() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Empty");

        let (tx, rx) = mpsc::channel();
        let summary = publish_with_backend(&MockBackend::new(), &config, Some(&tx)).unwrap();
        let events = collect_events(&rx);

        assert_eq!(summary.pictures, 0);
        assert_eq!(progress_values(&events), vec![0, 100]);
        assert_eq!(
            fs::read_to_string(config.target.join("pics/galerie.txt")).unwrap(),
            r#"{"title":"Empty","images":[]}"#
        );
    }

    #[test]
    fn thumbnail_failure_aborts_run() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Broken");
        fs::write(config.source.join("a.jpg"), b"a").unwrap();
        fs::write(config.source.join("b.jpg"), b"b").unwrap();

        let (tx, rx) = mpsc::channel();
        let result = publish_with_backend(&MockBackend::failing(), &config, Some(&tx));
        let events = collect_events(&rx);

        assert!(matches!(result, Err(PublishError::Imaging { ref file, .. }) if file == "a.jpg"));
        assert!(matches!(
            events.last(),
            Some(RunEvent::Finished(RunOutcome::Failed(_)))
        ));
        // The full-size copy made it out before the failure; nothing after it did
        assert!(config.target.join("pics/a.jpg").exists());
        assert!(!config.target.join("pics/b.jpg").exists());
        assert!(!progress_values(&events).contains(&100));
    }

    #[test]
    fn delta_root_ignored_when_reference_missing() {
        let tmp = TempDir::new().unwrap();
        let mut config = run_config(tmp.path(), "Demo");
        config.reference = Some(tmp.path().join("never-published"));
        config.delta = Some(tmp.path().join("delta"));

        let summary = publish_with_backend(&MockBackend::new(), &config, None).unwrap();
        assert!(!summary.delta_enabled);
        assert!(!tmp.path().join("delta").exists());
    }

    #[test]
    fn delta_counts_in_summary() {
        let tmp = TempDir::new().unwrap();
        let mut config = run_config(tmp.path(), "Demo");
        fs::write(config.source.join("a.jpg"), b"new").unwrap();
        let reference = tmp.path().join("prev");
        fs::create_dir_all(reference.join("pics")).unwrap();
        fs::write(reference.join("pics/a.jpg"), b"old").unwrap();
        config.reference = Some(reference);
        config.delta = Some(tmp.path().join("delta"));

        let summary = publish_with_backend(&MockBackend::new(), &config, None).unwrap();
        assert!(summary.delta_enabled);
        assert_eq!(summary.staged, 1);
        assert_eq!(list_files(&tmp.path().join("delta")), vec!["pics/a.jpg"]);
    }

    #[test]
    fn real_backend_writes_bounded_thumbnails() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Real");
        write_picture(&config.source, "wide.jpg", 400, 200);
        write_picture(&config.source, "tall.gif", 50, 300);

        publish(&config, None).unwrap();

        let pics = config.target.join("pics");
        assert_eq!(picture_dimensions(&pics.join("tn_wide.jpg")), (200, 100));
        assert_eq!(picture_dimensions(&pics.join("tn_tall.gif")), (33, 200));
        assert_eq!(picture_dimensions(&pics.join("wide.jpg")), (400, 200));
    }

    // =========================================================================
    // Orchestrator
    // =========================================================================

    #[test]
    fn orchestrator_runs_on_worker_and_resets_state() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Async");
        fs::write(config.source.join("a.png"), b"a").unwrap();

        let orchestrator = Orchestrator::new();
        assert!(!orchestrator.is_running());
        let handle = orchestrator
            .start_with_backend(MockBackend::new(), config.clone())
            .unwrap();

        let mut seen = Vec::new();
        let outcome = handle.wait_with(|e| seen.push(e.clone()));

        assert!(outcome.is_success());
        assert_eq!(progress_values(&seen), vec![0, 0, 100]);
        assert!(!orchestrator.is_running());
        assert!(config.target.join("pics/tn_a.png").exists());
    }

    #[test]
    fn second_start_is_refused_while_running() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Busy");

        let orchestrator = Orchestrator::new();
        // Hold the token as an active run would
        orchestrator.running.store(true, Ordering::Release);

        let result = orchestrator.start_with_backend(MockBackend::new(), config);
        assert!(matches!(result, Err(PublishError::AlreadyRunning)));
        assert!(orchestrator.is_running());
    }

    #[test]
    fn orchestrator_reports_failure_as_outcome() {
        let tmp = TempDir::new().unwrap();
        let config = run_config(tmp.path(), "Broken");
        fs::write(config.source.join("a.jpg"), b"a").unwrap();

        let orchestrator = Orchestrator::new();
        let outcome = orchestrator
            .start_with_backend(MockBackend::failing(), config)
            .unwrap()
            .wait();

        assert!(!outcome.is_success());
        assert!(!orchestrator.is_running());
        // Free again after the failed run
        let tmp2 = TempDir::new().unwrap();
        let again = orchestrator
            .start_with_backend(MockBackend::new(), run_config(tmp2.path(), "Again"))
            .unwrap()
            .wait();
        assert!(again.is_success());
    }
}
