//! The gait metric engine.
//!
//! One [`GaitEngine`] owns all rolling state: the extractor settings, the
//! per-metric windows and the dispatcher. Each [`GaitEngine::tick`] polls the
//! source for its current frame, runs the detector on it at most once, and
//! folds the first subject's metrics into the windows. Per-frame failures are
//! reported to the presenter and never stop the loop.

use crate::{
    aggregator::WindowedAggregator,
    config::EngineConfig,
    detector::PoseDetector,
    dispatcher::{Admission, FrameDispatcher, Ticket},
    landmarks::LandmarkSet,
    metrics::{MetricExtractor, MetricFrame},
    report::{AggregateSnapshot, Presenter},
    sources::{FrameSource, FrameToken, SourceFrame, SourceKind, SourcePoll},
    Error, Result,
};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Dispatcher is idle, nothing was polled
    Idle,
    /// Source had no frame this cycle
    Pending,
    /// Frame not processed (duplicate token or detection in flight)
    Skipped(Admission),
    /// First subject extracted and pushed into the windows
    Processed {
        token: FrameToken,
        metrics: MetricFrame,
    },
    /// Detector ran and found nobody
    NoSubject,
    /// Acquisition or detection failed for this frame
    Failed,
    /// Result arrived after the session it belongs to was stopped
    Discarded,
    /// Source reported end of stream; dispatcher is now idle
    Ended,
}

/// Counters over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub processed: u64,
    pub no_subject: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::Processed { .. } => self.processed += 1,
            TickOutcome::NoSubject => self.no_subject += 1,
            TickOutcome::Failed => self.failed += 1,
            TickOutcome::Skipped(_) | TickOutcome::Discarded => self.skipped += 1,
            TickOutcome::Idle | TickOutcome::Pending | TickOutcome::Ended => {}
        }
    }
}

/// Landmark-to-metric pipeline with its rolling state
#[derive(Debug, Clone)]
pub struct GaitEngine {
    extractor: MetricExtractor,
    aggregator: WindowedAggregator,
    dispatcher: FrameDispatcher,
    reset_on_start: bool,
    frames_processed: u64,
}

impl GaitEngine {
    /// Create an idle engine
    ///
    /// # Panics
    ///
    /// Panics if `config.max_buffer` is 0; use [`EngineConfig::validate`] first
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            extractor: MetricExtractor::new(config.visibility_floor),
            aggregator: WindowedAggregator::new(config.max_buffer),
            dispatcher: FrameDispatcher::new(),
            reset_on_start: config.reset_on_start,
            frames_processed: 0,
        }
    }

    /// Begin dispatching frames from a source of `kind`
    ///
    /// # Errors
    ///
    /// Returns `DetectorUnavailable` if the detector is not ready; dispatch
    /// never starts without one.
    pub fn start<D: PoseDetector>(&mut self, kind: SourceKind, detector: &D) -> Result<()> {
        if !detector.is_ready() {
            return Err(Error::DetectorUnavailable);
        }
        if self.reset_on_start {
            self.aggregator.reset();
        }
        self.dispatcher.start(kind);
        info!("Dispatch started for {kind:?} source");
        Ok(())
    }

    /// Stop dispatching; an in-flight result will be discarded
    pub fn stop(&mut self) {
        if self.dispatcher.is_active() {
            info!("Dispatch stopped after {} processed frames", self.frames_processed);
        }
        self.dispatcher.stop();
    }

    /// Clear windows, token history and dispatcher state
    pub fn reset(&mut self) {
        self.aggregator.reset();
        self.dispatcher.reset();
        self.frames_processed = 0;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.dispatcher.is_active()
    }

    #[must_use]
    pub fn snapshot(&self) -> AggregateSnapshot {
        self.aggregator.snapshot()
    }

    #[must_use]
    pub fn aggregator(&self) -> &WindowedAggregator {
        &self.aggregator
    }

    #[must_use]
    pub fn extractor(&self) -> &MetricExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn dispatcher(&self) -> &FrameDispatcher {
        &self.dispatcher
    }

    /// Frames whose subject made it into the windows
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// First half of a two-phase dispatch: claim the frame `token`
    ///
    /// Hosts that run the detector asynchronously call this before launching
    /// detection and [`Self::complete_frame`] when it resolves.
    pub fn begin_frame(&mut self, token: FrameToken) -> Admission {
        self.dispatcher.begin(token)
    }

    /// Second half of a two-phase dispatch: apply a detection result
    pub fn complete_frame(
        &mut self,
        ticket: Ticket,
        width: u32,
        height: u32,
        result: Result<Vec<LandmarkSet>>,
        presenter: &mut dyn Presenter,
    ) -> TickOutcome {
        if !self.dispatcher.complete(ticket) {
            debug!("Discarding late result for frame {}", ticket.token());
            return TickOutcome::Discarded;
        }

        match result {
            Ok(subjects) => {
                let Some(landmarks) = subjects.first() else {
                    debug!("No subject in frame {}", ticket.token());
                    presenter.no_subject();
                    return TickOutcome::NoSubject;
                };
                let metrics = self
                    .extractor
                    .extract(landmarks, f64::from(width), f64::from(height));
                let stored = self.aggregator.push_frame(&metrics);
                self.frames_processed += 1;
                debug!("Frame {}: {stored} samples stored", ticket.token());

                presenter.snapshot_updated(&self.aggregator.snapshot());
                TickOutcome::Processed {
                    token: ticket.token(),
                    metrics,
                }
            }
            Err(e) => {
                warn!("Detection failed for frame {}: {e}", ticket.token());
                presenter.status(&format!("Inference error: {e}"));
                TickOutcome::Failed
            }
        }
    }

    /// One scheduler tick against the active source
    pub fn tick<S, D>(&mut self, source: &mut S, detector: &mut D, presenter: &mut dyn Presenter) -> TickOutcome
    where
        S: FrameSource,
        D: PoseDetector<Frame = S::Frame>,
    {
        let Some(kind) = self.dispatcher.source_kind() else {
            return TickOutcome::Idle;
        };

        let outcome = self.poll_and_process(source, detector, presenter);

        // A still image gets exactly one pass
        if !kind.is_continuous() && self.dispatcher.is_active() {
            self.stop();
        }
        outcome
    }

    fn poll_and_process<S, D>(&mut self, source: &mut S, detector: &mut D, presenter: &mut dyn Presenter) -> TickOutcome
    where
        S: FrameSource,
        D: PoseDetector<Frame = S::Frame>,
    {
        let current = match source.poll() {
            Ok(SourcePoll::Frame(current)) => current,
            Ok(SourcePoll::Pending) => return TickOutcome::Pending,
            Ok(SourcePoll::Ended) => {
                info!("End of stream reached");
                presenter.status("End of stream");
                self.stop();
                return TickOutcome::Ended;
            }
            Err(e) => {
                warn!("Failed to acquire frame: {e}");
                presenter.status(&format!("Frame acquisition error: {e}"));
                return TickOutcome::Failed;
            }
        };

        self.dispatch(current, detector, presenter)
    }

    fn dispatch<D: PoseDetector>(
        &mut self,
        current: SourceFrame<D::Frame>,
        detector: &mut D,
        presenter: &mut dyn Presenter,
    ) -> TickOutcome {
        let ticket = match self.begin_frame(current.token) {
            Admission::Admit(ticket) => ticket,
            other => return TickOutcome::Skipped(other),
        };

        let result = if detector.is_ready() {
            detector.detect(&current.frame)
        } else {
            Err(Error::DetectorUnavailable)
        };

        self.complete_frame(ticket, current.width, current.height, result, presenter)
    }

    /// Run detection once on a still image and return to idle
    ///
    /// # Errors
    ///
    /// Returns `DetectorUnavailable` if the detector is not ready
    pub fn process_still<D: PoseDetector>(
        &mut self,
        still: SourceFrame<D::Frame>,
        detector: &mut D,
        presenter: &mut dyn Presenter,
    ) -> Result<TickOutcome> {
        self.start(SourceKind::StillImage, detector)?;
        let outcome = self.dispatch(still, detector, presenter);
        self.stop();
        Ok(outcome)
    }

    /// Tick until the source ends (or the engine is stopped)
    ///
    /// With `pace` set, each tick is padded to that interval, standing in for
    /// the display refresh that paces a live view.
    ///
    /// # Errors
    ///
    /// Returns `DetectorUnavailable` if the detector is not ready at start
    pub fn run<S, D>(
        &mut self,
        source: &mut S,
        detector: &mut D,
        presenter: &mut dyn Presenter,
        pace: Option<Duration>,
    ) -> Result<RunSummary>
    where
        S: FrameSource,
        D: PoseDetector<Frame = S::Frame>,
    {
        self.start(source.kind(), detector)?;

        let mut summary = RunSummary::default();
        while self.is_active() {
            let tick_start = Instant::now();
            let outcome = self.tick(source, detector, presenter);
            summary.record(&outcome);

            if let Some(rest) = pace.and_then(|interval| interval.checked_sub(tick_start.elapsed())) {
                std::thread::sleep(rest);
            }
        }

        info!(
            "Run finished: {} ticks, {} processed, {} without subject, {} failed",
            summary.ticks, summary.processed, summary.no_subject, summary.failed
        );
        Ok(summary)
    }
}

impl Default for GaitEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
