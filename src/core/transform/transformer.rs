//! Windowed batch transformer job
//!
//! The job wakes once per window, pulls whatever accumulated on the stream
//! since the checkpoint, processes it as one micro-batch and commits the new
//! positions. Windows never overlap: each one runs to completion (map, hash,
//! write, checkpoint) before the next tick is accepted.

use crate::adapters::stream::StreamConsumer;
use crate::config::StartingPosition;
use crate::core::state::{Checkpoint, StateManager};
use crate::core::transform::batch::{BatchProcessor, BatchResult, MicroBatch};
use crate::core::transform::partition::{Clock, SystemClock};
use crate::domain::ids::StreamName;
use crate::domain::{PipelineError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Lifecycle of the transformer job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformerState {
    /// Checkpoint not loaded yet
    Initializing,
    /// Idle between windows
    WaitingForWindow,
    /// A micro-batch is in flight
    ProcessingBatch,
    /// A window failed; terminal for this run
    Failed,
    /// Shut down between windows
    Stopped,
}

/// Settings of one transformer job
#[derive(Debug, Clone)]
pub struct TransformerSettings {
    /// Job name, also the checkpoint name
    pub job_name: String,

    /// Stream to consume
    pub stream: StreamName,

    /// Window length
    pub window: Duration,

    /// Where shards without a checkpoint start
    pub starting_position: StartingPosition,

    /// Upper bound on stream records per window
    pub max_records_per_batch: usize,

    /// Map and hash without writing or checkpointing
    pub dry_run: bool,
}

/// Summary of a transformer run
#[derive(Debug, Clone, Default)]
pub struct TransformSummary {
    /// Windows that wrote output
    pub windows_processed: u64,

    /// Windows that read nothing
    pub empty_windows: u64,

    /// Stream messages consumed
    pub messages_consumed: u64,

    /// Typed records written
    pub records_written: u64,

    /// Output objects, in write order
    pub outputs: Vec<String>,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl TransformSummary {
    fn record(&mut self, result: &BatchResult) {
        self.messages_consumed += result.messages as u64;
        match &result.output {
            Some(output) => {
                self.windows_processed += 1;
                self.records_written += result.records_written;
                self.outputs.push(output.to_string());
            }
            None => self.empty_windows += 1,
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            windows_processed = self.windows_processed,
            empty_windows = self.empty_windows,
            messages = self.messages_consumed,
            records = self.records_written,
            duration_secs = self.duration.as_secs(),
            "Transformer stopped"
        );
    }
}

/// Micro-batch consumer of the event stream
pub struct BatchTransformer {
    consumer: Arc<dyn StreamConsumer>,
    processor: BatchProcessor,
    state_manager: Arc<StateManager>,
    clock: Arc<dyn Clock>,
    settings: TransformerSettings,
    state: TransformerState,
    checkpoint: Option<Checkpoint>,
    summary: TransformSummary,
    windows_polled: usize,
}

impl BatchTransformer {
    /// Create a transformer job
    pub fn new(
        consumer: Arc<dyn StreamConsumer>,
        processor: BatchProcessor,
        state_manager: Arc<StateManager>,
        settings: TransformerSettings,
    ) -> Self {
        Self {
            consumer,
            processor,
            state_manager,
            clock: Arc::new(SystemClock),
            settings,
            state: TransformerState::Initializing,
            checkpoint: None,
            summary: TransformSummary::default(),
            windows_polled: 0,
        }
    }

    /// Replace the processing-time clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransformerState {
        self.state
    }

    /// In-memory checkpoint, once initialized
    pub fn checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoint.as_ref()
    }

    /// Counters accumulated so far
    pub fn summary(&self) -> &TransformSummary {
        &self.summary
    }

    /// Load the checkpoint and resolve a position for every shard
    async fn initialize(&mut self) -> Result<()> {
        let mut checkpoint = self
            .state_manager
            .load_or_create(&self.settings.job_name, &self.settings.stream)
            .await?;

        if checkpoint.stream_name != self.settings.stream {
            return Err(PipelineError::State(format!(
                "Checkpoint for job '{}' tracks stream '{}', not '{}'",
                self.settings.job_name, checkpoint.stream_name, self.settings.stream
            )));
        }

        for shard in self.consumer.list_shards(&self.settings.stream).await? {
            if checkpoint.position(&shard).is_some() {
                continue;
            }
            let position = match self.settings.starting_position {
                StartingPosition::TrimHorizon => 0,
                StartingPosition::Latest => {
                    self.consumer
                        .latest_position(&self.settings.stream, &shard)
                        .await?
                }
            };
            tracing::debug!(shard = %shard, position, "Resolved starting position");
            checkpoint.positions.insert(shard, position);
        }

        self.checkpoint = Some(checkpoint);
        self.state = TransformerState::WaitingForWindow;
        Ok(())
    }

    /// Read the next window from every shard
    ///
    /// The first shard read rotates by one each window so a busy shard
    /// cannot use up `max_records_per_batch` on every window.
    async fn poll_window(&self, checkpoint: &Checkpoint) -> Result<MicroBatch> {
        let mut records = Vec::new();
        let mut end_positions = BTreeMap::new();

        let shards: Vec<_> = checkpoint.positions.iter().collect();
        let offset = match shards.len() {
            0 => 0,
            n => self.windows_polled % n,
        };

        for &(shard, &position) in shards.iter().cycle().skip(offset).take(shards.len()) {
            let remaining = self.settings.max_records_per_batch - records.len();
            if remaining == 0 {
                break;
            }
            let output = self
                .consumer
                .get_records(&self.settings.stream, shard, position, remaining)
                .await?;
            if !output.records.is_empty() {
                end_positions.insert(shard.clone(), output.next_position);
                records.extend(output.records);
            }
        }

        Ok(MicroBatch {
            batch_id: checkpoint.next_batch_id,
            records,
            start_positions: checkpoint.positions.clone(),
            end_positions,
        })
    }

    /// Process exactly one window
    ///
    /// An empty window leaves the checkpoint untouched. A failed window moves
    /// the job to [`TransformerState::Failed`] and is not retried.
    pub async fn run_once(&mut self) -> Result<BatchResult> {
        match self.state {
            TransformerState::Initializing => self.initialize().await?,
            TransformerState::Failed => {
                return Err(PipelineError::State(
                    "Transformer has failed and cannot process further windows".to_string(),
                ))
            }
            _ => {}
        }

        let mut checkpoint = self
            .checkpoint
            .take()
            .ok_or_else(|| PipelineError::State("Checkpoint not initialized".to_string()))?;

        self.state = TransformerState::ProcessingBatch;
        let outcome = self.process_window(&mut checkpoint).await;
        self.checkpoint = Some(checkpoint);
        self.windows_polled = self.windows_polled.wrapping_add(1);

        match outcome {
            Ok(result) => {
                self.state = TransformerState::WaitingForWindow;
                self.summary.record(&result);
                Ok(result)
            }
            Err(e) => {
                self.state = TransformerState::Failed;
                Err(e)
            }
        }
    }

    async fn process_window(&self, checkpoint: &mut Checkpoint) -> Result<BatchResult> {
        let started = Instant::now();
        let batch = self.poll_window(checkpoint).await?;
        if batch.is_empty() {
            tracing::debug!(batch_id = batch.batch_id, "Empty window");
            return self.processor.process(&batch, self.clock.now()).await;
        }

        checkpoint.mark_started();
        let result = match self.processor.process(&batch, self.clock.now()).await {
            Ok(result) => result,
            Err(e) => {
                crate::log_error_with_context!(&e, "Window failed");
                checkpoint.mark_failed();
                if !self.settings.dry_run {
                    if let Err(state_err) = self.state_manager.record_failure(checkpoint).await {
                        tracing::warn!(error = %state_err, "Failed to record window failure");
                    }
                }
                return Err(e);
            }
        };

        let output_key = result.output.as_ref().map(|o| o.to_string());
        checkpoint.commit(
            batch.end_positions.clone(),
            result.records_written,
            output_key.clone(),
        );
        if !self.settings.dry_run {
            self.state_manager.checkpoint_batch(checkpoint).await?;
        }

        crate::log_window_processed!(
            result.batch_id,
            result.records_written,
            output_key.as_deref().unwrap_or("-"),
            started.elapsed()
        );
        Ok(result)
    }

    /// Run windows until shutdown is signalled or a window fails
    ///
    /// The first window starts immediately; later ones start one window
    /// length after the previous one started, or as soon as it finishes if
    /// it overran.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<TransformSummary> {
        let started = Instant::now();
        let mut ticker = tokio::time::interval(self.settings.window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            job_name = %self.settings.job_name,
            stream = %self.settings.stream,
            window_secs = self.settings.window.as_secs(),
            dry_run = self.settings.dry_run,
            "Starting batch transformer"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await?;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.state = TransformerState::Stopped;
        self.summary.duration = started.elapsed();
        self.summary.log_summary();
        Ok(self.summary.clone())
    }
}
