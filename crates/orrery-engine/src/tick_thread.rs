//! The context-side tick loop.
//!
//! [`WorkerState`] owns the [`StepEngine`] exclusively for the lifetime
//! of a run (moved in when the context spawns). Commands arrive over a
//! bounded crossbeam channel and tick results leave the same way; no
//! state is shared with the controlling side.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use orrery_core::{RunGeneration, StepError};
use orrery_sim::{StepEngine, StepMetrics, TickSnapshot};

/// Commands a context accepts. Body replacement is not among them; the
/// integrator replaces the whole context instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WorkerCommand {
    Start,
    Stop,
    Terminate,
}

/// Events flowing back from a context, each tagged with the run
/// generation the context was spawned for.
///
/// Metrics travel with each tick because the engine itself is owned by
/// the context; the controlling side has no other way to observe them.
#[derive(Clone, Debug)]
pub(crate) enum WorkerEvent {
    Tick {
        snapshot: TickSnapshot,
        metrics: StepMetrics,
    },
    Failed {
        generation: RunGeneration,
        error: StepError,
    },
}

/// State held by the context's main loop.
pub(crate) struct WorkerState {
    engine: StepEngine,
    generation: RunGeneration,
    command_rx: Receiver<WorkerCommand>,
    event_tx: Sender<WorkerEvent>,
    tick_budget: Option<Duration>,
    running: bool,
}

impl WorkerState {
    pub fn new(
        engine: StepEngine,
        generation: RunGeneration,
        command_rx: Receiver<WorkerCommand>,
        event_tx: Sender<WorkerEvent>,
        tick_rate_hz: Option<f64>,
    ) -> Self {
        Self {
            engine,
            generation,
            command_rx,
            event_tx,
            tick_budget: tick_rate_hz.map(|hz| Duration::from_secs_f64(1.0 / hz)),
            running: false,
        }
    }

    /// Main loop. Runs until terminated or until the controlling side
    /// drops its end of either channel.
    ///
    /// Consumes self and returns the [`StepEngine`] so a joining caller
    /// can recover the final state via `JoinHandle<StepEngine>`.
    pub fn run(mut self) -> StepEngine {
        // Publish the starting state as tick 0 so the committed range
        // always includes the initial body layout.
        let initial = WorkerEvent::Tick {
            snapshot: self.engine.snapshot_now(self.generation),
            metrics: StepMetrics::default(),
        };
        if self.event_tx.send(initial).is_err() {
            return self.engine;
        }

        loop {
            if !self.drain_commands() {
                break;
            }

            if !self.running {
                // Idle until the next command rather than spinning.
                match self.command_rx.recv() {
                    Ok(command) => {
                        if !self.apply(command) {
                            break;
                        }
                        continue;
                    }
                    Err(_) => break,
                }
            }

            let tick_start = Instant::now();
            match self.engine.execute_tick(self.generation) {
                Ok(snapshot) => {
                    let event = WorkerEvent::Tick {
                        snapshot,
                        metrics: *self.engine.metrics(),
                    };
                    if self.event_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    // A non-finite state poisons the run. Report once
                    // and stop ticking; the engine state stays frozen
                    // for post-mortem inspection.
                    let _ = self.event_tx.send(WorkerEvent::Failed {
                        generation: self.generation,
                        error,
                    });
                    self.running = false;
                    continue;
                }
            }

            if let Some(budget) = self.tick_budget {
                if !self.pace(tick_start + budget) {
                    break;
                }
            }
        }

        self.engine
    }

    /// Absorb all pending commands. Returns `false` on terminate or
    /// when the controlling side is gone.
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => {
                    if !self.apply(command) {
                        return false;
                    }
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn apply(&mut self, command: WorkerCommand) -> bool {
        match command {
            WorkerCommand::Start => {
                self.running = true;
                true
            }
            WorkerCommand::Stop => {
                self.running = false;
                true
            }
            WorkerCommand::Terminate => false,
        }
    }

    /// Wait out the remainder of the tick budget while staying
    /// responsive to commands. Returns `false` on terminate or
    /// disconnect.
    fn pace(&mut self, deadline: Instant) -> bool {
        loop {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return true;
            };
            match self.command_rx.recv_timeout(remaining) {
                Ok(command) => {
                    if !self.apply(command) {
                        return false;
                    }
                }
                Err(RecvTimeoutError::Timeout) => return true,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }
}
