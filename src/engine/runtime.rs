// src/engine/runtime.rs

use std::fmt;
use std::time::SystemTime;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ToolRunner;
use crate::publish::Publisher;
use crate::watch::{PollState, Watcher};

use super::poll::poll_once;
use super::{RuntimeEvent, RuntimeOptions};

/// The polling loop.
///
/// Polls, publishes when a dump is ready, sleeps, repeats. Publishing blocks
/// the loop; shutdown requests are only honoured while sleeping, so a publish
/// that has started always runs to completion.
pub struct Runtime<R: ToolRunner> {
    watcher: Watcher,
    publisher: Publisher<R>,
    options: RuntimeOptions,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    events_closed: bool,
}

impl<R: ToolRunner> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("watcher", &self.watcher)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<R: ToolRunner> Runtime<R> {
    pub fn new(
        watcher: Watcher,
        publisher: Publisher<R>,
        options: RuntimeOptions,
        event_rx: mpsc::Receiver<RuntimeEvent>,
    ) -> Self {
        Self {
            watcher,
            publisher,
            options,
            event_rx,
            events_closed: false,
        }
    }

    pub fn publisher(&self) -> &Publisher<R> {
        &self.publisher
    }

    /// Main loop. Returns the final poll state on shutdown (or after one
    /// poll with `once`).
    pub async fn run(mut self) -> Result<PollState> {
        info!(
            dir = ?self.watcher.input_dir(),
            wait_secs = self.watcher.wait_threshold().as_secs(),
            interval_secs = self.options.interval.as_secs(),
            "athens-publish runtime started"
        );

        let mut state = PollState::new();
        loop {
            state = poll_once(
                &self.watcher,
                &mut self.publisher,
                state,
                SystemTime::now(),
                self.options.failure_policy,
            )
            .await?;

            if self.options.once {
                info!("single poll complete; exiting");
                break;
            }

            if self.wait_for_next_poll().await {
                info!("shutdown requested; exiting");
                break;
            }
        }

        Ok(state)
    }

    /// Sleep for the poll interval. Returns true if shutdown was requested.
    async fn wait_for_next_poll(&mut self) -> bool {
        let interval = self.options.interval;
        if self.events_closed {
            sleep(interval).await;
            return false;
        }

        tokio::select! {
            _ = sleep(interval) => false,
            event = self.event_rx.recv() => match event {
                Some(RuntimeEvent::ShutdownRequested) => true,
                None => {
                    debug!("runtime event channel closed; polling until killed");
                    self.events_closed = true;
                    sleep(interval).await;
                    false
                }
            },
        }
    }
}
