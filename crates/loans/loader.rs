use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;
use std::{thread, time};

use log::info;

use crate::record::Record;
use crate::source::{self, SourceError};

/// Session load state. `Loaded` and `Failed` are terminal; there is no
/// retry within a session.
#[derive(Debug)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded(Vec<Record>),
    Failed(SourceError),
}

/// Owns the one asynchronous dataset load of the session.
///
/// `start` kicks off a worker thread that sleeps for the configured delay
/// (simulated network latency, additive to the real parse time) and then
/// parses the bundled dataset. Consumers drive the state machine by
/// calling `poll` on their tick. The in-flight load is not cancellable;
/// tearing the loader down just drops the channel.
#[derive(Debug)]
pub struct Loader {
    state: LoadState,
    rx: Option<Receiver<Result<Vec<Record>, SourceError>>>,
    delay: Duration,
}

impl Loader {
    pub fn new(delay: Duration) -> Self {
        Loader {
            state: LoadState::Idle,
            rx: None,
            delay,
        }
    }

    /// Kick off the fetch of the bundled dataset. Only the first call per
    /// session does anything.
    pub fn start(&mut self) {
        self.start_with(source::load)
    }

    pub fn start_with<F>(&mut self, fetch: F)
    where
        F: FnOnce() -> Result<Vec<Record>, SourceError> + Send + 'static,
    {
        if !matches!(self.state, LoadState::Idle) {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let delay = self.delay;
        thread::spawn(move || {
            let start = time::Instant::now();
            thread::sleep(delay);
            let result = fetch();
            let duration = time::Instant::now().duration_since(start);
            info!("dataset load done, cost {}ms", duration.as_millis());
            // the receiver may be gone if the consumer was torn down
            let _ = tx.send(result);
        });
        self.rx = Some(rx);
        self.state = LoadState::Loading;
    }

    /// Drive the state machine without blocking.
    pub fn poll(&mut self) -> &LoadState {
        if matches!(self.state, LoadState::Loading) {
            let received = match &self.rx {
                Some(rx) => match rx.try_recv() {
                    Ok(result) => Some(result),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => Some(Err(SourceError::Interrupted)),
                },
                None => None,
            };
            if let Some(result) = received {
                self.rx = None;
                self.state = match result {
                    Ok(records) => LoadState::Loaded(records),
                    Err(e) => LoadState::Failed(e),
                };
            }
        }
        &self.state
    }

    /// Block until the load reaches a terminal state. Starts the load if
    /// that has not happened yet. Used by the non-interactive outputs.
    pub fn wait(&mut self) -> &LoadState {
        if matches!(self.state, LoadState::Idle) {
            self.start();
        }
        while matches!(self.state, LoadState::Loading) {
            self.poll();
            thread::sleep(Duration::from_millis(5));
        }
        &self.state
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn data(&self) -> Option<&[Record]> {
        match &self.state {
            LoadState::Loaded(records) => Some(records),
            _ => None,
        }
    }

    pub fn loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&SourceError> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }
}
