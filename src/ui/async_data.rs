use std::{
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use chrono::{DateTime, Local};
use log::debug;

use crate::service::data_manager::{DataRetrievalError, DataRetrievalResult};

pub enum DataState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(DataRetrievalError),
}

type Tagged<T> = (u64, DataRetrievalResult<T>);

/// Result slot of a view. Every request gets a sequence number and only the answer to the
/// most recent one is committed; older answers are dropped when they arrive.
pub struct AsyncData<T> {
    state: DataState<T>,
    sender: Sender<Tagged<T>>,
    receiver: Receiver<Tagged<T>>,
    issued: u64,
    discarded: u64,
    fetched_at: Option<DateTime<Local>>,
}

impl<T: Send + 'static> AsyncData<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            state: DataState::Idle,
            sender,
            receiver,
            issued: 0,
            discarded: 0,
            fetched_at: None,
        }
    }

    /// Starts `fetch_fn` on a worker thread, superseding any request still in flight
    pub fn request<F>(&mut self, fetch_fn: F)
    where
        F: FnOnce() -> DataRetrievalResult<T> + Send + 'static,
    {
        self.issued += 1;
        let seq = self.issued;
        let tx = self.sender.clone();

        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(fetch_fn))
                .unwrap_or(Err(DataRetrievalError::WorkerPanicked));
            tx.send((seq, result)).ok();
        });

        self.state = DataState::Loading;
    }

    /// Drains finished requests, returns whether the state changed
    pub fn try_update(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok((seq, result)) if seq == self.issued => {
                    self.state = match result {
                        Ok(data) => DataState::Ready(data),
                        Err(e) => DataState::Failed(e),
                    };
                    self.fetched_at = Some(Local::now());
                    changed = true;
                }
                Ok((seq, _)) => {
                    self.discarded += 1;
                    debug!("Discarding stale response #{} (latest is #{})", seq, self.issued);
                }
                // The sender half lives in self, so the channel never disconnects
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }
}

impl<T> AsyncData<T> {
    pub fn state(&self) -> &DataState<T> {
        &self.state
    }

    pub fn get_data(&self) -> Option<&T> {
        match &self.state {
            DataState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DataState::Loading)
    }

    pub fn error(&self) -> Option<&DataRetrievalError> {
        match &self.state {
            DataState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Time of the last commit
    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }

    /// Number of responses dropped because a newer request was issued
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl<T: Send + 'static> Default for AsyncData<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) fn wait_until<T: Send + 'static>(data: &mut AsyncData<T>, done: impl Fn(&AsyncData<T>) -> bool) {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !done(&*data) {
        assert!(std::time::Instant::now() < deadline, "timed out waiting for async data");
        thread::sleep(std::time::Duration::from_millis(5));
        data.try_update();
    }
}
