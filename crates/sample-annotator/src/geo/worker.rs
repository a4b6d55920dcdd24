//! A single long-lived thread for deadline-bounded geo lookups.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{GeoEngine, GeoError};

type Job = Box<dyn FnOnce(&dyn GeoEngine) + Send>;

struct Request {
    deadline: Instant,
    job: Job,
}

/// Runs geo lookups on one dedicated thread so callers can stop waiting.
///
/// A lookup that outlives its deadline keeps the worker busy until the engine
/// returns; requests queued behind it whose callers have already given up are
/// skipped without calling the engine. The thread exits once the worker is
/// dropped and its current lookup, if any, returns.
pub struct GeoWorker {
    sender: Sender<Request>,
}

impl GeoWorker {
    /// Start the worker thread for `engine`.
    pub fn spawn(engine: Arc<dyn GeoEngine>) -> Result<Self, GeoError> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("geo-worker".to_string())
            .spawn(move || run(engine, receiver))
            .map_err(|e| GeoError::Unavailable(format!("cannot start geo worker: {}", e)))?;
        Ok(Self { sender })
    }

    /// Run `lookup` on the worker, waiting at most `timeout` for its answer.
    pub fn call<T, F>(&self, timeout: Duration, lookup: F) -> Result<T, GeoError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn GeoEngine) -> Result<T, GeoError> + Send + 'static,
    {
        let deadline = Instant::now() + timeout;
        let (reply, answer) = mpsc::channel();
        let job: Job = Box::new(move |engine: &dyn GeoEngine| {
            let _ = reply.send(lookup(engine));
        });

        self.sender
            .send(Request { deadline, job })
            .map_err(|_| GeoError::Unavailable("geo worker has stopped".to_string()))?;

        match answer.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(GeoError::Timeout(timeout)),
            // The worker drops a request it skipped or whose lookup panicked.
            Err(RecvTimeoutError::Disconnected) if Instant::now() >= deadline => {
                Err(GeoError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(GeoError::Unavailable(
                "geo lookup ended without an answer".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for GeoWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoWorker").finish_non_exhaustive()
    }
}

fn run(engine: Arc<dyn GeoEngine>, requests: Receiver<Request>) {
    for request in requests {
        if Instant::now() >= request.deadline {
            debug!("skipping geo lookup whose caller already timed out");
            continue;
        }
        let job = request.job;
        if panic::catch_unwind(AssertUnwindSafe(|| job(engine.as_ref()))).is_err() {
            warn!("geo lookup panicked");
        }
    }
    debug!("geo worker stopped");
}
