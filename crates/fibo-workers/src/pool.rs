//! Fixed-size pool of generator workers.
//!
//! Workers share one cache and pull ordinals from a bounded input queue,
//! pushing `Computed` results onto a bounded output queue. Shutdown is a
//! handshake: `close` sends one termination signal per worker and waits for
//! one acknowledgment per worker on a queue sized exactly to the worker
//! count.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, info, warn};

use fibo_core::constants::QUEUE_SLOTS_PER_WORKER;
use fibo_core::{ComputeObserver, FiboError, Generator, Memoizer, NoOpObserver, Number};

/// A result tagged with the ordinal that produced it.
///
/// With more than one worker, results leave the pool in completion order,
/// so the ordinal is the only reliable way to pair them with requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Computed {
    pub ordinal: u64,
    pub value: Number,
}

/// Channel ends handed to one worker thread.
struct WorkerQueues {
    input: Receiver<u64>,
    output: Sender<Computed>,
    quit: Receiver<()>,
    done: Sender<()>,
}

/// Sends the termination acknowledgment when dropped, so a worker
/// acknowledges on every exit path, unwinding included.
struct AckOnExit(Sender<()>);

impl Drop for AckOnExit {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}

/// A fixed set of worker threads sharing one cache.
///
/// The pool starts stopped. `start` and `close` move it between the two
/// states; calling either in the wrong state is an error.
pub struct GeneratorPool {
    generator: Generator,
    workers: usize,
    input: (Sender<u64>, Receiver<u64>),
    output: (Sender<Computed>, Receiver<Computed>),
    quit: (Sender<()>, Receiver<()>),
    done: (Sender<()>, Receiver<()>),
    handles: Vec<JoinHandle<()>>,
    running: bool,
}

impl GeneratorPool {
    /// Create a stopped pool of `workers` workers over `cache`.
    pub fn new(cache: Arc<dyn Memoizer>, workers: usize) -> Result<Self, FiboError> {
        Self::with_observer(cache, Arc::new(NoOpObserver::new()), workers)
    }

    /// Create a stopped pool whose workers report cache traffic to `observer`.
    pub fn with_observer(
        cache: Arc<dyn Memoizer>,
        observer: Arc<dyn ComputeObserver>,
        workers: usize,
    ) -> Result<Self, FiboError> {
        if workers == 0 {
            return Err(FiboError::InvalidArgument(
                "worker pool needs at least one worker".into(),
            ));
        }

        let capacity = workers * QUEUE_SLOTS_PER_WORKER;
        Ok(Self {
            generator: Generator::with_observer(cache, observer),
            workers,
            input: bounded(capacity),
            output: bounded(capacity),
            quit: bounded(workers),
            // Must exactly match the number of workers.
            done: bounded(workers),
            handles: Vec::with_capacity(workers),
            running: false,
        })
    }

    /// Number of workers launched by `start`.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The job input and result output queues.
    ///
    /// Both are bounded: sending blocks while the input is full and workers
    /// block while the output is full.
    #[must_use]
    pub fn io(&self) -> (Sender<u64>, Receiver<Computed>) {
        (self.input.0.clone(), self.output.1.clone())
    }

    /// Launch the workers.
    pub fn start(&mut self) -> Result<(), FiboError> {
        if self.running {
            return Err(FiboError::AlreadyRunning);
        }

        for id in 0..self.workers {
            let generator = self.generator.clone();
            let queues = WorkerQueues {
                input: self.input.1.clone(),
                output: self.output.0.clone(),
                quit: self.quit.1.clone(),
                done: self.done.0.clone(),
            };
            let spawned = thread::Builder::new()
                .name(format!("fibo-worker-{id}"))
                .spawn(move || run_worker(id, &generator, queues));
            match spawned {
                Ok(handle) => self.handles.push(handle),
                Err(err) => {
                    let started = self.handles.len();
                    self.shutdown(started);
                    return Err(FiboError::Spawn(err));
                }
            }
        }

        self.running = true;
        info!(
            workers = self.workers,
            cache = self.generator.cache().name(),
            "Worker pool started"
        );
        Ok(())
    }

    /// Stop every worker and wait until all of them have exited.
    ///
    /// Jobs still queued on the input stay there for the next `start`.
    pub fn close(&mut self) -> Result<(), FiboError> {
        if !self.running {
            return Err(FiboError::NotRunning);
        }
        self.shutdown(self.workers);
        self.running = false;
        info!(workers = self.workers, "Worker pool stopped");
        Ok(())
    }

    /// Clear the shared cache with no worker mid-computation.
    ///
    /// A running pool is stopped first and restarted afterwards; a stopped
    /// pool stays stopped.
    pub fn clear_cache(&mut self) -> Result<(), FiboError> {
        let was_running = self.running;
        if was_running {
            self.close()?;
        }
        let cleared = self.generator.clear_cache();
        if was_running {
            self.start()?;
        }
        cleared
    }

    /// Queue one ordinal, blocking while the input queue is full.
    pub fn submit(&self, ordinal: u64) -> Result<(), FiboError> {
        if !self.running {
            return Err(FiboError::NotRunning);
        }
        self.input
            .0
            .send(ordinal)
            .map_err(|_| FiboError::NotRunning)
    }

    /// Take the next result.
    ///
    /// Blocks while the pool is running; on a stopped pool only results
    /// already queued are returned.
    pub fn recv(&self) -> Result<Computed, FiboError> {
        if self.running {
            self.output.1.recv().map_err(|_| FiboError::NotRunning)
        } else {
            self.output.1.try_recv().map_err(|_| FiboError::NotRunning)
        }
    }

    /// Compute every ordinal in `ordinals` through the pool.
    ///
    /// Results come back in completion order, one per requested ordinal.
    /// Results left on the output queue by earlier work are discarded.
    /// Assumes no other consumer is reading the output queue at the same
    /// time.
    ///
    /// Fails with `WorkerLost` if a worker exits mid-batch, since the job it
    /// held will never produce a result.
    pub fn compute_all(&self, ordinals: &[u64]) -> Result<Vec<Computed>, FiboError> {
        self.compute_all_with(ordinals, |_| {})
    }

    /// Like `compute_all`, calling `on_result` as each result arrives.
    pub fn compute_all_with(
        &self,
        ordinals: &[u64],
        mut on_result: impl FnMut(&Computed),
    ) -> Result<Vec<Computed>, FiboError> {
        if !self.running {
            return Err(FiboError::NotRunning);
        }

        let mut pending: HashMap<u64, usize> = HashMap::new();
        for &ordinal in ordinals {
            *pending.entry(ordinal).or_default() += 1;
        }

        let input = self.input.0.clone();
        let (stop_tx, stop_rx) = bounded::<()>(0);
        thread::scope(|scope| {
            // Feed from a separate thread: with both queues bounded, sending
            // everything before receiving would stall once both fill up.
            scope.spawn(move || {
                for &ordinal in ordinals {
                    select! {
                        send(input, ordinal) -> sent => {
                            if sent.is_err() {
                                break;
                            }
                        }
                        // Disconnected once the receiving side gives up.
                        recv(stop_rx) -> _ => break,
                    }
                }
            });

            let collected = self.collect(&mut pending, ordinals.len(), &mut on_result);
            drop(stop_tx);
            collected
        })
    }

    /// Receive until every ordinal in `pending` has a result.
    fn collect(
        &self,
        pending: &mut HashMap<u64, usize>,
        expected: usize,
        on_result: &mut impl FnMut(&Computed),
    ) -> Result<Vec<Computed>, FiboError> {
        let mut results = Vec::with_capacity(expected);
        while results.len() < expected {
            select! {
                recv(self.output.1) -> msg => {
                    let computed = msg.map_err(|_| FiboError::NotRunning)?;
                    accept(pending, computed, &mut results, on_result);
                }
                recv(self.done.1) -> _ => {
                    // Put the acknowledgment back for `close`; the queue
                    // has room for one per worker.
                    let _ = self.done.0.try_send(());
                    while let Ok(computed) = self.output.1.try_recv() {
                        accept(pending, computed, &mut results, on_result);
                    }
                    if results.len() < expected {
                        warn!(
                            missing = expected - results.len(),
                            "Worker exited during batch"
                        );
                        return Err(FiboError::WorkerLost);
                    }
                }
            }
        }
        Ok(results)
    }

    /// Signal `count` workers to quit, wait for their acknowledgments and
    /// join every handle.
    fn shutdown(&mut self, count: usize) {
        for _ in 0..count {
            if self.quit.0.send(()).is_err() {
                break;
            }
        }
        for _ in 0..count {
            if self.done.1.recv().is_err() {
                break;
            }
        }
        // A worker that died early acknowledged without consuming its quit
        // signal; discard it so it cannot stop the next generation.
        while self.quit.1.try_recv().is_ok() {}

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Worker thread panicked");
            }
        }
    }
}

impl Drop for GeneratorPool {
    fn drop(&mut self) {
        if self.running {
            let _ = self.close();
        }
    }
}

/// Keep `computed` if its ordinal is still awaited, otherwise drop it as
/// left over from earlier work.
fn accept(
    pending: &mut HashMap<u64, usize>,
    computed: Computed,
    results: &mut Vec<Computed>,
    on_result: &mut impl FnMut(&Computed),
) {
    match pending.get_mut(&computed.ordinal) {
        Some(count) if *count > 0 => {
            *count -= 1;
            on_result(&computed);
            results.push(computed);
        }
        _ => debug!(ordinal = computed.ordinal, "Discarding stale result"),
    }
}

fn run_worker(id: usize, generator: &Generator, queues: WorkerQueues) {
    let _ack = AckOnExit(queues.done);
    debug!(worker = id, "Worker started");

    loop {
        select! {
            recv(queues.input) -> msg => {
                let Ok(ordinal) = msg else { break };
                let computed = Computed {
                    ordinal,
                    value: generator.compute(ordinal),
                };
                // Stay responsive to shutdown while blocked on a full output.
                select! {
                    send(queues.output, computed) -> sent => {
                        if sent.is_err() {
                            break;
                        }
                    }
                    recv(queues.quit) -> _ => {
                        debug!(worker = id, ordinal, "Dropping result on shutdown");
                        break;
                    }
                }
            }
            recv(queues.quit) -> _ => break,
        }
    }

    debug!(worker = id, "Worker stopped");
}
