//! # Task Management System
//!
//! [`AsyncLoadService`] runs [`Task`]s through a fixed three-stage pipeline:
//!
//! ```text
//! owning thread          load worker           post-process worker     owning thread
//! submit() --queue--> task.load(&mut W) --queue--> task.post_process() --queue--> drain_completed()
//!                                                                                  task.complete(&mut C)
//! ```
//!
//! ## Architecture Overview
//! - Each stage is a single thread, so jobs leave every stage in the order they
//!   entered it and the whole pipeline is FIFO
//! - The load worker owns a value of type `W` for the lifetime of the service; the
//!   mesh service keeps its scratch mesh builder there
//! - Completion is the only stage with access to the context `C`, and it only ever
//!   runs on the thread that constructed the service
//! - The in-flight key set lives on the owning thread; a second submit for a key
//!   that is still in flight is rejected
//!
//! ## Shutdown
//! Services are constructed and shut down explicitly. [`AsyncLoadService::shutdown`]
//! closes the submit queue, lets the workers finish what they already hold, and
//! joins them. Results that were never drained are dropped. Dropping the service
//! shuts it down as well.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut service = AsyncLoadService::new("loader", ())?;
//! service.submit(Box::new(MyTask::new(...)));
//!
//! // Once per frame, on the owning thread:
//! service.drain_completed(&mut context);
//! ```

pub mod task;

use std::{
    collections::HashSet,
    thread::{self, JoinHandle, ThreadId},
    time::Duration,
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, trace, warn};
use web_time::Instant;

use super::error::EngineError;
use task::{Task, TaskKey};

/// A job as it travels between the stages.
type BoxedTask<C, W> = Box<dyn Task<C, W> + Send>;

/// A load → post-process → complete pipeline with one worker per background stage.
///
/// # Type Parameters
/// - `C`: Completion context, passed to [`Task::complete`] on the owning thread
/// - `W`: Private state of the load worker
pub struct AsyncLoadService<C: 'static, W: Send + 'static = ()> {
    name: String,
    task_sender: Option<Sender<BoxedTask<C, W>>>,
    completed_receiver: Receiver<BoxedTask<C, W>>,
    in_flight: HashSet<TaskKey>,
    owner: ThreadId,
    workers: Vec<JoinHandle<()>>,
}

impl<C: 'static, W: Send + 'static> AsyncLoadService<C, W> {
    /// Starts the service's two worker threads.
    ///
    /// The calling thread becomes the owning thread: only it may drain completions.
    ///
    /// # Arguments
    /// * `name` - Used for the worker thread names and in log lines
    /// * `worker_state` - Moved into the load worker and lent to every `load()`
    ///
    /// # Errors
    /// [`EngineError::Spawn`] if a worker thread cannot be created.
    pub fn new(name: &str, worker_state: W) -> Result<Self, EngineError> {
        let (task_sender, task_receiver) = unbounded::<BoxedTask<C, W>>();
        let (loaded_sender, loaded_receiver) = unbounded::<BoxedTask<C, W>>();
        let (completed_sender, completed_receiver) = unbounded::<BoxedTask<C, W>>();

        let load_worker = spawn_worker(format!("{name}-load"), move || {
            let mut state = worker_state;
            while let Ok(mut task) = task_receiver.recv() {
                let started = Instant::now();
                task.load(&mut state);
                trace!("{} loaded in {:?}", task.key(), started.elapsed());
                if loaded_sender.send(task).is_err() {
                    break;
                }
            }
        })?;

        let post_process_worker = spawn_worker(format!("{name}-post"), move || {
            while let Ok(mut task) = loaded_receiver.recv() {
                task.post_process();
                if completed_sender.send(task).is_err() {
                    break;
                }
            }
        })?;

        info!("Started async service `{}`", name);

        Ok(Self {
            name: name.to_owned(),
            task_sender: Some(task_sender),
            completed_receiver,
            in_flight: HashSet::new(),
            owner: thread::current().id(),
            workers: vec![load_worker, post_process_worker],
        })
    }

    /// Queues a job.
    ///
    /// # Returns
    /// `false` if a job with the same key is still in flight, or the service has been
    /// shut down. The rejected job is dropped.
    pub fn submit(&mut self, task: BoxedTask<C, W>) -> bool {
        let key = task.key();
        if self.in_flight.contains(&key) {
            debug!("`{}` already has {} in flight", self.name, key);
            return false;
        }

        let Some(sender) = &self.task_sender else {
            warn!("`{}` is shut down, dropping {}", self.name, key);
            return false;
        };

        if sender.send(task).is_err() {
            error!("`{}` load worker is gone, dropping {}", self.name, key);
            return false;
        }

        self.in_flight.insert(key);
        true
    }

    /// Whether a job with `key` has been submitted and not yet completed.
    pub fn is_in_flight(&self, key: &TaskKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Runs `complete()` for every job that has finished post-processing.
    ///
    /// Never blocks. Must be called on the owning thread; elsewhere it does nothing.
    ///
    /// # Returns
    /// The number of jobs completed.
    pub fn drain_completed(&mut self, context: &mut C) -> usize {
        if !self.on_owner_thread() {
            return 0;
        }

        let mut drained = 0;
        while let Ok(task) = self.completed_receiver.try_recv() {
            self.complete(task, context);
            drained += 1;
        }
        drained
    }

    /// Blocks until every in-flight job has completed, or `timeout` passes.
    ///
    /// Intended for tests and shutdown paths, never for the frame loop.
    ///
    /// # Returns
    /// `true` if nothing is left in flight.
    pub fn flush(&mut self, context: &mut C, timeout: Duration) -> bool {
        if !self.on_owner_thread() {
            return false;
        }

        let deadline = Instant::now() + timeout;
        self.drain_completed(context);
        while !self.in_flight.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completed_receiver.recv_timeout(remaining) {
                Ok(task) => self.complete(task, context),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    error!("`{}` workers exited with jobs in flight", self.name);
                    return false;
                }
            }
        }
        true
    }

    /// Closes the submit queue and joins both workers.
    ///
    /// Jobs still queued are finished by the workers but never completed. Calling
    /// this twice is harmless.
    pub fn shutdown(&mut self) {
        if self.task_sender.take().is_none() {
            return;
        }

        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("unnamed").to_owned();
            if worker.join().is_err() {
                error!("Worker `{}` panicked", name);
            }
        }

        if !self.in_flight.is_empty() {
            debug!(
                "`{}` shut down with {} jobs never completed",
                self.name,
                self.in_flight.len()
            );
            self.in_flight.clear();
        }
        info!("Stopped async service `{}`", self.name);
    }

    fn complete(&mut self, task: BoxedTask<C, W>, context: &mut C) {
        self.in_flight.remove(&task.key());
        task.complete(context);
    }

    fn on_owner_thread(&self) -> bool {
        let current = thread::current().id();
        debug_assert_eq!(current, self.owner, "`{}` drained off its owning thread", self.name);
        if current != self.owner {
            error!("`{}` drained off its owning thread", self.name);
            return false;
        }
        true
    }
}

impl<C: 'static, W: Send + 'static> Drop for AsyncLoadService<C, W> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker<F>(name: String, body: F) -> Result<JoinHandle<()>, EngineError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|source| EngineError::Spawn { name, source })
}
