use std::sync::Arc;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use log::{debug, error};

/// A basic thread pool with a constant number of named threads.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

/// A job for a thread pool. The job may run on any thread, and will only be run once.
type Job = Box<dyn FnOnce() + Send + 'static>;

/// A message to a thread.
enum Message {
    /// A new job to run.
    NewJob(Job),
    /// Message to tell the thread to return.
    Terminate,
}

impl ThreadPool {
    /// Creates a new thread pool with the given number of threads. Thread names are the given
    /// name followed by the index of the thread.
    pub fn new(size: usize, name: &str) -> std::io::Result<ThreadPool> {
        if size == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "thread pool needs at least one thread"));
        }

        let (sender, receiver) = mpsc::channel();

        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| new_worker(format!("{}-{}", name, id), Arc::clone(&receiver)))
            .collect::<std::io::Result<Vec<Worker>>>()?;

        Ok(ThreadPool { workers, sender })
    }

    /// Executes the given closure on a thread.
    pub fn execute<F>(&self, f: F)
        where
            F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Message::NewJob(Box::new(f))).is_err() {
            error!("All worker threads have stopped, dropping job");
        }
    }
}

impl Drop for ThreadPool {
    /// Sends the termination message to all threads in the thread pool and waits for them to return.
    fn drop(&mut self) {
        for _ in &self.workers {
            self.sender.send(Message::Terminate).unwrap_or_default();
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.take() {
                if thread.join().is_err() {
                    error!("Worker thread panicked");
                }
            }
        }
    }
}

/// A worker, represented by a join handler if the thread is still running, or None.
type Worker = Option<thread::JoinHandle<()>>;

/// Creates a new worker with the given receiver end of an mpsc channel.
/// The worker will run until a Terminate message is sent to it through the channel.
fn new_worker(name: String, receiver: Arc<Mutex<mpsc::Receiver<Message>>>) -> std::io::Result<Worker> {
    let thread = thread::Builder::new().name(name).spawn(move || {
        debug!("Worker started");
        loop {
            let message = match receiver.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => break
            };

            match message {
                Ok(Message::NewJob(job)) => job(),
                Ok(Message::Terminate) | Err(_) => break
            }
        }
        debug!("Worker stopped");
    })?;

    Ok(Some(thread))
}
