use super::queue::BoundedQueue;
use super::{DropPolicy, LogEvent, LogFields, LogLevel, Logger};

use serde::Serialize;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

/// Configuration for [`AsyncJsonLogger`].
#[derive(Debug, Clone)]
pub struct AsyncJsonLoggerOptions {
    pub level: LogLevel,
    pub queue_size: usize,
    pub drop_policy: DropPolicy,
    pub output_path: PathBuf,
}

impl Default for AsyncJsonLoggerOptions {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            queue_size: 10_000,
            drop_policy: DropPolicy::DropOldest,
            output_path: PathBuf::from("logs/kalshi.log.json"),
        }
    }
}

struct Shared {
    queue: Mutex<BoundedQueue>,
    cv: Condvar,
    stop: AtomicBool,
    dropped: AtomicU64,
    level: LogLevel,
}

/// Async JSON-lines file logger with a bounded queue.
///
/// Enqueueing holds the queue mutex only long enough to push one event; a
/// dedicated writer thread swaps the queue contents into a local batch and
/// serializes outside the lock. Dropping the logger stops the writer, joins
/// it, and drains any remaining queued events.
pub struct AsyncJsonLogger {
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl AsyncJsonLogger {
    /// Open the output and start the background writer thread.
    ///
    /// Parent directories are created as needed. If the file cannot be
    /// opened, lines go to standard error instead.
    pub fn new(options: AsyncJsonLoggerOptions) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(BoundedQueue::new(options.queue_size, options.drop_policy)),
            cv: Condvar::new(),
            stop: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            level: options.level,
        });

        let out = open_output(&options.output_path);
        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || run_writer(&worker_shared, out));

        Self {
            shared,
            worker: Some(worker),
        }
    }
}

impl Logger for AsyncJsonLogger {
    fn log_event(&self, mut event: LogEvent) {
        if event.level < self.shared.level {
            return;
        }
        if event.ts_ms == 0 {
            event.ts_ms = now_ms();
        }

        let dropped = lock(&self.shared.queue).push(event);
        if dropped {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.shared.cv.notify_one();
    }

    fn level(&self) -> LogLevel {
        self.shared.level
    }
}

impl Drop for AsyncJsonLogger {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        self.shared.cv.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_writer(shared: &Shared, mut out: Box<dyn Write + Send>) {
    loop {
        let batch = {
            let mut queue = lock(&shared.queue);
            while !shared.stop.load(Ordering::Relaxed) && queue.is_empty() {
                queue = wait(&shared.cv, queue);
            }
            if shared.stop.load(Ordering::Relaxed) && queue.is_empty() {
                break;
            }
            queue.take_batch()
        };

        write_batch(&mut out, &batch);

        let dropped = shared.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            write_dropped_summary(&mut out, dropped);
        }

        let _ = out.flush();
    }

    // Drain anything enqueued between the last batch and the stop signal.
    let remaining = lock(&shared.queue).take_batch();
    write_batch(&mut out, &remaining);
    let _ = out.flush();
}

fn write_batch(out: &mut dyn Write, batch: &VecDeque<LogEvent>) {
    for event in batch {
        write_event(out, event);
    }
}

#[derive(Serialize)]
struct LogLine<'a> {
    ts_ms: u64,
    level: &'a str,
    component: &'a str,
    msg: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a LogFields>,

    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<&'a str>,
}

fn write_event(out: &mut dyn Write, event: &LogEvent) {
    let line = LogLine {
        ts_ms: event.ts_ms,
        level: event.level.as_str(),
        component: &event.component,
        msg: &event.message,
        fields: (!event.fields.is_empty()).then_some(&event.fields),
        raw: event.raw.as_deref(),
    };
    // Write failures are intentionally not propagated.
    if let Ok(json) = serde_json::to_string(&line) {
        let _ = writeln!(out, "{json}");
    }
}

fn write_dropped_summary(out: &mut dyn Write, dropped: u64) {
    let mut fields = LogFields::new();
    fields.add_uint("dropped", dropped);
    write_event(
        out,
        &LogEvent {
            ts_ms: now_ms(),
            level: LogLevel::Warn,
            component: "logging".to_string(),
            message: "dropped_logs".to_string(),
            fields,
            raw: None,
        },
    );
}

fn open_output(path: &Path) -> Box<dyn Write + Send> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(io::stderr()),
    }
}

fn lock<'a>(queue: &'a Mutex<BoundedQueue>) -> MutexGuard<'a, BoundedQueue> {
    match queue.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn wait<'a>(cv: &Condvar, guard: MutexGuard<'a, BoundedQueue>) -> MutexGuard<'a, BoundedQueue> {
    match cv.wait(guard) {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
