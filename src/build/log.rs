//! Ordered progress channel.
//!
//! Compile tasks run on many threads at once, and each wants to report
//! progress without tearing lines. They all enqueue into one unbounded
//! channel drained by a single consumer thread, which owns the output sink.
//!
//! Shutdown is an explicit handshake owned by the driver. Once every producer
//! task has joined, [`LogChannel::shutdown`] enqueues a single sentinel and
//! joins the consumer, so nothing queued before it is lost.

use colored::*;
use std::fmt;
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{}", tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub text: String,
    pub severity: Severity,
}

impl LogMessage {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

enum LogEvent {
    Message(LogMessage),
    Shutdown,
}

/// Where the consumer thread delivers messages
pub trait LogSink {
    fn emit(&mut self, message: &LogMessage);
}

/// Colored `[LEVEL] text` lines, on stdout unless given another writer.
///
/// Write errors are dropped. A closed pipe (`bmx build | head`) must not take
/// the consumer thread down with messages still queued.
#[derive(Debug)]
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> LogSink for ConsoleSink<W> {
    fn emit(&mut self, message: &LogMessage) {
        let tag = format!("[{}]", message.severity);
        let tag = match message.severity {
            Severity::Info => tag.blue(),
            Severity::Warning => tag.yellow(),
            Severity::Error => tag.red().bold(),
        };
        let _ = writeln!(self.out, "{} {}", tag, message.text);
    }
}

/// Keeps every message in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<LogMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.severity == severity)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&mut self, message: &LogMessage) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());
    }
}

/// Producer handle. Cheap to clone, safe to share across threads.
#[derive(Clone)]
pub struct LogSender {
    tx: Sender<LogEvent>,
}

impl LogSender {
    /// Never blocks. Messages sent after shutdown are dropped.
    pub fn enqueue(&self, message: LogMessage) {
        let _ = self.tx.send(LogEvent::Message(message));
    }

    pub fn info(&self, text: impl Into<String>) {
        self.enqueue(LogMessage::new(Severity::Info, text));
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.enqueue(LogMessage::new(Severity::Warning, text));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.enqueue(LogMessage::new(Severity::Error, text));
    }
}

/// Single-consumer, multi-producer log queue
pub struct LogChannel {
    tx: Sender<LogEvent>,
    consumer: Option<JoinHandle<usize>>,
}

impl LogChannel {
    /// Start the consumer thread draining into `sink`
    pub fn spawn<S>(sink: S) -> std::io::Result<Self>
    where
        S: LogSink + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let consumer = thread::Builder::new()
            .name("bmx-log".to_string())
            .spawn(move || consume(rx, sink))?;
        Ok(Self {
            tx,
            consumer: Some(consumer),
        })
    }

    pub fn sender(&self) -> LogSender {
        LogSender {
            tx: self.tx.clone(),
        }
    }

    /// Send the sentinel and wait for the consumer to drain.
    ///
    /// Call only after every producer has finished. Returns how many messages
    /// were delivered to the sink.
    pub fn shutdown(mut self) -> thread::Result<usize> {
        self.finish().unwrap_or(Ok(0))
    }

    fn finish(&mut self) -> Option<thread::Result<usize>> {
        let consumer = self.consumer.take()?;
        let _ = self.tx.send(LogEvent::Shutdown);
        Some(consumer.join())
    }
}

impl Drop for LogChannel {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

fn consume<S: LogSink>(rx: Receiver<LogEvent>, mut sink: S) -> usize {
    let mut delivered = 0;
    while let Ok(event) = rx.recv() {
        match event {
            LogEvent::Message(message) => {
                sink.emit(&message);
                delivered += 1;
            }
            LogEvent::Shutdown => break,
        }
    }
    delivered
}
