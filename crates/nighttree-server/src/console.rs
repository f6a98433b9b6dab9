//! Operator console on stdin.
//!
//! Stdin is read on its own OS thread. A blocking read there cannot be
//! cancelled, and a tokio task holding it would keep the runtime alive after
//! shutdown.

use std::io::{BufRead, BufReader};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Forward console lines from stdin.
pub fn spawn(tx: mpsc::Sender<String>) {
    if let Err(e) = spawn_reader(BufReader::new(std::io::stdin()), tx) {
        warn!("Console unavailable: {e}");
    }
}

/// Forward trimmed, non-empty lines from `input` until it ends or the
/// receiver goes away.
fn spawn_reader<R>(input: R, tx: mpsc::Sender<String>) -> std::io::Result<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else { break };
                let line = line.trim();
                if !line.is_empty() && tx.blocking_send(line.to_string()).is_err() {
                    break;
                }
            }
            debug!("Console input closed");
        })
}
