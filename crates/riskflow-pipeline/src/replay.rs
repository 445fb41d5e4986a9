//! JSONL event replay
//!
//! Feeds a transactions file into the raw-event channel, optionally rate
//! limited. Stands in for the external transport's producer side.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Replay a JSONL file of events into the channel. Returns the number of
/// events published. Blank lines are skipped; unparseable lines are passed
/// through untouched so the worker's input-error accounting sees them.
pub async fn replay_file(
    path: &Path,
    tx: &mpsc::UnboundedSender<serde_json::Value>,
    rate: f64,
) -> anyhow::Result<u64> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let delay = if rate > 0.0 {
        Some(Duration::from_secs_f64(1.0 / rate))
    } else {
        None
    };

    let mut sent = 0u64;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                // Forward malformed lines as raw strings; the worker counts
                // them as input errors instead of the replayer hiding them.
                warn!(error = %err, "forwarding unparseable event line");
                serde_json::Value::String(line.to_string())
            }
        };
        if tx.send(value).is_err() {
            warn!("event channel closed mid-replay");
            break;
        }
        sent += 1;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
    info!(sent, "replay finished");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_replays_lines_skipping_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"txn_id":"t1"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"txn_id":"t2"}}"#).unwrap();
        file.flush().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sent = replay_file(file.path(), &tx, 0.0).await.unwrap();
        assert_eq!(sent, 2);
        assert_eq!(rx.recv().await.unwrap()["txn_id"], "t1");
        assert_eq!(rx.recv().await.unwrap()["txn_id"], "t2");
    }

    #[tokio::test]
    async fn test_bad_lines_forwarded_as_strings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json at all").unwrap();
        file.flush().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        replay_file(file.path(), &tx, 0.0).await.unwrap();
        assert!(rx.recv().await.unwrap().is_string());
    }
}
