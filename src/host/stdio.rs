//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages from stdin,
//! dispatches them through the `HostCommandServer` router, and writes
//! `ResponseEnvelope` and `EventEnvelope` messages as newline-delimited
//! JSON to stdout.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use crate::app::App;
use crate::error::{ClientError, Result};
use crate::host::channel::{HostCommandClient, command_channel};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Default request channel capacity for the stdio bridge.
const REQUEST_CAPACITY: usize = 64;

/// Default event broadcast channel capacity for the stdio bridge.
const EVENT_CAPACITY: usize = 128;

type SharedWriter<W> = Arc<Mutex<BufWriter<W>>>;

/// Run the bridge on the process's stdin/stdout until stdin closes or a
/// `runtime.stop` command is received.
pub async fn run_stdio_bridge(app: Arc<App>) -> Result<()> {
    run_bridge(
        app,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Run the bridge over any line reader and writer.
///
/// Three concurrent tasks operate in parallel:
///
/// 1. **Reader** -- reads newline-delimited JSON, dispatches each
///    `CommandEnvelope` on its own task, and writes the resulting
///    `ResponseEnvelope` when it settles.
/// 2. **Event forwarder** -- writes broadcast `EventEnvelope` messages as
///    JSON lines.
/// 3. **Server** -- runs the `HostCommandServer` router loop.
///
/// In-flight commands are allowed to finish before the bridge returns.
pub async fn run_bridge<R, W>(app: Arc<App>, reader: R, writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (client, server) = command_channel(REQUEST_CAPACITY, EVENT_CAPACITY, app);
    let writer = Arc::new(Mutex::new(BufWriter::new(writer)));

    let server_handle = tokio::spawn(server.run());

    let event_writer = Arc::clone(&writer);
    let mut event_rx = client.subscribe_events();
    let event_handle = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event_envelope) => match serde_json::to_string(&event_envelope) {
                    Ok(json) => {
                        let mut w = event_writer.lock().await;
                        if let Err(e) = write_line(&mut w, &json).await {
                            tracing::warn!(
                                error = %e,
                                "failed to write event envelope; stopping event forwarder"
                            );
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize event envelope; skipping");
                    }
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event forwarder lagged; some events were dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    tracing::info!("event broadcast channel closed; stopping event forwarder");
                    break;
                }
            }
        }
    });

    // The reader owns the last client handle. Once it returns the server
    // drains, drops its event sender, and the forwarder sees `Closed`.
    let reader_result = run_reader(client, reader, Arc::clone(&writer)).await;
    let _ = server_handle.await;
    let _ = event_handle.await;

    reader_result
}

async fn run_reader<R, W>(client: HostCommandClient, mut reader: R, writer: SharedWriter<W>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut in_flight = JoinSet::new();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| ClientError::Channel(format!("failed to read command line: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, raw_line = %trimmed, "failed to parse command envelope");
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&writer, &response).await?;
                continue;
            }
        };

        if envelope.command == CommandName::RuntimeStop {
            let response = dispatch(&client, envelope).await;
            write_response(&writer, &response).await?;
            tracing::info!("runtime.stop received; shutting down bridge");
            break;
        }

        let client = client.clone();
        let writer = Arc::clone(&writer);
        in_flight.spawn(async move {
            let response = dispatch(&client, envelope).await;
            write_response(&writer, &response).await
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "failed to write response"),
            Err(e) => tracing::error!(error = %e, "command task panicked"),
        }
    }
    Ok(())
}

async fn dispatch(client: &HostCommandClient, envelope: CommandEnvelope) -> ResponseEnvelope {
    let request_id = envelope.request_id.clone();
    match client.send(envelope).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(error = %e, "host command dispatch failed");
            let id = if request_id.trim().is_empty() {
                "dispatch-error".to_owned()
            } else {
                request_id
            };
            ResponseEnvelope::error(id, format!("dispatch failed: {e}"))
        }
    }
}

async fn write_response<W>(writer: &SharedWriter<W>, response: &ResponseEnvelope) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)
        .map_err(|e| ClientError::Parse(format!("failed to serialize response envelope: {e}")))?;
    let mut w = writer.lock().await;
    write_line(&mut w, &json).await
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut BufWriter<W>, json: &str) -> Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| ClientError::Channel(format!("failed to write output: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| ClientError::Channel(format!("failed to write newline: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| ClientError::Channel(format!("failed to flush output: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::ClientConfig;
    use crate::host::contract::{EVENT_VERSION, EventEnvelope};
    use crate::storage::MemoryStore;
    use crate::test_utils::{MockApi, RecordingSpeech};
    use crate::theme::Theme;
    use serde_json::Value;

    fn app() -> Arc<App> {
        Arc::new(App::new(
            &ClientConfig::default(),
            Arc::new(MockApi::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingSpeech::default()),
            Theme::Light,
        ))
    }

    async fn run_lines(input: &str) -> Vec<Value> {
        let (out_tx, mut out_rx) = tokio::io::duplex(64 * 1024);
        let reader = BufReader::new(input.as_bytes());
        run_bridge(app(), reader, out_tx).await.unwrap();

        let mut raw = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut out_rx, &mut raw)
            .await
            .unwrap();
        raw.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
    }

    #[test]
    fn parse_error_response_is_well_formed() {
        let resp = ResponseEnvelope::error("parse-error", "bad json");
        assert!(!resp.ok);
        assert_eq!(resp.request_id, "parse-error");
        assert_eq!(resp.v, EVENT_VERSION);
        assert!(resp.error.is_some());
    }

    #[tokio::test]
    async fn garbage_line_gets_parse_error() {
        let lines = run_lines("not json\n").await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["request_id"], "parse-error");
        assert_eq!(lines[0]["ok"], false);
    }

    #[tokio::test]
    async fn ping_then_stop() {
        let input = concat!(
            r#"{"v":1,"request_id":"a","command":"host.ping","payload":{}}"#,
            "\n",
            r#"{"v":1,"request_id":"b","command":"runtime.stop","payload":{}}"#,
            "\n",
            r#"{"v":1,"request_id":"c","command":"host.ping","payload":{}}"#,
            "\n",
        );
        let lines = run_lines(input).await;
        let ids: Vec<_> = lines
            .iter()
            .filter_map(|l| l.get("request_id").and_then(Value::as_str))
            .collect();
        assert!(ids.contains(&"a"));
        assert!(ids.contains(&"b"));
        assert!(!ids.contains(&"c"), "commands after stop are not read");
    }

    #[tokio::test]
    async fn tab_switch_emits_event_line() {
        let input = concat!(
            r#"{"v":1,"request_id":"t","command":"tab.switch","payload":{"tab_id":"resources"}}"#,
            "\n",
        );
        let lines = run_lines(input).await;
        let events: Vec<EventEnvelope> = lines
            .iter()
            .filter(|l| l.get("event").is_some())
            .map(|l| serde_json::from_value(l.clone()).unwrap())
            .collect();
        assert!(
            events
                .iter()
                .any(|e| e.event == "tab.changed" && e.payload["tab_id"] == "resources")
        );
    }
}
