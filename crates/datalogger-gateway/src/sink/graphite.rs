//! Graphite carbon client over the plaintext protocol (TCP).
//!
//! One long-lived connection shared by all requests. It is opened lazily and
//! dropped after any failed write so the next write reconnects. After a failed
//! connect, writes fail fast until the reconnect back-off has passed. No
//! retries.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration, Instant};

use datalogger_core::error::{DataLoggerError, Result};
use datalogger_core::protocol::plaintext::encode_lines;

use super::TimeSeriesSink;

pub struct GraphiteClient {
    addr: String,
    connect_timeout: Duration,
    write_timeout: Duration,
    reconnect_backoff: Duration,
    conn: Mutex<Conn>,
}

#[derive(Default)]
struct Conn {
    stream: Option<TcpStream>,
    /// Earliest instant for the next connect attempt.
    retry_at: Option<Instant>,
}

/// `plaintext://host:port/` -> `host:port`.
pub fn parse_plaintext_url(url: &str) -> Result<String> {
    let rest = url.strip_prefix("plaintext://").ok_or_else(|| {
        DataLoggerError::Config(format!("unsupported sink url: {url} (expected plaintext://host:port/)"))
    })?;
    let addr = rest.trim_end_matches('/');
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| DataLoggerError::Config(format!("sink url is missing a port: {url}")))?;
    if host.is_empty() || addr.contains('/') {
        return Err(DataLoggerError::Config(format!("invalid sink url: {url}")));
    }
    port.parse::<u16>()
        .map_err(|_| DataLoggerError::Config(format!("invalid sink port: {port}")))?;
    Ok(addr.to_string())
}

impl GraphiteClient {
    pub fn from_url(
        url: &str,
        connect_timeout: Duration,
        write_timeout: Duration,
        reconnect_backoff: Duration,
    ) -> Result<Self> {
        Ok(Self {
            addr: parse_plaintext_url(url)?,
            connect_timeout,
            write_timeout,
            reconnect_backoff,
            conn: Mutex::new(Conn::default()),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn connect(&self) -> Result<TcpStream> {
        match timeout(self.connect_timeout, TcpStream::connect(self.addr.as_str())).await {
            Ok(Ok(stream)) => {
                tracing::debug!(addr = %self.addr, "graphite connected");
                Ok(stream)
            }
            Ok(Err(e)) => Err(DataLoggerError::Sink(format!("connect {} failed: {e}", self.addr))),
            Err(_) => Err(DataLoggerError::Sink(format!("connect {} timed out", self.addr))),
        }
    }
}

#[async_trait]
impl TimeSeriesSink for GraphiteClient {
    async fn write(&self, metrics: &BTreeMap<String, f64>, timestamp_ms: f64) -> Result<()> {
        let lines = encode_lines(metrics, timestamp_ms)?;

        let mut conn = self.conn.lock().await;
        if conn.stream.is_none() {
            if conn.retry_at.is_some_and(|at| Instant::now() < at) {
                return Err(DataLoggerError::Sink(format!(
                    "{} unavailable, backing off",
                    self.addr
                )));
            }
            match self.connect().await {
                Ok(stream) => {
                    conn.stream = Some(stream);
                    conn.retry_at = None;
                }
                Err(e) => {
                    conn.retry_at = Some(Instant::now() + self.reconnect_backoff);
                    return Err(e);
                }
            }
        }
        let Some(stream) = conn.stream.as_mut() else {
            return Err(DataLoggerError::Internal("graphite connection missing".into()));
        };

        let res = match timeout(self.write_timeout, stream.write_all(&lines)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DataLoggerError::Sink(format!("write to {} failed: {e}", self.addr))),
            Err(_) => Err(DataLoggerError::Sink(format!("write to {} timed out", self.addr))),
        };
        if res.is_err() {
            conn.stream = None;
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn parses_default_url() {
        assert_eq!(parse_plaintext_url("plaintext://localhost:2003/").unwrap(), "localhost:2003");
        assert_eq!(parse_plaintext_url("plaintext://10.0.0.5:2003").unwrap(), "10.0.0.5:2003");
    }

    #[test]
    fn rejects_other_schemes_and_missing_port() {
        assert!(parse_plaintext_url("udp://localhost:2003/").is_err());
        assert!(parse_plaintext_url("plaintext://localhost/").is_err());
        assert!(parse_plaintext_url("plaintext://localhost:x/").is_err());
    }

    #[tokio::test]
    async fn writes_carbon_lines_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = String::new();
            sock.read_to_string(&mut buf).await.unwrap();
            buf
        });

        let client = GraphiteClient::from_url(
            &format!("plaintext://{addr}/"),
            Duration::from_secs(1),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        let m = BTreeMap::from([("system.health.status".to_string(), 1.0)]);
        client.write(&m, 1_454_321_000_500.0).await.unwrap();
        drop(client);

        assert_eq!(server.await.unwrap(), "system.health.status 1 1454321000\n");
    }

    #[tokio::test]
    async fn connect_failure_is_sink_error() {
        // bind then drop to get a port nothing listens on
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let client = GraphiteClient::from_url(
            &format!("plaintext://{addr}/"),
            Duration::from_millis(500),
            Duration::from_millis(500),
            Duration::from_secs(60),
        )
        .unwrap();
        let m = BTreeMap::from([("cpu.load".to_string(), 5.0)]);
        let err = client.write(&m, 0.0).await.unwrap_err();
        assert_eq!(err.client_code().as_str(), "SINK_FAILED");

        // within the back-off window no connect is attempted
        let err = client.write(&m, 0.0).await.unwrap_err();
        assert!(err.to_string().contains("backing off"), "{err}");
    }
}
