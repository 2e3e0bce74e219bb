//! Multiplexed TCP transport.
//!
//! One connection is kept per endpoint authority. Requests are written as
//! newline-delimited [`StreamFrame`]s and answers are routed back to the
//! waiting caller by correlation id, so many calls share one socket.

use crate::directory::domain::{AgentEndpoint, EndpointScheme};
use crate::transport::domain::{A2aMessage, AgentCall, AgentReply, StreamFrame};
use crate::transport::ports::channel::decode_reply;
use crate::transport::ports::{TransportChannel, TransportError, TransportResult};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

/// Upper bound for a single frame on the wire.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

struct StreamConnection {
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl StreamConnection {
    async fn open(authority: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(authority).await?;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let reader = tokio::spawn(read_frames(
            FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_FRAME_BYTES)),
            Arc::clone(&pending),
            Arc::clone(&closed),
            authority.to_owned(),
        ));

        Ok(Self {
            writer: Mutex::new(FramedWrite::new(
                write_half,
                LinesCodec::new_with_max_length(MAX_FRAME_BYTES),
            )),
            pending,
            closed,
            reader,
        })
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for StreamConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_frames(
    mut frames: FramedRead<tokio::net::tcp::OwnedReadHalf, LinesCodec>,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    authority: String,
) {
    while let Some(next) = frames.next().await {
        let Ok(line) = next else {
            tracing::warn!(%authority, "stream read failed; closing connection");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<StreamFrame>(&line) {
            Ok(frame) => {
                if let Some(waiter) = pending.lock().await.remove(&frame.correlation_id) {
                    // The caller may have given up already.
                    drop(waiter.send(frame.message));
                }
            }
            Err(err) => {
                tracing::warn!(%authority, error = %err, "discarding unparseable stream frame");
            }
        }
    }
    closed.store(true, Ordering::Release);
    // Dropping the senders wakes every waiter with a closed-channel error.
    pending.lock().await.clear();
}

/// Removes the pending entry when the caller stops waiting.
struct PendingSlot {
    id: u64,
    pending: PendingMap,
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        let pending = Arc::clone(&self.pending);
        let id = self.id;
        if let Ok(mut map) = pending.try_lock() {
            map.remove(&id);
        } else if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                pending.lock().await.remove(&id);
            });
        }
    }
}

/// Channel that multiplexes calls over one TCP connection per endpoint.
#[derive(Default)]
pub struct MultiplexedStreamChannel {
    connections: Mutex<HashMap<String, Arc<StreamConnection>>>,
    next_id: AtomicU64,
}

impl MultiplexedStreamChannel {
    /// Creates a channel with no open connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached connections that are still open.
    pub async fn open_connections(&self) -> usize {
        self.connections
            .lock()
            .await
            .values()
            .filter(|connection| !connection.is_closed())
            .count()
    }

    async fn connection_for(
        &self,
        endpoint: &AgentEndpoint,
    ) -> TransportResult<Arc<StreamConnection>> {
        if let Some(open) = self.cached(endpoint).await {
            return Ok(open);
        }

        // The map stays unlocked while connecting.
        let fresh = StreamConnection::open(endpoint.authority())
            .await
            .map(Arc::new)
            .map_err(|err| TransportError::not_available(endpoint, err))?;

        let mut connections = self.connections.lock().await;
        if let Some(winner) = connections
            .get(endpoint.authority())
            .filter(|cached| !cached.is_closed())
        {
            return Ok(Arc::clone(winner));
        }
        connections.insert(endpoint.authority().to_owned(), Arc::clone(&fresh));
        Ok(fresh)
    }

    async fn cached(&self, endpoint: &AgentEndpoint) -> Option<Arc<StreamConnection>> {
        let mut connections = self.connections.lock().await;
        let existing = connections.get(endpoint.authority())?;
        if !existing.is_closed() {
            return Some(Arc::clone(existing));
        }
        tracing::debug!(authority = endpoint.authority(), "evicting closed stream");
        connections.remove(endpoint.authority());
        None
    }

    async fn evict(&self, endpoint: &AgentEndpoint, connection: &Arc<StreamConnection>) {
        connection.closed.store(true, Ordering::Release);
        let mut connections = self.connections.lock().await;
        if connections
            .get(endpoint.authority())
            .is_some_and(|cached| Arc::ptr_eq(cached, connection))
        {
            connections.remove(endpoint.authority());
        }
    }

    async fn round_trip(&self, endpoint: &AgentEndpoint, call: &AgentCall) -> TransportResult<Value> {
        let connection = self.connection_for(endpoint).await?;
        let correlation_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = StreamFrame {
            correlation_id,
            message: serde_json::to_value(A2aMessage::request(call))
                .map_err(|err| TransportError::malformed(endpoint, err))?,
        };
        let line =
            serde_json::to_string(&frame).map_err(|err| TransportError::malformed(endpoint, err))?;

        let (sender, receiver) = oneshot::channel();
        connection.pending.lock().await.insert(correlation_id, sender);
        let _slot = PendingSlot {
            id: correlation_id,
            pending: Arc::clone(&connection.pending),
        };
        // The reader marks the stream closed before it drains the pending map.
        if connection.is_closed() {
            self.evict(endpoint, &connection).await;
            return Err(TransportError::not_available(endpoint, "stream closed"));
        }

        let sent = connection.writer.lock().await.send(line).await;
        if let Err(err) = sent {
            self.evict(endpoint, &connection).await;
            return Err(TransportError::not_available(endpoint, err));
        }

        match receiver.await {
            Ok(message) => Ok(message),
            Err(_) => {
                self.evict(endpoint, &connection).await;
                Err(TransportError::not_available(
                    endpoint,
                    "stream closed before the answer arrived",
                ))
            }
        }
    }
}

#[async_trait]
impl TransportChannel for MultiplexedStreamChannel {
    async fn invoke(
        &self,
        endpoint: &AgentEndpoint,
        call: &AgentCall,
        timeout: Duration,
    ) -> TransportResult<AgentReply> {
        if endpoint.scheme() != EndpointScheme::Tcp {
            return Err(TransportError::not_available(
                endpoint,
                "multiplexed transport requires a tcp:// endpoint",
            ));
        }

        let raw = tokio::time::timeout(timeout, self.round_trip(endpoint, call))
            .await
            .map_err(|_| TransportError::timeout(endpoint, timeout))??;
        decode_reply(endpoint, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::domain::CapabilityTag;
    use serde_json::json;
    use tokio::net::TcpListener;

    fn call(message: &str) -> AgentCall {
        AgentCall::message(CapabilityTag::new("stop_info").expect("valid tag"), message)
    }

    /// Echo agent answering frames in reverse arrival order.
    async fn spawn_reversing_agent(batch: usize) -> AgentEndpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            let (read_half, write_half) = socket.into_split();
            let mut frames = FramedRead::new(read_half, LinesCodec::new());
            let mut sink = FramedWrite::new(write_half, LinesCodec::new());
            let mut held = Vec::new();
            while let Some(Ok(line)) = frames.next().await {
                let frame: StreamFrame = serde_json::from_str(&line).expect("frame");
                held.push(frame);
                if held.len() == batch {
                    while let Some(frame) = held.pop() {
                        let message = frame.message.get("payload").cloned().unwrap_or_default();
                        let answer = StreamFrame {
                            correlation_id: frame.correlation_id,
                            message: json!({
                                "type": "response",
                                "payload": {"text": message.get("message").cloned().unwrap_or_default()},
                            }),
                        };
                        sink.send(serde_json::to_string(&answer).expect("encode"))
                            .await
                            .expect("send");
                    }
                }
            }
        });
        AgentEndpoint::parse(format!("tcp://{addr}")).expect("valid endpoint")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_calls_share_one_connection_and_are_demultiplexed() {
        let endpoint = spawn_reversing_agent(2).await;
        let channel = MultiplexedStreamChannel::new();
        let timeout = Duration::from_secs(2);

        let first_call = call("alewife");
        let second_call = call("braintree");
        let (first, second) = tokio::join!(
            channel.invoke(&endpoint, &first_call, timeout),
            channel.invoke(&endpoint, &second_call, timeout),
        );

        assert_eq!(first.expect("first").text(), Some("alewife"));
        assert_eq!(second.expect("second").text(), Some("braintree"));
        assert_eq!(channel.open_connections().await, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn silent_agent_times_out() {
        let endpoint = spawn_reversing_agent(usize::MAX).await;
        let channel = MultiplexedStreamChannel::new();

        let err = channel
            .invoke(&endpoint, &call("kendall"), Duration::from_millis(50))
            .await
            .expect_err("never answers");

        assert!(matches!(err, TransportError::Timeout { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn closed_stream_is_not_available_and_evicted() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            drop(socket);
        });
        let endpoint = AgentEndpoint::parse(format!("tcp://{addr}")).expect("valid endpoint");
        let channel = MultiplexedStreamChannel::new();

        let err = channel
            .invoke(&endpoint, &call("downtown crossing"), Duration::from_secs(2))
            .await
            .expect_err("peer hung up");

        assert!(matches!(err, TransportError::NotAvailable { .. }));
        assert_eq!(channel.open_connections().await, 0);
    }

    /// Listener whose accept queue is full, so new connects hang.
    async fn saturated_listener() -> (TcpListener, Vec<TcpStream>, AgentEndpoint) {
        let socket = tokio::net::TcpSocket::new_v4().expect("socket");
        socket.bind("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let listener = socket.listen(0).expect("listen");
        let addr = listener.local_addr().expect("addr");
        let mut fillers = Vec::new();
        for _ in 0..4 {
            if let Ok(Ok(stream)) =
                tokio::time::timeout(Duration::from_millis(100), TcpStream::connect(addr)).await
            {
                fillers.push(stream);
            }
        }
        let endpoint = AgentEndpoint::parse(format!("tcp://{addr}")).expect("valid endpoint");
        (listener, fillers, endpoint)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stalled_connect_does_not_delay_other_endpoints() {
        let (_listener, _fillers, stalled) = saturated_listener().await;
        let healthy = spawn_reversing_agent(1).await;
        let channel = Arc::new(MultiplexedStreamChannel::new());

        let blocked = Arc::clone(&channel);
        let stuck = tokio::spawn(async move {
            blocked
                .invoke(&stalled, &call("wonderland"), Duration::from_secs(3))
                .await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = std::time::Instant::now();
        let reply = channel
            .invoke(&healthy, &call("kenmore"), Duration::from_millis(800))
            .await
            .expect("healthy agent answers");

        assert_eq!(reply.text(), Some("kenmore"));
        assert!(started.elapsed() < Duration::from_millis(500));
        stuck.abort();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_endpoints_are_rejected() {
        let channel = MultiplexedStreamChannel::new();
        let endpoint = AgentEndpoint::parse("http://agent.local:8001").expect("valid endpoint");

        let err = channel
            .invoke(&endpoint, &call("harvard"), Duration::from_millis(50))
            .await
            .expect_err("wrong scheme");

        assert!(matches!(err, TransportError::NotAvailable { .. }));
    }
}
