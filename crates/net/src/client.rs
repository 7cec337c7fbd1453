//! TCP chat client: connection loop and outbound mailbox
//!
//! One spawned task exclusively owns the socket and alternates two
//! duties per iteration: a bounded wait for inbound data (at most one
//! frame read and displayed), then a drain of the single-slot outbound
//! mailbox (at most one frame sent). Callers never touch the socket;
//! the mailbox is the only shared state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};

/// Upper bound on each readability wait. Exists so the loop services
/// the outbound mailbox at a bounded cadence even when no inbound data
/// arrives; receive and send share one task.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created but not yet connected
    Unbound,
    /// Connected, loop running
    Connected,
    /// Loop exited; terminal, no reconnect
    Closed,
}

/// Handle to a chat connection.
///
/// `new` is pure configuration; `start` connects and spawns the
/// connection loop. [`submit_message`] and [`stop`] are non-blocking
/// and callable from any thread.
///
/// [`submit_message`]: ChatClient::submit_message
/// [`stop`]: ChatClient::stop
pub struct ChatClient {
    config: ClientConfig,
    state: Arc<RwLock<ConnectionState>>,
    running: Arc<AtomicBool>,
    /// Single-slot outbound mailbox. Overwritten on every submit
    /// (last-write-wins), taken once per occupied loop cycle.
    mailbox: Arc<Mutex<Option<String>>>,
    started: AtomicBool,
}

impl ChatClient {
    /// Create an unconnected client. No I/O happens here.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Unbound)),
            running: Arc::new(AtomicBool::new(true)),
            mailbox: Arc::new(Mutex::new(None)),
            started: AtomicBool::new(false),
        }
    }

    /// Connect to the configured server and spawn the connection loop.
    ///
    /// A connect failure is returned to the caller; there is no retry
    /// or backoff. Calling `start` a second time fails with
    /// [`Error::AlreadyStarted`].
    pub async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyStarted);
        }

        let addr = (self.config.host.as_str(), self.config.port);
        info!(host = %self.config.host, port = self.config.port, "Connecting to chat server");
        let stream = TcpStream::connect(addr).await?;

        *lock_write(&self.state) = ConnectionState::Connected;

        tokio::spawn(connection_task(
            stream,
            self.state.clone(),
            self.running.clone(),
            self.mailbox.clone(),
        ));

        Ok(())
    }

    /// Overwrite the outbound mailbox with `text`.
    ///
    /// Non-blocking. A second submit before the loop drains the first
    /// silently discards the earlier value; only the most recent value
    /// is ever sent. Once the loop has stopped this has no effect.
    pub fn submit_message(&self, text: impl Into<String>) {
        *lock(&self.mailbox) = Some(text.into());
    }

    /// Request shutdown. Idempotent; safe before `start` and safe to
    /// call repeatedly. The loop observes the flag at its next
    /// iteration boundary and closes the socket on exit.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Current connection state. Callers cannot observe *why* a
    /// connection ended, only that it did.
    pub fn state(&self) -> ConnectionState {
        *lock_read(&self.state)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn lock_read<T>(rwlock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(PoisonError::into_inner)
}

fn lock_write<T>(rwlock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(PoisonError::into_inner)
}

/// The connection loop. Sole owner of the socket for its lifetime;
/// drops it on exit.
async fn connection_task(
    mut stream: TcpStream,
    state: Arc<RwLock<ConnectionState>>,
    running: Arc<AtomicBool>,
    mailbox: Arc<Mutex<Option<String>>>,
) {
    while running.load(Ordering::SeqCst) {
        // Bounded wait for inbound data. On timeout, fall through to
        // mailbox service.
        match timeout(POLL_INTERVAL, stream.readable()).await {
            Ok(Ok(())) => {
                // No read timeout once a frame has begun; a stalled
                // peer mid-frame blocks the loop until data arrives or
                // the connection drops.
                match read_frame(&mut stream).await {
                    Ok(text) => println!("{text}"),
                    Err(Error::ConnectionClosed) => {
                        println!("Disconnected from chat server");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Read error");
                        break;
                    }
                }
            }
            Ok(Err(e)) => {
                // Retry only genuinely transient wait errors.
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
                ) {
                    debug!(error = %e, "Transient socket wait error, retrying");
                    continue;
                }
                error!(error = %e, "Socket wait failed");
                break;
            }
            Err(_elapsed) => {}
        }

        // Mailbox is cleared here whether or not the send succeeds; a
        // failed send loses the in-flight message.
        let pending = lock(&mailbox).take();
        if let Some(text) = pending {
            if let Err(e) = write_frame(&mut stream, &text).await {
                println!("Message send error");
                warn!(error = %e, "Send failed");
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    *lock_write(&state) = ConnectionState::Closed;
    info!("Connection loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn wait_until_closed(client: &ChatClient) {
        timeout(Duration::from_secs(5), async {
            while client.state() != ConnectionState::Closed {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("client never reached Closed");
    }

    fn client_for(addr: std::net::SocketAddr) -> ChatClient {
        ChatClient::new(ClientConfig::new(addr.ip().to_string(), addr.port()))
    }

    #[tokio::test]
    async fn test_receive_then_peer_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let peer = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"\x00\x00\x00\x05hello").await.unwrap();
            // Dropping the socket closes the connection
        });

        let client = client_for(addr);
        assert_eq!(client.state(), ConnectionState::Unbound);
        client.start().await.unwrap();

        peer.await.unwrap();
        wait_until_closed(&client).await;

        // Dead connection: submitting is a no-op, not a panic
        client.submit_message("into the void");
    }

    #[tokio::test]
    async fn test_submit_sends_exact_wire_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let peer = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 6];
            sock.read_exact(&mut buf).await.unwrap();
            buf
        });

        let client = client_for(addr);
        client.start().await.unwrap();
        client.submit_message("hi");

        let received = peer.await.unwrap();
        assert_eq!(&received, b"\x00\x00\x00\x02hi");

        client.stop();
        wait_until_closed(&client).await;
    }

    #[tokio::test]
    async fn test_mailbox_last_write_wins() {
        let client = ChatClient::new(ClientConfig::default());

        client.submit_message("first");
        client.submit_message("second");

        // Only the most recent value occupies the slot
        assert_eq!(lock(&client.mailbox).take().as_deref(), Some("second"));
        assert_eq!(lock(&client.mailbox).take(), None);
    }

    #[tokio::test]
    async fn test_stop_before_start_and_twice() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = client_for(addr);
        client.stop();
        client.stop();

        // Start still connects, then the loop observes the cleared
        // flag at its first iteration boundary and shuts down.
        client.start().await.unwrap();
        wait_until_closed(&client).await;
        client.stop();
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = client_for(addr);
        client.start().await.unwrap();
        assert!(matches!(
            client.start().await,
            Err(Error::AlreadyStarted)
        ));

        client.stop();
        wait_until_closed(&client).await;
    }

    #[tokio::test]
    async fn test_connect_failure_is_returned() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr);
        assert!(matches!(client.start().await, Err(Error::Io(_))));
    }
}
