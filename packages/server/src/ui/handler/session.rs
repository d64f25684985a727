//! Per-connection session handling.
//!
//! A session moves through `Handshaking → Active → Closing → Closed`:
//!
//! - `Handshaking`: one read of the identity line. End of stream, a read
//!   error, an oversized line or a blank name goes straight to `Closing`
//!   without registering.
//! - `Active`: every following line is handed to the router. Oversized lines
//!   are dropped. An overflowing outbound queue ends the session.
//! - `Closing`: unregister and announce the departure (only if registered).
//! - `Closed`: the writer task is drained and the transport released.

use std::{sync::Arc, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter},
    sync::{Notify, mpsc},
    task::JoinHandle,
};

use super::framing::{Frame, read_frame};
use crate::{
    domain::{ClientRecord, ConnectionId, PusherChannel, Username},
    ui::state::AppState,
};

/// How long a closing session waits for queued lines to reach its peer.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum SessionState {
    Handshaking,
    Active(ClientRecord),
    Closing(Option<ClientRecord>),
    Closed,
}

struct Session<R> {
    state: Arc<AppState>,
    id: ConnectionId,
    reader: BufReader<R>,
    line_buf: Vec<u8>,
    /// Signalled when the outbound queue overflowed and the pusher dropped us
    overflow: Arc<Notify>,
}

/// Drive one connection from handshake to teardown.
///
/// The reader and writer halves are generic so sessions can run over TCP
/// or in-memory duplex streams alike.
pub async fn handle_connection<R, W>(state: Arc<AppState>, id: ConnectionId, reader: R, writer: W)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    // Outbound lines go through a bounded channel drained by this connection's writer task
    let (channel, rx, overflow) = PusherChannel::bounded(state.outbound_queue_depth);
    state.message_pusher.register_client(id, channel).await;
    let mut writer_task = pusher_loop(id, rx, writer);

    let mut session = Session {
        state: state.clone(),
        id,
        reader: BufReader::new(reader),
        line_buf: Vec::new(),
        overflow,
    };

    let mut current = SessionState::Handshaking;
    loop {
        current = match current {
            SessionState::Handshaking => session.handshake().await,
            SessionState::Active(record) => session.run(record).await,
            SessionState::Closing(record) => session.close(record).await,
            SessionState::Closed => break,
        };
    }

    // Dropping the last sender lets the writer task finish once the queue is empty
    state.message_pusher.unregister_client(id).await;
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer_task)
        .await
        .is_err()
    {
        tracing::warn!("Writer for {} did not drain in time, aborting", id);
        writer_task.abort();
    }
    tracing::debug!("Session {} closed", id);
}

impl<R> Session<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn handshake(&mut self) -> SessionState {
        let line = match self.next_frame().await {
            Some(Frame::Line(line)) => line,
            Some(Frame::Oversized) => {
                tracing::debug!("Connection {} sent an oversized identity", self.id);
                return SessionState::Closing(None);
            }
            None => {
                tracing::debug!("Connection {} closed before identifying", self.id);
                return SessionState::Closing(None);
            }
        };

        let username = match Username::new(&line) {
            Ok(username) => username,
            Err(e) => {
                tracing::debug!("Connection {} sent an invalid identity: {}", self.id, e);
                return SessionState::Closing(None);
            }
        };

        match self
            .state
            .connect_participant_usecase
            .execute(self.id, username)
            .await
        {
            Ok(record) => {
                tracing::info!("'{}' connected as {}", record.username, record.id);
                SessionState::Active(record)
            }
            Err(e) => {
                tracing::error!("Failed to register {}: {}", self.id, e);
                SessionState::Closing(None)
            }
        }
    }

    async fn run(&mut self, record: ClientRecord) -> SessionState {
        while let Some(line) = self.read_line().await {
            if line.is_empty() {
                continue;
            }
            let outcome = self
                .state
                .route_message_usecase
                .execute(&record, &line)
                .await;
            tracing::trace!("Routed line from {}: {:?}", record.id, outcome);
        }
        SessionState::Closing(Some(record))
    }

    async fn close(&mut self, record: Option<ClientRecord>) -> SessionState {
        // Never-identified connections leave no trace
        if let Some(record) = record {
            self.state
                .disconnect_participant_usecase
                .execute(&record)
                .await;
            tracing::info!("'{}' ({}) disconnected", record.username, record.id);
        }
        SessionState::Closed
    }

    /// Read the next routable line, skipping oversized ones.
    ///
    /// `None` means the session should stop: the stream ended, failed or idled
    /// out, or the outbound queue overflowed.
    async fn read_line(&mut self) -> Option<String> {
        let overflow = self.overflow.clone();
        loop {
            let frame = tokio::select! {
                frame = self.next_frame() => frame?,
                _ = overflow.notified() => {
                    tracing::warn!("Connection {} is not reading its messages, closing", self.id);
                    return None;
                }
            };
            match frame {
                Frame::Line(line) => return Some(line),
                Frame::Oversized => tracing::warn!(
                    "Dropped a line over {} bytes from {}",
                    self.state.max_line_length,
                    self.id
                ),
            }
        }
    }

    /// Read one bounded frame, applying the idle timeout.
    ///
    /// `None` on end of stream, a read error (including invalid UTF-8) or the
    /// idle timeout elapsing.
    async fn next_frame(&mut self) -> Option<Frame> {
        let read = read_frame(
            &mut self.reader,
            &mut self.line_buf,
            self.state.max_line_length,
        );
        let next = match self.state.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!("Connection {} idle for {:?}, closing", self.id, limit);
                    return None;
                }
            },
            None => read.await,
        };

        match next {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Read error on {}: {}", self.id, e);
                None
            }
        }
    }
}

/// Spawn the task that writes queued lines to the peer, newline-terminated.
///
/// The task ends when every sender is dropped or a write fails.
fn pusher_loop<W>(id: ConnectionId, mut rx: mpsc::Receiver<String>, writer: W) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut writer = BufWriter::new(writer);
        while let Some(line) = rx.recv().await {
            if let Err(e) = write_line(&mut writer, &line, rx.is_empty()).await {
                tracing::debug!("Write to {} failed: {}", id, e);
                return;
            }
        }
        if let Err(e) = writer.shutdown().await {
            tracing::trace!("Shutdown of {} failed: {}", id, e);
        }
    })
}

async fn write_line<W>(writer: &mut BufWriter<W>, line: &str, flush: bool) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    if flush {
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use linechat_shared::time::FixedClock;
    use tokio::io::{AsyncBufReadExt, DuplexStream, Lines, ReadHalf, WriteHalf};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - セッションの状態遷移（Handshaking → Active → Closing → Closed）
    //
    // 【なぜこのテストが必要か】
    // - ハンドシェイク前に切断した接続は参加通知・退出通知を出してはならない
    // - 切断時にレジストリに残骸が残らないことを保証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. ハンドシェイク前の切断
    // 2. 空白のみのユーザー名
    // 3. 通常の参加・発言・退出
    // 4. アイドルタイムアウト
    // 5. 上限を超える長さの行の破棄
    // 6. 受信しない接続の送信キュー溢れによる切断
    // ========================================

    struct TestPeer {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl TestPeer {
        async fn send(&mut self, line: &str) {
            self.writer
                .write_all(format!("{}\n", line).as_bytes())
                .await
                .unwrap();
        }

        async fn recv(&mut self) -> Option<String> {
            self.lines.next_line().await.unwrap()
        }
    }

    fn create_state(config: ServerConfig) -> Arc<AppState> {
        Arc::new(AppState::in_memory(&config, Arc::new(FixedClock::new(0))).unwrap())
    }

    fn connect(state: &Arc<AppState>) -> (TestPeer, JoinHandle<()>) {
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        let (client_read, client_write) = tokio::io::split(client);
        let id = state.connection_ids.generate();
        let handle = tokio::spawn(handle_connection(
            state.clone(),
            id,
            server_read,
            server_write,
        ));
        let peer = TestPeer {
            lines: BufReader::new(client_read).lines(),
            writer: client_write,
        };
        (peer, handle)
    }

    async fn wait_for_participants(state: &Arc<AppState>, expected: usize) {
        for _ in 0..100 {
            if state.get_participants_usecase.count().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("participant count never reached {}", expected);
    }

    #[tokio::test]
    async fn test_disconnect_before_handshake_leaves_no_trace() {
        // テスト項目: ハンドシェイク前の切断では通知もレジストリの残骸も生じない
        // given (前提条件):
        let state = create_state(ServerConfig::default());
        let (peer, handle) = connect(&state);

        // when (操作):
        drop(peer);
        handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(state.get_participants_usecase.count().await, 0);
        let (_, entries) = state.get_history_usecase.execute().await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_blank_username_is_rejected() {
        // テスト項目: 空白のみの識別行では登録されず、接続が閉じられる
        // given (前提条件):
        let state = create_state(ServerConfig::default());
        let (mut peer, handle) = connect(&state);

        // when (操作):
        peer.send("   ").await;
        handle.await.unwrap();

        // then (期待する結果): サーバーから EOF が届く
        assert_eq!(peer.recv().await, None);
        assert_eq!(state.get_participants_usecase.count().await, 0);
        let (_, entries) = state.get_history_usecase.execute().await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        // テスト項目: 参加・発言・退出の一連の流れで通知と履歴が正しく残る
        // given (前提条件):
        let state = create_state(ServerConfig::default());
        let (mut alice, alice_handle) = connect(&state);
        alice.send("alice\r").await;
        wait_for_participants(&state, 1).await;
        let (mut bob, bob_handle) = connect(&state);
        bob.send("bob").await;
        wait_for_participants(&state, 2).await;

        // when (操作):
        assert_eq!(alice.recv().await.as_deref(), Some("bob has joined the chat."));
        bob.send("hi alice").await;
        assert_eq!(alice.recv().await.as_deref(), Some("[bob]: hi alice"));
        drop(bob);
        bob_handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(alice.recv().await.as_deref(), Some("bob has left the chat."));
        assert_eq!(state.get_participants_usecase.count().await, 1);

        alice.send("/history").await;
        assert_eq!(alice.recv().await.as_deref(), Some("alice has joined the chat."));
        assert_eq!(alice.recv().await.as_deref(), Some("bob has joined the chat."));
        assert_eq!(alice.recv().await.as_deref(), Some("[bob]: hi alice"));
        assert_eq!(alice.recv().await.as_deref(), Some("bob has left the chat."));

        drop(alice);
        alice_handle.await.unwrap();
        assert_eq!(state.get_participants_usecase.count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_closes_session() {
        // テスト項目: アイドルタイムアウトを過ぎると退出扱いで接続が閉じられる
        // given (前提条件):
        let state = create_state(ServerConfig {
            idle_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        let (mut peer, handle) = connect(&state);
        peer.send("alice").await;

        // when (操作): 時間を進める（start_paused により自動で進む）
        handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(peer.recv().await, None);
        assert_eq!(state.get_participants_usecase.count().await, 0);
        let (_, entries) = state.get_history_usecase.execute().await;
        assert_eq!(
            entries,
            vec!["alice has joined the chat.", "alice has left the chat."]
        );
    }

    #[tokio::test]
    async fn test_oversized_line_is_dropped() {
        // テスト項目: 上限を超える行は他の参加者にも履歴にも届かず、接続は維持される
        // given (前提条件):
        let state = create_state(ServerConfig {
            max_line_length: 64,
            ..Default::default()
        });
        let (mut alice, _alice_handle) = connect(&state);
        alice.send("alice").await;
        wait_for_participants(&state, 1).await;
        let (mut bob, _bob_handle) = connect(&state);
        bob.send("bob").await;
        wait_for_participants(&state, 2).await;
        assert_eq!(alice.recv().await.as_deref(), Some("bob has joined the chat."));

        // when (操作):
        bob.send(&"x".repeat(1024 * 1024)).await;
        bob.send("after").await;

        // then (期待する結果): 次に届くのは後続の通常メッセージ
        assert_eq!(alice.recv().await.as_deref(), Some("[bob]: after"));
        let (_, entries) = state.get_history_usecase.execute().await;
        assert_eq!(
            entries,
            vec![
                "alice has joined the chat.",
                "bob has joined the chat.",
                "[bob]: after"
            ]
        );
        assert!(entries.iter().all(|entry| entry.len() <= 64 + "[bob]: ".len()));
    }

    #[tokio::test]
    async fn test_oversized_identity_closes_without_registering() {
        // テスト項目: 上限を超える識別行では登録されず、接続が閉じられる
        // given (前提条件):
        let state = create_state(ServerConfig {
            max_line_length: 16,
            ..Default::default()
        });
        let (mut peer, handle) = connect(&state);

        // when (操作):
        peer.send(&"a".repeat(100)).await;
        handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(peer.recv().await, None);
        assert_eq!(state.get_participants_usecase.count().await, 0);
        let (_, entries) = state.get_history_usecase.execute().await;
        assert!(entries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_reader_is_disconnected() {
        // テスト項目: 受信しない接続は送信キューが溢れた時点で切断され、退出が通知される
        // given (前提条件): alice は一切読まない
        let state = create_state(ServerConfig {
            outbound_queue_depth: 4,
            ..Default::default()
        });
        let (mut alice, alice_handle) = connect(&state);
        alice.send("alice").await;
        wait_for_participants(&state, 1).await;
        let (mut bob, _bob_handle) = connect(&state);
        bob.send("bob").await;
        wait_for_participants(&state, 2).await;

        // when (操作): ソケットと writer のバッファを超える量を送る
        let body = "y".repeat(100);
        for _ in 0..1000 {
            bob.send(&body).await;
        }

        // then (期待する結果): alice のセッションが終了し、bob には退出通知が届く
        alice_handle.await.unwrap();
        assert_eq!(bob.recv().await.as_deref(), Some("alice has left the chat."));
        assert_eq!(state.get_participants_usecase.count().await, 1);
        let (_, entries) = state.get_history_usecase.execute().await;
        assert_eq!(entries.last().map(String::as_str), Some("alice has left the chat."));
    }
}
