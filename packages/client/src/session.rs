//! Client session: identify, then relay terminal input and server lines.

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
    sync::mpsc,
};

use crate::{
    error::ClientError,
    ui::{redisplay_prompt, spawn_input_reader},
};

/// Connect to `addr` as `username` and chat until either side hangs up.
pub async fn run_client_session(addr: &str, username: &str) -> Result<(), ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    let (reader, writer) = stream.into_split();

    tracing::info!("Connected to chat server at {}", addr);
    println!(
        "Connected to the server as {}. Type your messages below (@user to whisper, /history to catch up, Ctrl+D to quit):",
        username
    );

    let input = spawn_input_reader(username);
    relay(BufReader::new(reader), writer, username, input).await
}

/// Pump lines between the server connection and the terminal.
///
/// Returns once the server closes the connection or the input ends.
async fn relay<R, W>(
    reader: R,
    mut writer: W,
    username: &str,
    mut input: mpsc::Receiver<String>,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    send_line(&mut writer, username).await?;

    let mut server_lines = reader.lines();
    loop {
        tokio::select! {
            line = server_lines.next_line() => match line? {
                Some(line) => {
                    println!("\r{}", line);
                    redisplay_prompt(username);
                }
                None => {
                    println!("\nServer disconnected.");
                    return Ok(());
                }
            },
            line = input.recv() => match line {
                Some(line) => {
                    // The server treats a line break as the end of a message
                    let line = line.trim_end_matches(['\r', '\n']);
                    if !line.is_empty() {
                        send_line(&mut writer, line).await?;
                    }
                }
                None => {
                    tracing::info!("Input closed, leaving chat");
                    writer.shutdown().await?;
                    return Ok(());
                }
            },
        }
    }
}

async fn send_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
