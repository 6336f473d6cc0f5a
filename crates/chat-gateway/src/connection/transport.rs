//! WebSocket transport
//!
//! Opens the socket and owns its write half. All outbound frames go through a
//! single writer fed by an mpsc channel.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::error::GatewayResult;
use crate::supervisor::UnitResult;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
pub(crate) type WsSource = SplitStream<WsStream>;

/// Append the version and encoding query to a gateway base URL
pub fn gateway_url(base: &str, version: u8) -> String {
    if base.contains('?') {
        format!("{base}&v={version}&encoding=json")
    } else {
        format!("{}/?v={version}&encoding=json", base.trim_end_matches('/'))
    }
}

/// Open the WebSocket and split it into its write and read halves
pub(crate) async fn open(url: &str) -> GatewayResult<(WsSink, WsSource)> {
    let (stream, response) = connect_async(url).await?;
    debug!(status = response.status().as_u16(), "WebSocket handshake complete");
    Ok(stream.split())
}

/// Forward queued frames to the socket until the queue closes or a close frame is sent
pub(crate) async fn write_loop(mut sink: WsSink, mut rx: mpsc::Receiver<Message>) -> UnitResult {
    while let Some(message) = rx.recv().await {
        let closing = matches!(message, Message::Close(_));
        sink.send(message).await?;
        trace!(closing, "Frame written");
        if closing {
            break;
        }
    }

    // The peer may already have dropped the connection.
    let _ = sink.close().await;
    debug!("Writer stopped");
    Ok(())
}
