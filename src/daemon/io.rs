//! Daemon I/O seams
//!
//! The control loop never talks to hardware or transports directly; it
//! goes through three narrow traits. The capture backend is on the far
//! side of an unbounded single-consumer channel: it pushes raw records in
//! from wherever frames arrive and the control loop drains them, so the
//! inventories have exactly one owner and no locking.

use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::frame::RawFrame;
use crate::{AirjamError, Result};

/// Create the raw-frame channel between a capture backend and the control
/// loop. The backend keeps the sender; the daemon drains the receiver.
pub fn raw_frame_channel() -> (
    mpsc::UnboundedSender<RawFrame>,
    mpsc::UnboundedReceiver<RawFrame>,
) {
    mpsc::unbounded_channel()
}

/// Channel-retune side of the capture subsystem.
#[async_trait]
pub trait RadioControl: Send + Sync {
    /// Ask the radio to retune to the given channel.
    async fn set_channel(&self, channel: u8) -> Result<()>;
}

/// Raw packet transmission primitive. Fire-and-forget; the air gives no
/// feedback.
#[async_trait]
pub trait FrameInjector: Send + Sync {
    async fn transmit(&self, frame: &[u8]) -> Result<()>;
}

/// Reporting transport for the JSON snapshots.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, payload: &str) -> Result<()>;
}

/// Console sink: one snapshot per line on stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl ReportSink for ConsoleSink {
    async fn publish(&self, payload: &str) -> Result<()> {
        println!("{payload}");
        Ok(())
    }
}

/// Message-bus sink: each snapshot goes out as one UDP datagram.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl UdpSink {
    pub async fn bind(dest: SocketAddr) -> Result<Self> {
        let bind_addr: SocketAddr = if dest.is_ipv4() {
            "0.0.0.0:0".parse().expect("literal addr")
        } else {
            "[::]:0".parse().expect("literal addr")
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(Self { socket, dest })
    }
}

#[async_trait]
impl ReportSink for UdpSink {
    async fn publish(&self, payload: &str) -> Result<()> {
        self.socket
            .send_to(payload.as_bytes(), self.dest)
            .await
            .map_err(|e| AirjamError::Transport(format!("bus send to {}: {}", self.dest, e)))?;
        Ok(())
    }
}

/// Stand-in radio backend that records every interaction instead of
/// touching hardware. Serves dry runs and the test suite.
#[derive(Debug, Default)]
pub struct LoopbackRadio {
    transmitted: Mutex<Vec<Vec<u8>>>,
    channels: Mutex<Vec<u8>>,
}

impl LoopbackRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames handed to the injector, in transmission order.
    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.transmitted.lock().expect("loopback poisoned").clone()
    }

    /// Channels the radio was asked to retune to, in request order.
    pub fn channels(&self) -> Vec<u8> {
        self.channels.lock().expect("loopback poisoned").clone()
    }
}

#[async_trait]
impl RadioControl for LoopbackRadio {
    async fn set_channel(&self, channel: u8) -> Result<()> {
        self.channels.lock().expect("loopback poisoned").push(channel);
        Ok(())
    }
}

#[async_trait]
impl FrameInjector for LoopbackRadio {
    async fn transmit(&self, frame: &[u8]) -> Result<()> {
        self.transmitted
            .lock()
            .expect("loopback poisoned")
            .push(frame.to_vec());
        Ok(())
    }
}

/// In-memory sink collecting every published snapshot.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectingSink {
    published: Mutex<Vec<String>>,
}

#[cfg(test)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().expect("sink poisoned").clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ReportSink for CollectingSink {
    async fn publish(&self, payload: &str) -> Result<()> {
        self.published
            .lock()
            .expect("sink poisoned")
            .push(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_raw_frame_channel_delivers_in_order() {
        let (tx, mut rx) = raw_frame_channel();
        tx.send(RawFrame::new(Bytes::from_static(&[1, 2, 3]))).unwrap();
        tx.send(RawFrame::new(Bytes::from_static(&[4]))).unwrap();

        assert_eq!(rx.recv().await.unwrap().data.as_ref(), &[1, 2, 3]);
        assert_eq!(rx.recv().await.unwrap().data.as_ref(), &[4]);
    }

    #[tokio::test]
    async fn test_loopback_radio_records_interactions() {
        let radio = LoopbackRadio::new();
        radio.set_channel(6).await.unwrap();
        radio.set_channel(7).await.unwrap();
        radio.transmit(&[0xc0, 0x00]).await.unwrap();

        assert_eq!(radio.channels(), vec![6, 7]);
        assert_eq!(radio.transmitted(), vec![vec![0xc0, 0x00]]);
    }

    #[tokio::test]
    async fn test_console_sink_publishes() {
        let sink = ConsoleSink;
        assert!(sink.publish("{}").await.is_ok());
    }

    #[tokio::test]
    async fn test_udp_sink_delivers_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dest = receiver.local_addr().unwrap();

        let sink = UdpSink::bind(dest).await.unwrap();
        sink.publish(r#"{"beacons":{}}"#).await.unwrap();

        let mut buf = [0u8; 256];
        let (len, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], br#"{"beacons":{}}"#);
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.publish("{}").await.unwrap();
        assert_eq!(sink.published(), vec!["{}".to_string()]);
    }
}
