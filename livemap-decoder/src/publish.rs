//! Event publishers
//!
//! A publisher takes a typed event and sends it on a named topic. Delivery is
//! best effort: the run loop counts failures and moves on.

use crate::message::{PublishedEvent, WireEvent};
use crate::types::{DecoderError, Result};
use std::io::Write;
use std::net::{ToSocketAddrs, UdpSocket};

/// Sink for published events
pub trait Publisher {
    fn publish(&mut self, topic: &str, event: &PublishedEvent) -> Result<()>;
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&mut self, topic: &str, event: &PublishedEvent) -> Result<()> {
        (**self).publish(topic, event)
    }
}

/// Writes one JSON object per event, one event per line
pub struct JsonLinesPublisher<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesPublisher<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Publisher for JsonLinesPublisher<W> {
    fn publish(&mut self, topic: &str, event: &PublishedEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &WireEvent { topic, event })?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Sends one JSON datagram per event to a fixed address
pub struct UdpPublisher {
    socket: UdpSocket,
}

impl UdpPublisher {
    /// Bind an ephemeral local socket and connect it to `target`
    pub fn connect(target: impl ToSocketAddrs) -> Result<Self> {
        let addr = target
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| DecoderError::InvalidConfig("UDP target resolved to no address".to_string()))?;
        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };

        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(addr)?;
        socket.set_nonblocking(true)?;

        log::info!("Publishing UDP datagrams to {}", addr);
        Ok(Self { socket })
    }
}

impl Publisher for UdpPublisher {
    fn publish(&mut self, topic: &str, event: &PublishedEvent) -> Result<()> {
        let payload = serde_json::to_vec(&WireEvent { topic, event })?;
        self.socket
            .send(&payload)
            .map_err(|e| DecoderError::PublishFailed {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Keeps every published event in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPublisher {
    pub events: Vec<(String, PublishedEvent)>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&PublishedEvent> {
        self.events.last().map(|(_, event)| event)
    }
}

impl Publisher for MemoryPublisher {
    fn publish(&mut self, topic: &str, event: &PublishedEvent) -> Result<()> {
        self.events.push((topic.to_string(), event.clone()));
        Ok(())
    }
}
