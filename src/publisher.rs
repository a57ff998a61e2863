//! # Transport of trajectory rows
//!
//! The playback node hands one [`Float64MultiArray`] per tick to a [`Publisher`]. The trait is
//! the whole transport contract: one ordered sequence of 11 values per call, no acknowledgement,
//! no delivery guarantee.
//!
//! Implementations
//! -----------------
//! * [`JsonLinesPublisher`] – one JSON object `{"topic": ..., "data": [...]}` per line on any
//!   [`Write`] (stdout for the binary).
//! * [`ChannelPublisher`] – in-process, non-blocking hand-off through an unbounded tokio channel.
use std::io::Write;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::{gal_orbits_errors::GalOrbitsError, trajectories::TrajectoryRow};

/// Ordered sequence of doubles, one trajectory row on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Float64MultiArray {
    pub data: Vec<f64>,
}

impl From<&TrajectoryRow> for Float64MultiArray {
    fn from(row: &TrajectoryRow) -> Self {
        Float64MultiArray {
            data: row.to_array().to_vec(),
        }
    }
}

pub trait Publisher {
    /// Name of the stream the messages are published on.
    fn topic(&self) -> &str;

    /// Hand one message to the transport.
    fn publish(&mut self, msg: &Float64MultiArray) -> Result<(), GalOrbitsError>;
}

#[derive(Serialize)]
struct Envelope<'a> {
    topic: &'a str,
    data: &'a [f64],
}

/// Writes each message as a JSON line and flushes it immediately.
#[derive(Debug)]
pub struct JsonLinesPublisher<W: Write> {
    topic: String,
    writer: W,
}

impl<W: Write> JsonLinesPublisher<W> {
    pub fn new(topic: impl Into<String>, writer: W) -> Self {
        JsonLinesPublisher {
            topic: topic.into(),
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Publisher for JsonLinesPublisher<W> {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn publish(&mut self, msg: &Float64MultiArray) -> Result<(), GalOrbitsError> {
        let envelope = Envelope {
            topic: &self.topic,
            data: &msg.data,
        };
        serde_json::to_writer(&mut self.writer, &envelope)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Sends each message over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    topic: String,
    sender: UnboundedSender<Float64MultiArray>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiving end of its channel.
    pub fn channel(topic: impl Into<String>) -> (Self, UnboundedReceiver<Float64MultiArray>) {
        let (sender, receiver) = unbounded_channel();
        (
            ChannelPublisher {
                topic: topic.into(),
                sender,
            },
            receiver,
        )
    }
}

impl Publisher for ChannelPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn publish(&mut self, msg: &Float64MultiArray) -> Result<(), GalOrbitsError> {
        self.sender
            .send(msg.clone())
            .map_err(|_| GalOrbitsError::Transport(format!("{}: receiver dropped", self.topic)))
    }
}

#[cfg(test)]
mod publisher_test {
    use super::*;

    fn row() -> TrajectoryRow {
        TrajectoryRow::from([0.5, 8.0, 1.0, 2.0, 230.0, 0.1, -3.0, -1.0e5, 1840.0, 7.99, 0.28])
    }

    #[test]
    fn test_message_from_row() {
        let msg = Float64MultiArray::from(&row());
        assert_eq!(
            msg.data,
            vec![0.5, 8.0, 1.0, 2.0, 230.0, 0.1, -3.0, -1.0e5, 1840.0, 7.99, 0.28]
        );
    }

    #[test]
    fn test_json_lines() {
        let mut publisher = JsonLinesPublisher::new("/gal_orbits", Vec::new());
        let msg = Float64MultiArray::from(&row());
        publisher.publish(&msg).unwrap();
        publisher.publish(&msg).unwrap();

        let text = String::from_utf8(publisher.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"topic":"/gal_orbits","data":[0.5,8.0,1.0,2.0,230.0,0.1,-3.0,-100000.0,1840.0,7.99,0.28]}"#
        );

        let parsed: Float64MultiArray = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_channel_publisher() {
        let (mut publisher, mut rx) = ChannelPublisher::channel("/gal_orbits");
        assert_eq!(publisher.topic(), "/gal_orbits");

        let msg = Float64MultiArray::from(&row());
        publisher.publish(&msg).unwrap();
        assert_eq!(rx.try_recv().unwrap(), msg);

        drop(rx);
        assert_eq!(
            publisher.publish(&msg),
            Err(GalOrbitsError::Transport(
                "/gal_orbits: receiver dropped".into()
            ))
        );
    }
}
