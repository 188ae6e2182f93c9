//! Log-based message sink adapter.
//!
//! Implements [`MessageSink`] by writing outbound bus messages to the
//! ESP-IDF logger (UART / USB-CDC in production).  In the full firmware the
//! communication manager implements the same trait and routes the message
//! to its destination task.

use log::info;

use crate::app::messages::{Message, MessageKind};
use crate::app::ports::MessageSink;
use crate::datetime::DateTime;

/// Adapter that logs every outbound [`Message`] to the serial console.
pub struct LogMessageSink;

impl LogMessageSink {
    pub fn new() -> Self {
        Self
    }
}

impl MessageSink for LogMessageSink {
    fn send(&mut self, message: &Message) {
        match message.kind {
            MessageKind::LocalTimeChanged { encoded_time } => match DateTime::decode(encoded_time)
            {
                Ok(dt) => info!(
                    "BUS | {:?} -> {:?} | LocalTimeChanged {dt}",
                    message.source, message.destination
                ),
                Err(e) => info!(
                    "BUS | {:?} -> {:?} | LocalTimeChanged <bad word: {e}>",
                    message.source, message.destination
                ),
            },
            other => {
                info!(
                    "BUS | {:?} -> {:?} | {other:?}",
                    message.source, message.destination
                );
            }
        }
    }
}
