use crate::events::{EmitError, Event, EventSink};
use std::io::{ErrorKind, Write};

/// Writes each event as one JSON line and flushes immediately
///
/// The consumer reads the stream live, so nothing is buffered across events.
#[derive(Debug)]
pub struct JsonLinesEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> EventSink for JsonLinesEmitter<W> {
    fn emit(&mut self, event: &Event) -> Result<(), EmitError> {
        let line = serde_json::to_vec(event)?;
        self.write_line(&line).map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe => EmitError::Closed,
            _ => EmitError::Io(e),
        })
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Vec<Event>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &Event) -> Result<(), EmitError> {
        self.events.push(event.clone());
        Ok(())
    }
}
