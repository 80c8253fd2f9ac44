//! Installs a global subscriber, so it lives alone in its own test binary.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use geoframe_core::logging::{LogConfig, LogFormat, init_logging_with_writer};

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Buffer {
    type Writer = Buffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn json_events_reach_the_writer_once_installed() {
    let buffer = Buffer::default();
    let config = LogConfig::default().with_format(LogFormat::Json);

    init_logging_with_writer(&config, buffer.clone()).unwrap();
    tracing::info!(target: "geoframe_core", rows = 10, "load complete");
    tracing::debug!(target: "geoframe_core", "filtered out at info");

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("\"message\":\"load complete\""));
    assert!(output.contains("\"rows\":10"));
    assert!(!output.contains("filtered out"));

    let again = init_logging_with_writer(&config, io::sink);
    assert!(again.is_err());
}
