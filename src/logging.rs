//! Tracing subscriber setup
//!
//! Diagnostics go to stderr for the batch commands. The interactive viewer
//! owns the terminal, so it logs to a file or not at all.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Build a subscriber that writes formatted events to `writer`.
pub fn build_subscriber<W>(writer: W, ansi: bool) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer().with_writer(writer).with_ansi(ansi);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}

/// Log to stderr.
pub fn init_stderr() {
    build_subscriber(io::stderr, true).init();
}

/// Log to `path`, truncating it.
pub fn init_file(path: &Path) -> io::Result<()> {
    let log_file = File::create(path)?;
    build_subscriber(Arc::new(log_file), false).init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_subscriber_writes_warnings() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = build_subscriber(move || writer.clone(), false);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(path = "children[0]", "suspicious node");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("suspicious node"));
        assert!(output.contains("children[0]"));
    }
}
