//! Tracing subscriber setup shared by the server and client subcommands.

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// `RUST_LOG` when set, otherwise `level` for this crate and tower-http.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fitcoach={0},tower_http={0}", level)))
}

/// Formatting layer writing JSON lines or compact text to `writer`.
pub fn output_layer<S, W>(json: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer().with_target(false).with_writer(writer).boxed()
    }
}

/// Install the global subscriber. Both formats go to stderr; stdout carries
/// command output only.
pub fn init(level: &str, json: bool) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(output_layer(json, std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
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

    fn emit(json: bool) -> String {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::registry().with(output_layer(json, buffer.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(route = "/api/chat/send", "Proxy request failed");
        });
        buffer.contents()
    }

    #[test]
    fn json_lines_go_to_the_given_writer() {
        let written = emit(true);
        let line: serde_json::Value = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["fields"]["message"], "Proxy request failed");
        assert_eq!(line["fields"]["route"], "/api/chat/send");
    }

    #[test]
    fn text_lines_go_to_the_given_writer() {
        let written = emit(false);
        assert!(written.contains("Proxy request failed"));
        assert!(serde_json::from_str::<serde_json::Value>(written.trim()).is_err());
    }
}
