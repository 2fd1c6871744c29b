use anyhow::Context;

use tracing::{subscriber::set_global_default, Subscriber};

use tracing_log::LogTracer;

use tracing_subscriber::fmt::{self, format::FmtSpan, MakeWriter};
use tracing_subscriber::EnvFilter;

use crate::settings::ApplicationSettings;

/// Build a formatting subscriber writing to `sink`.
///
/// With `log_spans` on, entering and closing the batch, dispatch and send spans are
/// logged too, which gives per-message timings.
pub fn create_subscriber<Sink>(settings: &ApplicationSettings, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let span_events = if settings.log_spans() {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    fmt::fmt()
        .with_env_filter(EnvFilter::new(settings.log_filter()))
        .with_span_events(span_events)
        .with_ansi(settings.log_ansi())
        .with_writer(sink)
        .finish()
}

/// Install the subscriber globally and route `log` records through it
pub fn set_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    LogTracer::init().context("Failed to initalize logging")?;

    set_global_default(subscriber).context("Failed to set global subscriber")
}
