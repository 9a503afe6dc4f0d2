use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Initialize the tracing subscriber, writing to stdout
///
/// `RUST_LOG` wins over `LOG_LEVEL`, which wins over the configured level.
/// `LOG_FORMAT` (or the configured format) picks `json`, `pretty` or the
/// compact default formatter.
pub fn init(settings: &LoggingSettings) {
    init_with_writer(settings, std::io::stdout);
}

/// Same as [`init`] but logs go to stderr, leaving stdout to console reports
pub fn init_stderr(settings: &LoggingSettings) {
    init_with_writer(settings, std::io::stderr);
}

fn init_with_writer<W>(settings: &LoggingSettings, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_level(true);

    // Ignore a second initialization (tests, embedded use)
    let _ = match format.as_str() {
        "json" => subscriber.json().try_init(),
        "pretty" => subscriber.pretty().try_init(),
        _ => subscriber.try_init(),
    };
}
