use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global subscriber: `RUST_LOG` when set, otherwise debug output for
/// the service crates and the HTTP trace layer.
pub fn init_telemetry(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tubely=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        let console_fmt = tracing_subscriber::fmt::layer()
            .event_format(Format::default().compact().with_target(false));
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .init();
    }
}
