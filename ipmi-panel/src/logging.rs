use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging on stderr, so stdout stays clean for the rendered panel.
///
/// `RUST_LOG` wins when set; otherwise `ipmi_panel=info`, or `ipmi_panel=error`
/// when `quiet`.
pub fn init_logging(quiet: bool) {
    let directive = if quiet { "ipmi_panel=error" } else { "ipmi_panel=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // try_init: un second appel (tests) ne doit pas paniquer
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
