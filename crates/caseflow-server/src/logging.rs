use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "caseflow_server=info,caseflow_core=info,caseflow_agent=info,tower_http=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter;
/// `format` is "json" for one object per line, anything else for
/// human-readable output.
pub(crate) fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
