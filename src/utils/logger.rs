use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset. `--verbose` turns on this
/// crate's per-link debug output (discarded links, wait polling, HTTP GETs)
/// while dependencies stay at `info`.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "cert_crawl=debug,info"
    } else {
        "cert_crawl=info,warn"
    }
}

/// Installs the global subscriber for the binary. `RUST_LOG`, when set and
/// valid, replaces the defaults entirely.
pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            let directives = default_directives(verbose);
            assert!(EnvFilter::try_new(directives).is_ok(), "{}", directives);
        }
        assert!(default_directives(true).contains("cert_crawl=debug"));
        assert!(default_directives(false).contains("cert_crawl=info"));
    }
}
