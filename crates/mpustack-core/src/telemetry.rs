//! Tracing subscriber installation.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::MpuConfig;
use crate::error::MpuStackResult;

/// Initialize the global tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to [`MpuConfig::log_level`].
/// Fails if the filter cannot be parsed or a global subscriber is already
/// installed.
pub fn init_tracing(config: &MpuConfig) -> MpuStackResult<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = env_filter(&config.log_level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Build the filter: `rust_log` directives are parsed leniently, the
/// configured level strictly.
fn env_filter(log_level: &str, rust_log: Option<&str>) -> MpuStackResult<EnvFilter> {
    match rust_log {
        Some(directives) => Ok(EnvFilter::builder().parse_lossy(directives)),
        None => Ok(EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MpuStackError;

    #[test]
    fn test_should_reject_invalid_log_level() {
        let result = env_filter("info,mpustack=loud", None);
        assert!(matches!(result, Err(MpuStackError::Internal(_))));
    }

    #[test]
    fn test_should_accept_configured_log_level() {
        let filter = env_filter("debug,mpustack_s3_core=trace", None).expect("valid filter");
        assert!(filter.to_string().contains("mpustack_s3_core=trace"));
    }

    #[test]
    fn test_should_prefer_rust_log_over_configured_level() {
        let filter = env_filter("not a level=", Some("warn")).expect("lenient filter");
        assert!(filter.to_string().contains("warn"));
    }

    #[test]
    fn test_should_fail_init_with_invalid_log_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = MpuConfig::builder().log_level("mpustack=loud".to_owned()).build();
        assert!(matches!(
            init_tracing(&config),
            Err(MpuStackError::Internal(_))
        ));
    }
}
