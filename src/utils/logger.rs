use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    /// CI 日誌收集器使用
    Json,
}

fn default_filter(verbose: bool) -> EnvFilter {
    let directive = if verbose {
        "gitlab_release=debug,info"
    } else {
        "gitlab_release=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    let registry = tracing_subscriber::registry().with(default_filter(verbose));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => registry.with(fmt_layer.compact()).init(),
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
    }
}

fn format_from_env(value: Option<&str>) -> LogFormat {
    match value {
        Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Compact,
    }
}

/// CLI 預設 compact 輸出；`GITLAB_RELEASE_LOG_FORMAT=json` 時改用 JSON
pub fn init_cli_logger(verbose: bool) {
    let format = format_from_env(std::env::var("GITLAB_RELEASE_LOG_FORMAT").ok().as_deref());
    match format {
        LogFormat::Json => init_json_logger(),
        LogFormat::Compact => init_logger(LogFormat::Compact, verbose),
    }
}

/// 給 CI 日誌收集器使用的 JSON logger
pub fn init_json_logger() {
    init_logger(LogFormat::Json, false);
}
