//! Process-wide logging runtime.
//!
//! [`LoggingRuntime`] is the composition root applications construct once at
//! startup. It owns the root [`Logger`] and optionally installs a panic hook
//! that reports uncaught panics through the tree.

use crate::InfraResult;
use crate::config_check::load_config;
use crate::registry::default_sink_registry;
use logtree_adapters::ProcessEnvironment;
use logtree_app::{Logger, SinkRegistry};
use logtree_config::ValidatedLoggingConfig;
use logtree_domain::{Context, EXCEPTION_KEY, ErrorInfo, SourceLocation, render_backtrace};
use logtree_ports::Environment;
use logtree_shared::ErrorEnvelope;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::panic::PanicHookInfo;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Message logged for panics caught by the hook.
pub const PANIC_MESSAGE: &str = "Uncaught panic";

/// Type name of the error recorded for a panic.
pub const PANIC_TYPE_NAME: &str = "panic";

static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static REPORTING_PANIC: Cell<bool> = const { Cell::new(false) };
}

/// Outcome of [`LoggingRuntime::install_panic_hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookInstall {
    /// The hook was installed by this call.
    Installed,
    /// A logtree panic hook was already installed in this process.
    AlreadyInstalled,
}

/// Explicitly constructed, process-wide logging context.
#[derive(Debug, Clone)]
pub struct LoggingRuntime {
    logger: Arc<Logger>,
}

impl LoggingRuntime {
    /// Build the tree for `config` against `registry`.
    pub fn new(
        config: &ValidatedLoggingConfig,
        registry: &SinkRegistry,
        environment: Arc<dyn Environment>,
    ) -> InfraResult<Self> {
        let logger = Logger::build(config, registry, environment).map_err(ErrorEnvelope::from)?;
        Ok(Self::from_logger(Arc::new(logger)))
    }

    /// Wrap an existing logger.
    #[must_use]
    pub const fn from_logger(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Load config from `config_path` plus the process environment and wire
    /// the built-in sinks.
    #[tracing::instrument(name = "logtree.runtime.load", skip_all)]
    pub fn load(config_path: Option<&Path>, overrides_json: Option<&str>) -> InfraResult<Self> {
        let env: BTreeMap<String, String> = std::env::vars().collect();
        Self::load_with_env(&env, config_path, overrides_json)
    }

    /// [`load`](Self::load) with an explicit variable map.
    pub fn load_with_env(
        env: &BTreeMap<String, String>,
        config_path: Option<&Path>,
        overrides_json: Option<&str>,
    ) -> InfraResult<Self> {
        let config = load_config(env, config_path, overrides_json)?;
        let environment: Arc<dyn Environment> =
            Arc::new(ProcessEnvironment::from_lookup(|name| env.get(name).cloned()));
        Self::new(&config, &default_sink_registry(), environment)
    }

    /// Root logger.
    #[must_use]
    pub fn logger(&self) -> Arc<Logger> {
        Arc::clone(&self.logger)
    }

    /// Report uncaught panics through the tree.
    ///
    /// Opt-in and idempotent: only the first call in a process installs the
    /// hook. The installed hook logs at `critical` and then runs the hook
    /// that was in place before it.
    pub fn install_panic_hook(&self) -> HookInstall {
        if HOOK_INSTALLED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("panic hook already installed; skipping");
            return HookInstall::AlreadyInstalled;
        }

        let previous = std::panic::take_hook();
        let logger = Arc::clone(&self.logger);
        std::panic::set_hook(Box::new(move |info| {
            if !report_once_per_thread(|| report_panic(&logger, info)) {
                tracing::debug!("panic raised while reporting a panic; not logged");
            }
            previous(info);
        }));
        tracing::info!("panic hook installed");
        HookInstall::Installed
    }

    /// Whether a logtree panic hook is installed in this process.
    #[must_use]
    pub fn panic_hook_installed() -> bool {
        HOOK_INSTALLED.load(Ordering::SeqCst)
    }
}

/// Clears the reporting flag even when `report` unwinds.
struct ReportingGuard;

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTING_PANIC.with(|flag| flag.set(false));
    }
}

/// Run `report` unless this thread is already inside it; returns whether it ran.
fn report_once_per_thread(report: impl FnOnce()) -> bool {
    if REPORTING_PANIC.with(|flag| flag.replace(true)) {
        return false;
    }
    let _guard = ReportingGuard;
    report();
    true
}

fn report_panic(logger: &Logger, info: &PanicHookInfo<'_>) {
    let payload = panic_payload(info);
    let location = info
        .location()
        .map_or_else(|| SourceLocation::new("<unknown>", 0), SourceLocation::from);
    let trace = render_backtrace(&Backtrace::capture(), &location);
    let error = ErrorInfo::new(PANIC_TYPE_NAME, payload)
        .at(location.file, location.line)
        .with_stack_trace(trace);

    let context = Context::new().with_error(EXCEPTION_KEY, error);
    if let Err(error) = logger.critical(PANIC_MESSAGE, context) {
        tracing::warn!(error = %error, "failed to log panic");
    }
}

fn panic_payload(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_reports_on_one_thread_are_skipped() {
        let mut inner_ran = None;
        let outer_ran = report_once_per_thread(|| {
            inner_ran = Some(report_once_per_thread(|| {}));
        });
        assert!(outer_ran);
        assert_eq!(inner_ran, Some(false));
        assert!(report_once_per_thread(|| {}), "flag resets after the outer report");
    }

    #[test]
    fn other_threads_report_independently() {
        let mut other_ran = None;
        report_once_per_thread(|| {
            other_ran = std::thread::scope(|scope| scope.spawn(|| report_once_per_thread(|| {})).join()).ok();
        });
        assert_eq!(other_ran, Some(true));
    }
}
