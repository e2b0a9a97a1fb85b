//! Error fixtures with cause chains.

use logtree_domain::ErrorInfo;
use std::error::Error;
use std::fmt;

/// `std::error::Error` with an optional boxed cause.
#[derive(Debug)]
pub struct ChainedError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ChainedError {
    /// Root error without a cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap `source` as this error's cause.
    #[must_use]
    pub fn caused_by(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for ChainedError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for ChainedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|source| source as &(dyn Error + 'static))
    }
}

/// "request failed" caused by "query failed" caused by an I/O error.
pub fn nested_error() -> ChainedError {
    ChainedError::new("request failed").caused_by(
        ChainedError::new("query failed").caused_by(std::io::Error::other("connection reset")),
    )
}

/// `ErrorInfo` chain of `depth` links; `Level0Error` is outermost.
pub fn error_chain(depth: usize) -> ErrorInfo {
    let mut current: Option<ErrorInfo> = None;
    for level in (0..depth.max(1)).rev() {
        let line = u32::try_from(level + 1).unwrap_or(u32::MAX);
        let mut info = ErrorInfo::new(format!("Level{level}Error"), format!("failure at level {level}"))
            .at(format!("level{level}.rs"), line)
            .with_stack_trace(format!("#0 level{level}()"));
        if let Some(previous) = current.take() {
            info = info.caused_by(previous);
        }
        current = Some(info);
    }
    current.unwrap_or_else(|| ErrorInfo::new("Level0Error", "failure at level 0"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_domain::Throwable;

    #[test]
    fn nested_error_has_three_links() {
        let error = nested_error();
        let mut depth = 1;
        let mut cursor = error.source();
        while let Some(next) = cursor {
            depth += 1;
            cursor = next.source();
        }
        assert_eq!(depth, 3);
    }

    #[test]
    fn error_chain_orders_outermost_first() {
        let chain = error_chain(2);
        assert_eq!(chain.type_name(), "Level0Error");
        let cause = chain.previous().map(|cause| cause.type_name());
        assert_eq!(cause, Some("Level1Error"));
        assert!(chain.previous().and_then(|cause| cause.previous()).is_none());
    }
}
