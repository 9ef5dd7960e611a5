use thiserror::Error;

/// Result alias for transcoding operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that abort a transcoding run.
///
/// Every variant is terminal for the current run; output already delivered to
/// the sink stands as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// An alias referenced an anchor that was not declared earlier in the
    /// stream. A forward reference (anchor declared later) is rejected the
    /// same way as a missing one.
    #[error(
        "no anchor named '{anchor}' is declared before the alias on element '{element}'; \
         an anchor must be declared before it can be referenced"
    )]
    UnresolvedAlias { anchor: String, element: String },

    /// An alias resolved to an anchor declared by one of its own open
    /// ancestors, which would replay the subtree without end.
    #[error(
        "the alias on element '{element}' references anchor '{anchor}', which is declared \
         by an ancestor of that element; inlining it would recurse forever"
    )]
    CyclicAlias { anchor: String, element: String },

    /// The YAML scanner rejected the input text.
    #[error("YAML parse error: {0}")]
    Parse(String),

    /// An error raised by the downstream markup sink, passed through as-is.
    #[error(transparent)]
    Sink(#[from] anyhow::Error),
}
