//! Errors surfaced to whoever mounts an editor.

use miette::Diagnostic;

use crate::platform::PlatformError;

/// Error type for editor construction and platform failures.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum EditorError {
    /// No element was given to mount on.
    #[error("missing element")]
    #[diagnostic(
        code(lighditor::missing_element),
        help("pass the element the editor should take over")
    )]
    MissingElement,

    /// The element is the document itself, or is not part of one.
    #[error("element {0} cannot host an editor")]
    #[diagnostic(
        code(lighditor::detached),
        help("mount on an element inside the document body, not the document root")
    )]
    Detached(String),

    /// Config could not be read.
    #[error("invalid config: {0}")]
    #[diagnostic(code(lighditor::config))]
    Config(String),

    /// The rendering platform refused an operation.
    #[error("platform error: {0}")]
    #[diagnostic(code(lighditor::platform))]
    Platform(#[from] PlatformError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(EditorError::MissingElement.to_string(), "missing element");
        let err: EditorError = PlatformError::from("no range").into();
        assert_eq!(err.to_string(), "platform error: no range");
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("lighditor::platform")
        );
    }
}
