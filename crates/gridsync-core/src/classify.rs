//! Error classification.
//!
//! Remote failures reach the reconcilers wrapped in arbitrary error types. The
//! [`ErrorClassifier`] walks the `source()` chain of an error and applies an ordered
//! list of rules to every link, so the reconcilers never depend on a particular
//! wrapper hierarchy. Rules are registered per concrete error type by the crate
//! that owns that type.

use std::error::Error;
use std::fmt;

/// Coarse classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The remote resource does not exist.
    NotFound,
    /// The caller is not authorized to perform the operation.
    AccessDenied,
    /// Credentials for the remote API could not be obtained.
    NoCredentials,
    /// Anything else. Treated as transient.
    Unclassified,
}

impl ErrorKind {
    /// Whether retrying without operator intervention is pointless.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::AccessDenied | Self::NoCredentials)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::AccessDenied => "access denied",
            Self::NoCredentials => "no credentials",
            Self::Unclassified => "unclassified",
        };
        f.write_str(s)
    }
}

/// Contribution of a single error in the chain to a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSegment {
    /// Append this text, then continue with the error's source. Empty text is skipped.
    Wrapped(String),
    /// Append this text and stop unwrapping.
    Final(String),
}

type KindRule = Box<dyn Fn(&(dyn Error + 'static)) -> Option<ErrorKind> + Send + Sync>;
type MessageRule = Box<dyn Fn(&(dyn Error + 'static)) -> Option<MessageSegment> + Send + Sync>;

/// Ordered set of classification and message rules.
#[derive(Default)]
pub struct ErrorClassifier {
    kind_rules: Vec<KindRule>,
    message_rules: Vec<MessageRule>,
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a classification rule for errors of type `E`.
    ///
    /// The rule returns `None` when it has no opinion, in which case later rules
    /// and deeper links of the chain are consulted.
    #[must_use]
    pub fn with_kind_rule<E, F>(mut self, rule: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&E) -> Option<ErrorKind> + Send + Sync + 'static,
    {
        self.kind_rules
            .push(Box::new(move |err| err.downcast_ref::<E>().and_then(&rule)));
        self
    }

    /// Registers a message rule for errors of type `E`.
    #[must_use]
    pub fn with_message_rule<E, F>(mut self, rule: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&E) -> Option<MessageSegment> + Send + Sync + 'static,
    {
        self.message_rules
            .push(Box::new(move |err| err.downcast_ref::<E>().and_then(&rule)));
        self
    }

    /// Classifies `err`. A denial anywhere in the chain wins; otherwise the
    /// outermost link matched by a rule decides.
    pub fn classify(&self, err: &(dyn Error + 'static)) -> ErrorKind {
        let mut outermost = None;
        for link in std::iter::successors(Some(err), |&e| e.source()) {
            match self.kind_rules.iter().find_map(|rule| rule(link)) {
                Some(ErrorKind::AccessDenied) => return ErrorKind::AccessDenied,
                Some(kind) => {
                    outermost.get_or_insert(kind);
                }
                None => {}
            }
        }
        outermost.unwrap_or(ErrorKind::Unclassified)
    }

    /// Builds a single-line description of `err` by unwrapping its chain.
    ///
    /// Links without a message rule contribute their `Display` output and end the
    /// walk, since a plain `Display` usually already includes its cause.
    pub fn describe(&self, err: &(dyn Error + 'static)) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut current = Some(err);

        while let Some(link) = current {
            match self.message_rules.iter().find_map(|rule| rule(link)) {
                Some(MessageSegment::Wrapped(msg)) => {
                    if !msg.is_empty() {
                        parts.push(msg);
                    }
                    current = link.source();
                }
                Some(MessageSegment::Final(msg)) => {
                    parts.push(msg);
                    break;
                }
                None => {
                    parts.push(link.to_string());
                    break;
                }
            }
        }

        parts.join(": ")
    }
}

impl fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorClassifier")
            .field("kind_rules", &self.kind_rules.len())
            .field("message_rules", &self.message_rules.len())
            .finish()
    }
}
