use std::fmt;

/// What kind of problem a single violation describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The text is not well-formed XML.
    MalformedXml,
    /// An element or attribute the engine relies on is absent or empty.
    MissingRequiredElement,
    /// A consumed value is present but cannot be interpreted (amount, date, period order).
    InvalidValue,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedXml => write!(f, "malformed XML"),
            Self::MissingRequiredElement => write!(f, "missing required element"),
            Self::InvalidValue => write!(f, "invalid value"),
        }
    }
}

/// One problem found while validating a document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseViolation {
    pub kind: ViolationKind,
    pub message: String,
    /// Byte offset into the source text, when the reader knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
}

impl ParseViolation {
    pub fn malformed(message: impl Into<String>, position: u64) -> Self {
        Self {
            kind: ViolationKind::MalformedXml,
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::MissingRequiredElement,
            message: message.into(),
            position: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::InvalidValue,
            message: message.into(),
            position: None,
        }
    }
}

impl fmt::Display for ParseViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} at byte {}: {}", self.kind, pos, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Parsing failed. Carries every violation found, never just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_violations(.violations))]
pub struct ParseError {
    pub violations: Vec<ParseViolation>,
}

impl ParseError {
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}

fn join_violations(violations: &[ParseViolation]) -> String {
    match violations.len() {
        0 => "document rejected".to_string(),
        1 => violations[0].to_string(),
        n => {
            let parts: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            format!("{n} problems: {}", parts.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_all_violations() {
        let err = ParseError {
            violations: vec![
                ParseViolation::malformed("unexpected end of document", 12),
                ParseViolation::missing("organisation-identifier"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 problems"));
        assert!(msg.contains("malformed XML at byte 12"));
        assert!(msg.contains("organisation-identifier"));
        assert!(err.has_kind(ViolationKind::MissingRequiredElement));
        assert!(!err.has_kind(ViolationKind::InvalidValue));
    }
}
