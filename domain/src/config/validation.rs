//! Structured configuration issues.
//!
//! Parsers that accept a fallback (an unknown dialogue type becomes a
//! debate, an unknown backend name becomes the default backend) return the
//! fallback value *and* an issue describing it, so callers can surface the
//! substitution instead of swallowing it.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a fallback value is used instead.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A string field did not match any known variant.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A participant or default refers to a backend that has no host.
    UnknownBackend { name: String },
    /// A numeric field must be positive.
    ZeroValue { field: String },
    /// A field required by another setting is unset.
    MissingValue { field: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_error() {
        let issue = ConfigIssue {
            severity: Severity::Error,
            code: ConfigIssueCode::ZeroValue {
                field: "cache.max_entries".to_string(),
            },
            message: "cache.max_entries must be positive".to_string(),
        };
        assert!(issue.is_error());

        let warning = ConfigIssue {
            severity: Severity::Warning,
            ..issue
        };
        assert!(!warning.is_error());
    }
}
