use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    NothingToUndo,
    InvalidFormat,
    FavoriteNotFound,
    InvalidSetting,
    EmptyTopic,
    InvalidWordCount,
    WordCountMismatch,
    GeneratorUnavailable,
    DuplicateTopic,
    ConfirmationRequired,
    StoreWriteFailed,
    StoreReadFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::NothingToUndo => "E2001",
            Self::InvalidFormat => "E2002",
            Self::FavoriteNotFound => "E2003",
            Self::InvalidSetting => "E2004",
            Self::EmptyTopic => "E3001",
            Self::InvalidWordCount => "E3002",
            Self::WordCountMismatch => "E3003",
            Self::GeneratorUnavailable => "E3004",
            Self::DuplicateTopic => "E3005",
            Self::ConfirmationRequired => "E2005",
            Self::StoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::StoreReadFailed => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::NothingToUndo => "Nothing to undo",
            Self::InvalidFormat => "Invalid file format",
            Self::FavoriteNotFound => "Favorite not found",
            Self::InvalidSetting => "Invalid setting",
            Self::EmptyTopic => "Topic is empty",
            Self::InvalidWordCount => "Invalid word count",
            Self::WordCountMismatch => "Generator returned the wrong number of words",
            Self::GeneratorUnavailable => "Generator request failed",
            Self::DuplicateTopic => "Topic was just generated",
            Self::ConfirmationRequired => "Confirmation required",
            Self::StoreWriteFailed => "Store write failed",
            Self::LockContention => "Lock contention",
            Self::StoreReadFailed => "Store read failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => {
                Some("Fix syntax in ~/.config/topicwords/config.toml and retry.")
            }
            Self::NothingToUndo => None,
            Self::InvalidFormat => Some("Import expects a JSON array of favorites."),
            Self::FavoriteNotFound => Some("Use `tw favorites` to list saved word sequences."),
            Self::InvalidSetting => Some(
                "Known settings: animations, sounds, autocomplete, duplicate-warning, view-mode.",
            ),
            Self::EmptyTopic => Some("Please enter a topic."),
            Self::InvalidWordCount => Some("Use a word count of at least 1."),
            Self::WordCountMismatch => Some("Try again; the generator may answer differently."),
            Self::GeneratorUnavailable => {
                Some("Check your network and the configured generator endpoint.")
            }
            Self::DuplicateTopic => Some("Pass --force to generate it again."),
            Self::ConfirmationRequired => Some("Re-run with --yes to confirm."),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `tw` process releases its lock."),
            Self::StoreReadFailed => Some("Check read permissions on the data directory."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::NothingToUndo,
            ErrorCode::InvalidFormat,
            ErrorCode::FavoriteNotFound,
            ErrorCode::InvalidSetting,
            ErrorCode::EmptyTopic,
            ErrorCode::InvalidWordCount,
            ErrorCode::WordCountMismatch,
            ErrorCode::GeneratorUnavailable,
            ErrorCode::DuplicateTopic,
            ErrorCode::ConfirmationRequired,
            ErrorCode::StoreWriteFailed,
            ErrorCode::StoreReadFailed,
            ErrorCode::LockContention,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::NothingToUndo.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }
}
