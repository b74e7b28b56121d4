//! Error types for the example-data crate.
//!
//! Registry parsing and roster generation fail with separate semantic enums
//! built with `thiserror`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing or querying a seed registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry file could not be read.
    #[error("failed to read registry file at '{path}': {message}")]
    IoError {
        /// Path to the registry file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The registry JSON is malformed or missing required fields.
    #[error("invalid registry JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The registry version is not supported.
    #[error("unsupported registry version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the registry.
        actual: u32,
    },

    /// The email domain cannot form valid addresses.
    #[error("invalid email domain: '{value}'")]
    InvalidEmailDomain {
        /// The rejected domain.
        value: String,
    },

    /// A department label is blank.
    #[error("department at index {index} is blank")]
    BlankDepartment {
        /// Index of the blank entry in the array.
        index: usize,
    },

    /// The registry contains no seed definitions.
    #[error("registry contains no seed definitions")]
    EmptySeeds,

    /// Two seed definitions share a name.
    #[error("seed '{name}' is defined more than once")]
    DuplicateSeed {
        /// The repeated seed name.
        name: String,
    },

    /// The requested seed name was not found in the registry.
    #[error("seed '{name}' not found in registry")]
    SeedNotFound {
        /// The seed name that was not found.
        name: String,
    },
}

/// Errors that can occur during roster generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Failed to generate a valid user name after maximum retries.
    #[error("failed to generate valid user name after {max_attempts} attempts")]
    NameGenerationFailed {
        /// Number of attempts made before giving up.
        max_attempts: usize,
    },

    /// The seed asks for an empty roster.
    #[error("seed '{name}' requests zero users")]
    EmptyRoster {
        /// Name of the offending seed.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::io(
        RegistryError::IoError {
            path: PathBuf::from("/tmp/seeds.json"),
            message: "file not found".to_owned(),
        },
        "failed to read registry file at '/tmp/seeds.json': file not found"
    )]
    #[case::version(
        RegistryError::UnsupportedVersion { expected: 1, actual: 2 },
        "unsupported registry version: expected 1, found 2"
    )]
    #[case::domain(
        RegistryError::InvalidEmailDomain { value: "nodot".to_owned() },
        "invalid email domain: 'nodot'"
    )]
    #[case::department(
        RegistryError::BlankDepartment { index: 3 },
        "department at index 3 is blank"
    )]
    #[case::duplicate(
        RegistryError::DuplicateSeed { name: "mossy-owl".to_owned() },
        "seed 'mossy-owl' is defined more than once"
    )]
    #[case::missing(
        RegistryError::SeedNotFound { name: "mossy-owl".to_owned() },
        "seed 'mossy-owl' not found in registry"
    )]
    fn registry_errors_format(#[case] err: RegistryError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn generation_errors_format() {
        assert_eq!(
            GenerationError::NameGenerationFailed { max_attempts: 100 }.to_string(),
            "failed to generate valid user name after 100 attempts"
        );
        assert_eq!(
            GenerationError::EmptyRoster {
                name: "empty".to_owned()
            }
            .to_string(),
            "seed 'empty' requests zero users"
        );
    }
}
