//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad args, unreadable input file)    |
//! | 3    | An input is not a readable delimited table       |
//! | 4    | Required columns missing                         |
//! | 5    | An input has no data rows                        |
//! | 6    | Duplicate contract keys (duplicates = "reject")  |
//! | 7    | Recon config invalid                             |
//! | 8    | Report could not be rendered or written          |

use provcmp_recon::ErrorCategory;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (JSON serialization, stdout closed).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

/// Input could not be decoded or tokenized.
pub const EXIT_PARSE: u8 = 3;

/// Required columns missing from an input.
pub const EXIT_SCHEMA: u8 = 4;

/// Input has a header but no data rows.
pub const EXIT_EMPTY_INPUT: u8 = 5;

/// Duplicate keys found in input.
pub const EXIT_DUPLICATE: u8 = 6;

/// Recon config could not be parsed or failed validation.
pub const EXIT_CONFIG: u8 = 7;

/// Rendering or artifact write failed.
pub const EXIT_OUTPUT: u8 = 8;

/// Map an engine error category to its exit code.
pub fn recon_exit_code(category: ErrorCategory) -> u8 {
    match category {
        ErrorCategory::ParseError => EXIT_PARSE,
        ErrorCategory::SchemaError => EXIT_SCHEMA,
        ErrorCategory::EmptyInputError => EXIT_EMPTY_INPUT,
        ErrorCategory::DuplicateKeyError => EXIT_DUPLICATE,
        ErrorCategory::ConfigError => EXIT_CONFIG,
        ErrorCategory::RenderError | ErrorCategory::IoError => EXIT_OUTPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_PARSE, EXIT_SCHEMA,
            EXIT_EMPTY_INPUT, EXIT_DUPLICATE, EXIT_CONFIG, EXIT_OUTPUT,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn render_and_io_share_output_code() {
        assert_eq!(recon_exit_code(ErrorCategory::RenderError), EXIT_OUTPUT);
        assert_eq!(recon_exit_code(ErrorCategory::IoError), EXIT_OUTPUT);
        assert_eq!(recon_exit_code(ErrorCategory::SchemaError), EXIT_SCHEMA);
    }
}
