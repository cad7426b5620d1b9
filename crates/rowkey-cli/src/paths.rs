//! Output path defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix inserted before the input's extension.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_with_ids";

/// Derives the output path for `input`: `data.csv` -> `data_with_ids.csv`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut name = OsString::from(stem);
    name.push(DEFAULT_OUTPUT_SUFFIX);
    if let Some(extension) = input.extension() {
        name.push(".");
        name.push(extension);
    }
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_suffix_before_extension() {
        assert_eq!(
            default_output_path(Path::new("data/clients.csv")),
            PathBuf::from("data/clients_with_ids.csv")
        );
    }

    #[test]
    fn test_without_extension() {
        assert_eq!(
            default_output_path(Path::new("clients")),
            PathBuf::from("clients_with_ids")
        );
    }

    #[test]
    fn test_only_last_extension_moves() {
        assert_eq!(
            default_output_path(Path::new("export.2024.csv")),
            PathBuf::from("export.2024_with_ids.csv")
        );
    }

    #[test]
    fn test_hidden_file() {
        assert_eq!(
            default_output_path(Path::new(".clients")),
            PathBuf::from(".clients_with_ids")
        );
    }
}
