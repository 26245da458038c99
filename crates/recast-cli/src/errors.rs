//! Better error messages with actionable suggestions.

use recast_core::OutputFormat;
use std::path::Path;

/// Build an error message for an unknown `--to` format.
pub fn unknown_format_error(name: &str, enabled: &[OutputFormat]) -> String {
    let mut msg = format!("Unknown output format '{}'", name);

    if let Some(suggestion) = find_similar_format(name) {
        msg.push_str(&format!(". Did you mean '{}'?", suggestion));
    }

    let names: Vec<_> = enabled.iter().map(|f| f.extension()).collect();
    msg.push_str(&format!("\n\nSupported formats: {}", names.join(", ")));
    msg
}

/// Build an error message for a format this build cannot write.
pub fn disabled_format_error(format: OutputFormat) -> String {
    format!(
        "Output format '{}' is not enabled in this build. \
         Rebuild with: cargo build --features image-all",
        format
    )
}

/// Build an error message for file read errors.
pub fn file_read_error(path: &Path, err: &std::io::Error) -> String {
    use std::io::ErrorKind;

    let mut msg = format!("Failed to read '{}'", path.display());

    match err.kind() {
        ErrorKind::NotFound => {
            msg.push_str(": file not found");

            if let Some(suggestions) = find_similar_files(path)
                && !suggestions.is_empty()
            {
                msg.push_str(&format!(".\n\nDid you mean: {}?", suggestions.join(", ")));
            }
        }
        ErrorKind::PermissionDenied => {
            msg.push_str(": permission denied. Check file permissions.");
        }
        _ => {
            msg.push_str(&format!(": {}", err));
        }
    }

    msg
}

/// Find a known format name close to `input` (for typo suggestions).
fn find_similar_format(input: &str) -> Option<&'static str> {
    let input = input.to_lowercase();

    OutputFormat::ALL
        .iter()
        .map(|f| f.extension())
        .find(|name| levenshtein(&input, name) <= 2 && input != *name)
}

/// Simple Levenshtein distance for short strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find similar files in the same directory (for "did you mean" suggestions).
fn find_similar_files(path: &Path) -> Option<Vec<String>> {
    let filename = path.file_name()?.to_str()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let entries = std::fs::read_dir(parent).ok()?;
    let mut suggestions: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name != filename && levenshtein(filename, name) <= 2)
        .collect();

    suggestions.sort();
    suggestions.truncate(3);
    Some(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_similar_format() {
        assert_eq!(find_similar_format("pngg"), Some("png"));
        assert_eq!(find_similar_format("wepb"), Some("webp"));
        assert_eq!(find_similar_format("zzzzzz"), None);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("png", "png"), 0);
        assert_eq!(levenshtein("png", "pngg"), 1);
        assert_eq!(levenshtein("abc", "xyz"), 3);
    }

    #[test]
    fn test_unknown_format_lists_supported() {
        let msg = unknown_format_error("pngg", &[OutputFormat::Png, OutputFormat::Jpeg]);
        assert!(msg.contains("Did you mean 'png'?"));
        assert!(msg.contains("Supported formats: png, jpeg"));
    }
}
