use anyhow::{Result, anyhow};
use std::path::Path;

/// Sanitizes a client-supplied filename before it is used in a staged path.
/// Strips any directory components and replaces reserved characters.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Get only the filename component (remove any path)
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(anyhow!("Filename cannot be empty"));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    // Block path separators and reserved characters, allow the rest
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    if sanitized.starts_with('.') {
        return Err(anyhow!("Hidden files (starting with '.') are not allowed"));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_passes_through() {
        assert_eq!(sanitize_filename("video.mp4").unwrap(), "video.mp4");
        assert_eq!(sanitize_filename("my photo.jpg").unwrap(), "my photo.jpg");
    }

    #[test]
    fn test_path_components_are_stripped() {
        assert_eq!(
            sanitize_filename("/etc/passwd/clip.mp4").unwrap(),
            "clip.mp4"
        );
        assert_eq!(sanitize_filename("../../clip.mp4").unwrap(), "clip.mp4");
    }

    #[test]
    fn test_reserved_characters_are_replaced() {
        assert_eq!(sanitize_filename("a:b*c.mp4").unwrap(), "a_b_c.mp4");
    }

    #[test]
    fn test_empty_and_hidden_names_rejected() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename(".hidden").is_err());
    }

    #[test]
    fn test_long_names_truncated() {
        let long = "a".repeat(300) + ".mp4";
        let sanitized = sanitize_filename(&long).unwrap();
        assert!(sanitized.len() <= 255);
    }
}
