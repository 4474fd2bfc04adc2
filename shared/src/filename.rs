/// Output filename resolution.
///
/// Priority: quoted `filename="..."` from `content-disposition`
/// (percent-decoded), then the caller's suggested name, then `"download"`.
/// A header that cannot be parsed is skipped silently.
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::errors::MetadataError;

pub const DEFAULT_FILENAME: &str = "download";

/// Where the resolved name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameSource {
    ContentDisposition,
    Suggested,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilename {
    pub name: String,
    pub source: FilenameSource,
}

/// Extract the quoted `filename` parameter of a `content-disposition` value.
///
/// `filename*` (RFC 5987) parameters are not considered.
pub fn parse_content_disposition(header: &str) -> Result<String, MetadataError> {
    let value_start = find_filename_param(header).ok_or(MetadataError::MissingFilename)?;
    let rest = header[value_start..].trim_start();
    let quoted = rest.strip_prefix('"').ok_or(MetadataError::Unquoted)?;
    let end = quoted.find('"').ok_or(MetadataError::Unterminated)?;

    let decoded = percent_decode_str(&quoted[..end])
        .decode_utf8()
        .map_err(|_| MetadataError::InvalidEncoding)?;
    if decoded.trim().is_empty() {
        return Err(MetadataError::Empty);
    }
    Ok(decoded.into_owned())
}

/// Byte offset just past the `=` of a `filename` parameter.
fn find_filename_param(header: &str) -> Option<usize> {
    const PARAM: &str = "filename";
    // ASCII lowering keeps byte offsets aligned with `header`.
    let lower = header.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    let mut from = 0;
    while let Some(pos) = lower[from..].find(PARAM) {
        let start = from + pos;
        let after = start + PARAM.len();
        from = after;

        let at_boundary = start == 0 || matches!(bytes[start - 1], b';' | b' ' | b'\t');
        if !at_boundary {
            continue;
        }
        let tail = &lower[after..];
        let trimmed = tail.trim_start();
        if let Some(value) = trimmed.strip_prefix('=') {
            return Some(lower.len() - value.len());
        }
    }
    None
}

/// Pick the output filename for a response.
pub fn resolve_filename(
    content_disposition: Option<&str>,
    suggested_filename: Option<&str>,
) -> ResolvedFilename {
    if let Some(header) = content_disposition {
        match parse_content_disposition(header) {
            Ok(name) => {
                return ResolvedFilename {
                    name,
                    source: FilenameSource::ContentDisposition,
                }
            }
            Err(e) => debug!("Ignoring content-disposition {:?}: {}", header, e),
        }
    }

    match suggested_filename.filter(|s| !s.is_empty()) {
        Some(name) => ResolvedFilename {
            name: name.to_string(),
            source: FilenameSource::Suggested,
        },
        None => ResolvedFilename {
            name: DEFAULT_FILENAME.to_string(),
            source: FilenameSource::Default,
        },
    }
}

/// Reduce a resolved name to a single safe path component.
///
/// Directory parts are dropped, characters that are invalid in common file
/// systems become `_`, and names that end up empty or as `.`/`..` fall back
/// to [`DEFAULT_FILENAME`].
pub fn sanitize_filename(name: &str) -> String {
    let last = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);

    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_filename() {
        assert_eq!(
            parse_content_disposition("attachment; filename=\"clip.mp3\""),
            Ok("clip.mp3".to_string())
        );
    }

    #[test]
    fn test_percent_decoded_filename() {
        assert_eq!(
            parse_content_disposition("attachment; filename=\"caf%C3%A9%20mix.ogg\""),
            Ok("café mix.ogg".to_string())
        );
    }

    #[test]
    fn test_case_and_spacing() {
        assert_eq!(
            parse_content_disposition("Attachment; FileName = \"Loud.WAV\"; size=10"),
            Ok("Loud.WAV".to_string())
        );
    }

    #[test]
    fn test_star_parameter_ignored() {
        let header = "attachment; filename*=UTF-8''a.mp3; filename=\"b.mp3\"";
        assert_eq!(parse_content_disposition(header), Ok("b.mp3".to_string()));
    }

    #[test]
    fn test_malformed_headers() {
        assert_eq!(
            parse_content_disposition("attachment"),
            Err(MetadataError::MissingFilename)
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=clip.mp3"),
            Err(MetadataError::Unquoted)
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=\"clip.mp3"),
            Err(MetadataError::Unterminated)
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=\"%FF%FE\""),
            Err(MetadataError::InvalidEncoding)
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=\"  \""),
            Err(MetadataError::Empty)
        );
    }

    #[test]
    fn test_header_wins_over_suggested() {
        let resolved = resolve_filename(Some("attachment; filename=\"clip.mp3\""), Some("other.mp3"));
        assert_eq!(resolved.name, "clip.mp3");
        assert_eq!(resolved.source, FilenameSource::ContentDisposition);
    }

    #[test]
    fn test_fallback_chain() {
        let resolved = resolve_filename(Some("attachment; filename=clip.mp3"), Some("song.mp3"));
        assert_eq!(resolved.name, "song.mp3");
        assert_eq!(resolved.source, FilenameSource::Suggested);

        let resolved = resolve_filename(None, None);
        assert_eq!(resolved.name, DEFAULT_FILENAME);
        assert_eq!(resolved.source, FilenameSource::Default);

        let resolved = resolve_filename(Some("inline"), Some(""));
        assert_eq!(resolved.source, FilenameSource::Default);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\music\\a.mp3"), "a.mp3");
        assert_eq!(sanitize_filename("what?.mp3"), "what_.mp3");
        assert_eq!(sanitize_filename(".."), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename("dir/"), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename("a\u{0}b.mp3"), "ab.mp3");
    }
}
