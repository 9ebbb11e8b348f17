// SPDX-License-Identifier: MIT
//
// Title lexer: splits the arguments of a `.TH` line into fields.
//
// `.TH` arguments are usually quoted, but real pages mix styles freely:
//
//     .TH LS 1 2024-03-01 "GNU coreutils 9.5" "User Commands"
//     .TH "Foo Bar" 3
//     .TH foo"bar baz" 1
//
// A field is either a `"`-delimited run (spaces allowed inside, no escape
// processing) or a bareword ending at whitespace. A `"` in the middle of a
// bareword ends it and opens quoted mode for the *next* field. Exactly one
// delimiter byte is consumed between fields.
//
// Only the first two fields (title, section) are extracted.

use crate::error::LexError;
use crate::is_space;

/// The fields extracted from a `.TH` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFields {
    pub title: String,
    pub section: String,
}

/// Why a field scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Unquoted field hit whitespace.
    Space,
    /// Hit a `"`: either closing a quoted field or opening quoted mode.
    Quote,
    /// Ran off the end of the text.
    End,
}

/// Scan one field starting at `start`. Flips `quoted` when a quote
/// opens or closes. Returns the exclusive end of the field and why it
/// stopped.
fn field_end(bytes: &[u8], start: usize, quoted: &mut bool) -> (usize, Stop) {
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if *quoted {
            if b == b'"' {
                *quoted = false;
                return (i, Stop::Quote);
            }
        } else if is_space(b) {
            return (i, Stop::Space);
        } else if b == b'"' {
            *quoted = true;
            return (i, Stop::Quote);
        }
    }
    (bytes.len(), Stop::End)
}

fn skip_space(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).copied().is_some_and(is_space) {
        pos += 1;
    }
    pos
}

/// Open a field at `pos`: consume an opening quote if present.
fn open_field(bytes: &[u8], pos: usize, quoted: &mut bool) -> usize {
    if bytes.get(pos) == Some(&b'"') {
        *quoted = true;
        pos + 1
    } else {
        pos
    }
}

/// Extract title and section from the staged `.TH` arguments.
///
/// `line` is everything after the macro token on the `.TH` line.
///
/// # Errors
///
/// - [`LexError::MissingTitle`] if nothing (or only an empty quoted
///   field) is present.
/// - [`LexError::UnterminatedTitle`] / [`LexError::UnterminatedSection`]
///   if a quoted field has no closing quote.
/// - [`LexError::MissingSection`] if the text ends before a second field.
pub fn lex_title(line: &str) -> Result<TitleFields, LexError> {
    let bytes = line.as_bytes();
    let mut quoted = false;

    // ── Title ──
    let start = open_field(bytes, skip_space(bytes, 0), &mut quoted);
    if start >= bytes.len() {
        return Err(LexError::MissingTitle {
            line: line.to_string(),
        });
    }
    let (end, stop) = field_end(bytes, start, &mut quoted);
    match stop {
        Stop::End if quoted => {
            return Err(LexError::UnterminatedTitle {
                line: line.to_string(),
            });
        }
        Stop::End => {
            return Err(LexError::MissingSection {
                line: line.to_string(),
            });
        }
        Stop::Space | Stop::Quote => {}
    }
    if end == start {
        return Err(LexError::MissingTitle {
            line: line.to_string(),
        });
    }
    // Field boundaries sit on ASCII bytes, so these are char boundaries.
    let title = line[start..end].to_string();

    // ── Section ──
    let mut pos = end + 1;
    if !quoted {
        pos = open_field(bytes, skip_space(bytes, pos), &mut quoted);
    }
    if pos >= bytes.len() {
        return Err(LexError::MissingSection {
            line: line.to_string(),
        });
    }
    let (end, stop) = field_end(bytes, pos, &mut quoted);
    if stop == Stop::End && quoted {
        return Err(LexError::UnterminatedSection {
            line: line.to_string(),
        });
    }
    if end == pos {
        return Err(LexError::MissingSection {
            line: line.to_string(),
        });
    }
    let section = line[pos..end].to_string();

    Ok(TitleFields { title, section })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(line: &str) -> (String, String) {
        let f = lex_title(line).unwrap();
        (f.title, f.section)
    }

    fn pair(title: &str, section: &str) -> (String, String) {
        (title.to_string(), section.to_string())
    }

    // ── Accepted forms ──────────────────────────────────────────

    #[test]
    fn quoted_title_with_space() {
        assert_eq!(fields("\"Foo Bar\" 3"), pair("Foo Bar", "3"));
    }

    #[test]
    fn unquoted_fields() {
        assert_eq!(fields("foo 1"), pair("foo", "1"));
    }

    #[test]
    fn leading_whitespace_is_skipped() {
        assert_eq!(fields(" \t ls 1"), pair("ls", "1"));
    }

    #[test]
    fn both_quoted() {
        assert_eq!(fields("\"git-log\" \"1\""), pair("git-log", "1"));
    }

    #[test]
    fn extra_fields_are_ignored() {
        assert_eq!(
            fields("LS 1 2024-03-01 \"GNU coreutils 9.5\" \"User Commands\""),
            pair("LS", "1")
        );
    }

    #[test]
    fn multiple_spaces_between_fields() {
        assert_eq!(fields("cat     1"), pair("cat", "1"));
    }

    #[test]
    fn quote_directly_followed_by_section() {
        assert_eq!(fields("\"Foo Bar\"3"), pair("Foo Bar", "3"));
    }

    #[test]
    fn quote_mid_bareword_opens_quoted_section() {
        assert_eq!(fields("foo\"bar baz\" 1"), pair("foo", "bar baz"));
    }

    #[test]
    fn unquoted_section_stops_at_quote() {
        assert_eq!(fields("foo 1\"x\""), pair("foo", "1"));
    }

    #[test]
    fn section_runs_to_end_of_text() {
        assert_eq!(fields("foo 3p"), pair("foo", "3p"));
    }

    #[test]
    fn trailing_carriage_return_is_whitespace() {
        assert_eq!(fields("foo 1 x\r"), pair("foo", "1"));
    }

    #[test]
    fn non_ascii_title() {
        assert_eq!(fields("\"café crème\" 7"), pair("café crème", "7"));
    }

    // ── Rejected forms ──────────────────────────────────────────

    #[test]
    fn unterminated_title() {
        let err = lex_title("\"Unterminated 3").unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedTitle {
                line: "\"Unterminated 3".to_string()
            }
        );
    }

    #[test]
    fn unterminated_section() {
        assert!(matches!(
            lex_title("foo \"1"),
            Err(LexError::UnterminatedSection { .. })
        ));
    }

    #[test]
    fn empty_text() {
        assert!(matches!(lex_title(""), Err(LexError::MissingTitle { .. })));
        assert!(matches!(
            lex_title("   "),
            Err(LexError::MissingTitle { .. })
        ));
    }

    #[test]
    fn lone_quote() {
        assert!(matches!(
            lex_title(" \""),
            Err(LexError::MissingTitle { .. })
        ));
    }

    #[test]
    fn empty_quoted_title() {
        assert!(matches!(
            lex_title("\"\" 1"),
            Err(LexError::MissingTitle { .. })
        ));
    }

    #[test]
    fn title_without_section() {
        assert!(matches!(
            lex_title("foo"),
            Err(LexError::MissingSection { .. })
        ));
        assert!(matches!(
            lex_title("foo   "),
            Err(LexError::MissingSection { .. })
        ));
        assert!(matches!(
            lex_title("\"Foo Bar\""),
            Err(LexError::MissingSection { .. })
        ));
    }

    #[test]
    fn empty_quoted_section() {
        assert!(matches!(
            lex_title("foo \"\""),
            Err(LexError::MissingSection { .. })
        ));
    }

    #[test]
    fn error_carries_raw_line() {
        let err = lex_title("foo \"1").unwrap_err();
        assert_eq!(err.line(), "foo \"1");
    }
}
