//! Local character sanitation applied before chunking.
//!
//! PDF extractions carry typographic quotes, soft hyphens, and stray control
//! characters that trip up TTS services. This pass is purely local; the
//! optional remote rewrite in [`super::rewrite`] handles structural cleanup
//! (page numbers, headers, references).

/// Sanitize text for TTS: replace typographic characters with ASCII
/// equivalents, drop control and zero-width characters, and normalize
/// whitespace while preserving paragraph breaks.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{2032}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{2033}' | '\u{00ab}' | '\u{00bb}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2011}' | '\u{2012}' | '\u{2015}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00a0}' => out.push(' '),
            // Zero-width characters and BOM
            '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' | '\u{00ad}' => {}
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    normalize_whitespace(&out)
}

/// Collapse runs of spaces/tabs to one space and runs of three or more
/// newlines to a paragraph break.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_spaces = false;
    let mut newlines = 0;

    for c in text.chars() {
        match c {
            '\n' => {
                newlines += 1;
                pending_spaces = false;
                if newlines <= 2 {
                    out.push('\n');
                }
            }
            ' ' | '\t' => pending_spaces = true,
            c => {
                if pending_spaces && !out.is_empty() && newlines == 0 {
                    out.push(' ');
                }
                pending_spaces = false;
                newlines = 0;
                out.push(c);
            }
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smart_quotes() {
        let text = "\u{201c}Hello,\u{201d} said John. \u{2018}It\u{2019}s nice.\u{2019}";
        assert_eq!(sanitize(text), "\"Hello,\" said John. 'It's nice.'");
    }

    #[test]
    fn test_dashes_and_ellipsis() {
        assert_eq!(sanitize("one–two—three…"), "one-two-three...");
    }

    #[test]
    fn test_control_and_zero_width_chars() {
        assert_eq!(sanitize("Hello\x00World\u{200b}!\u{feff}"), "HelloWorld!");
    }

    #[test]
    fn test_whitespace_normalized() {
        assert_eq!(sanitize("Hello   world\t!"), "Hello world !");
    }

    #[test]
    fn test_paragraph_breaks_preserved() {
        assert_eq!(
            sanitize("First para.\n\n\n\nSecond para.\n"),
            "First para.\n\nSecond para."
        );
    }

    #[test]
    fn test_trailing_space_before_newline_dropped() {
        assert_eq!(sanitize("line one \nline two"), "line one\nline two");
    }
}
