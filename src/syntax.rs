//! Syntax Checker
//!
//! A purely lexical pass run before a document is handed to the XML parse
//! tree. It verifies bracket, quote and tag balance and reports the first
//! problem with the line it occurred on. Attribute meaning is never looked at.

use tracing::debug;

use crate::error::SyntaxError;
use crate::scanner::{Cursor, EndReason, RawTag, TagScan, count_newlines, next_tag, parse_tag_name};

/// Check global well-formedness of `text`.
pub fn check_syntax(text: &str) -> Result<(), SyntaxError> {
    let mut cursor = Cursor::start();
    let mut open: Vec<(&str, usize)> = Vec::new();

    loop {
        match next_tag(text, cursor) {
            TagScan::Tag(tag) => {
                check_character_data(&text[cursor.offset..tag.start], cursor.line)?;
                check_tag_body(&tag)?;
                match classify(&tag)? {
                    TagKind::Open(name) => open.push((name, tag.start_line)),
                    TagKind::Close(name) => match open.pop() {
                        Some((expected, _)) if expected == name => {}
                        Some((expected, _)) => {
                            return Err(SyntaxError::MismatchedClosingTag {
                                expected: expected.to_string(),
                                found: name.to_string(),
                                line: tag.start_line,
                            });
                        }
                        None => {
                            return Err(SyntaxError::UnexpectedClosingTag {
                                found: name.to_string(),
                                line: tag.start_line,
                            });
                        }
                    },
                    TagKind::SelfClosing | TagKind::Markup => {}
                }
                cursor = tag.end;
            }
            TagScan::End(end) => match end.reason {
                EndReason::EndOfInput => {
                    check_character_data(&text[cursor.offset..], cursor.line)?;
                    break;
                }
                EndReason::UnterminatedTag { start_line } => {
                    return Err(SyntaxError::UnterminatedTag { line: start_line });
                }
                EndReason::UnterminatedComment { start_line } => {
                    return Err(SyntaxError::UnterminatedComment { line: start_line });
                }
            },
        }
    }

    if let Some((name, line)) = open.pop() {
        return Err(SyntaxError::UnclosedTag {
            name: name.to_string(),
            line,
        });
    }

    debug!(lines = cursor.line, "syntax check passed");
    Ok(())
}

/// `true` when [`check_syntax`] passes
pub fn is_well_formed(text: &str) -> bool {
    check_syntax(text).is_ok()
}

enum TagKind<'a> {
    Open(&'a str),
    Close(&'a str),
    SelfClosing,
    /// `<?...?>` and `<!...>` constructs
    Markup,
}

fn classify<'a>(tag: &RawTag<'a>) -> Result<TagKind<'a>, SyntaxError> {
    let body = tag.body;
    if body.starts_with('?') || body.starts_with('!') {
        return Ok(TagKind::Markup);
    }

    let empty = SyntaxError::EmptyTag {
        line: tag.start_line,
    };

    if let Some(rest) = body.strip_prefix('/') {
        let name = parse_tag_name(rest);
        if name.is_empty() {
            return Err(empty);
        }
        return Ok(TagKind::Close(name));
    }

    if let Some(rest) = body.trim_end().strip_suffix('/') {
        if parse_tag_name(rest).is_empty() {
            return Err(empty);
        }
        return Ok(TagKind::SelfClosing);
    }

    let name = parse_tag_name(body);
    if name.is_empty() {
        return Err(empty);
    }
    Ok(TagKind::Open(name))
}

/// Quotes must pair up and no `<` may appear outside them.
fn check_tag_body(tag: &RawTag<'_>) -> Result<(), SyntaxError> {
    let mut quote: Option<u8> = None;
    for b in tag.body.bytes() {
        match (quote, b) {
            (None, b'"') | (None, b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'<') => {
                return Err(SyntaxError::BracketInTag {
                    line: tag.start_line,
                });
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(SyntaxError::UnbalancedQuotes {
            line: tag.start_line,
        });
    }
    Ok(())
}

/// Text between tags may hold comments but no bare `>`.
fn check_character_data(data: &str, mut line: usize) -> Result<(), SyntaxError> {
    let mut rest = data;
    loop {
        let (text, comment) = match rest.find("<!--") {
            Some(idx) => (&rest[..idx], Some(&rest[idx..])),
            None => (rest, None),
        };

        for b in text.bytes() {
            match b {
                b'\n' => line += 1,
                b'>' => return Err(SyntaxError::StrayCloseBracket { line }),
                _ => {}
            }
        }

        let Some(comment) = comment else {
            return Ok(());
        };
        // The scanner already walked past this comment, so it is terminated.
        let Some(close) = comment[4..].find("-->") else {
            return Ok(());
        };
        let consumed = 4 + close + 3;
        line += count_newlines(&comment[..consumed]);
        rest = &comment[consumed..];
    }
}
