//! Tag Scanner
//!
//! Pulls the interior text of the next start or end tag out of a raw XML
//! buffer. Comments are skipped, and newlines are counted so that every tag
//! can be attributed to the line its `<` sits on.
//!
//! The scanner keeps no state of its own: the caller hands in a [`Cursor`]
//! and gets the advanced cursor back inside the result, so independent
//! documents can be scanned from any number of threads.

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Position of the scanner within a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Byte offset of the next character to scan
    pub offset: usize,
    /// 1-based line number at `offset`
    pub line: usize,
}

impl Cursor {
    /// Cursor at the start of a buffer, on line 1
    pub fn start() -> Self {
        Self { offset: 0, line: 1 }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::start()
    }
}

/// A tag's interior text and where it was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTag<'a> {
    /// Everything between `<` and `>`, both exclusive
    pub body: &'a str,
    /// Byte offset of the opening `<`
    pub start: usize,
    /// Line of the opening `<`
    pub start_line: usize,
    /// Scanner position just past the closing `>`
    pub end: Cursor,
}

impl<'a> RawTag<'a> {
    pub fn tag_len(&self) -> usize {
        self.body.len()
    }

    /// Leading element name of the tag body
    pub fn name(&self) -> &'a str {
        parse_tag_name(self.body)
    }
}

/// Why the scanner stopped without producing a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// No further `<` in the buffer (possibly after skipping comments)
    EndOfInput,
    /// A tag opened on `start_line` has no closing `>`
    UnterminatedTag { start_line: usize },
    /// A comment opened on `start_line` has no closing `-->`
    UnterminatedComment { start_line: usize },
}

/// Terminal state of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEnd {
    /// Line counter as left by comment skipping
    pub line: usize,
    pub reason: EndReason,
}

/// Outcome of [`next_tag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScan<'a> {
    Tag(RawTag<'a>),
    End(ScanEnd),
}

impl<'a> TagScan<'a> {
    /// Offset just past the tag, or 0 when no tag was produced
    pub fn offset(&self) -> usize {
        match self {
            TagScan::Tag(tag) => tag.end.offset,
            TagScan::End(_) => 0,
        }
    }

    /// Length of the tag body, or 0 when no tag was produced
    pub fn tag_len(&self) -> usize {
        match self {
            TagScan::Tag(tag) => tag.tag_len(),
            TagScan::End(_) => 0,
        }
    }

    /// Running line counter after the scan
    pub fn line(&self) -> usize {
        match self {
            TagScan::Tag(tag) => tag.end.line,
            TagScan::End(end) => end.line,
        }
    }

    pub fn tag(&self) -> Option<&RawTag<'a>> {
        match self {
            TagScan::Tag(tag) => Some(tag),
            TagScan::End(_) => None,
        }
    }
}

/// Scan `buf` from `cursor` for the next tag that is not a comment.
pub fn next_tag(buf: &str, cursor: Cursor) -> TagScan<'_> {
    let bytes = buf.as_bytes();
    let mut pos = cursor.offset.min(bytes.len());
    let mut line = cursor.line;

    loop {
        while pos < bytes.len() && bytes[pos] != b'<' {
            if bytes[pos] == b'\n' {
                line += 1;
            }
            pos += 1;
        }

        if pos >= bytes.len() {
            return TagScan::End(ScanEnd {
                line,
                reason: EndReason::EndOfInput,
            });
        }

        let start_line = line;

        if buf[pos..].starts_with(COMMENT_OPEN) {
            let content = pos + COMMENT_OPEN.len();
            match buf[content..].find(COMMENT_CLOSE) {
                Some(rel) => {
                    let after = content + rel + COMMENT_CLOSE.len();
                    line += count_newlines(&buf[pos..after]);
                    pos = after;
                    continue;
                }
                None => {
                    return TagScan::End(ScanEnd {
                        line,
                        reason: EndReason::UnterminatedComment { start_line },
                    });
                }
            }
        }

        let body_start = pos + 1;
        return match buf[body_start..].find('>') {
            Some(rel) => {
                let body = &buf[body_start..body_start + rel];
                TagScan::Tag(RawTag {
                    body,
                    start: pos,
                    start_line,
                    end: Cursor {
                        offset: body_start + rel + 1,
                        line: line + count_newlines(body),
                    },
                })
            }
            None => TagScan::End(ScanEnd {
                line,
                reason: EndReason::UnterminatedTag { start_line },
            }),
        };
    }
}

/// Split the element name off a tag body at the first whitespace.
///
/// Leading whitespace is not stripped: `" stream"` yields an empty name.
pub fn parse_tag_name(body: &str) -> &str {
    match body.find(char::is_whitespace) {
        Some(idx) => &body[..idx],
        None => body,
    }
}

pub(crate) fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

/// Iterator over every tag of a buffer
pub struct Tags<'a> {
    buf: &'a str,
    cursor: Cursor,
    end: Option<ScanEnd>,
}

impl<'a> Tags<'a> {
    pub fn new(buf: &'a str) -> Self {
        Self {
            buf,
            cursor: Cursor::start(),
            end: None,
        }
    }

    /// How the scan ended, once the iterator is exhausted
    pub fn end(&self) -> Option<&ScanEnd> {
        self.end.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = RawTag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end.is_some() {
            return None;
        }
        match next_tag(self.buf, self.cursor) {
            TagScan::Tag(tag) => {
                self.cursor = tag.end;
                Some(tag)
            }
            TagScan::End(end) => {
                self.end = Some(end);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_basic() {
        assert_eq!(parse_tag_name("stream name=\"foo\""), "stream");
    }

    #[test]
    fn test_tag_name_without_attributes() {
        assert_eq!(parse_tag_name("stream"), "stream");
    }

    #[test]
    fn test_tag_name_leading_space_is_callers_job() {
        let body = " stream name=\"foo\"";
        assert_eq!(parse_tag_name(body), "");
        assert_eq!(parse_tag_name(&body[1..]), "stream");
    }

    #[test]
    fn test_tag_name_empty() {
        assert_eq!(parse_tag_name(""), "");
    }

    #[test]
    fn test_simple_tag() {
        let xml = "<stream name=\"foo\">";
        let scan = next_tag(xml, Cursor::start());
        let tag = scan.tag().unwrap();

        assert_eq!(tag.body, "stream name=\"foo\"");
        assert_eq!(scan.tag_len(), "stream name=\"foo\"".len());
        assert_eq!(tag.start_line, 1);
        assert_eq!(scan.offset(), xml.len());
    }

    #[test]
    fn test_skips_comment() {
        let xml = "<!-- this is a comment -->\n<stream name=\"bar\">";
        let scan = next_tag(xml, Cursor::start());

        assert_eq!(scan.tag().unwrap().body, "stream name=\"bar\"");
        assert_eq!(scan.line(), 2);
        assert_eq!(scan.tag().unwrap().start_line, 2);
    }

    #[test]
    fn test_multiline_comment_counts_lines() {
        let xml = "<!-- one\ntwo\nthree -->\n<a>";
        let scan = next_tag(xml, Cursor::start());
        assert_eq!(scan.tag().unwrap().start_line, 4);
    }

    #[test]
    fn test_handles_newlines() {
        let xml = "\n\n  \n<stream type=\"output\">";
        let scan = next_tag(xml, Cursor::start());

        assert_eq!(scan.tag().unwrap().body, "stream type=\"output\"");
        assert_eq!(scan.tag().unwrap().start_line, 4);
    }

    #[test]
    fn test_newlines_inside_tag_advance_counter() {
        let xml = "<stream\n  name=\"a\"\n/>";
        let scan = next_tag(xml, Cursor::start());
        assert_eq!(scan.tag().unwrap().start_line, 1);
        assert_eq!(scan.line(), 3);
    }

    #[test]
    fn test_missing_closing_bracket() {
        let scan = next_tag("<stream", Cursor::start());

        assert_eq!(scan.offset(), 0);
        assert_eq!(scan.tag_len(), 0);
        assert!(matches!(
            scan,
            TagScan::End(ScanEnd {
                reason: EndReason::UnterminatedTag { start_line: 1 },
                ..
            })
        ));
    }

    #[test]
    fn test_only_comment() {
        let scan = next_tag("<!-- only comment -->", Cursor::start());

        assert_eq!(scan.offset(), 0);
        assert_eq!(scan.tag_len(), 0);
    }

    #[test]
    fn test_unterminated_comment() {
        let scan = next_tag("\n<!-- never ends <a>", Cursor::start());
        assert_eq!(
            scan,
            TagScan::End(ScanEnd {
                line: 2,
                reason: EndReason::UnterminatedComment { start_line: 2 },
            })
        );
    }

    #[test]
    fn test_resumes_from_cursor() {
        let xml = "<a>\n<b/>";
        let first = next_tag(xml, Cursor::start());
        let second = next_tag(xml, first.tag().unwrap().end);

        assert_eq!(second.tag().unwrap().body, "b/");
        assert_eq!(second.tag().unwrap().start_line, 2);
    }

    #[test]
    fn test_tags_iterator() {
        let xml = "<streams>\n  <!-- <ignored> -->\n  <stream name=\"a\"/>\n</streams>\n";
        let mut tags = Tags::new(xml);
        let names: Vec<(&str, usize)> = tags.by_ref().map(|t| (t.name(), t.start_line)).collect();

        assert_eq!(
            names,
            vec![("streams", 1), ("stream", 3), ("/streams", 4)]
        );
        assert_eq!(tags.end().unwrap().reason, EndReason::EndOfInput);
        assert_eq!(tags.end().unwrap().line, 5);
    }
}
