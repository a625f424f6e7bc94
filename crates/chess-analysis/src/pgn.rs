//! Reading and writing the annotated game records the pipelines work on.
//!
//! The reader understands as much PGN as main-line replay needs: tag pairs,
//! move numbers, NAGs, brace and rest-of-line comments, and recursive
//! variations (skipped). Brace comments are collected as the pending comment
//! of the next move.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::warn;

/// Longest move token accepted by default, in bytes.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 11;

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Errors raised while reading game records.
#[derive(Debug, Error)]
pub enum PgnError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("move token `{token}` is longer than {max} bytes")]
    TokenTooLong { token: String, max: usize },
}

/// The tag pairs heading one game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeader {
    pub tags: Vec<(String, String)>,
}

impl GameHeader {
    /// Value of the first tag named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }

    /// The game's result token, `*` when the header has none.
    pub fn result(&self) -> &str {
        self.get("Result").unwrap_or("*")
    }

    /// True if the game starts from a set-up position.
    pub fn is_setup(&self) -> bool {
        self.get("SetUp") == Some("1") || self.get("FEN").is_some()
    }

    /// The set-up position, if any.
    pub fn fen(&self) -> Option<&str> {
        self.get("FEN")
    }
}

/// Parses `[Name "value"]`, unescaping `\"` and `\\` in the value.
fn parse_tag(line: &str) -> Option<(String, String)> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (name, rest) = inner.split_once(char::is_whitespace)?;
    let quoted = rest.trim().strip_prefix('"')?;

    let mut value = String::new();
    let mut chars = quoted.chars();
    loop {
        match chars.next()? {
            '\\' => value.push(chars.next()?),
            '"' => break,
            c => value.push(c),
        }
    }
    Some((name.to_string(), value))
}

/// Strips a leading move number: `12.`, `12...e5`, `1.e4`. A bare `...`
/// continuation marker strips to nothing.
fn strip_move_number(token: &str) -> &str {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if token[digits..].starts_with('.') {
        token[digits..].trim_start_matches('.')
    } else {
        token
    }
}

/// Streaming reader over a sequence of games.
pub struct PgnReader<R> {
    inner: R,
    line: Vec<u8>,
    pos: usize,
    comment: String,
    max_token_len: usize,
}

impl<R: BufRead> PgnReader<R> {
    pub fn new(inner: R) -> Self {
        PgnReader {
            inner,
            line: Vec::new(),
            pos: 0,
            comment: String::new(),
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }

    /// Sets the longest move token accepted before [`PgnError::TokenTooLong`].
    pub fn with_max_token_len(mut self, max_token_len: usize) -> Self {
        self.max_token_len = max_token_len;
        self
    }

    /// Next byte without consuming it, reading a new line when needed.
    fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.line.len() {
            self.line.clear();
            self.pos = 0;
            if self.inner.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
        }
        Ok(Some(self.line[self.pos]))
    }

    #[inline]
    fn at_line_start(&self) -> bool {
        self.pos == 0
    }

    fn rest_of_line(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.line[self.pos..]).into_owned();
        self.pos = self.line.len();
        rest
    }

    /// Consumes a `{ ... }` comment, the opening brace included.
    /// Returns None when input ends first.
    fn read_brace_comment(&mut self) -> io::Result<Option<String>> {
        self.pos += 1;
        let mut text = Vec::new();
        while let Some(b) = self.peek()? {
            self.pos += 1;
            if b == b'}' {
                return Ok(Some(String::from_utf8_lossy(&text).into_owned()));
            }
            text.push(b);
        }
        Ok(None)
    }

    /// Consumes a `( ... )` variation, nested ones and their comments included.
    fn skip_variation(&mut self) -> io::Result<()> {
        let mut depth = 0usize;
        while let Some(b) = self.peek()? {
            match b {
                b'{' => {
                    self.read_brace_comment()?;
                    continue;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// Reads the next game's tag pairs.
    ///
    /// Movetext left over from the previous game is skipped. Returns None
    /// once the input holds no further header.
    pub fn read_header(&mut self) -> Result<Option<GameHeader>, PgnError> {
        while let Some(b) = self.peek()? {
            if b == b'[' && self.at_line_start() {
                break;
            }
            if b == b'{' {
                self.read_brace_comment()?;
            } else {
                self.pos += 1;
            }
        }
        self.comment.clear();

        let mut header = GameHeader::default();
        while let Some(b) = self.peek()? {
            if !self.at_line_start() || b != b'[' {
                break;
            }
            let line = self.rest_of_line();
            match parse_tag(&line) {
                Some(tag) => header.tags.push(tag),
                None => warn!(line = %line.trim_end(), "ignoring malformed tag pair"),
            }
        }

        Ok(if header.tags.is_empty() {
            None
        } else {
            Some(header)
        })
    }

    /// Returns the next main-line move token.
    ///
    /// Returns None at the game's result token, at the next game's header or
    /// at the end of input.
    pub fn next_move(&mut self) -> Result<Option<String>, PgnError> {
        while let Some(b) = self.peek()? {
            match b {
                b'[' if self.at_line_start() => return Ok(None),
                b'{' => {
                    if let Some(text) = self.read_brace_comment()? {
                        let text = text.trim();
                        if !text.is_empty() {
                            if !self.comment.is_empty() {
                                self.comment.push(' ');
                            }
                            self.comment.push_str(text);
                        }
                    }
                }
                b';' => {
                    self.rest_of_line();
                }
                b'(' => self.skip_variation()?,
                b'$' => {
                    self.pos += 1;
                    while let Some(d) = self.peek()? {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                b if b.is_ascii_whitespace() || b == b')' || b == b'}' => self.pos += 1,
                _ => {
                    let token = self.read_token()?;
                    if RESULTS.contains(&token.as_str()) {
                        return Ok(None);
                    }
                    let san = strip_move_number(&token)
                        .trim_end_matches(|c: char| c == '!' || c == '?');
                    if san.is_empty() {
                        continue;
                    }
                    if san.len() > self.max_token_len {
                        return Err(PgnError::TokenTooLong {
                            token: san.to_string(),
                            max: self.max_token_len,
                        });
                    }
                    return Ok(Some(san.to_string()));
                }
            }
        }
        Ok(None)
    }

    fn read_token(&mut self) -> io::Result<String> {
        let mut token = Vec::new();
        while let Some(b) = self.peek()? {
            if b.is_ascii_whitespace() || b"{}();$".contains(&b) {
                break;
            }
            token.push(b);
            self.pos += 1;
            if self.pos >= self.line.len() {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&token).into_owned())
    }

    /// Returns the comment collected before the last move token and clears it.
    pub fn take_comment(&mut self) -> String {
        std::mem::take(&mut self.comment)
    }
}

/// Writes games in the simplified annotated format the pipelines produce.
pub struct PgnWriter<W> {
    inner: W,
}

impl<W: Write> PgnWriter<W> {
    pub fn new(inner: W) -> Self {
        PgnWriter { inner }
    }

    /// Tag pairs followed by a blank line.
    pub fn header(&mut self, header: &GameHeader) -> io::Result<()> {
        for (name, value) in &header.tags {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            writeln!(self.inner, "[{} \"{}\"]", name, escaped)?;
        }
        writeln!(self.inner)
    }

    /// Move number before the move played at `ply`.
    ///
    /// White's moves get `N. `; Black's only when it opens the movetext,
    /// as `N... `.
    pub fn move_number(&mut self, ply: u32, first_of_game: bool) -> io::Result<()> {
        let number = 1 + ply / 2;
        if ply % 2 == 0 {
            write!(self.inner, "{}. ", number)
        } else if first_of_game {
            write!(self.inner, "{}... ", number)
        } else {
            Ok(())
        }
    }

    pub fn san(&mut self, san: &str) -> io::Result<()> {
        write!(self.inner, "{} ", san)
    }

    /// Writes `fragment` unchanged.
    pub fn raw(&mut self, fragment: &str) -> io::Result<()> {
        self.inner.write_all(fragment.as_bytes())
    }

    /// Result token closing the game, then a blank line.
    pub fn result(&mut self, result: &str) -> io::Result<()> {
        write!(self.inner, "{}\n\n", result)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> PgnReader<&[u8]> {
        PgnReader::new(text.as_bytes())
    }

    fn all_moves(reader: &mut PgnReader<&[u8]>) -> Vec<String> {
        std::iter::from_fn(|| reader.next_move().unwrap()).collect()
    }

    const TWO_GAMES: &str = r#"[Event "Casual"]
[White "A \"the\" player"]
[Result "1-0"]

1. e4 {first} e5 2. Nf3 $1 Nc6!? (2... d6 {Philidor} (2... f5)) 3. Bb5 ; Spanish
a6 1-0

[Event "Second"]
[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 b - - 0 1"]

1... Kd7 2.e4 *
"#;

    #[test]
    fn reads_headers_and_moves() {
        let mut r = reader(TWO_GAMES);

        let first = r.read_header().unwrap().unwrap();
        assert_eq!(first.get("White"), Some("A \"the\" player"));
        assert_eq!(first.result(), "1-0");
        assert!(!first.is_setup());
        assert_eq!(
            all_moves(&mut r),
            vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]
        );

        let second = r.read_header().unwrap().unwrap();
        assert!(second.is_setup());
        assert_eq!(second.fen(), Some("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1"));
        assert_eq!(second.result(), "*");
        assert_eq!(all_moves(&mut r), vec!["Kd7", "e4"]);

        assert!(r.read_header().unwrap().is_none());
    }

    #[test]
    fn comments_attach_to_the_next_move() {
        let mut r = reader("[Event \"x\"]\n\n1. e4 { q=0.2; p=[e4:5] } {second} e5 *\n");
        r.read_header().unwrap();
        assert_eq!(r.next_move().unwrap().as_deref(), Some("e4"));
        assert_eq!(r.take_comment(), "");
        assert_eq!(r.next_move().unwrap().as_deref(), Some("e5"));
        assert_eq!(r.take_comment(), "q=0.2; p=[e4:5] second");
        assert_eq!(r.take_comment(), "");
    }

    #[test]
    fn detached_continuation_dots_are_skipped() {
        let mut r = reader("[Event \"x\"]\n\n1. ... e5 2. Nf3 .. Nc6 *\n");
        r.read_header().unwrap();
        assert_eq!(all_moves(&mut r), vec!["e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn multi_line_comment() {
        let mut r = reader("[Event \"x\"]\n\n1. e4 { q=0.1;\np=[d4:3] } d5 *\n");
        r.read_header().unwrap();
        r.next_move().unwrap();
        r.next_move().unwrap();
        assert_eq!(r.take_comment(), "q=0.1;\np=[d4:3]");
    }

    #[test]
    fn leftover_movetext_is_skipped() {
        let mut r = reader(TWO_GAMES);
        r.read_header().unwrap();
        assert_eq!(r.next_move().unwrap().as_deref(), Some("e4"));
        let second = r.read_header().unwrap().unwrap();
        assert_eq!(second.get("Event"), Some("Second"));
        assert_eq!(r.take_comment(), "");
    }

    #[test]
    fn next_header_ends_a_game_without_result() {
        let mut r = reader("[Event \"a\"]\n\n1. e4\n[Event \"b\"]\n\n1. d4 *\n");
        r.read_header().unwrap();
        assert_eq!(all_moves(&mut r), vec!["e4"]);
        assert_eq!(r.read_header().unwrap().unwrap().get("Event"), Some("b"));
        assert_eq!(all_moves(&mut r), vec!["d4"]);
    }

    #[test]
    fn move_numbers_and_castling_zeros() {
        assert_eq!(strip_move_number("12."), "");
        assert_eq!(strip_move_number("12...e5"), "e5");
        assert_eq!(strip_move_number("1.e4"), "e4");
        assert_eq!(strip_move_number("0-0-0"), "0-0-0");
        assert_eq!(strip_move_number("Nf3"), "Nf3");
        assert_eq!(strip_move_number("..."), "");
    }

    #[test]
    fn token_length_limit() {
        let mut r = reader("[Event \"x\"]\n\n1. Nbxd2xxxxxxx *\n");
        r.read_header().unwrap();
        assert!(matches!(
            r.next_move(),
            Err(PgnError::TokenTooLong { max: 11, .. })
        ));

        let mut relaxed = reader("[Event \"x\"]\n\n1. Nbxd2xxxxxxx *\n").with_max_token_len(32);
        relaxed.read_header().unwrap();
        assert_eq!(
            relaxed.next_move().unwrap().as_deref(),
            Some("Nbxd2xxxxxxx")
        );
    }

    #[test]
    fn unterminated_comment_is_dropped() {
        let mut r = reader("[Event \"x\"]\n\n1. e4 { never closed\n");
        r.read_header().unwrap();
        assert_eq!(r.next_move().unwrap().as_deref(), Some("e4"));
        assert_eq!(r.next_move().unwrap(), None);
        assert_eq!(r.take_comment(), "");
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(reader("").read_header().unwrap().is_none());
        assert!(reader("\n\n  \n").read_header().unwrap().is_none());
    }

    #[test]
    fn writer_layout() {
        let header = GameHeader {
            tags: vec![
                ("Event".to_string(), "Quote \"q\"".to_string()),
                ("Result".to_string(), "0-1".to_string()),
            ],
        };
        let mut w = PgnWriter::new(Vec::new());
        w.header(&header).unwrap();
        w.move_number(0, true).unwrap();
        w.san("e4").unwrap();
        w.move_number(1, false).unwrap();
        w.raw("{ q=0.1; p=[d5:100] } ").unwrap();
        w.san("e5").unwrap();
        w.move_number(2, false).unwrap();
        w.san("Nf3").unwrap();
        w.result(header.result()).unwrap();

        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(
            text,
            "[Event \"Quote \\\"q\\\"\"]\n[Result \"0-1\"]\n\n\
             1. e4 { q=0.1; p=[d5:100] } e5 2. Nf3 0-1\n\n"
        );
    }

    #[test]
    fn black_to_move_first() {
        let mut w = PgnWriter::new(Vec::new());
        w.move_number(9, true).unwrap();
        w.san("Kd7").unwrap();
        w.move_number(10, false).unwrap();
        w.san("e4").unwrap();
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "5... Kd7 6. e4 ");
    }
}
