//! Character-level tokenizer.
//!
//! The [`Lexer`] turns a character source into [`Token`]s following one
//! [`CsvFormat`]. Every transition lives in the single `match` of
//! [`Lexer::next_token`]; states that hand the current character on to
//! another state park it in `pending` instead of reading ahead.

use std::{
    io::{self, BufRead, BufReader},
    mem,
};

use crate::types::{CR, LF, SP};
use crate::{CsvError, CsvFormat, Position, Result, Violation};

/// A lexical unit of CSV input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// One field value. `quoted` is set when the value was enclosed in quotes,
    /// `null` when the unquoted source text, escapes included, spells the
    /// format's null string.
    Field {
        value: String,
        quoted: bool,
        null: bool,
    },
    /// The line break closing a record. Always follows the record's last field.
    EndOfRecord,
    /// A comment line, without its marker, the space after it and the line break.
    Comment(String),
    EndOfFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartOfLine,
    /// Whitespace seen at the start of a line; a comment marker is still possible.
    LeadingSpace,
    StartOfField,
    InField,
    InQuotedField,
    /// Just saw a quote inside a quoted field: doubled quote or closer.
    AfterQuote,
    AfterClosingQuote,
    InComment,
    /// The last field of a record was emitted, `EndOfRecord` is owed.
    RecordEnd,
    EndOfStream,
}

/// One step of input: CR, LF and CRLF fold into a single line break which
/// keeps its raw text for quoted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Char(char),
    LineBreak(&'static str),
    Eof,
}

/// UTF-8 character reader with one character of lookahead and position
/// tracking. Reads the underlying source a line at a time.
struct CharSource<R> {
    reader: BufReader<R>,
    line_buffer: String,
    line: Vec<char>,
    cursor: usize,
    offset: u64,
    line_number: u64,
    eof: bool,
}

impl<R: io::Read> CharSource<R> {
    fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_buffer: String::with_capacity(100),
            line: Vec::with_capacity(100),
            cursor: 0,
            offset: 0,
            line_number: 1,
            eof: false,
        }
    }

    /// Makes sure at least one character is buffered. False at end of input.
    fn fill(&mut self) -> io::Result<bool> {
        if self.cursor < self.line.len() {
            return Ok(true);
        }
        if self.eof {
            return Ok(false);
        }
        self.line_buffer.clear();
        if self.reader.read_line(&mut self.line_buffer)? == 0 {
            self.eof = true;
            return Ok(false);
        }
        self.line.clear();
        self.line.extend(self.line_buffer.chars());
        self.cursor = 0;
        Ok(true)
    }

    fn peek(&mut self) -> io::Result<Option<char>> {
        Ok(if self.fill()? {
            Some(self.line[self.cursor])
        } else {
            None
        })
    }

    fn read(&mut self) -> io::Result<Option<char>> {
        if !self.fill()? {
            return Ok(None);
        }
        let c = self.line[self.cursor];
        self.cursor += 1;
        self.offset += 1;
        Ok(Some(c))
    }

    fn next_input(&mut self) -> io::Result<Input> {
        let input = match self.read()? {
            None => Input::Eof,
            Some(CR) if self.peek()? == Some(LF) => {
                self.read()?;
                Input::LineBreak("\r\n")
            }
            Some(CR) => Input::LineBreak("\r"),
            Some(LF) => Input::LineBreak("\n"),
            Some(c) => Input::Char(c),
        };
        if let Input::LineBreak(_) = input {
            self.line_number += 1;
        }
        Ok(input)
    }

    /// Position of the next character to be read.
    fn position(&self) -> Position {
        Position::new(self.offset, self.line_number)
    }
}

/// Tokenizer over any `io::Read` source.
pub struct Lexer<R> {
    source: CharSource<R>,
    format: CsvFormat,
    state: State,
    pending: Option<Input>,
    token: String,
    /// Source text of an unquoted field, kept once it holds an escape.
    raw: Option<String>,
    /// Length of `token` up to its last escaped character.
    literal_len: usize,
    quoted: bool,
    token_start: Position,
}

impl<R: io::Read> Lexer<R> {
    pub fn new(reader: R, format: &CsvFormat) -> Self {
        Self {
            source: CharSource::new(reader),
            format: format.clone(),
            state: State::StartOfLine,
            pending: None,
            token: String::with_capacity(100),
            raw: None,
            literal_len: 0,
            quoted: false,
            token_start: Position::new(0, 1),
        }
    }

    /// Where the most recent field or comment started.
    pub fn token_start(&self) -> Position {
        self.token_start
    }

    /// Position of the next unread character.
    pub fn position(&self) -> Position {
        self.source.position()
    }

    /// 1-based line the lexer is currently on.
    pub fn current_line(&self) -> u64 {
        self.source.line_number
    }

    /// Produces the next token. Once the source is exhausted every call
    /// returns [`Token::EndOfFile`].
    ///
    /// # Errors
    /// [`CsvError::MalformedInput`] for an unterminated quoted field, an escape
    /// at end of input, text after a closing quote, or (with strict quotes) a
    /// quote inside an unquoted field. [`CsvError::Io`] when the source fails.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            match self.state {
                State::RecordEnd => {
                    self.state = State::StartOfLine;
                    return Ok(Token::EndOfRecord);
                }
                State::EndOfStream => return Ok(Token::EndOfFile),
                _ => {}
            }

            let input = match self.pending.take() {
                Some(input) => input,
                None => {
                    if matches!(
                        self.state,
                        State::StartOfLine | State::LeadingSpace | State::StartOfField
                    ) {
                        self.token_start = self.source.position();
                    }
                    self.source.next_input()?
                }
            };

            match (self.state, input) {
                (State::StartOfLine, Input::Eof) => {
                    self.state = State::EndOfStream;
                    return Ok(Token::EndOfFile);
                }
                (State::StartOfLine, Input::LineBreak(_)) => {
                    if !self.format.ignore_empty_lines() {
                        return Ok(self.emit_field(State::RecordEnd));
                    }
                }
                (State::StartOfLine | State::LeadingSpace, Input::Char(c))
                    if self.format.is_comment_marker(c) =>
                {
                    self.state = State::InComment;
                }
                (State::StartOfLine | State::LeadingSpace, Input::Char(c))
                    if self.is_ignorable_space(c) =>
                {
                    self.state = State::LeadingSpace;
                }
                (State::StartOfLine | State::LeadingSpace, input) => {
                    self.state = State::StartOfField;
                    self.pending = Some(input);
                }

                (State::StartOfField, Input::Char(c)) if self.is_ignorable_space(c) => {}
                (State::StartOfField, Input::Char(c)) if self.format.is_quote(c) => {
                    self.quoted = true;
                    self.state = State::InQuotedField;
                }
                (State::StartOfField, input) => {
                    self.state = State::InField;
                    self.pending = Some(input);
                }

                (State::InField, Input::Char(c)) if self.format.is_delimiter(c) => {
                    return Ok(self.emit_field(State::StartOfField));
                }
                (State::InField, Input::LineBreak(_)) => {
                    return Ok(self.emit_field(State::RecordEnd));
                }
                (State::InField, Input::Eof) => {
                    return Ok(self.emit_field(State::EndOfStream));
                }
                (State::InField, Input::Char(c)) if self.format.is_escape(c) => {
                    let raw = self.raw.get_or_insert_with(|| self.token.clone());
                    raw.push(c);
                    self.read_escaped()?;
                }
                (State::InField, Input::Char(c))
                    if self.format.is_quote(c) && self.format.strict_quotes() =>
                {
                    return Err(self.malformed(Violation::UnexpectedQuote(c)));
                }
                (State::InField, Input::Char(c)) => {
                    self.token.push(c);
                    if let Some(raw) = self.raw.as_mut() {
                        raw.push(c);
                    }
                }

                (State::InQuotedField, Input::Char(c)) if self.format.is_escape(c) => {
                    self.read_escaped()?;
                }
                (State::InQuotedField, Input::Char(c)) if self.format.is_quote(c) => {
                    self.state = State::AfterQuote;
                }
                (State::InQuotedField, Input::Char(c)) => self.token.push(c),
                (State::InQuotedField, Input::LineBreak(raw)) => self.token.push_str(raw),
                (State::InQuotedField, Input::Eof) => {
                    if self.format.lenient_eof() {
                        return Ok(self.emit_field(State::EndOfStream));
                    }
                    let start = self.token_start;
                    return Err(self.malformed(Violation::UnterminatedQuote(start)));
                }

                (State::AfterQuote, Input::Char(c)) if self.format.is_quote(c) => {
                    self.token.push(c);
                    self.state = State::InQuotedField;
                }
                (State::AfterQuote, input) => {
                    self.state = State::AfterClosingQuote;
                    self.pending = Some(input);
                }

                (State::AfterClosingQuote, Input::Char(c)) if self.format.is_delimiter(c) => {
                    return Ok(self.emit_field(State::StartOfField));
                }
                (State::AfterClosingQuote, Input::LineBreak(_)) => {
                    return Ok(self.emit_field(State::RecordEnd));
                }
                (State::AfterClosingQuote, Input::Eof) => {
                    return Ok(self.emit_field(State::EndOfStream));
                }
                (State::AfterClosingQuote, Input::Char(c)) if c.is_whitespace() => {}
                (State::AfterClosingQuote, Input::Char(c)) => {
                    if !self.format.allow_trailing_text() {
                        return Err(self.malformed(Violation::TrailingText(c)));
                    }
                    self.token.push(c);
                }

                (State::InComment, Input::Char(c)) => self.token.push(c),
                (State::InComment, Input::LineBreak(_)) => {
                    return Ok(self.emit_comment(State::StartOfLine));
                }
                (State::InComment, Input::Eof) => {
                    return Ok(self.emit_comment(State::EndOfStream));
                }

                (State::RecordEnd | State::EndOfStream, _) => {
                    unreachable!("terminal states are handled before reading")
                }
            }
        }
    }

    /// Whitespace that `ignore_surrounding_spaces` lets the lexer drop.
    fn is_ignorable_space(&self, c: char) -> bool {
        self.format.ignore_surrounding_spaces() && c.is_whitespace() && !self.format.is_delimiter(c)
    }

    /// Appends the character following an escape character, whatever it is.
    fn read_escaped(&mut self) -> Result<()> {
        let escaped = match self.source.next_input()? {
            Input::Char(c) => {
                self.token.push(c);
                c.to_string()
            }
            Input::LineBreak(line_break) => {
                self.token.push_str(line_break);
                line_break.to_owned()
            }
            Input::Eof => return Err(self.malformed(Violation::EofInEscape)),
        };
        if let Some(raw) = self.raw.as_mut() {
            raw.push_str(&escaped);
        }
        self.literal_len = self.token.len();
        Ok(())
    }

    fn emit_field(&mut self, next: State) -> Token {
        let null = self.is_null();
        if !self.quoted && self.format.ignore_surrounding_spaces() {
            let trimmed = self.token.trim_end().len().max(self.literal_len);
            self.token.truncate(trimmed);
        }
        self.state = next;
        self.raw = None;
        self.literal_len = 0;
        Token::Field {
            value: mem::take(&mut self.token),
            quoted: mem::take(&mut self.quoted),
            null,
        }
    }

    /// Whether the current unquoted field spells the null string. Compares the
    /// source text so that an escaped sentinel such as `\N` still matches.
    fn is_null(&self) -> bool {
        let Some(null) = self.format.null_string() else {
            return false;
        };
        if self.quoted {
            return false;
        }
        let mut text = self.raw.as_deref().unwrap_or(self.token.as_str());
        if self.format.ignore_surrounding_spaces() {
            text = text.trim_end();
        }
        if self.format.trim() {
            text = text.trim();
        }
        text == null
    }

    fn emit_comment(&mut self, next: State) -> Token {
        self.state = next;
        let mut text = mem::take(&mut self.token);
        if text.starts_with(SP) {
            text.remove(0);
        }
        Token::Comment(text)
    }

    fn malformed(&mut self, violation: Violation) -> CsvError {
        self.state = State::EndOfStream;
        CsvError::malformed(0, self.source.position(), violation)
    }
}
