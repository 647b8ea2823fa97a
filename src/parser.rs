//! Record assembler. Pulls tokens from the [`Lexer`] and groups them into
//! [`Record`]s, resolving the header and merging comment lines on the way.
//!
//!  # Example (Parser):
//! ``` rs
//! fn main() {
//!    let format = csvformat::CsvFormat::default().with_first_record_as_header();
//!    let mut parser = csvformat::Parser::from_path("./AAPL.csv", &format).unwrap();
//!
//!    println!("{:?}", parser.header_names().unwrap());
//!    for entry in parser.entries() {
//!        println!("{}", entry.unwrap());
//!    }
//! }
//! ```

use std::{
    io::{self, Cursor},
    path::Path,
    sync::Arc,
};

use log::{debug, trace};

use crate::lexer::{Lexer, Token};
use crate::{CsvError, CsvFormat, HeaderMap, Position, Record, Result, Violation};

/// Field values of one record before it is numbered and checked.
struct Assembled {
    values: Vec<Option<String>>,
    position: Position,
    comment: Option<String>,
}

/// A parse session over one character source.
///
/// Records are produced lazily and only once: after the source is exhausted,
/// after an error, or after [`Parser::close`] nothing more is produced and the
/// source has been dropped.
pub struct Parser<R> {
    lexer: Option<Lexer<R>>,
    format: CsvFormat,
    headers: Option<Arc<HeaderMap>>,
    header_comment: Option<String>,
    trailer_comment: Option<String>,
    /// Header row that is also owed to the caller as data.
    replay: Option<Assembled>,
    record_number: u64,
}

impl<R: io::Read> Parser<R> {
    /// Opens a session and resolves the header.
    ///
    /// # Errors
    /// [`CsvError::Configuration`] when the format does not validate, and any
    /// error met while reading the header row.
    pub fn new(reader: R, format: &CsvFormat) -> Result<Self> {
        format.validate()?;
        debug!(
            "opening parser: delimiter {:?}, quote {:?}, header {:?}",
            format.delimiter(),
            format.quote_char(),
            format.header()
        );

        let mut parser = Self {
            lexer: Some(Lexer::new(reader, format)),
            format: format.clone(),
            headers: None,
            header_comment: None,
            trailer_comment: None,
            replay: None,
            record_number: 0,
        };
        parser.headers = parser.resolve_headers()?.map(Arc::new);
        Ok(parser)
    }

    fn resolve_headers(&mut self) -> Result<Option<HeaderMap>> {
        let header = self.format.header().map(<[String]>::to_vec);
        let names = match header.as_deref() {
            None => return Ok(None),
            Some([]) => {
                let Some(first) = self.assemble()? else {
                    return Ok(Some(HeaderMap::build(Vec::new(), &self.format, Position::default())?));
                };
                let names = first
                    .values
                    .iter()
                    .map(|name| name.clone().unwrap_or_default())
                    .collect();
                let headers = HeaderMap::build(names, &self.format, first.position)?;
                if self.format.skip_header_record() {
                    self.header_comment = first.comment;
                } else {
                    self.replay = Some(first);
                }
                headers
            }
            Some(names) => {
                let names = names.to_vec();
                if self.format.skip_header_record() {
                    if let Some(skipped) = self.assemble()? {
                        self.header_comment = skipped.comment;
                    }
                }
                HeaderMap::build(names, &self.format, Position::default())?
            }
        };
        debug!("resolved header {:?}", names.names());
        Ok(Some(names))
    }

    /// Pulls tokens up to the end of the next record.
    fn assemble(&mut self) -> Result<Option<Assembled>> {
        let Some(lexer) = self.lexer.as_mut() else {
            return Ok(None);
        };
        let format = &self.format;
        let record = self.record_number + 1;

        let mut values = Vec::new();
        let mut comment: Option<String> = None;
        let mut position = None;

        loop {
            match lexer.next_token().map_err(|e| e.at_record(record))? {
                Token::Comment(text) => match comment.as_mut() {
                    Some(merged) => {
                        merged.push('\n');
                        merged.push_str(&text);
                    }
                    None => comment = Some(text),
                },
                Token::Field { value, null, .. } => {
                    position.get_or_insert_with(|| lexer.token_start());
                    values.push(normalize(format, value, null));
                }
                Token::EndOfRecord => break,
                Token::EndOfFile if values.is_empty() => {
                    if comment.is_some() {
                        self.trailer_comment = comment;
                    }
                    return Ok(None);
                }
                Token::EndOfFile => break,
            }
        }

        if format.trailing_delimiter() && values.len() > 1 && values.last() == Some(&Some(String::new())) {
            values.pop();
        }

        Ok(Some(Assembled {
            values,
            position: position.unwrap_or_default(),
            comment,
        }))
    }

    /// Pulls the next record.
    ///
    /// Returns `Ok(None)` once the source is exhausted, `max_rows` is reached
    /// or the parser is closed.
    ///
    /// # Errors
    /// [`CsvError::MalformedInput`] when the input breaks a lexical rule or a
    /// record's length differs from the header's (unless
    /// `allow_missing_column_names`), [`CsvError::Io`] when the source fails.
    /// Any error closes the session.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let max_rows = self.format.max_rows();
        if max_rows > 0 && self.record_number >= max_rows {
            self.close();
            return Ok(None);
        }

        let next = match self.replay.take() {
            Some(header_row) => Ok(Some(header_row)),
            None => self.assemble(),
        };
        let assembled = match next {
            Ok(Some(assembled)) => assembled,
            Ok(None) => {
                self.close();
                return Ok(None);
            }
            Err(error) => {
                self.close();
                return Err(error);
            }
        };

        self.record_number += 1;
        if let Some(headers) = &self.headers {
            if !self.format.allow_missing_column_names() && assembled.values.len() != headers.len() {
                let error = CsvError::malformed(
                    self.record_number,
                    assembled.position,
                    Violation::FieldCountMismatch {
                        expected: headers.len(),
                        found: assembled.values.len(),
                    },
                );
                self.close();
                return Err(error);
            }
        }

        trace!(
            "record {} at {}: {} values",
            self.record_number,
            assembled.position,
            assembled.values.len()
        );
        Ok(Some(Record::new(
            assembled.values,
            self.record_number,
            assembled.position,
            assembled.comment,
            self.headers.clone(),
        )))
    }

    /// Iterator over the remaining records.
    pub fn entries(&mut self) -> Entries<'_, R> {
        Entries::new(self)
    }

    /// Reads every remaining record into memory.
    pub fn collect_records(&mut self) -> Result<Vec<Record>> {
        self.entries().collect()
    }

    /// Releases the source. Calling it again does nothing.
    pub fn close(&mut self) {
        self.replay = None;
        if self.lexer.take().is_some() {
            debug!("closing parser after {} records", self.record_number);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lexer.is_none()
    }

    pub fn format(&self) -> &CsvFormat {
        &self.format
    }

    /// The session's header mapping, if one was configured or read.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_deref()
    }

    pub fn header_names(&self) -> Option<&[String]> {
        self.headers.as_ref().map(|headers| headers.names())
    }

    /// Comment lines found before the header row.
    pub fn header_comment(&self) -> Option<&str> {
        self.header_comment.as_deref()
    }

    /// Comment lines found after the last record.
    pub fn trailer_comment(&self) -> Option<&str> {
        self.trailer_comment.as_deref()
    }

    /// Number of data records produced so far.
    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    /// 1-based line of the source the parser has read up to. `None` once closed.
    pub fn current_line(&self) -> Option<u64> {
        self.lexer.as_ref().map(|lexer| lexer.current_line())
    }
}

impl Parser<std::fs::File> {
    /// Opens a session over the file at `path`.
    pub fn from_path(path: impl AsRef<Path>, format: &CsvFormat) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Parser::new(file, format)
    }
}

impl Parser<Cursor<String>> {
    /// Opens a session over an in-memory string.
    pub fn from_str(text: &str, format: &CsvFormat) -> Result<Self> {
        Parser::new(Cursor::new(text.to_owned()), format)
    }
}

fn normalize(format: &CsvFormat, value: String, null: bool) -> Option<String> {
    if null {
        None
    } else if format.trim() {
        Some(value.trim().to_owned())
    } else {
        Some(value)
    }
}

/// Iterator of parser entries ([`Record`]s).
///
/// # Examples:
/// ```
/// let format = csvformat::CsvFormat::default().with_first_record_as_header();
/// let mut parser = format.parse_str("name,age\nMike,15\nJenny,16").unwrap();
/// let names: Vec<String> = parser
///     .entries()
///     .map(|record| record.unwrap().get_by_name("name").unwrap().unwrap().to_owned())
///     .collect();
/// assert_eq!(names, ["Mike", "Jenny"]);
/// ```
pub struct Entries<'a, R>
where
    R: io::Read,
{
    owner: &'a mut Parser<R>,
}

impl<'a, R: io::Read> Entries<'a, R> {
    fn new(owner: &'a mut Parser<R>) -> Self {
        Self { owner }
    }
}

impl<R: io::Read> Iterator for Entries<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.owner.next_record().transpose()
    }
}
