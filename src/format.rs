//! The format descriptor: one immutable value that drives both the lexer and
//! the printer.
//!
//! Every `with_*` method returns a modified copy, so presets can be shared
//! and specialised freely:
//!
//! ```
//! use csvformat::{CsvFormat, QuoteMode};
//!
//! let base = CsvFormat::default();
//! let semicolons = base.with_delimiter(';').with_quote_mode(QuoteMode::All);
//! assert_eq!(base.delimiter(), ',');
//! assert_eq!(semicolons.delimiter(), ';');
//! ```
//!
//! Conflicting special characters are reported by [`CsvFormat::validate`],
//! which every parser and printer runs before touching its source or sink.

use std::{
    collections::HashSet,
    fmt,
    io::{self, Cursor},
    str::FromStr,
};

use crate::printer::encode_value;
use crate::types::{BACKSLASH, CR, CRLF, DEFAULT_DELIM, DOUBLE_QUOTE, LF, TAB};
use crate::{CsvError, Parser, Printer, Result, ToField};

/// When the printer encloses a value in quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuoteMode {
    /// Only values holding special characters.
    #[default]
    Minimal,
    /// Every value, nulls included: a null prints as the quoted null string.
    All,
    /// Every value except nulls, which print bare so they read back as null.
    AllNonNull,
    /// Every value that is not a numeric literal.
    NonNumeric,
    /// Never quote; escape special characters with the escape character.
    None,
}

/// Declarative description of a CSV dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CsvFormat {
    delimiter: char,
    quote_char: Option<char>,
    quote_mode: QuoteMode,
    escape_char: Option<char>,
    record_separator: String,
    comment_marker: Option<char>,
    header: Option<Vec<String>>,
    header_comments: Vec<String>,
    null_string: Option<String>,
    allow_missing_column_names: bool,
    ignore_empty_lines: bool,
    ignore_surrounding_spaces: bool,
    skip_header_record: bool,
    allow_duplicate_header_names: bool,
    ignore_header_case: bool,
    trim: bool,
    trailing_delimiter: bool,
    strict_quotes: bool,
    lenient_eof: bool,
    allow_trailing_text: bool,
    auto_flush: bool,
    max_rows: u64,
}

impl Default for CsvFormat {
    /// Comma separated, double-quote enclosed, CRLF terminated, blank lines
    /// skipped.
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIM,
            quote_char: Some(DOUBLE_QUOTE),
            quote_mode: QuoteMode::Minimal,
            escape_char: None,
            record_separator: CRLF.to_owned(),
            comment_marker: None,
            header: None,
            header_comments: Vec::new(),
            null_string: None,
            allow_missing_column_names: false,
            ignore_empty_lines: true,
            ignore_surrounding_spaces: false,
            skip_header_record: false,
            allow_duplicate_header_names: false,
            ignore_header_case: false,
            trim: false,
            trailing_delimiter: false,
            strict_quotes: false,
            lenient_eof: false,
            allow_trailing_text: false,
            auto_flush: false,
            max_rows: 0,
        }
    }
}

impl CsvFormat {
    /// Strict RFC 4180: like the default but empty lines are records.
    pub fn rfc4180() -> Self {
        Self::default().with_ignore_empty_lines(false)
    }

    /// The dialect Excel writes and reads.
    pub fn excel() -> Self {
        Self::default()
            .with_ignore_empty_lines(false)
            .with_allow_missing_column_names(true)
    }

    /// Tab delimited, surrounding spaces ignored.
    pub fn tdf() -> Self {
        Self::default()
            .with_delimiter(TAB)
            .with_ignore_surrounding_spaces(true)
    }

    /// `SELECT ... INTO OUTFILE` / `LOAD DATA INFILE` defaults.
    pub fn mysql() -> Self {
        Self::default()
            .with_delimiter(TAB)
            .with_escape(BACKSLASH)
            .with_ignore_empty_lines(false)
            .without_quote()
            .with_record_separator(LF.to_string())
            .with_null_string("\\N")
            .with_quote_mode(QuoteMode::AllNonNull)
    }

    /// PostgreSQL `COPY ... WITH (FORMAT csv)`.
    pub fn postgresql_csv() -> Self {
        Self::default()
            .with_ignore_empty_lines(false)
            .with_record_separator(LF.to_string())
            .with_null_string("")
            .with_quote_mode(QuoteMode::AllNonNull)
    }

    /// PostgreSQL `COPY ... WITH (FORMAT text)`.
    pub fn postgresql_text() -> Self {
        Self::default()
            .with_delimiter(TAB)
            .with_escape(BACKSLASH)
            .with_ignore_empty_lines(false)
            .with_record_separator(LF.to_string())
            .with_null_string("\\N")
            .with_quote_mode(QuoteMode::AllNonNull)
    }

    fn with(&self, change: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        change(&mut next);
        next
    }

    /// Character separating fields. Defaults to comma (',').
    pub fn with_delimiter(&self, delimiter: char) -> Self {
        self.with(|f| f.delimiter = delimiter)
    }

    /// Character enclosing fields. Defaults to the double quote ('"').
    pub fn with_quote(&self, quote: char) -> Self {
        self.with(|f| f.quote_char = Some(quote))
    }

    /// Disables quoting entirely.
    pub fn without_quote(&self) -> Self {
        self.with(|f| f.quote_char = None)
    }

    /// When the printer encloses values in quotes. See [`QuoteMode`].
    pub fn with_quote_mode(&self, quote_mode: QuoteMode) -> Self {
        self.with(|f| f.quote_mode = quote_mode)
    }

    /// Character escaping the next character, in and outside quotes. The
    /// escaped character is taken literally.
    ///
    /// # Arguments
    /// * `escape` - must differ from the delimiter, quote and comment marker.
    pub fn with_escape(&self, escape: char) -> Self {
        self.with(|f| f.escape_char = Some(escape))
    }

    /// Disables escaping.
    pub fn without_escape(&self) -> Self {
        self.with(|f| f.escape_char = None)
    }

    /// String the printer writes after each record. The parser accepts CR, LF
    /// and CRLF whatever this is set to.
    pub fn with_record_separator(&self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        self.with(|f| f.record_separator = separator)
    }

    /// Character starting a comment line. Only recognized at the start of a
    /// line, never inside quotes or after a delimiter.
    pub fn with_comment_marker(&self, marker: char) -> Self {
        self.with(|f| f.comment_marker = Some(marker))
    }

    /// Comment lines become ordinary records again.
    pub fn without_comment_marker(&self) -> Self {
        self.with(|f| f.comment_marker = None)
    }

    /// Explicit column names.
    ///
    /// An empty list means the names are read from the first record, which is
    /// then also yielded as data unless `skip_header_record` is set, see
    /// [`CsvFormat::with_first_record_as_header`].
    pub fn with_header<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect();
        self.with(|f| f.header = Some(names))
    }

    /// Read the column names off the first record and do not yield it.
    /// Turning `skip_header_record` off afterwards yields that record as data too.
    pub fn with_first_record_as_header(&self) -> Self {
        self.with(|f| {
            f.header = Some(Vec::new());
            f.skip_header_record = true;
        })
    }

    /// No header mapping, records are accessed by index only.
    pub fn without_header(&self) -> Self {
        self.with(|f| f.header = None)
    }

    /// Lines the printer writes as comments ahead of the header row.
    pub fn with_header_comments<I, S>(&self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let comments = comments.into_iter().map(Into::into).collect();
        self.with(|f| f.header_comments = comments)
    }

    /// Sentinel standing for an absent value on both the parse and print side.
    pub fn with_null_string(&self, null_string: impl Into<String>) -> Self {
        let null_string = null_string.into();
        self.with(|f| f.null_string = Some(null_string))
    }

    /// No null sentinel: every value is present.
    pub fn without_null_string(&self) -> Self {
        self.with(|f| f.null_string = None)
    }

    /// Skip blank lines instead of yielding them as one empty value. On by default.
    pub fn with_ignore_empty_lines(&self, ignore: bool) -> Self {
        self.with(|f| f.ignore_empty_lines = ignore)
    }

    /// Drop whitespace around unquoted fields and between quotes and delimiters.
    pub fn with_ignore_surrounding_spaces(&self, ignore: bool) -> Self {
        self.with(|f| f.ignore_surrounding_spaces = ignore)
    }

    /// Whether the first record is withheld from the caller when a header is
    /// configured.
    ///
    /// # Arguments
    /// * `skip` - with explicit names, `true` discards the first record. With
    ///   names read from the first record, `false` yields that record as data too.
    pub fn with_skip_header_record(&self, skip: bool) -> Self {
        self.with(|f| f.skip_header_record = skip)
    }

    /// Tolerate blank header names, and records whose length differs from
    /// the header's.
    pub fn with_allow_missing_column_names(&self, allow: bool) -> Self {
        self.with(|f| f.allow_missing_column_names = allow)
    }

    /// Accept a header naming the same column twice; the later column wins on
    /// lookup by name.
    pub fn with_allow_duplicate_header_names(&self, allow: bool) -> Self {
        self.with(|f| f.allow_duplicate_header_names = allow)
    }

    /// Match header names case-insensitively.
    pub fn with_ignore_header_case(&self, ignore: bool) -> Self {
        self.with(|f| f.ignore_header_case = ignore)
    }

    /// Trim leading and trailing whitespace from values, parsed or printed.
    pub fn with_trim(&self, trim: bool) -> Self {
        self.with(|f| f.trim = trim)
    }

    /// Print a delimiter after the last value, and drop the empty value such a
    /// delimiter leaves when parsing.
    pub fn with_trailing_delimiter(&self, trailing: bool) -> Self {
        self.with(|f| f.trailing_delimiter = trailing)
    }

    /// Reject quote characters inside unquoted fields instead of keeping them.
    pub fn with_strict_quotes(&self, strict: bool) -> Self {
        self.with(|f| f.strict_quotes = strict)
    }

    /// Accept a quoted field left open at end of input.
    pub fn with_lenient_eof(&self, lenient: bool) -> Self {
        self.with(|f| f.lenient_eof = lenient)
    }

    /// Keep text found between a closing quote and the next delimiter.
    pub fn with_allow_trailing_text(&self, allow: bool) -> Self {
        self.with(|f| f.allow_trailing_text = allow)
    }

    /// Flush the printer's sink after every record.
    pub fn with_auto_flush(&self, auto_flush: bool) -> Self {
        self.with(|f| f.auto_flush = auto_flush)
    }

    /// Stop parsing after `max_rows` data records. Zero means no limit.
    pub fn with_max_rows(&self, max_rows: u64) -> Self {
        self.with(|f| f.max_rows = max_rows)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn quote_char(&self) -> Option<char> {
        self.quote_char
    }

    pub fn quote_mode(&self) -> QuoteMode {
        self.quote_mode
    }

    pub fn escape_char(&self) -> Option<char> {
        self.escape_char
    }

    /// Printed after each record.
    pub fn record_separator(&self) -> &str {
        &self.record_separator
    }

    pub fn comment_marker(&self) -> Option<char> {
        self.comment_marker
    }

    /// `None` without a header, an empty slice when names come from the first record.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn header_comments(&self) -> &[String] {
        &self.header_comments
    }

    pub fn null_string(&self) -> Option<&str> {
        self.null_string.as_deref()
    }

    pub fn allow_missing_column_names(&self) -> bool {
        self.allow_missing_column_names
    }

    pub fn ignore_empty_lines(&self) -> bool {
        self.ignore_empty_lines
    }

    pub fn ignore_surrounding_spaces(&self) -> bool {
        self.ignore_surrounding_spaces
    }

    pub fn skip_header_record(&self) -> bool {
        self.skip_header_record
    }

    pub fn allow_duplicate_header_names(&self) -> bool {
        self.allow_duplicate_header_names
    }

    pub fn ignore_header_case(&self) -> bool {
        self.ignore_header_case
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    pub fn trailing_delimiter(&self) -> bool {
        self.trailing_delimiter
    }

    pub fn strict_quotes(&self) -> bool {
        self.strict_quotes
    }

    pub fn lenient_eof(&self) -> bool {
        self.lenient_eof
    }

    pub fn allow_trailing_text(&self) -> bool {
        self.allow_trailing_text
    }

    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Zero when unlimited.
    pub fn max_rows(&self) -> u64 {
        self.max_rows
    }

    pub(crate) fn is_delimiter(&self, c: char) -> bool {
        c == self.delimiter
    }

    pub(crate) fn is_quote(&self, c: char) -> bool {
        self.quote_char == Some(c)
    }

    pub(crate) fn is_escape(&self, c: char) -> bool {
        self.escape_char == Some(c)
    }

    pub(crate) fn is_comment_marker(&self, c: char) -> bool {
        self.comment_marker == Some(c)
    }

    /// Checks that the special characters and the explicit header can be
    /// used together.
    ///
    /// # Errors
    /// [`CsvError::Configuration`] when the delimiter, quote, escape or
    /// comment marker collide or are line breaks, or when an explicit header
    /// has blank or duplicate names the flags do not allow.
    pub fn validate(&self) -> Result<()> {
        if is_line_break(self.delimiter) {
            return Err(CsvError::Configuration(
                "the delimiter cannot be a line break".into(),
            ));
        }

        let specials = [
            ("quote character", self.quote_char),
            ("escape character", self.escape_char),
            ("comment marker", self.comment_marker),
        ];
        for (i, (name, special)) in specials.iter().enumerate() {
            let Some(c) = special else { continue };
            if is_line_break(*c) {
                return Err(CsvError::Configuration(format!(
                    "the {name} cannot be a line break"
                )));
            }
            if *c == self.delimiter {
                return Err(CsvError::Configuration(format!(
                    "the {name} and the delimiter cannot be the same ('{c}')"
                )));
            }
            for (other_name, other) in &specials[i + 1..] {
                if *other == Some(*c) {
                    return Err(CsvError::Configuration(format!(
                        "the {name} and the {other_name} cannot be the same ('{c}')"
                    )));
                }
            }
        }

        if let Some(names) = &self.header {
            let mut seen = HashSet::with_capacity(names.len());
            for (column, name) in names.iter().enumerate() {
                if name.trim().is_empty() {
                    if !self.allow_missing_column_names {
                        return Err(CsvError::Configuration(format!(
                            "header name is missing at column {column}"
                        )));
                    }
                    continue;
                }
                let key = if self.ignore_header_case {
                    name.to_lowercase()
                } else {
                    name.clone()
                };
                if !seen.insert(key) && !self.allow_duplicate_header_names {
                    return Err(CsvError::Configuration(format!(
                        "the header contains a duplicate name: `{name}` in {names:?}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Opens a parse session over `reader`.
    pub fn parse<R: io::Read>(&self, reader: R) -> Result<Parser<R>> {
        Parser::new(reader, self)
    }

    /// Opens a parse session over an in-memory string.
    pub fn parse_str(&self, text: &str) -> Result<Parser<Cursor<String>>> {
        Parser::from_str(text, self)
    }

    /// Opens a print session writing to `writer`.
    pub fn printer<W: io::Write>(&self, writer: W) -> Result<Printer<W>> {
        Printer::new(writer, self)
    }

    /// Formats one record into a string, without record separator, header or
    /// comments.
    ///
    /// ```
    /// let line = csvformat::CsvFormat::default()
    ///     .format_record(["a", "b,c"])
    ///     .unwrap();
    /// assert_eq!(line, "a,\"b,c\"");
    /// ```
    pub fn format_record<I>(&self, values: I) -> Result<String>
    where
        I: IntoIterator,
        I::Item: ToField,
    {
        self.validate()?;
        let mut line = String::new();
        for (index, value) in values.into_iter().enumerate() {
            if index > 0 {
                line.push(self.delimiter);
            }
            encode_value(self, value.to_field().as_deref(), index == 0, &mut line)?;
        }
        Ok(line)
    }
}

fn is_line_break(c: char) -> bool {
    c == CR || c == LF
}

/// Named presets, selectable from configuration strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Predefined {
    Default,
    Excel,
    Mysql,
    PostgresqlCsv,
    PostgresqlText,
    Rfc4180,
    Tdf,
}

impl Predefined {
    pub fn format(self) -> CsvFormat {
        match self {
            Predefined::Default => CsvFormat::default(),
            Predefined::Excel => CsvFormat::excel(),
            Predefined::Mysql => CsvFormat::mysql(),
            Predefined::PostgresqlCsv => CsvFormat::postgresql_csv(),
            Predefined::PostgresqlText => CsvFormat::postgresql_text(),
            Predefined::Rfc4180 => CsvFormat::rfc4180(),
            Predefined::Tdf => CsvFormat::tdf(),
        }
    }
}

impl FromStr for Predefined {
    type Err = CsvError;

    /// Case-insensitive; `_` and `-` are ignored, so `PostgreSQL_CSV`,
    /// `postgresql-csv` and `postgresqlcsv` all match.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "default" => Ok(Predefined::Default),
            "excel" => Ok(Predefined::Excel),
            "mysql" => Ok(Predefined::Mysql),
            "postgresqlcsv" => Ok(Predefined::PostgresqlCsv),
            "postgresqltext" => Ok(Predefined::PostgresqlText),
            "rfc4180" => Ok(Predefined::Rfc4180),
            "tdf" => Ok(Predefined::Tdf),
            _ => Err(CsvError::Configuration(format!("unknown format `{s}`"))),
        }
    }
}

impl fmt::Display for Predefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Predefined::Default => "default",
            Predefined::Excel => "excel",
            Predefined::Mysql => "mysql",
            Predefined::PostgresqlCsv => "postgresql_csv",
            Predefined::PostgresqlText => "postgresql_text",
            Predefined::Rfc4180 => "rfc4180",
            Predefined::Tdf => "tdf",
        };
        f.write_str(name)
    }
}
