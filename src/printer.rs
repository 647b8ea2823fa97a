//! CSV printer which can be used to write records to a file or any other
//! `io::Write` sink, quoting and escaping as the [`CsvFormat`] says.
//!
//!  # Example (Printer):
//! ``` rs
//! fn main() {
//!     let format = csvformat::CsvFormat::default()
//!         .with_comment_marker('#')
//!         .with_header_comments(["generated"])
//!         .with_header(["Header1", "Header 2", "Header,3"]);
//!     let mut printer = csvformat::Printer::from_path("./test.txt", &format).unwrap();
//!
//!     printer
//!         .print_records([
//!             csvformat::csv!["entry", "entry", "entry"],
//!             csvformat::csv!["entry", 1, 2.5],
//!         ])
//!         .unwrap();
//!     printer.close().unwrap();
//! }
//! ```

use std::{
    io::{self, BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::types::{CR, LF, SP};
use crate::{CsvError, CsvFormat, QuoteMode, Record, Result, ToField};

/// A print session writing to one sink.
///
/// Header comments and the header row are written ahead of the first field,
/// or on [`Printer::flush`]/[`Printer::close`] when nothing else was printed.
/// Dropping the printer flushes the sink but swallows errors; call
/// [`Printer::close`] to see them.
pub struct Printer<W: io::Write> {
    writer: Option<BufWriter<W>>,
    format: CsvFormat,
    new_record: bool,
    preamble_pending: bool,
    records: u64,
}

impl Printer<std::fs::File> {
    /// Creates a printer writing to a new file at `path`.
    ///
    /// # Errors
    /// If the format does not validate or the file cannot be created.
    pub fn from_path(path: impl AsRef<Path>, format: &CsvFormat) -> Result<Self> {
        format.validate()?;
        let file = std::fs::File::create(path)?;
        Printer::new(file, format)
    }
}

impl<W: io::Write> Printer<W> {
    /// Opens a print session over `writer`.
    ///
    /// # Errors
    /// [`CsvError::Configuration`] when the format does not validate.
    pub fn new(writer: W, format: &CsvFormat) -> Result<Self> {
        format.validate()?;
        debug!(
            "opening printer: delimiter {:?}, quote mode {:?}",
            format.delimiter(),
            format.quote_mode()
        );
        Ok(Self {
            writer: Some(BufWriter::new(writer)),
            format: format.clone(),
            new_record: true,
            preamble_pending: true,
            records: 0,
        })
    }

    pub fn format(&self) -> &CsvFormat {
        &self.format
    }

    /// Prints one field of the current record.
    ///
    /// # Errors
    /// [`CsvError::Configuration`] when the value needs escaping but the
    /// format has no escape character, [`CsvError::Io`] when the sink fails.
    pub fn print<T: ToField + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.write_preamble()?;
        let mut out = String::new();
        if !self.new_record {
            out.push(self.format.delimiter());
        }
        encode_value(&self.format, value.to_field().as_deref(), self.new_record, &mut out)?;
        self.new_record = false;
        self.write_str(&out)
    }

    /// Prints every value of one record followed by the record separator.
    ///
    /// The whole line is formatted first and handed to the sink in a single
    /// write.
    pub fn print_record<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: ToField,
    {
        self.write_preamble()?;
        let mut out = String::new();
        let mut new_record = self.new_record;
        for value in values {
            if !new_record {
                out.push(self.format.delimiter());
            }
            encode_value(&self.format, value.to_field().as_deref(), new_record, &mut out)?;
            new_record = false;
        }
        self.end_record(&mut out);
        self.write_str(&out)?;
        self.record_done()
    }

    /// Prints several records.
    pub fn print_records<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: IntoIterator,
        <I::Item as IntoIterator>::Item: ToField,
    {
        for record in records {
            self.print_record(record)?;
        }
        Ok(())
    }

    /// Prints a parsed record, preceded by its comment when the format has a
    /// comment marker.
    pub fn print_parsed(&mut self, record: &Record) -> Result<()> {
        if let Some(comment) = record.comment() {
            self.print_comment(comment)?;
        }
        self.print_record(record.values())
    }

    /// Ends the current record, even if no field was printed.
    pub fn println(&mut self) -> Result<()> {
        self.write_preamble()?;
        let mut out = String::new();
        self.end_record(&mut out);
        self.write_str(&out)?;
        self.record_done()
    }

    /// Prints `comment` as comment lines, one per line of text.
    ///
    /// Does nothing when the format has no comment marker. A record in
    /// progress is ended first.
    pub fn print_comment(&mut self, comment: &str) -> Result<()> {
        let Some(marker) = self.format.comment_marker() else {
            return Ok(());
        };
        self.write_preamble()?;
        if !self.new_record {
            self.println()?;
        }
        let mut out = String::new();
        push_comment(&self.format, marker, comment, &mut out);
        self.write_str(&out)
    }

    /// Writes any pending preamble and flushes the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.write_preamble()?;
        self.sink()?.flush()?;
        Ok(())
    }

    /// Flushes and releases the sink. Calling it again does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.writer.is_none() {
            return Ok(());
        }
        self.flush()?;
        self.writer = None;
        debug!("closed printer after {} records", self.records);
        Ok(())
    }

    /// Flushes and hands back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.write_preamble()?;
        let writer = self.writer.take().ok_or_else(closed)?;
        writer.into_inner().map_err(|e| CsvError::Io(e.into_error()))
    }

    fn write_preamble(&mut self) -> Result<()> {
        if !self.preamble_pending {
            return Ok(());
        }
        self.preamble_pending = false;

        let mut out = String::new();
        if let Some(marker) = self.format.comment_marker() {
            for comment in self.format.header_comments() {
                push_comment(&self.format, marker, comment, &mut out);
            }
        }
        if let Some(names) = self.format.header() {
            if !names.is_empty() && !self.format.skip_header_record() {
                for (index, name) in names.iter().enumerate() {
                    if index > 0 {
                        out.push(self.format.delimiter());
                    }
                    encode_value(&self.format, Some(name.as_str()), index == 0, &mut out)?;
                }
                self.end_record(&mut out);
            }
        }
        if out.is_empty() {
            return Ok(());
        }
        self.write_str(&out)
    }

    fn end_record(&self, out: &mut String) {
        if self.format.trailing_delimiter() {
            out.push(self.format.delimiter());
        }
        out.push_str(self.format.record_separator());
    }

    fn record_done(&mut self) -> Result<()> {
        self.new_record = true;
        self.records += 1;
        if self.format.auto_flush() {
            self.sink()?.flush()?;
        }
        Ok(())
    }

    fn sink(&mut self) -> Result<&mut BufWriter<W>> {
        self.writer.as_mut().ok_or_else(closed)
    }

    fn write_str(&mut self, out: &str) -> Result<()> {
        self.sink()?.write_all(out.as_bytes())?;
        Ok(())
    }
}

fn closed() -> CsvError {
    CsvError::Io(io::Error::new(
        io::ErrorKind::Other,
        "the printer has been closed",
    ))
}

fn push_comment(format: &CsvFormat, marker: char, comment: &str, out: &mut String) {
    for line in comment.split("\r\n").flat_map(|line| line.split(&[CR, LF][..])) {
        out.push(marker);
        out.push(SP);
        out.push_str(line);
        out.push_str(format.record_separator());
    }
}

/// Appends one value to `out`, quoted or escaped as the format requires.
/// `new_record` tells whether the value opens a record.
pub(crate) fn encode_value(
    format: &CsvFormat,
    value: Option<&str>,
    new_record: bool,
    out: &mut String,
) -> Result<()> {
    let Some(value) = value else {
        let null_string = format.null_string().unwrap_or_default();
        match format.quote_char() {
            Some(quote) if format.quote_mode() == QuoteMode::All => {
                push_quoted(format, quote, null_string, out)
            }
            _ => out.push_str(null_string),
        }
        return Ok(());
    };
    let value = if format.trim() { value.trim() } else { value };

    let quote = match (format.quote_char(), format.quote_mode()) {
        (Some(quote), mode) if mode != QuoteMode::None => quote,
        _ => return encode_escaped(format, value, new_record, out),
    };

    let quote_it = match format.quote_mode() {
        QuoteMode::All | QuoteMode::AllNonNull => true,
        QuoteMode::NonNumeric => !is_numeric(value) || needs_quotes(format, value, new_record),
        QuoteMode::Minimal | QuoteMode::None => needs_quotes(format, value, new_record),
    };
    if !quote_it {
        out.push_str(value);
        return Ok(());
    }

    push_quoted(format, quote, value, out);
    Ok(())
}

/// Encloses `value` in quotes, escaping or doubling embedded quotes.
fn push_quoted(format: &CsvFormat, quote: char, value: &str, out: &mut String) {
    out.push(quote);
    for c in value.chars() {
        match format.escape_char() {
            Some(escape) if c == quote || c == escape => out.push(escape),
            None if c == quote => out.push(quote),
            _ => {}
        }
        out.push(c);
    }
    out.push(quote);
}

/// Whether a value would be misread if printed bare.
fn needs_quotes(format: &CsvFormat, value: &str, new_record: bool) -> bool {
    if format.null_string() == Some(value) {
        return true;
    }
    let (Some(first), Some(last)) = (value.chars().next(), value.chars().last()) else {
        return new_record;
    };
    if first.is_whitespace() || last.is_whitespace() {
        return true;
    }
    if new_record && format.is_comment_marker(first) {
        return true;
    }
    value.chars().any(|c| {
        c == CR || c == LF || format.is_delimiter(c) || format.is_quote(c) || format.is_escape(c)
    })
}

fn encode_escaped(format: &CsvFormat, value: &str, new_record: bool, out: &mut String) -> Result<()> {
    // a present value spelling the null string must not read back as null
    let spells_null = format.null_string() == Some(value);
    for (index, c) in value.chars().enumerate() {
        let special = c == CR
            || c == LF
            || format.is_delimiter(c)
            || format.is_quote(c)
            || format.is_escape(c)
            || (index == 0 && spells_null)
            || (index == 0 && new_record && format.is_comment_marker(c));
        if special {
            let escape = format.escape_char().ok_or_else(|| {
                CsvError::Configuration(format!(
                    "cannot print {value:?} without quotes: no escape character is set"
                ))
            })?;
            out.push(escape);
        }
        out.push(c);
    }
    Ok(())
}

/// Plain decimal literal: optional sign, digits with an optional fraction,
/// optional exponent.
fn is_numeric(value: &str) -> bool {
    fn all_digits(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_digit())
    }

    let unsigned = value.strip_prefix(&['+', '-'][..]).unwrap_or(value);
    let (mantissa, exponent) = match unsigned.find(&['e', 'E'][..]) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if integer.is_empty() && fraction.is_empty() {
        return false;
    }
    if !all_digits(integer) || !all_digits(fraction) {
        return false;
    }
    match exponent {
        Some(exponent) => {
            let exponent = exponent.strip_prefix(&['+', '-'][..]).unwrap_or(exponent);
            !exponent.is_empty() && all_digits(exponent)
        }
        None => true,
    }
}
