use std::{
    any::type_name,
    borrow::Cow,
    collections::HashMap,
    fmt::{self, Display},
    ops::Index,
    str::FromStr,
    sync::Arc,
};

use log::warn;

use crate::{CsvError, CsvFormat, Result, Violation};

pub(crate) const CR: char = '\r';
pub(crate) const LF: char = '\n';
pub(crate) const SP: char = ' ';
pub(crate) const TAB: char = '\t';
pub(crate) const DOUBLE_QUOTE: char = '"';
pub(crate) const BACKSLASH: char = '\\';
pub(crate) const DEFAULT_DELIM: char = ',';
pub(crate) const CRLF: &str = "\r\n";

/// Location of a character in the source.
///
/// `offset` counts characters from the start of the source (0-based),
/// `line` counts line breaks (1-based). CR, LF and CRLF each count once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub offset: u64,
    pub line: u64,
}

impl Position {
    pub fn new(offset: u64, line: u64) -> Self {
        Self { offset, line }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, offset {}", self.line, self.offset)
    }
}

/// Column names of one parse session and their lookup table.
///
/// Built once per session and shared by every [`Record`] through an `Arc`.
/// Blank names keep their position but are never mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    names: Vec<String>,
    index: HashMap<String, usize>,
    ignore_case: bool,
}

impl HeaderMap {
    /// Builds the mapping from a header row read off the source.
    ///
    /// # Errors
    /// A blank name fails unless `allow_missing_column_names` is set, a repeated
    /// name fails with [`CsvError::DuplicateHeaderName`] unless
    /// `allow_duplicate_header_names` is set.
    pub(crate) fn build(names: Vec<String>, format: &CsvFormat, position: Position) -> Result<Self> {
        let ignore_case = format.ignore_header_case();
        let mut index = HashMap::with_capacity(names.len());

        for (column, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                if !format.allow_missing_column_names() {
                    return Err(CsvError::malformed(
                        0,
                        position,
                        Violation::MissingHeaderName { column },
                    ));
                }
                continue;
            }

            let key = lookup_key(name, ignore_case);
            if index.contains_key(&key) {
                if !format.allow_duplicate_header_names() {
                    return Err(CsvError::DuplicateHeaderName {
                        name: name.clone(),
                        position,
                    });
                }
                warn!("duplicate header name `{name}` at column {column}, later column wins");
            }
            index.insert(key, column);
        }

        Ok(Self {
            names,
            index,
            ignore_case,
        })
    }

    /// Header names in column order, blanks included.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Zero-based column for a name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        if self.ignore_case {
            self.index.get(&name.to_lowercase()).copied()
        } else {
            self.index.get(name).copied()
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }
}

fn lookup_key(name: &str, ignore_case: bool) -> String {
    if ignore_case {
        name.to_lowercase()
    } else {
        name.to_owned()
    }
}

/// One parsed CSV row.
///
/// Values are `None` where the source held the format's null string.
/// Records are detached from the parser that produced them: the header mapping
/// is shared, everything else is owned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    values: Vec<Option<String>>,
    record_number: u64,
    position: Position,
    comment: Option<String>,
    headers: Option<Arc<HeaderMap>>,
}

impl Record {
    pub(crate) fn new(
        values: Vec<Option<String>>,
        record_number: u64,
        position: Position,
        comment: Option<String>,
        headers: Option<Arc<HeaderMap>>,
    ) -> Self {
        Self {
            values,
            record_number,
            position,
            comment,
            headers,
        }
    }

    /// Builds a detached record, e.g. to hand to a [`crate::Printer`].
    pub fn from_values(values: Vec<Option<String>>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Value at `index`. `None` for a null value or an index past the end.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|value| value.as_deref())
    }

    /// Whether the value at `index` exists and is null.
    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(None))
    }

    /// Value of the column called `name`.
    ///
    /// # Errors
    /// [`CsvError::NoHeader`] when the session had no header,
    /// [`CsvError::InvalidColumn`] when the name is unknown and
    /// [`CsvError::NotAField`] when this record is shorter than the header.
    pub fn get_by_name(&self, name: &str) -> Result<Option<&str>> {
        let headers = self.headers.as_ref().ok_or(CsvError::NoHeader)?;
        let index = headers
            .index_of(name)
            .ok_or_else(|| CsvError::InvalidColumn(name.to_owned()))?;
        match self.values.get(index) {
            Some(value) => Ok(value.as_deref()),
            None => Err(CsvError::NotAField(index)),
        }
    }

    /// Attempts to retrieve and cast a field to a given type.
    ///
    /// # Examples:
    /// ```
    /// let format = csvformat::CsvFormat::default();
    /// let record = format.parse_str("This is a row,25,56.2").unwrap().next_record().unwrap().unwrap();
    ///
    /// assert_eq!(record.get_casted::<String>(0).unwrap(), "This is a row".to_string());
    /// assert_eq!(record.get_casted::<u32>(1).unwrap(), 25);
    /// assert_eq!(record.get_casted::<f64>(2).unwrap(), 56.2);
    /// ```
    pub fn get_casted<T: FromStr>(&self, index: usize) -> Result<T> {
        match self.values.get(index) {
            Some(value) => {
                let value = value.as_deref().unwrap_or_default();
                value.parse::<T>().map_err(|_| {
                    CsvError::ConversionError(index, value.to_owned(), type_name::<T>().to_owned())
                })
            }
            None => Err(CsvError::NotAField(index)),
        }
    }

    /// Iterates over the values in column order.
    pub fn iter(&self) -> FieldsIter<'_> {
        FieldsIter {
            record: self,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<Option<String>> {
        self.values.clone()
    }

    /// 1-based number of this record among the data records of its session.
    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    /// Where the record's first character sits in the source.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    /// Comment lines that immediately preceded this record, joined with `\n`.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_deref()
    }

    /// Whether `name` is a column of the header mapping.
    pub fn is_mapped(&self, name: &str) -> bool {
        self.headers
            .as_ref()
            .is_some_and(|headers| headers.contains(name))
    }

    /// Whether `name` is mapped and this record is long enough to hold it.
    pub fn is_set(&self, name: &str) -> bool {
        self.headers
            .as_ref()
            .and_then(|headers| headers.index_of(name))
            .is_some_and(|index| index < self.values.len())
    }

    /// Whether the record has exactly as many values as the header has names.
    /// Always true without a header.
    pub fn is_consistent(&self) -> bool {
        self.headers
            .as_ref()
            .map_or(true, |headers| headers.len() == self.values.len())
    }

    /// Name to value map. Columns this record lacks are left out.
    pub fn to_map(&self) -> HashMap<String, Option<String>> {
        let mut map = HashMap::new();
        if let Some(headers) = &self.headers {
            for (index, name) in headers.names().iter().enumerate() {
                if name.trim().is_empty() {
                    continue;
                }
                if let Some(value) = self.values.get(index) {
                    map.insert(name.clone(), value.clone());
                }
            }
        }
        map
    }
}

impl From<&[&str]> for Record {
    fn from(fields: &[&str]) -> Self {
        Record::from_values(fields.iter().map(|field| Some(field.to_string())).collect())
    }
}

impl From<&Record> for Vec<Option<String>> {
    fn from(value: &Record) -> Self {
        value.to_vec()
    }
}

impl Index<usize> for Record {
    type Output = str;

    /// Null values index as the empty string.
    fn index(&self, index: usize) -> &Self::Output {
        self.values
            .get(index)
            .expect("Index out of bounds in Record")
            .as_deref()
            .unwrap_or_default()
    }
}

impl Display for Record {
    /// Writes the values as one line of default-format CSV, without separator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = CsvFormat::default()
            .format_record(&self.values)
            .map_err(|_| fmt::Error)?;
        f.write_str(&line)
    }
}

pub struct FieldsIter<'a> {
    record: &'a Record,
    index: usize,
}

impl<'a> Iterator for FieldsIter<'a> {
    type Item = Option<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.record.values.get(self.index)?;
        self.index += 1;
        Some(value.as_deref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.record.values.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FieldsIter<'_> {}

impl<'a> IntoIterator for &'a Record {
    type Item = Option<&'a str>;
    type IntoIter = FieldsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A value the [`crate::Printer`] can write as one field.
///
/// `None` means an absent value, printed as the format's null string.
pub trait ToField {
    fn to_field(&self) -> Option<Cow<'_, str>>;
}

impl ToField for str {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl ToField for String {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl ToField for Cow<'_, str> {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_ref()))
    }
}

impl<T: ToField + ?Sized> ToField for &T {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        (**self).to_field()
    }
}

impl<T: ToField> ToField for Option<T> {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(|value| value.to_field())
    }
}

macro_rules! display_to_field {
    ($($t:ty),*) => {
        $(impl ToField for $t {
            fn to_field(&self) -> Option<Cow<'_, str>> {
                Some(Cow::Owned(self.to_string()))
            }
        })*
    };
}

display_to_field!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char);

/// Create a list of printable values from several expressions.
/// Every expression is turned into a present value through its `Display` impl.
///
/// # Examples:
/// ```
/// let header = csvformat::csv!["Header 1", "Header 2", "Header 3"];
/// let entry1 = csvformat::csv!["This is text", 1.2, 5];
/// assert_eq!(entry1[2].as_deref(), Some("5"));
/// ```
#[macro_export]
macro_rules! csv {
    ($($e:expr),* $(,)?) => {
        {
            let row: ::std::vec::Vec<::std::option::Option<::std::string::String>> =
                ::std::vec![$(::std::option::Option::Some(::std::format!("{}", $e))),*];
            row
        }
    };
}
