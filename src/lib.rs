//! [crate]
//! A format-driven CSV library: one [`CsvFormat`] value describes the dialect,
//! a [`Parser`] turns characters into [`Record`]s and a [`Printer`] turns values
//! back into correctly quoted and escaped text.
//!
//! # Example (Printer):
//! ```
//! use csvformat::{CsvFormat, QuoteMode};
//!
//! let format = CsvFormat::default()
//!     .with_comment_marker('#')
//!     .with_header_comments(["exported"])
//!     .with_header(["Header1", "Header 2", "Header,3"])
//!     .with_record_separator("\n");
//!
//! let mut printer = format.printer(Vec::new()).unwrap();
//! printer.print_record(csvformat::csv!["entry", 1, 2.5]).unwrap();
//! printer.print_record([Some("a,b"), None, Some("c")]).unwrap();
//!
//! let text = String::from_utf8(printer.into_inner().unwrap()).unwrap();
//! assert_eq!(text, "# exported\nHeader1,Header 2,\"Header,3\"\nentry,1,2.5\n\"a,b\",,c\n");
//! ```
//!
//! # Example (Parser):
//! ```
//! use csvformat::CsvFormat;
//!
//! let format = CsvFormat::default()
//!     .with_first_record_as_header()
//!     .with_comment_marker('#')
//!     .with_null_string("NULL");
//!
//! let data = "Date,Open,Close\n# first day\n2024-01-02,187.15,NULL\n";
//! let mut parser = format.parse_str(data).unwrap();
//!
//! let record = parser.next_record().unwrap().unwrap();
//! assert_eq!(record.get_by_name("Open").unwrap(), Some("187.15"));
//! assert_eq!(record.get_by_name("Close").unwrap(), None);
//! assert_eq!(record.comment(), Some("first day"));
//! assert!(parser.next_record().unwrap().is_none());
//! ```

mod error;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod types;

pub use error::{CsvError, Result, Violation};
pub use format::{CsvFormat, Predefined, QuoteMode};
pub use lexer::{Lexer, Token};
pub use parser::{Entries, Parser};
pub use printer::Printer;
pub use types::{FieldsIter, HeaderMap, Position, Record, ToField};
