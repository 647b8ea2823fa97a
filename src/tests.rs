use csvformat::{CsvError, CsvFormat, Parser, Position, Predefined, Printer, QuoteMode, Record, Violation};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn row(items: &[&str]) -> Vec<Option<String>> {
    items.iter().map(|item| Some(item.to_string())).collect()
}

fn values(records: &[Record]) -> Vec<Vec<Option<String>>> {
    records.iter().map(Record::to_vec).collect()
}

fn parse_all(format: &CsvFormat, data: &str) -> Vec<Record> {
    format
        .parse_str(data)
        .expect("could not open parser.")
        .collect_records()
        .expect("could not parse records.")
}

fn print_all(format: &CsvFormat, rows: &[Vec<Option<String>>]) -> String {
    let mut printer = format.printer(Vec::new()).expect("could not open printer.");
    printer.print_records(rows).expect("could not print records.");
    String::from_utf8(printer.into_inner().expect("could not flush.")).unwrap()
}

#[test]
fn test_well_formed_csv_no_commas_no_quotes() {
    init_logger();
    let data = r#"header1,header2,header3,header4
r1c1,r1c2,r1c3,r1c4
r2c1,r2c2,r2c3,r2c4
r3c1,r3c2,r3c3,r3c4"#;
    let format = CsvFormat::default().with_first_record_as_header();
    let mut parser = Parser::new(data.as_bytes(), &format).expect("could not create parser.");
    let header_len = parser.headers().unwrap().len();
    let rows: Vec<_> = parser.entries().map(|entry| entry.unwrap()).collect();

    assert_eq!(header_len, 4);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 4);
    assert_eq!(rows[0].get_casted::<String>(0).unwrap(), "r1c1".to_owned());
    assert_eq!(rows[1].get_by_name("header2").unwrap(), Some("r2c2"));
    assert_eq!(rows[2].record_number(), 3);
}

#[test]
fn test_well_formed_csv_with_number_fields() {
    let data = r#"header1,header2,header3,header4
11,12,13,14
21,22,23,24
31,32,33,34"#;
    let rows = parse_all(&CsvFormat::default().with_first_record_as_header(), data);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get_casted::<i32>(0).unwrap(), 11);
    assert_eq!(rows[1].get_casted::<i32>(1).unwrap(), 22);
    assert_eq!(rows[2].get_casted::<i32>(2).unwrap(), 33);
    assert!(matches!(
        rows[2].get_casted::<i32>(9),
        Err(CsvError::NotAField(9))
    ));
}

#[test]
fn test_well_formed_csv_with_quoted_strings() {
    let data = r#"header1,header2,header3,header4
"test,",12,13,"com,ma"
"""wow""",22,23,24
"b""d",32,33,34"#;
    let rows = parse_all(&CsvFormat::default().with_first_record_as_header(), data);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get(0), Some("test,"));
    assert_eq!(rows[0].get(3), Some("com,ma"));
    assert_eq!(rows[1].get(0), Some("\"wow\""));
    assert_eq!(rows[2].get(0), Some("b\"d"));
}

#[test]
fn test_well_formed_csv_with_empty_fields() {
    let data = "header1,header2,header3,header4\n,,,\n,,,\n";
    let rows = parse_all(&CsvFormat::default().with_first_record_as_header(), data);

    assert_eq!(values(&rows), vec![row(&["", "", "", ""]), row(&["", "", "", ""])]);
}

#[test]
fn test_quoted_line_breaks_are_kept_raw() {
    let data = "a,\"multi\r\nline\",\"old\rmac\"\nb,c,d";
    let rows = parse_all(&CsvFormat::default(), data);

    assert_eq!(
        values(&rows),
        vec![row(&["a", "multi\r\nline", "old\rmac"]), row(&["b", "c", "d"])]
    );
    assert_eq!(rows[1].position(), Position::new(26, 4));
}

#[test]
fn test_record_positions() {
    let data = "a\n\"multi\nline\",x\nb";
    let rows = parse_all(&CsvFormat::default(), data);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].position(), Position::new(0, 1));
    assert_eq!(rows[1].position(), Position::new(2, 2));
    assert_eq!(rows[2].position(), Position::new(17, 4));
}

#[test]
fn test_consecutive_comments_merge_into_one() {
    let format = CsvFormat::default().with_comment_marker('#');
    let data = "#c1\n#c2\n# c3\n#c4\na,b\nc,d\n";
    let rows = parse_all(&format, data);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows.iter().filter(|record| record.has_comment()).count(), 1);
    assert_eq!(rows[0].comment(), Some("c1\nc2\nc3\nc4"));
    assert_eq!(rows[1].comment(), None);
}

#[test]
fn test_header_and_trailer_comments() {
    let format = CsvFormat::default()
        .with_first_record_as_header()
        .with_comment_marker('#');
    let data = "# exported\n# by tool\nname,age\n# kid\nMike,15\n# end\n";
    let mut parser = format.parse_str(data).unwrap();

    assert_eq!(parser.header_comment(), Some("exported\nby tool"));
    let records = parser.collect_records().unwrap();
    assert_eq!(values(&records), vec![row(&["Mike", "15"])]);
    assert_eq!(records[0].comment(), Some("kid"));
    assert_eq!(parser.trailer_comment(), Some("end"));
}

#[test]
fn test_comment_marker_only_counts_at_line_start() {
    let format = CsvFormat::default().with_comment_marker('#');
    let rows = parse_all(&format, "a,#b\n\"#c\",d\n");

    assert_eq!(values(&rows), vec![row(&["a", "#b"]), row(&["#c", "d"])]);
    assert!(!rows[0].has_comment());
}

#[test]
fn test_header_preamble_order_does_not_depend_on_configuration_order() {
    let first = CsvFormat::default()
        .with_comment_marker('#')
        .with_header_comments(["c1", "c2"])
        .with_header(["a", "b"]);
    let second = CsvFormat::default()
        .with_header(["a", "b"])
        .with_header_comments(["c1", "c2"])
        .with_comment_marker('#');

    let expected = "# c1\r\n# c2\r\na,b\r\n1,2\r\n";
    assert_eq!(print_all(&first, &[row(&["1", "2"])]), expected);
    assert_eq!(print_all(&second, &[row(&["1", "2"])]), expected);
}

#[test]
fn test_preamble_without_records() {
    let format = CsvFormat::default()
        .with_comment_marker('#')
        .with_header_comments(["only"])
        .with_header(["a"]);
    let mut printer = format.printer(Vec::new()).unwrap();
    printer.flush().unwrap();

    let text = String::from_utf8(printer.into_inner().unwrap()).unwrap();
    assert_eq!(text, "# only\r\na\r\n");
}

#[test]
fn test_minimal_quoting() {
    let format = CsvFormat::default().with_record_separator("\n");
    let text = print_all(
        &format,
        &[
            row(&["a,b", "plain", "say \"hi\"", " padded", "two\nlines"]),
            row(&["", "x"]),
        ],
    );

    assert_eq!(
        text,
        "\"a,b\",plain,\"say \"\"hi\"\"\",\" padded\",\"two\nlines\"\n\"\",x\n"
    );
}

#[test]
fn test_quote_modes() {
    let base = CsvFormat::default()
        .with_record_separator("\n")
        .with_null_string("NULL");
    let record = vec![Some("1".to_owned()), Some("x".to_owned()), None];

    let all = base.with_quote_mode(QuoteMode::All);
    assert_eq!(all.format_record(&record).unwrap(), "\"1\",\"x\",\"NULL\"");

    let all_non_null = base.with_quote_mode(QuoteMode::AllNonNull);
    assert_eq!(all_non_null.format_record(&record).unwrap(), "\"1\",\"x\",NULL");
    assert_eq!(values(&parse_all(&all_non_null, "\"1\",\"x\",NULL")), vec![record.clone()]);

    let non_numeric = base.with_quote_mode(QuoteMode::NonNumeric);
    assert_eq!(non_numeric.format_record(&record).unwrap(), "1,\"x\",NULL");

    let none = base.with_quote_mode(QuoteMode::None).with_escape('\\');
    assert_eq!(
        none.format_record([Some("a,b"), Some("c")]).unwrap(),
        "a\\,b,c"
    );

    let no_escape = base.with_quote_mode(QuoteMode::None);
    assert!(matches!(
        no_escape.format_record([Some("a,b")]),
        Err(CsvError::Configuration(_))
    ));
}

#[test]
fn test_null_sentinel() {
    let format = CsvFormat::default().with_null_string("NULL");
    let rows = parse_all(&format, "NULL,\"NULL\",x\n");

    assert_eq!(
        values(&rows),
        vec![vec![None, Some("NULL".to_owned()), Some("x".to_owned())]]
    );
    assert!(rows[0].is_null(0));
    assert!(!rows[0].is_null(1));

    let text = print_all(&format, &values(&rows));
    assert_eq!(text, "NULL,\"NULL\",x\r\n");
}

#[test]
fn test_empty_sources() {
    assert_eq!(parse_all(&CsvFormat::default(), "").len(), 0);
    assert_eq!(parse_all(&CsvFormat::default(), "\n").len(), 0);
    assert_eq!(parse_all(&CsvFormat::default(), "\r\n\r\n").len(), 0);

    let keep = CsvFormat::rfc4180();
    assert_eq!(values(&parse_all(&keep, "\n")), vec![row(&[""])]);
    assert_eq!(values(&parse_all(&keep, "a\n\nb")), vec![row(&["a"]), row(&[""]), row(&["b"])]);
}

#[test]
fn test_record_shorter_than_header() {
    let strict = CsvFormat::default().with_header(["a", "b", "c"]);
    let mut parser = strict.parse_str("1,2,3\n1,2\n").unwrap();
    assert!(parser.next_record().unwrap().is_some());

    let error = parser.next_record().unwrap_err();
    assert!(error.is_malformed_input());
    match error {
        CsvError::MalformedInput {
            record, violation, ..
        } => {
            assert_eq!(record, 2);
            assert_eq!(
                violation,
                Violation::FieldCountMismatch {
                    expected: 3,
                    found: 2
                }
            );
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(parser.is_closed());
    assert!(parser.next_record().unwrap().is_none());

    let lenient = strict.with_allow_missing_column_names(true);
    let rows = parse_all(&lenient, "1,2\n");
    assert_eq!(values(&rows), vec![row(&["1", "2"])]);
    assert!(!rows[0].is_consistent());
    assert!(rows[0].is_mapped("c"));
    assert!(!rows[0].is_set("c"));
    assert!(matches!(rows[0].get_by_name("c"), Err(CsvError::NotAField(2))));
}

#[test]
fn test_unterminated_quote_reports_record_and_position() {
    let mut parser = CsvFormat::default().parse_str("a,b\nc,d\n\"bad").unwrap();
    assert_eq!(parser.collect_records().ok(), None);

    let mut parser = CsvFormat::default().parse_str("a,b\nc,d\n\"bad").unwrap();
    parser.next_record().unwrap();
    parser.next_record().unwrap();
    let error = parser.next_record().unwrap_err();
    match error {
        CsvError::MalformedInput {
            record, violation, ..
        } => {
            assert_eq!(record, 3);
            assert_eq!(violation, Violation::UnterminatedQuote(Position::new(8, 3)));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let lenient = CsvFormat::default().with_lenient_eof(true);
    assert_eq!(values(&parse_all(&lenient, "\"bad")), vec![row(&["bad"])]);
}

#[test]
fn test_text_after_closing_quote() {
    let error = CsvFormat::default()
        .parse_str("\"a\"b,c")
        .unwrap()
        .next_record()
        .unwrap_err();
    assert_eq!(error.violation(), Some(&Violation::TrailingText('b')));

    let lenient = CsvFormat::default().with_allow_trailing_text(true);
    assert_eq!(values(&parse_all(&lenient, "\"a\"b,c")), vec![row(&["ab", "c"])]);
}

#[test]
fn test_strict_quotes() {
    let data = "ab\"c,d";
    assert_eq!(values(&parse_all(&CsvFormat::default(), data)), vec![row(&["ab\"c", "d"])]);

    let strict = CsvFormat::default().with_strict_quotes(true);
    let error = strict.parse_str(data).unwrap().next_record().unwrap_err();
    assert_eq!(error.violation(), Some(&Violation::UnexpectedQuote('"')));
}

#[test]
fn test_explicit_header_with_skipped_first_record() {
    let format = CsvFormat::default()
        .with_header(["a", "b"])
        .with_skip_header_record(true);
    let rows = parse_all(&format, "x,y\n1,2\n");

    assert_eq!(values(&rows), vec![row(&["1", "2"])]);
    assert_eq!(rows[0].get_by_name("a").unwrap(), Some("1"));
    assert_eq!(rows[0].record_number(), 1);

    let kept = format.with_skip_header_record(false);
    assert_eq!(parse_all(&kept, "x,y\n1,2\n").len(), 2);
}

#[test]
fn test_duplicate_header_names() {
    let format = CsvFormat::default().with_first_record_as_header();
    match format.parse_str("a,b,a\n1,2,3\n") {
        Err(CsvError::DuplicateHeaderName { name, .. }) => assert_eq!(name, "a"),
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("duplicate header accepted"),
    }

    let allowed = format.with_allow_duplicate_header_names(true);
    let rows = parse_all(&allowed, "a,b,a\n1,2,3\n");
    assert_eq!(rows[0].get_by_name("a").unwrap(), Some("3"));
    assert_eq!(&rows[0][0], "1");
}

#[test]
fn test_missing_header_names() {
    let format = CsvFormat::default().with_first_record_as_header();
    let error = format.parse_str("a,,c\n1,2,3\n").err().unwrap();
    assert_eq!(
        error.violation(),
        Some(&Violation::MissingHeaderName { column: 1 })
    );

    let allowed = format.with_allow_missing_column_names(true);
    assert_eq!(parse_all(&allowed, "a,,c\n1,2,3\n").len(), 1);
}

#[test]
fn test_ignore_header_case() {
    let format = CsvFormat::default()
        .with_first_record_as_header()
        .with_ignore_header_case(true);
    let rows = parse_all(&format, "Name,Age\nMike,15\n");

    assert_eq!(rows[0].get_by_name("NAME").unwrap(), Some("Mike"));
    assert_eq!(rows[0].get_by_name("age").unwrap(), Some("15"));

    let sensitive = CsvFormat::default().with_first_record_as_header();
    let rows = parse_all(&sensitive, "Name,Age\nMike,15\n");
    assert!(matches!(rows[0].get_by_name("name"), Err(CsvError::InvalidColumn(_))));
}

#[test]
fn test_max_rows() {
    let format = CsvFormat::default().with_max_rows(2);
    let mut parser = format.parse_str("1\n2\n3\n").unwrap();

    assert_eq!(values(&parser.collect_records().unwrap()), vec![row(&["1"]), row(&["2"])]);
    assert!(parser.is_closed());
}

#[test]
fn test_trim_and_trailing_delimiter() {
    let format = CsvFormat::default()
        .with_trim(true)
        .with_trailing_delimiter(true);
    let rows = parse_all(&format, " a , b ,\nc,\" d \",\n");
    assert_eq!(values(&rows), vec![row(&["a", "b"]), row(&["c", "d"])]);

    let printed = format.with_record_separator("\n");
    assert_eq!(print_all(&printed, &[row(&[" a ", "b"])]), "a,b,\n");
}

#[test]
fn test_surrounding_spaces() {
    let format = CsvFormat::default().with_ignore_surrounding_spaces(true);
    let rows = parse_all(&format, "  a  ,  \" b \"  ,c\n");
    assert_eq!(values(&rows), vec![row(&["a", " b ", "c"])]);
}

#[test]
fn test_invalid_formats_fail_at_session_open() {
    let bad = [
        CsvFormat::default().with_delimiter('\n'),
        CsvFormat::default().with_quote(','),
        CsvFormat::default().with_escape('"'),
        CsvFormat::default().with_comment_marker('\r'),
        CsvFormat::default().with_header(["a", "a"]),
    ];
    for format in bad {
        assert!(matches!(format.validate(), Err(CsvError::Configuration(_))));
        assert!(matches!(format.parse_str("x"), Err(CsvError::Configuration(_))));
        assert!(matches!(format.printer(Vec::new()), Err(CsvError::Configuration(_))));
    }
}

#[test]
fn test_close_is_idempotent() {
    let mut parser = CsvFormat::default().parse_str("a\nb\n").unwrap();
    assert!(parser.next_record().unwrap().is_some());
    parser.close();
    parser.close();
    assert!(parser.is_closed());
    assert!(parser.next_record().unwrap().is_none());
    assert_eq!(parser.current_line(), None);

    let mut printer = CsvFormat::default().printer(Vec::new()).unwrap();
    printer.print_record(["a"]).unwrap();
    printer.close().unwrap();
    printer.close().unwrap();
    assert!(matches!(printer.print_record(["b"]), Err(CsvError::Io(_))));
}

#[test]
fn test_print_field_by_field() {
    let format = CsvFormat::default().with_record_separator("\n");
    let mut printer = format.printer(Vec::new()).unwrap();
    printer.print("a").unwrap();
    printer.print(&1).unwrap();
    printer.print(&None::<String>).unwrap();
    printer.println().unwrap();
    printer.print("#start").unwrap();
    printer.println().unwrap();

    let text = String::from_utf8(printer.into_inner().unwrap()).unwrap();
    assert_eq!(text, "a,1,\n#start\n");
}

#[test]
fn test_comments_survive_a_parse_print_cycle() {
    let format = CsvFormat::default()
        .with_comment_marker('#')
        .with_record_separator("\n");
    let data = "# note\n# more\na,b\n\"#start\",c\n";
    let rows = parse_all(&format, data);
    assert_eq!(values(&rows), vec![row(&["a", "b"]), row(&["#start", "c"])]);

    let mut printer = format.printer(Vec::new()).unwrap();
    for record in &rows {
        printer.print_parsed(record).unwrap();
    }
    let text = String::from_utf8(printer.into_inner().unwrap()).unwrap();
    assert_eq!(text, "# note\n# more\na,b\n\"#start\",c\n");
    assert_eq!(values(&parse_all(&format, &text)), values(&rows));
}

#[test]
fn test_files_round_trip() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.csv");
    let format = CsvFormat::default().with_header(["Date", "Open", "Close"]);

    let mut printer = Printer::from_path(&path, &format).unwrap();
    printer.print_record(csvformat::csv!["2024-01-02", 187.15, 185.64]).unwrap();
    printer.print_record(csvformat::csv!["2024-01-03", 184.22, 184.25]).unwrap();
    printer.close().unwrap();

    let reading = CsvFormat::default().with_first_record_as_header();
    let mut parser = Parser::from_path(&path, &reading).unwrap();
    let closes: Vec<f64> = parser
        .entries()
        .map(|record| record.unwrap().get_by_name("Close").unwrap().unwrap().parse().unwrap())
        .collect();
    assert_eq!(closes, vec![185.64, 184.25]);

    assert!(matches!(
        Parser::from_path(dir.path().join("missing.csv"), &reading),
        Err(CsvError::Io(_))
    ));
}

#[test]
fn test_predefined_formats() {
    assert_eq!("PostgreSQL_CSV".parse::<Predefined>().unwrap(), Predefined::PostgresqlCsv);
    assert_eq!("mysql".parse::<Predefined>().unwrap().format(), CsvFormat::mysql());
    assert!("oracle".parse::<Predefined>().is_err());

    let mysql = Predefined::Mysql.format();
    let rows = vec![vec![Some("a\tb".to_owned()), None, Some("c\nd".to_owned())]];
    let text = print_all(&mysql, &rows);
    assert_eq!(text, "a\\\tb\t\\N\tc\\\nd\n");
    assert_eq!(values(&parse_all(&mysql, &text)), rows);
    assert_eq!(values(&parse_all(&mysql, "\\N\tN\n")), vec![vec![None, Some("N".to_owned())]]);

    let tdf = CsvFormat::tdf();
    assert_eq!(values(&parse_all(&tdf, " a \t b\n")), vec![row(&["a", "b"])]);

    let excel = CsvFormat::excel();
    assert_eq!(values(&parse_all(&excel, "a,,b\n\n")), vec![row(&["a", "", "b"]), row(&[""])]);
}

#[test]
fn test_every_preset_reads_back_what_it_prints() {
    let with_nulls = vec![
        vec![
            Some("plain".to_owned()),
            None,
            Some("tab\there".to_owned()),
            Some("line\nbreak".to_owned()),
        ],
        vec![
            Some("\\N".to_owned()),
            Some("N".to_owned()),
            Some("back\\slash".to_owned()),
            Some(String::new()),
        ],
        vec![None],
    ];
    let without_nulls: Vec<Vec<Option<String>>> = with_nulls
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|value| Some(value.clone().unwrap_or_else(|| "x".to_owned())))
                .collect()
        })
        .collect();

    let presets = [
        Predefined::Default,
        Predefined::Excel,
        Predefined::Mysql,
        Predefined::PostgresqlCsv,
        Predefined::PostgresqlText,
        Predefined::Rfc4180,
        Predefined::Tdf,
    ];
    for preset in presets {
        let format = preset.format();
        let rows = if format.null_string().is_some() {
            &with_nulls
        } else {
            &without_nulls
        };
        let text = print_all(&format, rows);
        assert_eq!(&values(&parse_all(&format, &text)), rows, "{preset} printed {text:?}");
    }
}

#[test]
fn test_header_row_also_yielded_when_not_skipped() {
    let data = "a,b\n1,2\n";
    let format = CsvFormat::default()
        .with_first_record_as_header()
        .with_skip_header_record(false);
    let rows = parse_all(&format, data);

    assert_eq!(values(&rows), vec![row(&["a", "b"]), row(&["1", "2"])]);
    assert_eq!(rows[0].get_by_name("b").unwrap(), Some("b"));
    assert_eq!(rows[1].get_by_name("b").unwrap(), Some("2"));
    assert_eq!(rows[1].record_number(), 2);

    let names_only = CsvFormat::default().with_header(Vec::<String>::new());
    assert_eq!(values(&parse_all(&names_only, data)), values(&rows));

    let skipped = CsvFormat::default().with_first_record_as_header();
    assert_eq!(values(&parse_all(&skipped, data)), vec![row(&["1", "2"])]);
}

#[test]
fn test_escaped_values_spelling_the_null_string() {
    let format = CsvFormat::default()
        .with_quote_mode(QuoteMode::None)
        .with_escape('\\')
        .with_null_string("NULL");
    let rows = vec![vec![Some("NULL".to_owned()), None, Some("NULLS".to_owned())]];
    let text = print_all(&format, &rows);

    assert_eq!(text, "\\NULL,NULL,NULLS\r\n");
    assert_eq!(values(&parse_all(&format, &text)), rows);
}

#[test]
fn test_escaped_whitespace_is_not_trimmed() {
    let format = CsvFormat::default()
        .with_ignore_surrounding_spaces(true)
        .with_escape('\\');
    let rows = parse_all(&format, "a\\ ,b \n");
    assert_eq!(values(&rows), vec![row(&["a ", "b"])]);
}

fn field_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z,;\"\r\n #\\\\NUL]{0,8}")
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<Option<String>>>> {
    prop::collection::vec(prop::collection::vec(field_strategy(), 1..5), 0..8)
}

proptest! {
    #[test]
    fn prop_minimal_quoting_round_trips(rows in rows_strategy()) {
        let format = CsvFormat::default()
            .with_null_string("NULL")
            .with_comment_marker('#');
        let text = print_all(&format, &rows);
        prop_assert_eq!(values(&parse_all(&format, &text)), rows);
    }

    #[test]
    fn prop_quoting_with_escape_round_trips(rows in rows_strategy()) {
        let format = CsvFormat::default()
            .with_delimiter(';')
            .with_escape('\\')
            .with_null_string("NULL");
        let text = print_all(&format, &rows);
        prop_assert_eq!(values(&parse_all(&format, &text)), rows);
    }

    #[test]
    fn prop_quote_all_non_null_round_trips(rows in rows_strategy()) {
        let format = CsvFormat::default()
            .with_quote_mode(QuoteMode::AllNonNull)
            .with_null_string("NULL")
            .with_record_separator("\n");
        let text = print_all(&format, &rows);
        prop_assert_eq!(values(&parse_all(&format, &text)), rows);
    }

    #[test]
    fn prop_escaping_without_quotes_round_trips(rows in rows_strategy()) {
        let format = CsvFormat::default()
            .with_delimiter(';')
            .with_quote_mode(QuoteMode::None)
            .with_escape('\\')
            .with_null_string("NULL")
            .with_ignore_empty_lines(false);
        let text = print_all(&format, &rows);
        prop_assert_eq!(values(&parse_all(&format, &text)), rows);
    }
}
