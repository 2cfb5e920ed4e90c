use delimit_model::{
    Column, DataType, ModelError, RecordPosition, SchemaDescription, TimeZoneSource, Value,
    ValueFormat, Warning, WarningKind, WarningScope,
};

#[test]
fn schema_description_marks_ignored_and_unconverted() {
    let columns = vec![
        Column::typed("Id", DataType::Integer).with_ordinal(0),
        Column::typed("Raw", DataType::Double)
            .with_ordinal(1)
            .with_convert(false),
        Column::new("Skip").with_ordinal(2).with_ignore(true),
    ];
    let description = SchemaDescription::from_columns(&columns);
    assert_eq!(description.len(), 3);
    assert_eq!(description.columns[0].data_type, DataType::Integer);
    assert_eq!(description.columns[1].data_type, DataType::String);
    let visible: Vec<&str> = description
        .visible()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(visible, vec!["Id", "Raw"]);
}

#[test]
fn column_names_match_ignoring_case_and_padding() {
    let column = Column::new("Straße");
    assert!(column.matches_name(" STRASSE ") || column.matches_name("straße"));
    assert!(column.matches_name("STRAßE"));
    assert!(!column.matches_name("Street"));
}

#[test]
fn data_type_names_parse_with_aliases() {
    assert_eq!("uuid".parse::<DataType>().ok(), Some(DataType::Guid));
    assert_eq!(" Date ".parse::<DataType>().ok(), Some(DataType::DateTime));
    assert!(matches!(
        "currency".parse::<DataType>(),
        Err(ModelError::UnknownDataType { .. })
    ));
    assert_eq!(DataType::Numeric.describe(), "decimal");
    assert_eq!(DataType::Integer.with_article(), "an integer");
    assert_eq!(DataType::DateTime.with_article(), "a date");
}

#[test]
fn value_format_reads_partial_json() {
    let format: ValueFormat =
        serde_json::from_str(r#"{"data_type": "DateTime", "date_format": "dd.MM.yyyy;yyyyMMdd"}"#)
            .expect("parse format");
    assert_eq!(format.time_part_format, "HH:mm:ss");
    assert_eq!(
        format.date_patterns().collect::<Vec<_>>(),
        vec!["dd.MM.yyyy", "yyyyMMdd"]
    );
    assert!(format.validate().is_ok());
}

#[test]
fn columns_with_time_zone_serialize() {
    let column = Column::typed("When", DataType::DateTime)
        .with_time_part("Clock")
        .with_time_zone(TimeZoneSource::Constant("+01:00".to_string()));
    let json = serde_json::to_value(&column).expect("serialize");
    assert_eq!(json["time_part"], "Clock");
    assert_eq!(json["time_zone"]["Constant"], "+01:00");
}

#[test]
fn values_report_type_and_render() {
    assert!(Value::Null.is_null());
    assert_eq!(Value::Integer(4).data_type(), Some(DataType::Integer));
    assert_eq!(Value::Null.display_with("(null)").to_string(), "(null)");
    assert_eq!(Value::Binary(vec![1, 2, 3]).to_string(), "<3 bytes>");
}

#[test]
fn warnings_render_position_and_scope() {
    let warning = Warning {
        record_number: 7,
        scope: WarningScope::Row,
        kind: WarningKind::RowShape,
        message: "Line has fewer columns than expected (1 of 2)".to_string(),
        start_line: 9,
        end_line: 9,
        column_name: None,
    };
    assert_eq!(warning.ordinal(), -1);
    assert!(warning.is_row_level());
    assert_eq!(
        warning.to_string(),
        "record 7 (line 9): Line has fewer columns than expected (1 of 2)"
    );
    assert_eq!(WarningKind::EmptyTrailingColumns.to_string(), "empty trailing columns");
}

#[test]
fn record_position_spans_lines() {
    let position = RecordPosition {
        start_line: 4,
        end_line: 6,
        record_number: 2,
    };
    assert_eq!(position.line_span(), 3);
    assert_eq!(RecordPosition::default().line_span(), 1);
}

#[test]
fn columns_read_from_partial_json() {
    let column: Column =
        serde_json::from_str(r#"{"name": "Qty", "value_format": {"data_type": "Integer"}}"#)
            .expect("parse column");
    assert_eq!(column.data_type(), DataType::Integer);
    assert!(column.convert);
    assert!(!column.ignore);
    assert_eq!(column.time_zone, None);
}
