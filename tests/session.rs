use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use rusty_dataviz::chart::{build, ChartData, ChartKind, ChartRequest};
use rusty_dataviz::{ChartError, ChartResponse, Error, ErrorCategory, LoadError, Session};

const AGE_CITY: &[u8] = b"age,city\n25,A\n30,B\n,A\n40,C\n";

fn loaded() -> Session {
    let session = Session::new();
    session.load(AGE_CITY, "csv").unwrap();
    session
}

#[test]
fn age_city_scenario() {
    let session = loaded();

    let schema = session.schema().unwrap();
    assert_eq!(schema.numeric_columns, ["age"]);
    assert_eq!(schema.categorical_columns, ["city"]);

    let dataset = session.snapshot().unwrap();
    let build_data = |request: ChartRequest| {
        build(&request, &dataset.table, &dataset.profiles).map(|spec| spec.data)
    };

    let Ok(ChartData::Histogram { bins }) =
        build_data(ChartRequest::new(ChartKind::Histogram).with_primary("age"))
    else {
        panic!("expected histogram data");
    };
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);

    let Ok(ChartData::Bar { categories }) =
        build_data(ChartRequest::new(ChartKind::Bar).with_primary("city"))
    else {
        panic!("expected bar data");
    };
    assert_eq!(
        categories,
        [("A".to_string(), 2), ("B".to_string(), 1), ("C".to_string(), 1)]
    );

    let err = build_data(ChartRequest::new(ChartKind::Correlation)).unwrap_err();
    assert_eq!(err, ChartError::InsufficientNumericColumns { found: 1 });
    assert!(err.to_string().contains("insufficient numeric columns"));
}

#[test]
fn pie_is_an_unknown_kind() {
    let session = loaded();
    match session.chart("pie", Some("age"), None) {
        ChartResponse::Error { error, category } => {
            assert_eq!(category, ErrorCategory::Chart);
            assert!(error.contains("pie"));
        }
        other => panic!("expected an error, got {other:?}"),
    }
}

#[test]
fn scatter_names_the_missing_column() {
    let session = loaded();
    let err = session
        .render_chart("scatter", Some("age"), Some("height"))
        .unwrap_err();
    assert!(matches!(
        &err,
        Error::Chart(ChartError::ColumnNotFound(name)) if name == "height"
    ));
    assert!(err.to_string().contains("height"));
}

#[test]
fn wrong_column_kind_and_missing_reference() {
    let session = loaded();
    assert!(matches!(
        session.render_chart("histogram", Some("city"), None),
        Err(Error::Chart(ChartError::ColumnNotNumeric(name))) if name == "city"
    ));
    assert!(matches!(
        session.render_chart("scatter", Some("age"), None),
        Err(Error::Chart(ChartError::ColumnNotSpecified { role: "secondary", .. }))
    ));
}

#[test]
fn chart_response_carries_a_base64_png() {
    let session = loaded();
    let response = session.chart("histogram", Some("age"), None);
    let ChartResponse::Image { image } = response else {
        panic!("expected an image, got {response:?}");
    };
    let png = STANDARD.decode(image).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn failed_upload_keeps_the_previous_table() {
    let session = loaded();

    let err = session.load(b"a,b\n1,2\n3\n", "csv").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Load);
    let err = session.load(b"whatever", "parquet").unwrap_err();
    assert!(matches!(
        err,
        Error::Load(LoadError::UnsupportedFormat { .. })
    ));

    assert_eq!(session.schema().unwrap().row_count, 4);
}

#[test]
fn nan_cells_are_missing_everywhere() {
    let session = Session::new();
    session.load(b"x,y\n1,2\nNAN,4\n3,6\n", "csv").unwrap();

    let stats = serde_json::to_value(session.stats().unwrap()).unwrap();
    assert_eq!(stats["missingValues"]["x"], json!(1));
    assert_eq!(stats["basicStats"]["x"]["count"], json!(2));
    assert_eq!(stats["basicStats"]["x"]["max"], json!(3.0));

    assert!(matches!(
        session.chart("histogram", Some("x"), None),
        ChartResponse::Image { .. }
    ));
    let dataset = session.snapshot().unwrap();
    let request = ChartRequest::new(ChartKind::Scatter).with_primary("x").with_secondary("y");
    let Ok(ChartData::Scatter { points }) =
        build(&request, &dataset.table, &dataset.profiles).map(|spec| spec.data)
    else {
        panic!("expected scatter data");
    };
    assert_eq!(points, [(1.0, 2.0), (3.0, 6.0)]);
}

#[test]
fn stats_and_rows_serialise_like_the_json_api() {
    let session = loaded();

    let stats = serde_json::to_value(session.stats().unwrap()).unwrap();
    assert_eq!(stats["basicStats"]["age"]["count"], json!(3));
    assert_eq!(stats["basicStats"]["age"]["50%"], json!(30.0));
    assert_eq!(stats["missingValues"], json!({"age": 1, "city": 0}));
    assert_eq!(stats["dataTypes"], json!({"age": "float64", "city": "object"}));

    let rows = serde_json::to_value(session.rows(2).unwrap()).unwrap();
    assert_eq!(
        rows,
        json!({
            "rows": [{"age": 25.0, "city": "A"}, {"age": 30.0, "city": "B"}],
            "totalRows": 4
        })
    );
}

#[test]
fn readers_see_whole_tables_during_replacement() {
    let session = Arc::new(loaded());
    let wide = b"a,b,c\n1,2,3\n4,5,6\n";

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                for _ in 0..200 {
                    let dataset = session.snapshot().unwrap();
                    let shape = (dataset.table.row_count(), dataset.table.column_count());
                    assert!(shape == (4, 2) || shape == (2, 3), "torn read: {shape:?}");
                }
            })
        })
        .collect();

    for i in 0..50 {
        let source: &[u8] = if i % 2 == 0 { wide } else { AGE_CITY };
        session.load(source, "csv").unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }
}
