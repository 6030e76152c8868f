use approx::assert_relative_eq;
use proptest::prelude::*;

use rusty_dataviz::chart::math::{correlation_matrix, histogram, HISTOGRAM_BINS};
use rusty_dataviz::chart::{build, ChartData, ChartKind, ChartRequest};
use rusty_dataviz::data::loader::load;
use rusty_dataviz::data::schema::classify;
use rusty_dataviz::render::{render, HEIGHT, WIDTH};
use rusty_dataviz::{Column, ColumnData, Table};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn chart(table: &Table, request: ChartRequest) -> ChartData {
    build(&request, table, &classify(table)).unwrap().data
}

fn optional_floats() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.85, -1_000.0f64..1_000.0), 0..80)
}

proptest! {
    #[test]
    fn histogram_bins_conserve_the_value_count(values in optional_floats()) {
        let present = values.iter().flatten().count();
        let table = Table::new(vec![Column::new("v", ColumnData::Float(values))]).unwrap();

        let ChartData::Histogram { bins } = chart(&table, ChartRequest::new(ChartKind::Histogram).with_primary("v")) else {
            panic!("expected histogram data");
        };
        prop_assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), present);
        if present > 0 {
            prop_assert_eq!(bins.len(), HISTOGRAM_BINS);
        }
    }

    #[test]
    fn scatter_drops_rows_missing_either_coordinate(
        rows in prop::collection::vec(
            (prop::option::weighted(0.8, -50.0f64..50.0), prop::option::weighted(0.8, -50.0f64..50.0)),
            0..60,
        )
    ) {
        let complete = rows.iter().filter(|(x, y)| x.is_some() && y.is_some()).count();
        let (xs, ys): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let table = Table::new(vec![
            Column::new("x", ColumnData::Float(xs)),
            Column::new("y", ColumnData::Float(ys)),
        ])
        .unwrap();

        let request = ChartRequest::new(ChartKind::Scatter).with_primary("x").with_secondary("y");
        let ChartData::Scatter { points } = chart(&table, request) else {
            panic!("expected scatter data");
        };
        prop_assert_eq!(points.len(), complete);
    }

    #[test]
    fn bar_categories_are_capped_and_sorted(
        labels in prop::collection::vec(prop::option::weighted(0.9, "[a-p]{1,2}"), 0..120)
    ) {
        let table = Table::new(vec![Column::new("c", ColumnData::Text(labels))]).unwrap();

        let ChartData::Bar { categories } = chart(&table, ChartRequest::new(ChartKind::Bar).with_primary("c")) else {
            panic!("expected bar data");
        };
        prop_assert!(categories.len() <= 10);
        prop_assert!(categories.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal(
        columns in prop::collection::vec(
            prop::collection::vec(prop::option::weighted(0.9, -100.0f64..100.0), 12),
            2..6,
        )
    ) {
        let matrix = correlation_matrix(&columns);
        prop_assert_eq!(matrix.len(), columns.len());
        for (i, row) in matrix.iter().enumerate() {
            if let Some(d) = row[i] {
                prop_assert_eq!(d, 1.0);
            }
            for (j, value) in row.iter().enumerate() {
                prop_assert_eq!(*value, matrix[j][i]);
                if let Some(r) = value {
                    prop_assert!((-1.0..=1.0).contains(r));
                }
            }
        }
    }
}

#[test]
fn histogram_of_a_constant_column_widens_the_range() {
    let bins = histogram(&[5.0, 5.0, 5.0], HISTOGRAM_BINS);
    assert_relative_eq!(bins[0].lower, 4.5);
    assert_relative_eq!(bins[HISTOGRAM_BINS - 1].upper, 5.5);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
}

#[test]
fn perfectly_correlated_columns() {
    let table = load(b"a,b,c\n1,2,9\n2,4,7\n3,6,5\n4,8,3\n", "csv").unwrap();
    let ChartData::Correlation { columns, matrix } = chart(&table, ChartRequest::new(ChartKind::Correlation)) else {
        panic!("expected correlation data");
    };
    assert_eq!(columns, ["a", "b", "c"]);
    assert_relative_eq!(matrix[0][1].unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(matrix[0][2].unwrap(), -1.0, epsilon = 1e-12);
}

#[test]
fn every_kind_renders_a_png() {
    let table = load(
        b"age,income,city\n25,40000,Lisbon\n31,52000,Oslo\n47,61000,Lisbon\n52,58000,Madrid\n",
        "csv",
    )
    .unwrap();
    let profiles = classify(&table);
    let requests = [
        ChartRequest::new(ChartKind::Histogram).with_primary("age"),
        ChartRequest::new(ChartKind::Scatter).with_primary("age").with_secondary("income"),
        ChartRequest::new(ChartKind::Bar).with_primary("city"),
        ChartRequest::new(ChartKind::Correlation),
    ];
    for request in requests {
        let spec = build(&request, &table, &profiles).unwrap();
        let image = render(&spec).unwrap();
        assert_eq!(&image.png[..8], &PNG_MAGIC, "{}", spec.kind);
        assert_eq!((image.width, image.height), (WIDTH, HEIGHT));
    }
}

#[test]
fn long_bar_labels_render_without_error() {
    let mut csv = String::from("product\n");
    for i in 0..10 {
        for _ in 0..(12 - i) {
            csv.push_str(&format!("an exceptionally long product description number {i}\n"));
        }
    }
    let table = load(csv.as_bytes(), "csv").unwrap();
    let spec = build(
        &ChartRequest::new(ChartKind::Bar).with_primary("product"),
        &table,
        &classify(&table),
    )
    .unwrap();
    let ChartData::Bar { categories } = &spec.data else {
        panic!("expected bar data");
    };
    assert_eq!(categories.len(), 10);
    assert_eq!(categories[0].1, 12);

    let image = render(&spec).unwrap();
    assert_eq!(&image.png[..8], &PNG_MAGIC);
}

#[test]
fn rendering_is_deterministic() {
    let table = load(b"x\n1\n2\n2\n3\n3\n3\n", "csv").unwrap();
    let spec = build(
        &ChartRequest::new(ChartKind::Histogram).with_primary("x"),
        &table,
        &classify(&table),
    )
    .unwrap();
    assert_eq!(render(&spec).unwrap().png, render(&spec).unwrap().png);
}
