use agepop_tools::chart::{ChartShape, Orientation, build_chart};
use agepop_tools::config::AgeColumnRules;
use agepop_tools::io::build_table;
use agepop_tools::model::{AggregatedSeries, RawTable, RegionSeries};
use agepop_tools::{ChartKind, DashboardError, aggregate, resolve_age_columns};

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn sample_table() -> RawTable {
    build_table(
        grid(&[
            &["행정구역", "2025_계_총인구수", "2025_계_1세", "2025_계_0세", "2025_계_100세 이상"],
            &["서울특별시  (1100000000)", "1,300", "1,000", "100", "200"],
            &["서울특별시(1100000001)", "70", "0", "50", "20"],
            &["부산광역시  (2600000000)", "9,999", "3,456", "2,000", "7"],
        ]),
        "행정구역",
    )
    .expect("table built")
}

#[test]
fn rows_sharing_a_region_key_are_summed() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let series = aggregate(&table, &columns, &["서울특별시"]).expect("aggregated");

    assert_eq!(series.ages, vec![0, 1, 100]);
    assert_eq!(series.count("서울특별시", 0), Some(150));
    assert_eq!(series.count("서울특별시", 1), Some(1_000));
    assert_eq!(series.count("서울특별시", 100), Some(220));
}

#[test]
fn thousands_separators_are_stripped() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let series = aggregate(&table, &columns, &["부산광역시"]).expect("aggregated");
    assert_eq!(series.count("부산광역시", 1), Some(3_456));
    assert_eq!(series.count("부산광역시", 0), Some(2_000));
}

#[test]
fn selection_order_is_kept_and_duplicates_collapse() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let series =
        aggregate(&table, &columns, &["부산광역시", "서울특별시", "부산광역시"]).expect("aggregated");
    let regions: Vec<&str> = series
        .regions
        .iter()
        .map(|region| region.region.as_str())
        .collect();
    assert_eq!(regions, vec!["부산광역시", "서울특별시"]);
}

#[test]
fn aggregation_ignores_row_order() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let selection = ["서울특별시", "부산광역시"];
    let forward = aggregate(&table, &columns, &selection).expect("aggregated");

    let mut reversed = table.clone();
    reversed.rows.reverse();
    let backward = aggregate(&reversed, &columns, &selection).expect("aggregated");

    let mut rotated = table.clone();
    rotated.rows.rotate_left(1);
    let rotated = aggregate(&rotated, &columns, &selection).expect("aggregated");

    assert_eq!(forward, backward);
    assert_eq!(forward, rotated);
}

#[test]
fn malformed_count_is_reported() {
    let table = build_table(
        grid(&[
            &["행정구역", "2025_계_0세"],
            &["Seoul(11)", "12,3x4"],
        ]),
        "행정구역",
    )
    .expect("table built");
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let err = aggregate(&table, &columns, &["Seoul"]).expect_err("malformed count");
    match err {
        DashboardError::MalformedCount {
            region,
            column,
            value,
        } => {
            assert_eq!(region, "Seoul(11)");
            assert_eq!(column, "2025_계_0세");
            assert_eq!(value, "12,3x4");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_and_negative_cells_are_malformed() {
    for value in ["", "-5", "1.5"] {
        let table = build_table(
            grid(&[&["행정구역", "2025_계_0세"], &["Seoul", value]]),
            "행정구역",
        )
        .expect("table built");
        let columns =
            resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
        let err = aggregate(&table, &columns, &["Seoul"]).expect_err("malformed count");
        assert!(matches!(err, DashboardError::MalformedCount { .. }), "{value}");
    }
}

#[test]
fn unknown_regions_fail_explicitly() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let err = aggregate(&table, &columns, &["서울특별시", "제주특별자치도", "Atlantis"])
        .expect_err("unknown region");
    match err {
        DashboardError::UnknownRegion(keys) => {
            assert_eq!(keys, vec!["제주특별자치도".to_string(), "Atlantis".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_selection_is_rejected() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let selection: [&str; 0] = [];
    let err = aggregate(&table, &columns, &selection).expect_err("empty selection");
    assert!(matches!(err, DashboardError::EmptySelection));
}

#[test]
fn single_region_bar_chart_is_a_mirrored_pyramid() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let series = aggregate(&table, &columns, &["서울특별시"]).expect("aggregated");
    let chart = build_chart(&series, ChartKind::Bar);

    assert_eq!(chart.orientation, Orientation::Horizontal);
    let ChartShape::Pyramid { region, bars } = chart.shape else {
        panic!("expected a pyramid");
    };
    assert_eq!(region, "서울특별시");
    assert_eq!(bars.len(), 3);
    for bar in &bars {
        assert!(bar.left <= 0);
        assert_eq!(bar.left.abs(), bar.right);
    }
    assert_eq!(bars[0].age, 0);
    assert_eq!(bars[0].right, 150);
}

#[test]
fn multi_region_bar_chart_groups_by_age() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let series = aggregate(&table, &columns, &["서울특별시", "부산광역시"]).expect("aggregated");
    let chart = build_chart(&series, ChartKind::Bar);

    assert_eq!(chart.orientation, Orientation::Vertical);
    let ChartShape::GroupedBars { regions, groups } = chart.shape else {
        panic!("expected grouped bars");
    };
    assert_eq!(regions, vec!["서울특별시".to_string(), "부산광역시".to_string()]);
    let ages: Vec<u32> = groups.iter().map(|group| group.age).collect();
    assert_eq!(ages, vec![0, 1, 100]);
    assert_eq!(groups[1].values, vec![1_000, 3_456]);
}

#[test]
fn line_chart_has_one_series_per_region() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");

    for selection in [vec!["서울특별시"], vec!["서울특별시", "부산광역시"]] {
        let series = aggregate(&table, &columns, &selection).expect("aggregated");
        let chart = build_chart(&series, ChartKind::Line);
        let ChartShape::Lines { series: lines } = chart.shape else {
            panic!("expected lines");
        };
        assert_eq!(lines.len(), selection.len());
        assert_eq!(lines[0].points, vec![(0, 150), (1, 1_000), (100, 220)]);
    }
}

#[test]
fn summed_counts_that_overflow_are_rejected() {
    let table = build_table(
        grid(&[
            &["행정구역", "2025_계_0세"],
            &["서울특별시  (1100000000)", "18446744073709551615"],
            &["서울특별시  (1100000001)", "1"],
        ]),
        "행정구역",
    )
    .expect("table built");
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let err = aggregate(&table, &columns, &["서울특별시"]).expect_err("overflow");
    match err {
        DashboardError::CountOverflow { region, column } => {
            assert_eq!(region, "서울특별시");
            assert_eq!(column, "2025_계_0세");
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn ragged_series() -> AggregatedSeries {
    AggregatedSeries {
        ages: vec![0, 1, 2],
        regions: vec![
            RegionSeries {
                region: "서울특별시".into(),
                counts: vec![10, 20, 30],
            },
            RegionSeries {
                region: "부산광역시".into(),
                counts: vec![5],
            },
        ],
    }
}

#[test]
fn grouped_bars_fill_missing_counts_with_zero() {
    let chart = build_chart(&ragged_series(), ChartKind::Bar);
    let ChartShape::GroupedBars { groups, .. } = chart.shape else {
        panic!("expected grouped bars");
    };
    assert_eq!(groups[0].values, vec![10, 5]);
    assert_eq!(groups[2].values, vec![30, 0]);
}

#[test]
fn aggregated_table_prints_one_row_per_age() {
    let table = sample_table();
    let columns =
        resolve_age_columns(&table.headers, &AgeColumnRules::default()).expect("columns");
    let series = aggregate(&table, &columns, &["서울특별시", "부산광역시"]).expect("aggregated");

    let tsv = series.to_tsv();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines[0], "연령\t서울특별시\t부산광역시");
    assert_eq!(lines[1], "0\t150\t2000");
    assert_eq!(lines[3], "100\t220\t7");
    assert_eq!(lines.len(), 4);

    assert_eq!(ragged_series().to_tsv().lines().nth(3), Some("2\t30\t0"));
}
