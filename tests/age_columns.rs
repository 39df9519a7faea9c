use std::collections::HashSet;

use agepop_tools::config::AgeColumnRules;
use agepop_tools::resolve::{extract_region_key, missing_ages, resolve_age_columns};
use agepop_tools::DashboardError;

fn korean_headers() -> Vec<String> {
    let mut headers = vec![
        "행정구역".to_string(),
        "2025년05월_계_총인구수".to_string(),
        "2025년05월_계_연령구간인구수".to_string(),
    ];
    for age in 0..100 {
        headers.push(format!("2025년05월_계_{age}세"));
    }
    headers.push("2025년05월_계_100세 이상".to_string());
    for age in 0..100 {
        headers.push(format!("2025년05월_남_{age}세"));
    }
    headers.push("2025년05월_남_100세 이상".to_string());
    headers
}

#[test]
fn total_columns_resolve_and_sex_specific_columns_are_excluded() {
    let names = [
        "2025_total_0세",
        "2025_total_1세",
        "2025_total_100세이상",
        "2025_male_5세",
    ];
    let columns = resolve_age_columns(&names, &AgeColumnRules::with_category("total"))
        .expect("age columns resolved");

    let resolved: Vec<(&str, u32)> = columns
        .iter()
        .map(|column| (column.name.as_str(), column.age))
        .collect();
    assert_eq!(
        resolved,
        vec![
            ("2025_total_0세", 0),
            ("2025_total_1세", 1),
            ("2025_total_100세이상", 100),
        ]
    );
    assert_eq!(
        columns.iter().map(|column| column.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn monthly_export_headers_cover_every_age_once() {
    let headers = korean_headers();
    let columns =
        resolve_age_columns(&headers, &AgeColumnRules::default()).expect("age columns resolved");

    assert_eq!(columns.len(), 101);
    let ages: HashSet<u32> = columns.iter().map(|column| column.age).collect();
    assert_eq!(ages.len(), columns.len());
    assert!(ages.iter().all(|age| *age <= 100));
    assert!(missing_ages(&columns, 100).is_empty());

    let last = columns.last().expect("top bucket present");
    assert_eq!(last.name, "2025년05월_계_100세 이상");
    assert_eq!(last.age, 100);
    assert!(columns.iter().all(|column| !column.name.contains("_남_")));
}

#[test]
fn output_preserves_input_column_order() {
    let names = ["x_계_3세", "x_계_1세", "x_계_2세"];
    let columns =
        resolve_age_columns(&names, &AgeColumnRules::default()).expect("age columns resolved");
    let ages: Vec<u32> = columns.iter().map(|column| column.age).collect();
    assert_eq!(ages, vec![3, 1, 2]);
}

#[test]
fn and_above_bucket_without_digits_maps_to_ceiling() {
    let names = ["x_계_0세", "x_계_이상"];
    let rules = AgeColumnRules {
        ceiling_age: 85,
        ..AgeColumnRules::default()
    };
    let columns = resolve_age_columns(&names, &rules).expect("age columns resolved");
    assert_eq!(columns[1].age, 85);
}

#[test]
fn lenient_rules_accept_any_category() {
    let names = ["행정구역", "2025_남_0세", "2025_여_1세"];
    let columns =
        resolve_age_columns(&names, &AgeColumnRules::lenient()).expect("age columns resolved");
    assert_eq!(columns.len(), 2);
}

#[test]
fn headers_without_age_markers_fail() {
    let names = ["행정구역", "2025년05월_계_총인구수"];
    let err = resolve_age_columns(&names, &AgeColumnRules::default())
        .expect_err("no age column present");
    assert!(matches!(
        err,
        DashboardError::NoAgeColumnsFound { column_count: 2 }
    ));
}

#[test]
fn duplicate_ages_are_rejected() {
    let names = ["a_계_5세", "b_계_5세"];
    let err = resolve_age_columns(&names, &AgeColumnRules::default())
        .expect_err("duplicate age detected");
    assert!(matches!(err, DashboardError::DuplicateAge { age: 5, .. }));
}

#[test]
fn ages_above_the_ceiling_are_rejected() {
    let names = ["a_계_0세", "a_계_120세"];
    let err = resolve_age_columns(&names, &AgeColumnRules::default())
        .expect_err("age above ceiling");
    assert!(matches!(
        err,
        DashboardError::AgeOutOfRange {
            age: 120,
            ceiling: 100,
            ..
        }
    ));
}

#[test]
fn region_keys_drop_parenthesised_codes() {
    assert_eq!(extract_region_key("Seoul(11)"), "Seoul");
    assert_eq!(extract_region_key("Busan"), "Busan");
    assert_eq!(extract_region_key("  Seoul (11)  "), "Seoul");
    assert_eq!(extract_region_key(""), "");
    assert_eq!(extract_region_key("서울특별시  (1100000000)"), "서울특별시");
    assert_eq!(extract_region_key("(11)"), "");
}

#[test]
fn region_key_extraction_is_idempotent() {
    for label in ["Seoul(11)", "  Busan ", "종로구 (1111000000)", "a(b(c))"] {
        let once = extract_region_key(label);
        assert_eq!(extract_region_key(once), once);
    }
}
