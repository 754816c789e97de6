mod common;

use fuelprice_core::{filter_states, series_to_json, state_series};

use common::{prepared, states};

fn sample() -> fuelprice_core::PreparedTable {
    prepared(&[
        "2019-01-06,2019-01-12,SAO PAULO,GASOLINA COMUM,4.00",
        "2019-01-06,2019-01-12,RIO DE JANEIRO,GASOLINA COMUM,4.70",
        "2019-01-06,2019-01-12,BAHIA,GASOLINA COMUM,4.40",
        "2020-06-07,2020-06-13,RIO DE JANEIRO,GASOLINA COMUM,",
        "2020-06-07,2020-06-13,SAO PAULO,GASOLINA COMUM,4.20",
        "2021-05-02,2021-05-08,BAHIA,GASOLINA COMUM,5.90",
    ])
}

#[test]
fn selection_keeps_table_order() {
    let table = sample();
    let selected = filter_states(&table, &["SAO PAULO", "RIO DE JANEIRO"]).expect("filter");

    assert_eq!(
        states(&selected),
        vec!["SAO PAULO", "RIO DE JANEIRO", "RIO DE JANEIRO", "SAO PAULO"]
    );
}

#[test]
fn empty_selection_gives_empty_table_with_same_columns() {
    let table = sample();
    let none: [&str; 0] = [];
    let selected = filter_states(&table, &none).expect("filter");

    assert!(selected.is_empty());
    assert_eq!(
        selected.dataframe().get_column_names(),
        table.dataframe().get_column_names()
    );
    assert!(state_series(&selected).expect("series").is_empty());
}

#[test]
fn unknown_states_select_nothing() {
    let table = sample();
    let selected = filter_states(&table, &["PIAUI".to_string()]).expect("filter");
    assert!(selected.is_empty());
}

#[test]
fn filtering_twice_is_idempotent() {
    let table = sample();
    let once = filter_states(&table, &["BAHIA"]).expect("first filter");
    let twice = filter_states(&once, &["BAHIA"]).expect("second filter");
    assert_eq!(once, twice);
    assert_eq!(once.height(), 2);
}

#[test]
fn series_group_points_per_state_with_gaps() {
    let table = sample();
    let selected = filter_states(&table, &["RIO DE JANEIRO", "SAO PAULO"]).expect("filter");
    let series = state_series(&selected).expect("series");

    let names: Vec<&str> = series.iter().map(|s| s.state.as_str()).collect();
    assert_eq!(names, vec!["SAO PAULO", "RIO DE JANEIRO"]);

    let rio = &series[1];
    assert_eq!(rio.points.len(), 2);
    assert_eq!(rio.points[0].resale_value, Some(4.7));
    assert_eq!(rio.points[1].resale_value, None);
    assert!(rio.points[0].date < rio.points[1].date);

    let json = series_to_json(&series).expect("json");
    assert!(json.contains("\"state\": \"SAO PAULO\""));
    assert!(json.contains("null"));
}
