use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use fuelprice_core::{MetricCard, StateMetrics};

pub fn currency(value: f64) -> String {
    format!("R${value:.2}")
}

pub fn percent(value: f64) -> String {
    format!("{value:+.2}%")
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One row per card: current price, change over the window and the dates the
/// two ends were observed.
pub fn metric_cards(cards: &[MetricCard]) -> Table {
    let mut table = base_table();
    table.set_header(vec!["State", "Current price", "Change", "From", "To"]);
    for card in cards {
        match card {
            MetricCard::Available(metrics) => {
                table.add_row(metric_row(metrics));
            }
            MetricCard::Unavailable { state, reason } => {
                table.add_row(vec![
                    state.clone(),
                    "no data".to_string(),
                    "-".to_string(),
                    reason.clone(),
                    String::new(),
                ]);
            }
        }
    }
    table
}

fn metric_row(metrics: &StateMetrics) -> Vec<String> {
    vec![
        metrics.state.clone(),
        currency(metrics.latest_value),
        percent(metrics.percent_change),
        metrics.earliest_date.format("%Y-%m-%d").to_string(),
        metrics.latest_date.format("%Y-%m-%d").to_string(),
    ]
}

pub fn latest_prices(rows: &[(String, Option<f64>)]) -> Table {
    let mut table = base_table();
    table.set_header(vec!["State", "Current price"]);
    for (state, value) in rows {
        let price = value.map(currency).unwrap_or_else(|| "no data".to_string());
        table.add_row(vec![state.clone(), price]);
    }
    table
}

pub fn state_list(states: &[String]) -> Table {
    let mut table = base_table();
    table.set_header(vec!["#", "State"]);
    for (idx, state) in states.iter().enumerate() {
        table.add_row(vec![(idx + 1).to_string(), state.clone()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_currency_and_signed_percent() {
        assert_eq!(currency(4.186), "R$4.19");
        assert_eq!(percent(25.0), "+25.00%");
        assert_eq!(percent(-3.456), "-3.46%");
    }

    #[test]
    fn unavailable_cards_render_as_no_data() {
        let cards = vec![MetricCard::Unavailable {
            state: "ACRE".to_string(),
            reason: "no records for state 'ACRE'".to_string(),
        }];
        let rendered = metric_cards(&cards).to_string();
        assert!(rendered.contains("ACRE"));
        assert!(rendered.contains("no data"));
    }
}
