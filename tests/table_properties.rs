#[cfg(test)]
mod table_property_tests {
    use anyhow::anyhow;
    use hotel_table::data::exporter::{DataExporter, ExportFormat};
    use hotel_table::data::record::{JsonRecord, Record, RowKey};
    use hotel_table::data::value::CellValue;
    use hotel_table::table::column::{ColumnDescriptor, ColumnModel, SortingFn};
    use hotel_table::table::config::TableConfig;
    use hotel_table::table::engine::TableEngine;
    use hotel_table::table::filter::{DateRange, FilterDescriptor, FilterRegistry};
    use hotel_table::table::renderer::{CellRenderer, PLACEHOLDER};
    use hotel_table::table::state::{SortDirection, SortEntry};
    use serde_json::{json, Value};
    use std::collections::{BTreeSet, HashMap};
    use std::sync::{Arc, Mutex};

    fn record(key: &str, value: Value) -> JsonRecord {
        JsonRecord::new(key, value.as_object().cloned().unwrap())
    }

    /// 100 guests spread over statuses, room types and June check-in days
    fn reservations(n: usize) -> Vec<JsonRecord> {
        (0..n)
            .map(|i| {
                record(
                    &format!("res-{}", i),
                    json!({
                        "guest": format!("Guest {:03}", i),
                        "status": (["confirmed", "checked_in", "cancelled", "checked_out"][i % 4]),
                        "roomType": (["single", "double", "suite"][i % 3]),
                        "checkIn": format!("2024-06-{:02}T10:00:00Z", i % 30 + 1),
                        "amount": (i * 17 % 500) as i64,
                    }),
                )
            })
            .collect()
    }

    fn columns() -> ColumnModel<JsonRecord> {
        ColumnModel::new(vec![
            ColumnDescriptor::new("guest", "Guest").hideable(false),
            ColumnDescriptor::new("status", "Status").with_sorting(SortingFn::Text),
            ColumnDescriptor::new("roomType", "Room Type"),
            ColumnDescriptor::new("checkIn", "Check-in").with_sorting(SortingFn::Datetime),
            ColumnDescriptor::new("amount", "Amount")
                .with_sorting(SortingFn::Basic)
                .sortable(true),
        ])
    }

    fn filters() -> FilterRegistry {
        FilterRegistry::new(vec![
            FilterDescriptor::new("status", "Status")
                .option("confirmed", "Confirmed")
                .option("checked_in", "Checked In")
                .option("cancelled", "Cancelled")
                .option("checked_out", "Checked Out"),
            FilterDescriptor::new("roomType", "Room Type")
                .option("single", "Single")
                .option("double", "Double")
                .option("suite", "Suite"),
        ])
    }

    fn date_config() -> TableConfig {
        TableConfig {
            enable_date_filter: true,
            date_filter_column: Some("checkIn".to_string()),
            ..TableConfig::default()
        }
    }

    fn engine(n: usize) -> TableEngine<JsonRecord> {
        TableEngine::new(reservations(n), columns(), filters(), date_config())
    }

    fn field(row: &JsonRecord, name: &str) -> String {
        row.field(name).map(|v| v.to_string()).unwrap_or_default()
    }

    fn keys(rows: &[&JsonRecord]) -> Vec<RowKey> {
        rows.iter().map(|row| row.row_key()).collect()
    }

    #[test]
    fn test_filters_combine_as_conjunction() {
        let mut engine = engine(100);
        engine.set_filter_value("status", Some("confirmed"));
        engine.set_filter_value("roomType", Some("suite"));
        engine.set_global_query("guest 0");

        let rows = engine.filtered_rows();
        assert!(!rows.is_empty());
        for row in &rows {
            assert_eq!(field(row, "status"), "confirmed");
            assert_eq!(field(row, "roomType"), "suite");
            assert!(field(row, "guest").to_lowercase().contains("guest 0"));
        }

        // i % 4 == 0 and i % 3 == 2 and i < 100
        let expected = (0..100).filter(|i| i % 4 == 0 && i % 3 == 2).count();
        assert_eq!(engine.view().total_filtered_count, expected);
    }

    #[test]
    fn test_adding_a_filter_never_grows_the_result() {
        let mut engine = engine(100);
        let mut previous = engine.view().total_filtered_count;

        let steps: Vec<Box<dyn Fn(&mut TableEngine<JsonRecord>)>> = vec![
            Box::new(|e: &mut TableEngine<JsonRecord>| {
                e.set_global_query("guest");
            }),
            Box::new(|e: &mut TableEngine<JsonRecord>| {
                e.set_filter_values("status", &["confirmed", "cancelled"]);
            }),
            Box::new(|e: &mut TableEngine<JsonRecord>| {
                e.set_filter_value("roomType", Some("double"));
            }),
            Box::new(|e: &mut TableEngine<JsonRecord>| {
                e.set_date_range(DateRange::parse("2024-06-05..2024-06-20").unwrap());
            }),
            Box::new(|e: &mut TableEngine<JsonRecord>| {
                e.set_global_query("guest 01");
            }),
        ];
        for step in steps {
            step(&mut engine);
            let count = engine.view().total_filtered_count;
            assert!(count <= previous, "{} > {}", count, previous);
            previous = count;
        }
    }

    #[test]
    fn test_pages_cover_filtered_rows_exactly_once() {
        let mut engine = engine(100);
        engine.set_filter_values("status", &["confirmed", "checked_in"]);
        engine.set_sort(vec![SortEntry::new("amount", SortDirection::Descending)]);
        engine.set_page_size(7);

        let expected = keys(&engine.filtered_rows());
        let mut seen = Vec::new();
        let pages = engine.view().page_count;
        assert_eq!(pages, expected.len().div_ceil(7));
        for page in 0..pages {
            engine.set_page(page);
            let rows = engine.page_rows();
            assert!(rows.len() <= 7);
            seen.extend(keys(&rows));
        }
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut engine = engine(40);
        engine.toggle_sort("status");

        let rows = engine.filtered_rows();
        for pair in rows.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if field(a, "status") == field(b, "status") {
                let index = |row: &JsonRecord| {
                    row.row_key().as_str()[4..].parse::<usize>().unwrap()
                };
                assert!(index(a) < index(b), "{:?} before {:?}", a.row_key(), b.row_key());
            }
        }
    }

    #[test]
    fn test_alphanumeric_sort_orders_embedded_numbers() {
        let rows = ["item10", "item2", "item1", "Item3"]
            .iter()
            .map(|name| record(name, json!({ "name": name })))
            .collect::<Vec<_>>();
        let mut engine = TableEngine::new(
            rows,
            ColumnModel::new(vec![ColumnDescriptor::new("name", "Name")]),
            FilterRegistry::default(),
            TableConfig::default(),
        );
        engine.toggle_sort("name");

        let names: Vec<String> = engine
            .page_rows()
            .iter()
            .map(|row| field(row, "name"))
            .collect();
        assert_eq!(names, vec!["item1", "item2", "Item3", "item10"]);
    }

    #[test]
    fn test_selection_survives_filtering_until_row_disappears() {
        let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut engine = engine(20).on_row_selection_change(move |rows| {
            let keys = rows.iter().map(|r| r.row_key().0.clone()).collect();
            sink.lock().unwrap().push(keys);
        });

        engine.toggle_row_selected(RowKey::from("res-1"));
        engine.toggle_row_selected(RowKey::from("res-2"));

        // res-1 is checked_in; filtering it out of view keeps it selected
        engine.set_filter_value("status", Some("cancelled"));
        assert!(engine.state().is_selected(&RowKey::from("res-1")));
        assert_eq!(engine.selected_rows().len(), 2);

        // Refreshing without res-2 prunes it
        let remaining: Vec<JsonRecord> = reservations(20)
            .into_iter()
            .filter(|row| row.row_key() != RowKey::from("res-2"))
            .collect();
        engine.set_rows(remaining);

        let expected: BTreeSet<RowKey> = [RowKey::from("res-1")].into_iter().collect();
        assert_eq!(engine.state().row_selection, expected);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                vec!["res-1".to_string()],
                vec!["res-1".to_string(), "res-2".to_string()],
                vec!["res-1".to_string()],
            ]
        );
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let mut engine = engine(30);
        let boundary = CellValue::from_text("2024-06-05T10:00:00Z")
            .as_timestamp()
            .unwrap();

        engine.set_date_range(DateRange::new(Some(boundary), Some(boundary)));
        let rows = engine.filtered_rows();
        assert_eq!(keys(&rows), vec![RowKey::from("res-4")]);

        engine.set_date_range(DateRange::parse("2024-06-05..2024-06-07").unwrap());
        assert_eq!(engine.view().total_filtered_count, 3);

        engine.set_date_range(DateRange::parse("2024-06-28..").unwrap());
        assert_eq!(engine.view().total_filtered_count, 3);

        // Inverted bounds match nothing
        engine.set_date_range(DateRange::parse("2024-06-10..2024-06-01").unwrap());
        assert_eq!(engine.view().total_filtered_count, 0);
    }

    #[test]
    fn test_export_ignores_paging() {
        let mut engine = engine(100);
        engine.set_filter_value("status", Some("cancelled"));
        engine.set_filter_value("roomType", Some("single"));
        engine.set_date_range(DateRange::parse("2024-06-01..2024-06-20").unwrap());
        engine.set_page_size(3);
        engine.set_page(1);

        let filtered = engine.view().total_filtered_count;
        assert_eq!(filtered, 7);
        assert_eq!(engine.page_rows().len(), 3);

        let csv = DataExporter::export_to_string(&engine, ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1 + filtered);
        assert_eq!(lines[0], "Guest,Status,Room Type,Check-in,Amount");
    }

    #[test]
    fn test_export_follows_sorted_filtered_order() {
        let mut engine = engine(100);
        engine.set_filter_value("status", Some("cancelled"));
        engine.set_filter_value("roomType", Some("single"));
        engine.set_date_range(DateRange::parse("2024-06-01..2024-06-20").unwrap());
        engine.set_page_size(3);
        engine.toggle_sort("amount");
        engine.toggle_sort("amount");
        engine.set_page(2);

        let columns = engine.visible_columns();
        let expected: Vec<String> = engine
            .filtered_rows()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| column.display(row))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        assert_eq!(expected.len(), 7);

        let csv = DataExporter::export_to_string(&engine, ExportFormat::Csv).unwrap();
        let data: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(data, expected);

        // Descending amounts, whatever page is showing
        let amount = engine.columns().get("amount").unwrap();
        let amounts: Vec<f64> = engine
            .filtered_rows()
            .iter()
            .map(|row| amount.value(row).as_f64().unwrap())
            .collect();
        assert!(amounts.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_empty_table_state() {
        let mut engine = TableEngine::new(Vec::new(), columns(), filters(), date_config());
        engine.next_page();
        engine.last_page();

        let view = engine.view();
        assert_eq!(view.total_count, 0);
        assert_eq!(view.total_filtered_count, 0);
        assert_eq!(view.page_count, 0);
        assert_eq!(engine.state().page.index, 0);
        assert!(engine.page_rows().is_empty());

        let csv = DataExporter::export_to_string(&engine, ExportFormat::Csv).unwrap();
        assert_eq!(csv.trim_end(), "Guest,Status,Room Type,Check-in,Amount");
    }

    #[test]
    fn test_page_clamped_after_refresh_shrinks_data() {
        let mut engine = engine(100);
        engine.last_page();
        assert_eq!(engine.state().page.index, 9);

        engine.set_rows(reservations(25));
        assert_eq!(engine.state().page.index, 2);
        assert_eq!(engine.page_rows().len(), 5);
    }

    #[test]
    fn test_header_checkbox_only_touches_current_page() {
        let mut engine = engine(30);
        engine.set_page(1);
        engine.toggle_page_selection(true);

        let selected: Vec<RowKey> = engine.state().row_selection.iter().cloned().collect();
        let page_keys: BTreeSet<RowKey> = keys(&engine.page_rows()).into_iter().collect();
        assert_eq!(selected.len(), 10);
        assert!(selected.iter().all(|key| page_keys.contains(key)));

        engine.select_all_filtered();
        assert_eq!(engine.state().row_selection.len(), 30);
    }

    #[test]
    fn test_locked_columns_ignore_toggles() {
        let columns = ColumnModel::new(vec![
            ColumnDescriptor::new("guest", "Guest").hideable(false),
            ColumnDescriptor::new("status", "Status").sortable(false),
        ]);
        let mut engine =
            TableEngine::new(reservations(5), columns, FilterRegistry::default(), TableConfig::default());

        assert!(!engine.toggle_sort("status"));
        assert!(engine.state().sort.is_empty());
        assert!(!engine.toggle_column_visibility("guest", false));
        assert_eq!(engine.visible_columns().len(), 2);
    }

    #[test]
    fn test_failing_accessor_renders_placeholder() {
        let columns = ColumnModel::new(vec![
            ColumnDescriptor::new("guest", "Guest"),
            ColumnDescriptor::new("nightly", "Nightly").with_accessor(|row: &JsonRecord| {
                let amount = row
                    .field("amount")
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| anyhow!("no amount"))?;
                if amount == 0.0 {
                    return Err(anyhow!("division by zero"));
                }
                Ok(CellValue::Float(1000.0 / amount))
            }),
        ]);
        let engine =
            TableEngine::new(reservations(3), columns, FilterRegistry::default(), TableConfig::default());

        let rows = engine.page_rows();
        assert_eq!(rows.len(), 3);
        let nightly = engine.columns().get("nightly").unwrap();
        // res-0 has amount 0
        assert_eq!(nightly.display(rows[0]), PLACEHOLDER);
        assert_ne!(nightly.display(rows[1]), PLACEHOLDER);
        assert_eq!(engine.columns().get("guest").unwrap().display(rows[0]), "Guest 000");
    }

    #[test]
    fn test_hidden_columns_leave_search_and_export() {
        let mut engine = engine(12);
        engine.set_global_query("suite");
        assert_eq!(engine.view().total_filtered_count, 4);

        engine.toggle_column_visibility("roomType", false);
        assert_eq!(engine.view().total_filtered_count, 0);

        engine.set_global_query("");
        let csv = DataExporter::export_to_string(&engine, ExportFormat::Csv).unwrap();
        assert!(!csv.lines().next().unwrap().contains("Room Type"));
        assert!(!csv.contains("suite"));
    }

    #[test]
    fn test_badge_labels_are_searchable() {
        let labels: HashMap<String, String> =
            [("checked_in".to_string(), "In House".to_string())].into_iter().collect();
        let columns = ColumnModel::new(vec![
            ColumnDescriptor::new("guest", "Guest"),
            ColumnDescriptor::new("status", "Status").with_renderer(CellRenderer::Badge { labels }),
        ]);
        let mut engine =
            TableEngine::new(reservations(8), columns, FilterRegistry::default(), TableConfig::default());
        engine.set_global_query("in house");
        assert_eq!(engine.view().total_filtered_count, 2);
    }
}
