use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use hotel_table::data::record::Record;
use hotel_table::table::engine::TableEngine;
use hotel_table::ui::toolbar::PaginationSummary;

/// Print the current page the way the grid shows it, for `--print`
pub fn display_page<T: Record>(engine: &TableEngine<T>) {
    let summary = PaginationSummary::from_engine(engine);
    if summary.filtered == 0 {
        println!("{}", "No matching rows.".yellow());
        return;
    }

    println!("{}", render_page(engine));
    println!(
        "\n{}",
        format!("{}  |  {}", summary.page_label(), summary.rows_label()).green()
    );
}

/// The current page as a comfy-table, visible columns only
pub fn render_page<T: Record>(engine: &TableEngine<T>) -> Table {
    let columns = engine.visible_columns();
    let state = engine.state();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|column| {
                let label = match state.sort_for(&column.id) {
                    Some((_, direction)) => {
                        format!("{} {}", column.header, direction.indicator())
                    }
                    None => column.header.clone(),
                };
                Cell::new(label).add_attribute(Attribute::Bold)
            })
            .collect::<Vec<_>>(),
    );

    for row in engine.page_rows() {
        table.add_row(
            columns
                .iter()
                .map(|column| column.display(row))
                .collect::<Vec<_>>(),
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_table::config::TableSchema;
    use hotel_table::data::loaders::parse_json_records;
    use hotel_table::table::config::TableConfig;

    #[test]
    fn test_render_page_uses_display_text() {
        let rows = parse_json_records(
            r#"[
                {"_id": "b1", "guest": {"name": "Ada"}, "amount": 120.5, "status": "paid", "issuedAt": "2024-05-01"},
                {"_id": "b2", "guest": {"name": "Grace"}, "amount": 80, "status": "pending", "issuedAt": "2024-05-02"}
            ]"#,
            &["_id"],
        )
        .unwrap();
        let schema = TableSchema::resolve("bills").unwrap();
        let mut engine = schema.engine(rows, TableConfig::default());
        engine.toggle_sort("amount");

        let text = render_page(&engine).to_string();
        assert!(text.contains("$120.50"));
        assert!(text.contains("Grace"));
        assert!(text.find("Grace").unwrap() < text.find("Ada").unwrap());
    }
}
