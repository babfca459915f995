//! Plain-text rendering of a month for terminals.

use crate::calendar::WEEKDAY_HEADERS;
use crate::class_type::ClassCatalog;
use crate::schedule::FeeSummary;
use crate::session::MonthView;

const CELL_WIDTH: usize = 9;
const TAG_WIDTH: usize = 5;

/// Whole units with comma grouping, e.g. `12,500`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_fee(amount: u64) -> String {
    format!("Rs. {}", format_amount(amount))
}

pub fn month_grid(view: &MonthView) -> String {
    let mut out = String::new();
    let width = CELL_WIDTH * 7;
    out.push_str(&format!("{:^width$}\n", view.title));
    for header in WEEKDAY_HEADERS {
        out.push_str(&format!("{header:<w$}", w = CELL_WIDTH));
    }
    out.push('\n');

    let mut cells: Vec<String> = Vec::with_capacity(view.layout.cell_count() as usize);
    cells.extend((0..view.layout.leading_blanks).map(|_| String::new()));
    for cell in &view.days {
        let tag: String = cell
            .class_type
            .as_deref()
            .unwrap_or("")
            .chars()
            .take(TAG_WIDTH)
            .collect();
        cells.push(format!("{:>2} {tag}", cell.day));
    }
    while cells.len() % 7 != 0 {
        cells.push(String::new());
    }
    for week in cells.chunks(7) {
        let line: String = week
            .iter()
            .map(|cell| format!("{cell:<w$}", w = CELL_WIDTH))
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn fee_table(summary: &FeeSummary) -> String {
    let mut out = String::from("Class Fees\n");
    out.push_str(&format!(
        "Number of Classes: {}\n",
        summary.total_class_count
    ));
    let label_width = summary
        .rows
        .iter()
        .map(|row| row.label.len())
        .max()
        .unwrap_or(0);
    for row in &summary.rows {
        out.push_str(&format!(
            "  {:<label_width$}  x {:>2} = {}\n",
            row.label,
            row.count,
            format_fee(row.fee)
        ));
    }
    out.push_str(&format!("Total Fees: {}\n", format_fee(summary.total_fee)));
    out
}

pub fn catalog_legend(catalog: &ClassCatalog) -> String {
    let mut out = String::new();
    for entry in catalog.iter() {
        let tag: String = entry.id.chars().take(TAG_WIDTH).collect();
        out.push_str(&format!(
            "  {tag:<w$}  {:<24} {}\n",
            entry.label,
            format_fee(entry.fee),
            w = TAG_WIDTH
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_group_by_thousands() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1,000");
        assert_eq!(format_amount(1234567), "1,234,567");
    }
}
