use itertools::Itertools as _;
use stats::{delta::Delta, rank::Unit};

pub const NO_DATA: &str = "No data available";

pub fn fmt_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Percent => format!("{:.1}%", value),
        Unit::Money => format!("{:.2}", value),
        Unit::Score => format!("{:.1}", value),
        Unit::Days => format!("{:.1}d", value),
        Unit::Count => {
            if value.fract() == 0.0 {
                format!("{}", value)
            } else {
                format!("{:.1}", value)
            }
        }
    }
}

pub fn fmt_delta(delta: &Delta) -> String {
    format!("{} {:.1}%", delta.trend().arrow(), delta.percentage.abs())
}

/// Plain-text table with left-aligned first column and right-aligned values.
#[derive(Debug, Clone, Default)]
pub struct Table {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: Vec<String>) -> Self {
        Table {
            title: title.into(),
            headers,
            rows: vec![],
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(idx) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (cell, width))| {
                if idx == 0 {
                    format!("{:<width$}", cell, width = width)
                } else {
                    format!("{:>width$}", cell, width = width)
                }
            })
            .join("  ")
            .trim_end()
            .to_owned()
    }

    pub fn render(&self) -> String {
        let mut msg = format!("{}\n", self.title);
        if self.rows.is_empty() {
            msg.push_str(NO_DATA);
            msg.push('\n');
            return msg;
        }
        let widths = self.widths();
        msg.push_str(&Table::line(&self.headers, &widths));
        msg.push('\n');
        msg.push_str(&widths.iter().map(|w| "-".repeat(*w)).join("  "));
        msg.push('\n');
        for row in &self.rows {
            msg.push_str(&Table::line(row, &widths));
            msg.push('\n');
        }
        msg
    }
}
