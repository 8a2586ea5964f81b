// 📊 Plain-text rendering of a ledger: entry table + category bar chart

use crate::ledger::Entry;
use crate::session::CategoryCount;
use std::fmt;

/// Bordered `User | Message | Category` table
pub struct LedgerTable<'d> {
    entries: &'d [Entry],
    max_message: usize,
}

impl<'d> LedgerTable<'d> {
    pub fn new(entries: &'d [Entry]) -> Self {
        Self {
            entries,
            max_message: 60,
        }
    }

    fn rows(&self) -> Vec<[String; 3]> {
        self.entries
            .iter()
            .map(|e| {
                [
                    e.user.clone(),
                    truncate(&e.message, self.max_message),
                    e.category.to_string(),
                ]
            })
            .collect()
    }
}

impl fmt::Display for LedgerTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let header = ["User", "Message", "Category"];
        let rows = self.rows();

        let mut widths = header.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let border = |f: &mut fmt::Formatter| -> fmt::Result {
            write!(f, "+")?;
            for width in widths {
                write!(f, "{}+", "-".repeat(width + 2))?;
            }
            writeln!(f)
        };
        let line = |f: &mut fmt::Formatter, cells: [&str; 3]| -> fmt::Result {
            write!(f, "|")?;
            for (cell, width) in cells.iter().zip(widths) {
                write!(f, " {:<width$} |", cell, width = width)?;
            }
            writeln!(f)
        };

        border(f)?;
        line(f, header)?;
        border(f)?;
        for row in &rows {
            line(f, [row[0].as_str(), row[1].as_str(), row[2].as_str()])?;
        }
        border(f)
    }
}

/// Horizontal bar chart, one bar per category, in the given order
pub struct FrequencyChart<'d> {
    counts: &'d [CategoryCount],
    width: usize,
}

impl<'d> FrequencyChart<'d> {
    pub fn new(counts: &'d [CategoryCount]) -> Self {
        Self { counts, width: 40 }
    }
}

impl fmt::Display for FrequencyChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Some(max) = self.counts.iter().map(|c| c.count).max() else {
            return writeln!(f, "(no transactions)");
        };
        let label_width = self
            .counts
            .iter()
            .map(|c| c.category.as_str().len())
            .max()
            .unwrap_or(0);

        for c in self.counts {
            // At least one block for any non-zero count
            let bar = (c.count * self.width).div_ceil(max);
            writeln!(
                f,
                "{:>label_width$} | {} {}",
                c.category.as_str(),
                "█".repeat(bar),
                c.count,
                label_width = label_width
            )?;
        }
        Ok(())
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    #[test]
    fn test_table_layout() {
        let entries = vec![
            Entry::new("Alice", "INR 250 spent at Domino's", Category::Food),
            Entry::new("Alice", "INR 1200 paid for electricity bill", Category::Bills),
        ];

        let rendered = LedgerTable::new(&entries).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], lines[2]);
        assert_eq!(lines[0], lines[5]);
        assert!(lines[1].starts_with("| User  | Message"));
        assert!(lines[3].contains("INR 250 spent at Domino's"));
        assert!(lines[4].ends_with("| Bills    |"));
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_table_truncates_long_messages() {
        let entries = vec![Entry::new("u", "x".repeat(100), Category::Others)];
        let rendered = LedgerTable {
            max_message: 10,
            ..LedgerTable::new(&entries)
        }
        .to_string();
        assert!(rendered.contains("| xxxxxxx... |"));
    }

    #[test]
    fn test_chart_scales_bars() {
        let counts = vec![
            CategoryCount { category: Category::Food, count: 4 },
            CategoryCount { category: Category::Travel, count: 1 },
        ];

        let rendered = FrequencyChart {
            width: 8,
            ..FrequencyChart::new(&counts)
        }
        .to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "  Food | ████████ 4");
        assert_eq!(lines[1], "Travel | ██ 1");
    }

    #[test]
    fn test_empty_chart() {
        assert_eq!(FrequencyChart::new(&[]).to_string(), "(no transactions)\n");
    }
}
