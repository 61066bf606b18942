use serde::{Deserialize, Serialize};
use crate::{CatalogError, CatalogResult};

pub const MAX_ROWS: u16 = 52;
pub const MAX_COLUMNS: u16 = 99;

/// Rectangular auditorium layout: rows are lettered (`A`..`Z`, `AA`, `AB`, ...), columns numbered from 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatLayout {
    pub rows: u16,
    pub columns: u16,
}

impl SeatLayout {
    pub fn new(rows: u16, columns: u16) -> CatalogResult<Self> {
        let layout = Self { rows, columns };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(CatalogError::InvalidLayout(format!(
                "rows must be between 1 and {}, got {}",
                MAX_ROWS, self.rows
            )));
        }
        if self.columns == 0 || self.columns > MAX_COLUMNS {
            return Err(CatalogError::InvalidLayout(format!(
                "columns must be between 1 and {}, got {}",
                MAX_COLUMNS, self.columns
            )));
        }
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Seat labels in row-major order: `A1, A2, ..., B1, ...`.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.capacity());
        for row in 0..self.rows {
            let row_label = row_letters(row);
            for column in 1..=self.columns {
                labels.push(format!("{}{}", row_label, column));
            }
        }
        labels
    }
}

/// Ordering key for seat labels so that `A2` sorts before `A10` and `B1` after `A99`.
pub fn label_sort_key(label: &str) -> (usize, String, u32, String) {
    let split = label.find(|c: char| c.is_ascii_digit()).unwrap_or(label.len());
    let (row, rest) = label.split_at(split);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let column = digits.parse::<u32>().unwrap_or(u32::MAX);
    (row.len(), row.to_string(), column, label.to_string())
}

/// Zero-based row index to spreadsheet-style letters.
fn row_letters(index: u16) -> String {
    let mut n = index as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
