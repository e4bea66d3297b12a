// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 2-D cell grid of a single sheet.
//!
//! Rows and columns are 1-based. Every placement operation returns the
//! number of rows it consumed, so callers advance their own cursors.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools as _;
use lazy_regex::regex;
use serde::Serialize;

use super::style::Style;
use crate::{Error, Result};

/// Height of every line of a multi-line text block, in points.
pub const LINE_HEIGHT: u32 = 14;

/// Base height of a multi-line text block row, in points.
pub const BASE_HEIGHT: u32 = 15;

/// Converts a length into a number of rows or columns.
pub(crate) fn span(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Value of a [`Cell`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CellValue {
    /// Plain text.
    Text(String),

    /// Text made of differently styled runs.
    Rich(Vec<Run>),
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl CellValue {
    /// Returns the whole text of this [`CellValue`].
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(t) => t.clone(),
            Self::Rich(runs) => runs.iter().map(|r| r.text.as_str()).join(""),
        }
    }

    /// Splits the given step `text` into [`Run`]s, styling every
    /// `<placeholder>` as [`Style::Template`].
    #[must_use]
    pub fn template(text: &str) -> Self {
        let mut runs = Vec::new();
        let mut last = 0;
        for m in regex!(r"<\w+>").find_iter(text) {
            if m.start() > last {
                runs.push(Run::new(&text[last..m.start()], Style::Normal));
            }
            runs.push(Run::new(m.as_str(), Style::Template));
            last = m.end();
        }
        if last < text.len() || runs.is_empty() {
            runs.push(Run::new(&text[last..], Style::Normal));
        }
        Self::Rich(runs)
    }
}

/// Styled run of a rich text [`CellValue`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Run {
    /// Text of the run.
    pub text: String,

    /// Style of the run.
    pub style: Style,
}

impl Run {
    /// Creates a new [`Run`].
    #[must_use]
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self { text: text.into(), style }
    }
}

/// Single written cell.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Cell {
    /// 1-based row.
    pub row: u32,

    /// 1-based column.
    pub column: u32,

    /// Value of the cell.
    #[serde(flatten)]
    pub value: CellValue,

    /// Style of the cell.
    pub style: Style,

    /// Target of the link, as `SHEET!A1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
}

/// Grid of a single sheet.
///
/// A cell is never written twice, column widths only grow.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Worksheet {
    /// Name of the sheet.
    pub name: String,

    /// Written cells, in writing order.
    pub cells: Vec<Cell>,

    /// Widths of columns, in characters.
    pub column_widths: BTreeMap<u32, u32>,

    /// Heights of rows, in points.
    pub row_heights: BTreeMap<u32, u32>,

    /// Number of top rows frozen while scrolling.
    pub frozen_rows: u32,

    /// Positions of [`Worksheet::cells`].
    #[serde(skip)]
    occupied: HashSet<(u32, u32)>,
}

impl Worksheet {
    /// Creates a new empty [`Worksheet`] with the given `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Freezes the given number of top `rows`.
    pub fn freeze_rows(&mut self, rows: u32) {
        self.frozen_rows = rows;
    }

    /// Returns the [`Cell`] at the given position, if it's written.
    #[must_use]
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.column == column)
    }

    /// Writes a single cell.
    ///
    /// # Errors
    ///
    /// [`Error::CellOccupied`] if the cell is already written.
    pub fn put(
        &mut self,
        row: u32,
        column: u32,
        value: impl Into<CellValue>,
        style: Style,
    ) -> Result<&mut Cell> {
        if !self.occupied.insert((row, column)) {
            return Err(Error::CellOccupied {
                sheet: self.name.clone(),
                row,
                column,
            });
        }
        self.cells.push(Cell {
            row,
            column,
            value: value.into(),
            style,
            hyperlink: None,
        });
        let last = self.cells.len() - 1;
        Ok(&mut self.cells[last])
    }

    /// Writes a cell linking to the first cell of the `target` sheet.
    ///
    /// # Errors
    ///
    /// [`Error::CellOccupied`] if the cell is already written.
    pub fn link(
        &mut self,
        row: u32,
        column: u32,
        text: &str,
        target: &str,
    ) -> Result<u32> {
        self.put(row, column, text, Style::Hyperlink)?.hyperlink =
            Some(format!("{target}!A1"));
        Ok(1)
    }

    /// Writes a line of light cells: `Tags:` label and the space-joined
    /// `tags` right to it.
    ///
    /// # Errors
    ///
    /// [`Error::CellOccupied`] if any of the cells is already written.
    pub fn tags(&mut self, row: u32, column: u32, tags: &[String]) -> Result<u32> {
        _ = self.put(row, column, "Tags:", Style::Light)?;
        _ = self.put(row, column + 1, tags.join(" "), Style::Light)?;
        Ok(1)
    }

    /// Writes the given `lines` into consecutive rows of a single column.
    ///
    /// # Errors
    ///
    /// [`Error::CellOccupied`] if any of the cells is already written.
    pub fn lines(
        &mut self,
        row: u32,
        column: u32,
        lines: &[String],
        style: Style,
    ) -> Result<u32> {
        for (idx, line) in (row..).zip(lines) {
            _ = self.put(idx, column, line.as_str(), style)?;
        }
        Ok(span(lines.len()))
    }

    /// Writes a multi-line `text` into a single cell, growing its row to fit
    /// all the lines.
    ///
    /// # Errors
    ///
    /// [`Error::CellOccupied`] if the cell is already written.
    pub fn long_text(&mut self, row: u32, column: u32, text: &str) -> Result<u32> {
        _ = self.put(row, column, text, Style::Normal)?;
        let lines = span(regex!(r"\r\n|\r|\n").split(text).count());
        _ = self
            .row_heights
            .insert(row, (lines - 1) * LINE_HEIGHT + BASE_HEIGHT);
        Ok(1)
    }

    /// Writes a table with a styled `header` row followed by the `data`
    /// rows, growing column widths to fit the cells.
    ///
    /// Always consumes `data.len() + 1` rows.
    ///
    /// # Errors
    ///
    /// [`Error::CellOccupied`] if any of the cells is already written.
    pub fn table(
        &mut self,
        row: u32,
        column: u32,
        header: &[String],
        data: &[Vec<String>],
    ) -> Result<u32> {
        let rows = std::iter::once((header, Style::TableHeader))
            .chain(data.iter().map(|r| (r.as_slice(), Style::TableCell)));
        for (y, (cells, style)) in (row..).zip(rows) {
            for (x, value) in (column..).zip(cells) {
                self.grow_width(x, value.chars().count());
                _ = self.put(y, x, value.as_str(), style)?;
            }
        }
        Ok(span(data.len()) + 1)
    }

    /// Grows the width of the given `column` to `width`, unless it's already
    /// wider.
    pub fn grow_width(&mut self, column: u32, width: usize) {
        let width = span(width);
        let current = self.column_widths.entry(column).or_insert(width);
        if width > *current {
            *current = width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|&v| v.to_owned()).collect()
    }

    #[test]
    fn never_reuses_a_cell() {
        let mut ws = Worksheet::new("INVOICES");
        _ = ws.put(2, 3, "first", Style::Normal).unwrap();

        let err = ws.put(2, 3, "second", Style::Bold).unwrap_err();

        assert!(matches!(
            err,
            Error::CellOccupied { row: 2, column: 3, ref sheet } if sheet == "INVOICES",
        ));
        assert_eq!(ws.cell(2, 3).unwrap().value.text(), "first");
    }

    #[test]
    fn tables_consume_header_and_data_rows() {
        let mut ws = Worksheet::new("S");

        let used = ws
            .table(5, 2, &strings(&["a", "long header"]), &[strings(&["1", "2"]), strings(&["3", "4"])])
            .unwrap();

        assert_eq!(used, 3);
        assert_eq!(ws.cell(5, 3).unwrap().style, Style::TableHeader);
        assert_eq!(ws.cell(7, 2).unwrap().style, Style::TableCell);
        assert_eq!(ws.column_widths[&3], 11);
    }

    #[test]
    fn widths_only_grow() {
        let mut ws = Worksheet::new("S");

        ws.grow_width(1, 10);
        ws.grow_width(1, 4);
        ws.grow_width(1, 12);

        assert_eq!(ws.column_widths[&1], 12);
    }

    #[test]
    fn long_text_sizes_row_by_lines() {
        let mut ws = Worksheet::new("S");

        _ = ws.long_text(4, 1, "one\ntwo\r\nthree").unwrap();
        _ = ws.long_text(6, 1, "single").unwrap();

        assert_eq!(ws.row_heights[&4], 2 * LINE_HEIGHT + BASE_HEIGHT);
        assert_eq!(ws.row_heights[&6], BASE_HEIGHT);
    }

    #[test]
    fn template_runs_highlight_every_placeholder() {
        let value = CellValue::template("pay <amount> in <currency> now");

        let CellValue::Rich(runs) = &value else {
            panic!("expected rich text");
        };
        let styles = runs.iter().map(|r| (r.text.as_str(), r.style)).collect::<Vec<_>>();
        assert_eq!(
            styles,
            [
                ("pay ", Style::Normal),
                ("<amount>", Style::Template),
                (" in ", Style::Normal),
                ("<currency>", Style::Template),
                (" now", Style::Normal),
            ],
        );
        assert_eq!(value.text(), "pay <amount> in <currency> now");
    }

    #[test]
    fn links_point_to_first_cell() {
        let mut ws = Worksheet::new("TOC");

        _ = ws.link(2, 3, "Invoices", "INVOICES").unwrap();

        let cell = ws.cell(2, 3).unwrap();
        assert_eq!(cell.hyperlink.as_deref(), Some("INVOICES!A1"));
        assert_eq!(cell.style, Style::Hyperlink);
    }

    #[test]
    fn serializes_cells_flat() {
        let mut ws = Worksheet::new("S");
        _ = ws.put(1, 1, "x", Style::Bold).unwrap();

        let json = serde_json::to_value(&ws).unwrap();

        assert_eq!(json["cells"][0]["type"], "text");
        assert_eq!(json["cells"][0]["value"], "x");
        assert_eq!(json["cells"][0]["style"], "bold");
        assert!(json.get("occupied").is_none());
    }
}
