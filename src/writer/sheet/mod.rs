// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Spreadsheet [`Writer`] implementation.
//!
//! Lays a [`Report`] out onto a [`Workbook`]: a `TOC` sheet linking to one
//! sheet per document. The [`Workbook`] only describes cells, styles and
//! sizes, so turning it into an actual spreadsheet file is up to an external
//! encoder consuming its JSON form.
//!
//! Optional tester columns occupy the leftmost columns of every sheet, and
//! the content starts right after them.

pub mod grid;
pub mod naming;
pub mod style;

use std::collections::{BTreeMap, HashSet};

use lazy_regex::regex;
use serde::Serialize;

use crate::{
    hierarchy::HierarchyNode,
    model::{Feature, FeatureElement, Report},
    Error, Result, Writer,
};

#[doc(inline)]
pub use self::{
    grid::{Cell, CellValue, Run, Worksheet},
    naming::SheetNames,
    style::{Style, StyleSpec},
};

/// Marker of an element nobody has tested yet.
pub const PENDING: &str = "Pending";

/// Options of laying out a [`Workbook`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SheetOptions {
    /// Number of tester progress columns, `0` disables them.
    pub testers: u32,

    /// Number of leading folders to ignore in the table of contents.
    pub base_depth: usize,
}

/// Laid out spreadsheet.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    /// Sheets, the table of contents first.
    pub sheets: Vec<Worksheet>,

    /// Attributes of every [`Style`] used by the cells.
    pub styles: BTreeMap<Style, StyleSpec>,
}

impl Workbook {
    /// Returns the sheet with the given `name`, if any.
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// [`Writer`] laying a [`Report`] out onto a [`Workbook`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Sheet {
    /// Layout options.
    options: SheetOptions,
}

impl Sheet {
    /// Creates a new [`Sheet`] [`Writer`] with the given [`SheetOptions`].
    #[must_use]
    pub const fn new(options: SheetOptions) -> Self {
        Self { options }
    }
}

impl Writer for Sheet {
    type Output = Workbook;

    fn write(&mut self, report: &Report) -> Result<Workbook> {
        let SheetOptions { testers, base_depth } = self.options;
        let mut names = SheetNames::new();
        let mut sheets = Vec::with_capacity(report.features.len() + 1);
        let mut seen = HashSet::new();

        for f in &report.features {
            if !seen.insert(f.relative_folder.as_str()) {
                return Err(Error::DuplicateDocument { path: f.relative_folder.clone() });
            }
            let name = names.assign(f.name(), &f.relative_folder)?;
            tracing::debug!(sheet = %name, path = %f.relative_folder, "laying out sheet");
            sheets.push(feature_sheet(f, name, testers)?);
        }

        let hierarchy = HierarchyNode::build(&report.features, base_depth);
        sheets.insert(0, toc_sheet(&hierarchy, &mut names, testers)?);

        Ok(Workbook { sheets, styles: Style::table() })
    }
}

/// Lays out the table of contents sheet.
///
/// Documents right in the scan root go first, then the folders, each one
/// with its documents and sub-folders indented one column further.
fn toc_sheet(
    root: &HierarchyNode<'_>,
    names: &mut SheetNames,
    testers: u32,
) -> Result<Worksheet> {
    let mut ws = Worksheet::new(naming::TOC);
    ws.freeze_rows(1);
    _ = ws.put(1, 1, "New/TODO", Style::Bold)?;
    tester_headers(&mut ws, 2, testers)?;
    let column = testers + 2;
    _ = ws.put(1, column, "Sections", Style::Bold)?;

    let mut row = 2;
    for doc in &root.documents {
        let target = names.assign(doc.name(), &doc.relative_folder)?;
        row += ws.link(row, column, doc.name(), &target)?;
    }
    for node in root.toc_roots() {
        row += toc_entry(&mut ws, node, names, column, row)?;
    }

    Ok(ws)
}

/// Lays out a single folder of the table of contents, returning the number
/// of rows it consumed.
fn toc_entry(
    ws: &mut Worksheet,
    node: &HierarchyNode<'_>,
    names: &mut SheetNames,
    column: u32,
    row: u32,
) -> Result<u32> {
    _ = ws.put(row, column, node.segment.as_str(), Style::Bold)?;

    let mut height = 0;
    for doc in &node.documents {
        let target = names.assign(doc.name(), &doc.relative_folder)?;
        height += ws.link(row + height + 1, column + 1, doc.name(), &target)?;
    }
    for child in node.children.values() {
        height += toc_entry(ws, child, names, column + 1, row + height + 1)?;
    }

    Ok(height + 1)
}

/// Writes `Tester N` headers into the first row, starting at the `first`
/// column.
fn tester_headers(ws: &mut Worksheet, first: u32, testers: u32) -> Result<()> {
    for i in 1..=testers {
        _ = ws.put(1, first + i - 1, format!("Tester {i}"), Style::Bold)?;
    }
    Ok(())
}

/// Lays out the sheet of a single document.
fn feature_sheet(f: &Feature, name: String, testers: u32) -> Result<Worksheet> {
    let sub = &f.feature;
    let column = testers + 2;
    let mut ws = Worksheet::new(name);
    ws.freeze_rows(1);

    _ = ws.put(1, column, sub.name.as_str(), Style::Bold)?;
    tester_headers(&mut ws, 1, testers)?;

    let mut row = 2;
    if !sub.tags.is_empty() {
        row += ws.tags(row, column, &sub.tags)?;
    }
    if !sub.description.is_empty() {
        row += ws.long_text(row, column + 1, &dedent(&sub.description))?;
    }
    row += 1;

    for el in &sub.feature_elements {
        row += block(&mut ws, el, testers, column + 1, row)?;
    }

    Ok(ws)
}

/// Lays out a single element starting at the given position, returning the
/// number of rows it consumed, a trailing blank row included.
///
/// Elements of a `Rule` are laid out one column further right, below the
/// rule itself.
fn block(
    ws: &mut Worksheet,
    el: &FeatureElement,
    testers: u32,
    column: u32,
    start: u32,
) -> Result<u32> {
    let mut row = start + ws.lines(start, column, &el.before_comments, Style::Light)?;

    _ = ws.put(row, column, format!("{}: {}", el.label(), el.name), Style::Bold)?;
    if el.is_scenario_shaped() {
        for i in 1..=testers {
            _ = ws.put(row, i, PENDING, Style::NotTested)?;
        }
    }
    row += 1;

    if !el.tags.is_empty() {
        row += ws.tags(row, column, &el.tags)?;
    }
    if !el.description.is_empty() {
        row += ws.long_text(row, column, &dedent(&el.description))?;
    }
    row += ws.lines(row, column, &el.after_comments, Style::Light)?;
    row += 1;

    for step in el.steps() {
        row += ws.lines(row, column + 1, &step.before_comments, Style::Light)?;
        _ = ws.put(row, column + 1, format!("{} ", step.keyword), Style::StepKeyword)?;
        _ = ws.put(row, column + 2, CellValue::template(&step.text), Style::Normal)?;
        row += 1;

        if let Some((header, data)) = step.data_table.split_first() {
            row += ws.table(row, column + 2, header, data)?;
        }
        if !step.doc_string.is_empty() {
            row += ws.long_text(row, column + 2, &step.doc_string)?;
        }
        row += ws.lines(row, column + 1, &step.after_comments, Style::Light)?;
    }

    for ex in el.examples() {
        row += ws.lines(row, column, &ex.before_comments, Style::Light)?;
        row += 1;
        _ = ws.put(row, column, "Examples", Style::Normal)?;
        row += 1;
        row += ws.table(row, column + 2, &ex.header, &ex.data)?;
        row += ws.lines(row, column, &ex.after_comments, Style::Light)?;
    }

    for child in el.children() {
        row += block(ws, child, testers, column + 1, row)?;
    }

    Ok(row - start + 1)
}

/// Strips the indentation of description lines.
fn dedent(text: &str) -> String {
    regex!(r"\n +").replace_all(text, "\n").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Configuration, ElementKind, Example, KeywordType, RunResult, Step,
        SubFeature, Summary,
    };

    use super::*;

    fn step(keyword: &str, text: &str) -> Step {
        Step {
            keyword: keyword.into(),
            raw_keyword: format!("{keyword} "),
            keyword_type: KeywordType::from_keyword(keyword),
            text: text.into(),
            ..Step::default()
        }
    }

    fn element(name: &str, kind: ElementKind) -> FeatureElement {
        FeatureElement {
            name: name.into(),
            description: String::new(),
            tags: vec![],
            line: 1,
            before_comments: vec![],
            after_comments: vec![],
            result: RunResult::default(),
            kind,
        }
    }

    fn doc(path: &str, name: &str, elements: Vec<FeatureElement>) -> Feature {
        Feature {
            relative_folder: path.into(),
            feature: SubFeature {
                name: name.into(),
                feature_elements: elements,
                ..SubFeature::default()
            },
            result: RunResult::default(),
        }
    }

    fn report(features: Vec<Feature>) -> Report {
        Report { features, summary: Summary::default(), configuration: Configuration::now() }
    }

    fn text(ws: &Worksheet, row: u32, column: u32) -> String {
        ws.cell(row, column).map(|c| c.value.text()).unwrap_or_default()
    }

    fn outline() -> FeatureElement {
        element(
            "Refund <amount>",
            ElementKind::ScenarioOutline {
                steps: vec![step("When", "refunding <amount>")],
                examples: vec![Example {
                    header: vec!["amount".into()],
                    data: vec![vec!["10".into()], vec!["20".into()]],
                    ..Example::default()
                }],
            },
        )
    }

    #[test]
    fn lays_out_feature_sheet() {
        let mut f = doc("billing/refund.feature", "Refunds", vec![outline()]);
        f.feature.tags = vec!["@money".into()];
        f.feature.description = "Money back.\n    Sometimes.".into();

        let book = Sheet::new(SheetOptions { testers: 2, base_depth: 0 })
            .write(&report(vec![f]))
            .unwrap();

        let ws = book.sheet("REFUNDS").unwrap();
        assert_eq!(text(ws, 1, 1), "Tester 1");
        assert_eq!(text(ws, 1, 2), "Tester 2");
        assert_eq!(text(ws, 1, 4), "Refunds");
        assert_eq!(text(ws, 2, 4), "Tags:");
        assert_eq!(text(ws, 2, 5), "@money");
        assert_eq!(text(ws, 3, 5), "Money back.\nSometimes.");
        assert_eq!(ws.row_heights[&3], 14 + 15);
        // Blank row, then the element.
        assert_eq!(text(ws, 5, 5), "Scenario Outline: Refund <amount>");
        assert_eq!(text(ws, 5, 1), PENDING);
        assert_eq!(ws.cell(5, 2).unwrap().style, Style::NotTested);
        assert_eq!(text(ws, 7, 6), "When ");
        assert_eq!(text(ws, 7, 7), "refunding <amount>");
        assert_eq!(text(ws, 9, 5), "Examples");
        assert_eq!(text(ws, 10, 7), "amount");
        assert_eq!(text(ws, 12, 7), "20");
        assert_eq!(ws.frozen_rows, 1);
    }

    #[test]
    fn background_has_no_pending_marker() {
        let el = element(
            "Setup",
            ElementKind::Background { steps: vec![step("Given", "a customer")] },
        );
        let book = Sheet::new(SheetOptions { testers: 1, base_depth: 0 })
            .write(&report(vec![doc("a.feature", "A", vec![el])]))
            .unwrap();

        let ws = book.sheet("A").unwrap();

        assert_eq!(text(ws, 3, 4), "Background: Setup");
        assert!(ws.cell(3, 1).is_none());
    }

    #[test]
    fn block_height_counts_every_row() {
        let mut ws = Worksheet::new("S");

        let used = block(&mut ws, &outline(), 0, 1, 1).unwrap();

        // Title, blank, step, blank, "Examples", header, 2 rows, trailing.
        assert_eq!(used, 9);
    }

    #[test]
    fn rule_children_are_indented() {
        let rule = element(
            "Partial",
            ElementKind::Rule {
                feature_elements: vec![element(
                    "Half",
                    ElementKind::Scenario { steps: vec![step("Then", "half is back")] },
                )],
            },
        );

        let book = Sheet::new(SheetOptions::default())
            .write(&report(vec![doc("a.feature", "A", vec![rule])]))
            .unwrap();

        let ws = book.sheet("A").unwrap();
        assert_eq!(text(ws, 3, 3), "Rule: Partial");
        assert_eq!(text(ws, 5, 4), "Scenario: Half");
        assert_eq!(text(ws, 7, 5), "Then ");
    }

    #[test]
    fn repeated_document_path_is_rejected() {
        let err = Sheet::default()
            .write(&report(vec![
                doc("billing/invoice.feature", "Invoices", vec![]),
                doc("billing/invoice.feature", "Invoices", vec![]),
            ]))
            .unwrap_err();

        assert!(
            matches!(&err, Error::DuplicateDocument { path } if path == "billing/invoice.feature"),
            "{err}",
        );
    }

    #[test]
    fn toc_links_every_document_by_folder() {
        let book = Sheet::new(SheetOptions { testers: 1, base_depth: 0 })
            .write(&report(vec![
                doc("login.feature", "Login", vec![]),
                doc("billing/invoice.feature", "Invoices", vec![]),
                doc("billing/eu/vat.feature", "VAT", vec![]),
                doc("billing/refund.feature", "Refunds", vec![]),
            ]))
            .unwrap();

        let names = book.sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["TOC", "LOGIN", "INVOICES", "VAT", "REFUNDS"]);

        let toc = &book.sheets[0];
        assert_eq!(text(toc, 1, 1), "New/TODO");
        assert_eq!(text(toc, 1, 2), "Tester 1");
        assert_eq!(text(toc, 1, 3), "Sections");
        assert_eq!(text(toc, 2, 3), "Login");
        assert_eq!(text(toc, 3, 3), "billing");
        assert_eq!(text(toc, 4, 4), "Invoices");
        assert_eq!(text(toc, 5, 4), "Refunds");
        assert_eq!(text(toc, 6, 4), "eu");
        assert_eq!(text(toc, 7, 5), "VAT");
        assert_eq!(
            toc.cell(7, 5).unwrap().hyperlink.as_deref(),
            Some("VAT!A1"),
        );
    }

    #[test]
    fn toc_elides_single_root_folder() {
        let book = Sheet::new(SheetOptions::default())
            .write(&report(vec![
                doc("features/billing/invoice.feature", "Invoices", vec![]),
                doc("features/login/login.feature", "Login", vec![]),
            ]))
            .unwrap();

        let toc = &book.sheets[0];
        assert_eq!(text(toc, 2, 2), "billing");
        assert_eq!(text(toc, 3, 3), "Invoices");
        assert_eq!(text(toc, 4, 2), "login");
        assert_eq!(text(toc, 5, 3), "Login");
    }

    #[test]
    fn equally_named_documents_get_suffixes() {
        let book = Sheet::new(SheetOptions::default())
            .write(&report(vec![
                doc("a/name.feature", "Name", vec![]),
                doc("b/name.feature", "Name", vec![]),
                doc("c/name.feature", "Name", vec![]),
            ]))
            .unwrap();

        let names = book.sheets.iter().skip(1).map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["NAME", "NAME2", "NAME3"]);
        let toc = &book.sheets[0];
        assert_eq!(toc.cell(5, 3).unwrap().hyperlink.as_deref(), Some("NAME2!A1"));
    }
}
