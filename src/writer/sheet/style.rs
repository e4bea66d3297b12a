// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cell styles of a [`Workbook`].
//!
//! [`Workbook`]: super::Workbook

use std::collections::BTreeMap;

use serde::Serialize;

/// Style tag of a cell or a rich text run.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// Regular text.
    Normal,

    /// Titles and headers.
    Bold,

    /// Comments and tags.
    Light,

    /// Step keywords.
    StepKeyword,

    /// `<placeholder>` runs of step text.
    Template,

    /// Header cells of data and example tables.
    TableHeader,

    /// Body cells of data and example tables.
    TableCell,

    /// Links to other sheets.
    Hyperlink,

    /// Tester progress marker of an element nobody has tested yet.
    NotTested,
}

impl Style {
    /// All the [`Style`]s.
    pub const ALL: [Self; 9] = [
        Self::Normal,
        Self::Bold,
        Self::Light,
        Self::StepKeyword,
        Self::Template,
        Self::TableHeader,
        Self::TableCell,
        Self::Hyperlink,
        Self::NotTested,
    ];

    /// Returns the visual attributes of this [`Style`].
    #[must_use]
    pub const fn spec(self) -> StyleSpec {
        let plain = StyleSpec {
            bold: false,
            italic: false,
            underline: false,
            font_color: None,
            fill: None,
            border: false,
        };
        match self {
            Self::Normal => plain,
            Self::Bold => StyleSpec { bold: true, ..plain },
            Self::Light => StyleSpec { italic: true, font_color: Some("808080"), ..plain },
            Self::StepKeyword => StyleSpec { bold: true, font_color: Some("1F4E79"), ..plain },
            Self::Template => StyleSpec { font_color: Some("C71585"), ..plain },
            Self::TableHeader => StyleSpec {
                bold: true,
                fill: Some("BDD7EE"),
                border: true,
                ..plain
            },
            Self::TableCell => StyleSpec { border: true, ..plain },
            Self::Hyperlink => StyleSpec { underline: true, font_color: Some("0563C1"), ..plain },
            Self::NotTested => StyleSpec { font_color: Some("9C0006"), fill: Some("FFC7CE"), ..plain },
        }
    }

    /// Returns the table of all the [`Style`]s with their attributes.
    #[must_use]
    pub fn table() -> BTreeMap<Self, StyleSpec> {
        Self::ALL.into_iter().map(|s| (s, s.spec())).collect()
    }
}

/// Visual attributes of a [`Style`], for an encoder to apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSpec {
    /// Bold font.
    pub bold: bool,

    /// Italic font.
    pub italic: bool,

    /// Underlined font.
    pub underline: bool,

    /// Font color as `RRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<&'static str>,

    /// Background fill color as `RRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,

    /// Thin border around the cell.
    pub border: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_style() {
        let table = Style::table();

        assert_eq!(table.len(), Style::ALL.len());
        assert!(table[&Style::Bold].bold);
        assert!(table[&Style::TableHeader].fill.is_some());
        assert_eq!(table[&Style::Normal], Style::Normal.spec());
    }

    #[test]
    fn serializes_as_camel_case_keys() {
        let json = serde_json::to_value(Style::table()).unwrap();

        assert_eq!(json["notTested"]["fontColor"], "9C0006");
        assert_eq!(json["stepKeyword"]["bold"], true);
        assert!(json["normal"].get("fill").is_none());
    }
}
