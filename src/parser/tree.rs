// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Raw parse tree of a [Gherkin] document.
//!
//! Shaped after the [Cucumber messages] `GherkinDocument`, so it can be
//! deserialized right from the `ndjson` output of the official parser. Note
//! that feature and rule children are heterogeneous [`Child`] records with
//! optional payloads: their kind is decided by the [classifier] and not by
//! the type system.
//!
//! [classifier]: crate::normalize::classify
//! [Cucumber messages]: https://github.com/cucumber/messages
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use serde::{Deserialize, Serialize};

/// Parsed `.feature` document.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GherkinDocument {
    /// Path of the document relative to the scan root.
    #[serde(default)]
    pub uri: Option<String>,

    /// The only feature of the document, if it has any.
    #[serde(default)]
    pub feature: Option<Feature>,

    /// All the comments of the document, in source order.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Position in a source document.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Location {
    /// 1-based line.
    pub line: usize,

    /// 1-based column.
    #[serde(default)]
    pub column: Option<usize>,
}

impl Location {
    /// Creates a new [`Location`] at the start of the given `line`.
    #[must_use]
    pub const fn line(line: usize) -> Self {
        Self { line, column: None }
    }
}

/// `#` comment line.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Comment {
    /// Where the comment is.
    pub location: Location,

    /// Full text of the comment line, including the `#`.
    pub text: String,
}

/// `@tag` of a feature, rule, scenario or examples.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Tag {
    /// Where the tag is.
    #[serde(default)]
    pub location: Location,

    /// Name of the tag, including the `@`.
    pub name: String,
}

/// `Feature` node.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Where the `Feature` keyword is.
    #[serde(default)]
    pub location: Location,

    /// Tags of the feature.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Language of the document.
    #[serde(default)]
    pub language: String,

    /// Keyword, as written.
    #[serde(default)]
    pub keyword: String,

    /// Name of the feature.
    #[serde(default)]
    pub name: String,

    /// Free-form description below the name.
    #[serde(default)]
    pub description: String,

    /// Children, in source order.
    #[serde(default)]
    pub children: Vec<Child>,
}

/// Child of a [`Feature`] or a [`Rule`].
///
/// Exactly one of the payloads is expected to be set.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Child {
    /// `Rule` payload.
    #[serde(default)]
    pub rule: Option<Rule>,

    /// `Background` payload.
    #[serde(default)]
    pub background: Option<Background>,

    /// `Scenario` or `Scenario Outline` payload.
    #[serde(default)]
    pub scenario: Option<Scenario>,

    /// Detached `Examples` payload, not owned by any scenario.
    #[serde(default)]
    pub examples: Option<Examples>,
}

impl Child {
    /// Returns the first [`Location`] found among this [`Child`]'s payloads.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.rule
            .as_ref()
            .map(|r| r.location)
            .or_else(|| self.background.as_ref().map(|b| b.location))
            .or_else(|| self.scenario.as_ref().map(|s| s.location))
            .or_else(|| self.examples.as_ref().map(|e| e.location))
    }
}

impl From<Rule> for Child {
    fn from(rule: Rule) -> Self {
        Self { rule: Some(rule), ..Self::default() }
    }
}

impl From<Background> for Child {
    fn from(background: Background) -> Self {
        Self { background: Some(background), ..Self::default() }
    }
}

impl From<Scenario> for Child {
    fn from(scenario: Scenario) -> Self {
        Self { scenario: Some(scenario), ..Self::default() }
    }
}

impl From<Examples> for Child {
    fn from(examples: Examples) -> Self {
        Self { examples: Some(examples), ..Self::default() }
    }
}

/// `Rule` node grouping other children.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Rule {
    /// Where the `Rule` keyword is.
    #[serde(default)]
    pub location: Location,

    /// Tags of the rule.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Keyword, as written.
    #[serde(default)]
    pub keyword: String,

    /// Name of the rule.
    #[serde(default)]
    pub name: String,

    /// Free-form description below the name.
    #[serde(default)]
    pub description: String,

    /// Children, in source order.
    #[serde(default)]
    pub children: Vec<Child>,
}

/// `Background` node.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Background {
    /// Where the `Background` keyword is.
    #[serde(default)]
    pub location: Location,

    /// Keyword, as written.
    #[serde(default)]
    pub keyword: String,

    /// Name of the background.
    #[serde(default)]
    pub name: String,

    /// Free-form description below the name.
    #[serde(default)]
    pub description: String,

    /// Steps of the background.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// `Scenario` or `Scenario Outline` node.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Scenario {
    /// Where the keyword is.
    #[serde(default)]
    pub location: Location,

    /// Tags of the scenario.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Keyword, as written.
    #[serde(default)]
    pub keyword: String,

    /// Name of the scenario.
    #[serde(default)]
    pub name: String,

    /// Free-form description below the name.
    #[serde(default)]
    pub description: String,

    /// Steps of the scenario.
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Example blocks of the scenario.
    #[serde(default)]
    pub examples: Vec<Examples>,
}

/// `Examples` block.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Examples {
    /// Where the `Examples` keyword is.
    #[serde(default)]
    pub location: Location,

    /// Tags of the block.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Keyword, as written.
    #[serde(default)]
    pub keyword: String,

    /// Name of the block.
    #[serde(default)]
    pub name: String,

    /// Free-form description below the name.
    #[serde(default)]
    pub description: String,

    /// Header row of the table.
    #[serde(default)]
    pub table_header: Option<TableRow>,

    /// Data rows of the table.
    #[serde(default)]
    pub table_body: Vec<TableRow>,
}

/// Row of a table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct TableRow {
    /// Where the row is.
    #[serde(default)]
    pub location: Location,

    /// Cells of the row.
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Creates a new [`TableRow`] at the given `line` out of cell values.
    #[must_use]
    pub fn new<I, S>(line: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: Location::line(line),
            cells: values
                .into_iter()
                .map(|v| TableCell {
                    location: Location::line(line),
                    value: v.into(),
                })
                .collect(),
        }
    }

    /// Returns values of this [`TableRow`]'s cells.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.value.clone()).collect()
    }
}

/// Cell of a [`TableRow`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct TableCell {
    /// Where the cell is.
    #[serde(default)]
    pub location: Location,

    /// Value of the cell.
    #[serde(default)]
    pub value: String,
}

/// Step of a scenario or background.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Where the step is.
    #[serde(default)]
    pub location: Location,

    /// Keyword, as written, including the trailing space.
    #[serde(default)]
    pub keyword: String,

    /// Kind of the keyword, if the parser resolved it.
    #[serde(default)]
    pub keyword_type: Option<KeywordType>,

    /// Text following the keyword.
    #[serde(default)]
    pub text: String,

    /// Attached doc string.
    #[serde(default)]
    pub doc_string: Option<DocString>,

    /// Attached data table.
    #[serde(default)]
    pub data_table: Option<DataTable>,
}

/// Doc string attached to a [`Step`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocString {
    /// Where the opening delimiter is.
    #[serde(default)]
    pub location: Location,

    /// Media type annotation after the opening delimiter.
    #[serde(default)]
    pub media_type: Option<String>,

    /// Content between the delimiters.
    #[serde(default)]
    pub content: String,
}

/// Data table attached to a [`Step`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct DataTable {
    /// Where the table starts.
    #[serde(default)]
    pub location: Location,

    /// All the rows, header included.
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

/// Kind of a [`Step`] keyword, independent of the document language.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub enum KeywordType {
    /// `Given`.
    Context,

    /// `When`.
    Action,

    /// `Then`.
    Outcome,

    /// `And`, `But` or `*`.
    Conjunction,

    /// Not resolved.
    #[default]
    Unknown,
}

impl KeywordType {
    /// Resolves a [`KeywordType`] out of an English step `keyword`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_lowercase().as_str() {
            "given" => Self::Context,
            "when" => Self::Action,
            "then" => Self::Outcome,
            "and" | "but" | "*" => Self::Conjunction,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_cucumber_message() {
        let json = r#"{
            "uri": "billing/invoice.feature",
            "feature": {
                "location": {"line": 1, "column": 1},
                "tags": [],
                "language": "en",
                "keyword": "Feature",
                "name": "Invoices",
                "description": "",
                "children": [{
                    "scenario": {
                        "location": {"line": 3, "column": 3},
                        "keyword": "Scenario",
                        "name": "Issue",
                        "steps": [{
                            "location": {"line": 4, "column": 5},
                            "keyword": "Given ",
                            "keywordType": "Context",
                            "text": "a customer"
                        }],
                        "examples": []
                    }
                }]
            },
            "comments": [{"location": {"line": 2, "column": 1}, "text": "  # note"}]
        }"#;

        let doc: GherkinDocument = serde_json::from_str(json).unwrap();

        let feature = doc.feature.unwrap();
        assert_eq!(feature.name, "Invoices");
        let scenario = feature.children[0].scenario.as_ref().unwrap();
        assert_eq!(scenario.steps[0].keyword_type, Some(KeywordType::Context));
        assert_eq!(doc.comments[0].location.line, 2);
    }

    #[test]
    fn child_location_comes_from_payload() {
        let child = Child::from(Scenario {
            location: Location::line(7),
            ..Scenario::default()
        });

        assert_eq!(child.location(), Some(Location::line(7)));
        assert_eq!(Child::default().location(), None);
    }

    #[test]
    fn keyword_type_from_english_keywords() {
        assert_eq!(KeywordType::from_keyword("Given "), KeywordType::Context);
        assert_eq!(KeywordType::from_keyword("WHEN"), KeywordType::Action);
        assert_eq!(KeywordType::from_keyword("Then"), KeywordType::Outcome);
        assert_eq!(KeywordType::from_keyword("But "), KeywordType::Conjunction);
        assert_eq!(KeywordType::from_keyword("* "), KeywordType::Conjunction);
        assert_eq!(KeywordType::from_keyword("Дано"), KeywordType::Unknown);
    }
}
