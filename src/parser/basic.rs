// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Parser`] implementation backed by the [`gherkin`] crate.

use std::{
    fs,
    path::{Component, Path, PathBuf},
    sync::Arc,
    vec,
};

use futures::stream;
use itertools::Itertools as _;
use sealed::sealed;

use super::{tree, Error, GherkinDocument, Parser, Result};

/// Default [`Parser`].
///
/// Accepts either a single `.feature` file or a directory, which is walked
/// recursively for `.feature` files (in path order).
///
/// As there is no async runtime-agnostic way to interact with io, this
/// [`Parser`] is blocking.
#[derive(Clone, Copy, Debug, Default)]
pub struct Basic;

impl<I: AsRef<Path>> Parser<I> for Basic {
    type Output = stream::Iter<vec::IntoIter<Result<GherkinDocument>>>;

    fn parse(self, input: I) -> Self::Output {
        let input = input.as_ref();
        let documents = match discover(input) {
            Ok(files) => files
                .into_iter()
                .map(|(uri, path)| read_document(&path, uri))
                .collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(documents)
    }
}

/// Finds all the `.feature` files of the given `input`, paired with their
/// slash-separated paths relative to it.
///
/// # Errors
///
/// If the `input` doesn't exist or can't be walked.
pub fn discover(input: &Path) -> Result<Vec<(String, PathBuf)>> {
    if input.is_file() {
        let uri = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(vec![(uri, input.to_path_buf())]);
    }
    if !input.is_dir() {
        return Err(Error::Stream {
            reason: format!("`{}` is neither a file nor a directory", input.display()),
        });
    }

    let walker = globwalk::GlobWalkerBuilder::new(input, "*.feature")
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Stream {
            reason: format!("failed to walk `{}`: {e}", input.display()),
        })?;

    Ok(walker
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let path = entry.into_path();
            (relative_uri(input, &path), path)
        })
        .sorted()
        .collect())
}

/// Converts `path` into a slash-separated path relative to `root`.
fn relative_uri(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            Component::Prefix(_)
            | Component::RootDir
            | Component::CurDir
            | Component::ParentDir => None,
        })
        .join("/")
}

/// Reads and parses a single `.feature` file.
fn read_document(path: &Path, uri: String) -> Result<GherkinDocument> {
    let text = fs::read_to_string(path).map_err(|e| Error::Reading {
        path: uri.clone(),
        source: Arc::new(e),
    })?;
    parse_str(&text, uri)
}

/// Parses the given [Gherkin] `text` into a [`GherkinDocument`] located at
/// `uri`.
///
/// A text without any Gherkin content (only blank and comment lines) results
/// in a [`GherkinDocument`] without a feature.
///
/// # Errors
///
/// If the [`gherkin`] parser rejects the `text`.
///
/// [Gherkin]: https://cucumber.io/docs/gherkin/reference
pub fn parse_str(text: &str, uri: impl Into<String>) -> Result<GherkinDocument> {
    let uri = uri.into();
    let comments = scan_comments(text);

    let is_blank = text.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    });
    if is_blank {
        return Ok(GherkinDocument { uri: Some(uri), feature: None, comments });
    }

    let feature = gherkin::Feature::parse(text, gherkin::GherkinEnv::default())
        .map_err(|e| Error::Parsing { path: uri.clone(), reason: e.to_string() })?;

    Ok(GherkinDocument {
        uri: Some(uri),
        feature: Some(feature.into_tree()),
        comments,
    })
}

/// Collects `#` comment lines of the given `text`.
///
/// [`gherkin`] drops comments, so they are recovered here. Lines inside doc
/// strings are content, and the `# language:` header is a directive.
fn scan_comments(text: &str) -> Vec<tree::Comment> {
    let mut fence: Option<&str> = None;
    let mut comments = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();

        if let Some(delim) = fence {
            if trimmed.starts_with(delim) {
                fence = None;
            }
            continue;
        }
        if let Some(delim) =
            ["\"\"\"", "```"].into_iter().find(|d| trimmed.starts_with(d))
        {
            fence = Some(delim);
            continue;
        }

        let is_directive = trimmed
            .strip_prefix('#')
            .is_some_and(|rest| rest.trim_start().starts_with("language:"));
        if trimmed.starts_with('#') && !is_directive {
            comments.push(tree::Comment {
                location: tree::Location {
                    line: idx + 1,
                    column: Some(line.len() - trimmed.len() + 1),
                },
                text: line.to_owned(),
            });
        }
    }
    comments
}

/// Conversion of [`gherkin`] AST nodes into the [`tree`].
#[sealed]
pub trait IntoTree {
    /// Resulting [`tree`] node.
    type Node;

    /// Converts this [`gherkin`] node into a [`tree`] node.
    fn into_tree(self) -> Self::Node;
}

#[sealed]
impl IntoTree for gherkin::Feature {
    type Node = tree::Feature;

    fn into_tree(self) -> Self::Node {
        let children = merge_children(
            self.background,
            self.scenarios,
            self.rules.into_iter().map(IntoTree::into_tree).map(tree::Child::from),
        );
        tree::Feature {
            location: self.position.into_tree(),
            tags: tags(self.tags, self.position),
            language: String::new(),
            keyword: self.keyword,
            name: self.name,
            description: self.description.unwrap_or_default(),
            children,
        }
    }
}

#[sealed]
impl IntoTree for gherkin::Rule {
    type Node = tree::Rule;

    fn into_tree(self) -> Self::Node {
        tree::Rule {
            location: self.position.into_tree(),
            tags: tags(self.tags, self.position),
            keyword: self.keyword,
            name: self.name,
            description: self.description.unwrap_or_default(),
            children: merge_children(self.background, self.scenarios, None),
        }
    }
}

#[sealed]
impl IntoTree for gherkin::Background {
    type Node = tree::Background;

    fn into_tree(self) -> Self::Node {
        tree::Background {
            location: self.position.into_tree(),
            keyword: self.keyword,
            name: String::new(),
            description: self.description.unwrap_or_default(),
            steps: self.steps.into_iter().map(IntoTree::into_tree).collect(),
        }
    }
}

#[sealed]
impl IntoTree for gherkin::Scenario {
    type Node = tree::Scenario;

    fn into_tree(self) -> Self::Node {
        tree::Scenario {
            location: self.position.into_tree(),
            tags: tags(self.tags, self.position),
            keyword: self.keyword,
            name: self.name,
            description: self.description.unwrap_or_default(),
            steps: self.steps.into_iter().map(IntoTree::into_tree).collect(),
            examples: self.examples.into_iter().map(IntoTree::into_tree).collect(),
        }
    }
}

#[sealed]
impl IntoTree for gherkin::Examples {
    type Node = tree::Examples;

    fn into_tree(self) -> Self::Node {
        let mut rows = self
            .table
            .map(|t| t.rows)
            .unwrap_or_default()
            .into_iter()
            .zip(self.position.line + 1..)
            .map(|(values, line)| tree::TableRow::new(line, values));
        let table_header = rows.next();

        tree::Examples {
            location: self.position.into_tree(),
            tags: tags(self.tags, self.position),
            keyword: self.keyword,
            name: String::new(),
            description: String::new(),
            table_header,
            table_body: rows.collect(),
        }
    }
}

#[sealed]
impl IntoTree for gherkin::Step {
    type Node = tree::Step;

    fn into_tree(self) -> Self::Node {
        let keyword_type = match tree::KeywordType::from_keyword(&self.keyword) {
            tree::KeywordType::Conjunction => tree::KeywordType::Conjunction,
            _ => match self.ty {
                gherkin::StepType::Given => tree::KeywordType::Context,
                gherkin::StepType::When => tree::KeywordType::Action,
                gherkin::StepType::Then => tree::KeywordType::Outcome,
            },
        };
        let line = self.position.line;

        tree::Step {
            location: self.position.into_tree(),
            keyword: self.keyword,
            keyword_type: Some(keyword_type),
            text: self.value,
            doc_string: self.docstring.map(|content| tree::DocString {
                location: tree::Location::line(line + 1),
                media_type: None,
                content,
            }),
            data_table: self.table.map(|t| tree::DataTable {
                location: t.position.into_tree(),
                rows: t
                    .rows
                    .into_iter()
                    .zip(t.position.line..)
                    .map(|(values, line)| tree::TableRow::new(line, values))
                    .collect(),
            }),
        }
    }
}

#[sealed]
impl IntoTree for gherkin::LineCol {
    type Node = tree::Location;

    fn into_tree(self) -> Self::Node {
        tree::Location { line: self.line, column: Some(self.col) }
    }
}

/// Converts [`gherkin`] tags (stored without `@`) into [`tree::Tag`]s.
fn tags(tags: Vec<String>, position: gherkin::LineCol) -> Vec<tree::Tag> {
    tags.into_iter()
        .map(|name| tree::Tag {
            // As `gherkin` parser omits tag positions, the line above the
            // tagged node is used.
            location: tree::Location::line(position.line.saturating_sub(1)),
            name: if name.starts_with('@') { name } else { format!("@{name}") },
        })
        .collect()
}

/// Merges separately stored [`gherkin`] children back into source order.
fn merge_children(
    background: Option<gherkin::Background>,
    scenarios: Vec<gherkin::Scenario>,
    rules: impl IntoIterator<Item = tree::Child>,
) -> Vec<tree::Child> {
    background
        .map(|b| tree::Child::from(b.into_tree()))
        .into_iter()
        .chain(scenarios.into_iter().map(|s| tree::Child::from(s.into_tree())))
        .chain(rules)
        .sorted_by_key(|c| c.location().map_or(0, |l| l.line))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use futures::{executor::block_on, StreamExt as _};

    use super::*;

    const FEATURE: &str = "\
# language: en
@billing
Feature: Invoices
  Sent monthly.

  # prepare customer
  Background:
    Given a customer

  # first
  # second
  Scenario Outline: Issue <amount>
    Given an order of <amount>
      \"\"\"
      # not a comment
      \"\"\"
    And a table
      | a | b |
      | 1 | 2 |

    Examples:
      | amount |
      | 10     |
      | 20     |

  Rule: Paid invoices
    Scenario: Pay
      When the invoice is paid
      Then it is closed
";

    #[test]
    fn restores_source_order() {
        let doc = parse_str(FEATURE, "billing/invoice.feature").unwrap();
        let feature = doc.feature.unwrap();

        let kinds = feature
            .children
            .iter()
            .map(|c| {
                (c.background.is_some(), c.rule.is_some(), c.scenario.is_some())
            })
            .collect::<Vec<_>>();

        assert_eq!(
            kinds,
            [(true, false, false), (false, false, true), (false, true, false)],
        );
        assert_eq!(feature.tags[0].name, "@billing");
        assert_eq!(doc.uri.as_deref(), Some("billing/invoice.feature"));
    }

    #[test]
    fn recovers_comments_outside_doc_strings() {
        let doc = parse_str(FEATURE, "x.feature").unwrap();

        let comments = doc
            .comments
            .iter()
            .map(|c| (c.location.line, c.text.trim()))
            .collect::<Vec<_>>();

        assert_eq!(
            comments,
            [(6, "# prepare customer"), (10, "# first"), (11, "# second")],
        );
    }

    #[test]
    fn converts_examples_and_steps() {
        let doc = parse_str(FEATURE, "x.feature").unwrap();
        let feature = doc.feature.unwrap();
        let outline = feature.children[1].scenario.as_ref().unwrap();

        let examples = &outline.examples[0];
        assert_eq!(examples.table_header.as_ref().unwrap().values(), ["amount"]);
        assert_eq!(examples.table_body.len(), 2);

        let and = &outline.steps[1];
        assert_eq!(and.keyword_type, Some(tree::KeywordType::Conjunction));
        assert_eq!(and.data_table.as_ref().unwrap().rows.len(), 2);
        assert!(outline.steps[0].doc_string.is_some());
    }

    #[test]
    fn blank_document_has_no_feature() {
        let doc = parse_str("# only a comment\n\n", "empty.feature").unwrap();

        assert!(doc.feature.is_none());
        assert_eq!(doc.comments.len(), 1);
    }

    #[test]
    fn invalid_document_is_a_parsing_error() {
        let err = parse_str("Scenario without feature\n  Given x\n", "bad.feature")
            .unwrap_err();

        assert!(matches!(err, Error::Parsing { ref path, .. } if path == "bad.feature"));
    }

    #[test]
    fn walks_directories_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("billing")).unwrap();
        fs::write(
            dir.path().join("billing/refund.feature"),
            "Feature: Refund\n  Scenario: Ok\n    Given x\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("billing/invoice.feature"),
            "Feature: Invoice\n  Scenario: Ok\n    Given x\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not gherkin").unwrap();

        let docs = block_on(Basic.parse(dir.path()).collect::<Vec<_>>());

        let uris = docs
            .into_iter()
            .map(|d| d.unwrap().uri.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(uris, ["billing/invoice.feature", "billing/refund.feature"]);
    }

    #[test]
    fn missing_input_is_a_stream_error() {
        let docs = block_on(
            Basic.parse("/definitely/not/here").collect::<Vec<_>>(),
        );

        assert!(matches!(docs.as_slice(), [Err(Error::Stream { .. })]));
    }
}
