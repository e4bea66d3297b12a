// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turning a [`Stream`] of raw [`GherkinDocument`]s into a [`Report`].
//!
//! Every document is normalized on its own: its children are
//! [classified], comments are [attached] to the nodes they annotate, and
//! the resulting [`Feature`] is accounted in the [`Summary`].
//!
//! A document which can't be read, parsed or classified doesn't stop the
//! run: it's logged, skipped and remembered in [`Normalized::defects`], so
//! all the broken documents are reported at once by
//! [`Normalized::into_report()`].
//!
//! [attached]: comments::CommentAttacher
//! [classified]: classify::classify()
//! [`Summary`]: crate::model::Summary

pub mod classify;
pub mod comments;

use std::pin::pin;

use futures::{Stream, StreamExt as _};

use crate::{
    error::{Defects, SourceDefect},
    model::{
        Configuration, ElementKind, Example, Feature, FeatureElement,
        KeywordType, Report, RunResult, Step, SubFeature, Summary,
    },
    parser::{self, tree, GherkinDocument},
    Error, Result,
};

use self::{
    classify::{classify, Classified, Scope},
    comments::{Attached, CommentAttacher},
};

/// Outcome of [`normalize()`]: the [`Report`] over all the well-formed
/// documents along with the skipped ones.
#[derive(Clone, Debug)]
pub struct Normalized {
    /// [`Report`] over all the successfully normalized documents.
    pub report: Report,

    /// Documents skipped because of their defects.
    pub defects: Defects,
}

impl Normalized {
    /// Returns the [`Report`], only if no document was skipped.
    ///
    /// # Errors
    ///
    /// [`Error::SourceDefects`] naming every skipped document.
    pub fn into_report(self) -> Result<Report> {
        if self.defects.is_empty() {
            Ok(self.report)
        } else {
            Err(Error::SourceDefects(self.defects))
        }
    }
}

/// Consumes the given `documents` in order, normalizing each one into a
/// [`Feature`] of the resulting [`Report`].
///
/// # Errors
///
/// [`Error::Parser`] if the source itself fails (see
/// [`parser::Error::Stream`]), nothing after it is consumed.
///
/// Per-document defects, documents without any feature included, are not
/// errors here, see [`Normalized::defects`].
pub async fn normalize<S>(
    documents: S,
    configuration: Configuration,
) -> Result<Normalized>
where
    S: Stream<Item = parser::Result<GherkinDocument>>,
{
    let mut documents = pin!(documents);
    let mut features = Vec::new();
    let mut summary = Summary::default();
    let mut defects = Vec::new();

    while let Some(event) = documents.next().await {
        let outcome = event
            .map_err(Error::from)
            .and_then(|doc| normalize_document(&doc));
        match outcome {
            Ok(feature) => {
                tracing::debug!(
                    path = %feature.relative_folder,
                    elements = feature.feature.feature_elements.len(),
                    "normalized document",
                );
                account(&mut summary, &feature);
                features.push(feature);
            }
            Err(e) if e.is_source_defect() => {
                let path = defect_path(&e).to_owned();
                tracing::warn!(%path, "skipping document: {e}");
                defects.push(SourceDefect { path, reason: e.to_string() });
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        features = summary.features.total,
        scenarios = summary.scenarios.total,
        skipped = defects.len(),
        "normalization finished",
    );

    Ok(Normalized {
        report: Report { features, summary, configuration },
        defects: Defects(defects),
    })
}

/// Normalizes a single [`GherkinDocument`] into a [`Feature`].
///
/// # Errors
///
/// - [`Error::EmptyDocument`] if the `doc` has no feature;
/// - [`Error::UnrecognizedElement`] or [`Error::NestedRule`] if any of its
///   children can't be classified.
pub fn normalize_document(doc: &GherkinDocument) -> Result<Feature> {
    let path = doc
        .uri
        .as_deref()
        .map(|uri| uri.replace('\\', "/"))
        .unwrap_or_default();
    let Some(feature) = &doc.feature else {
        return Err(Error::EmptyDocument { path });
    };

    let classified = feature
        .children
        .iter()
        .map(|c| classify(c, Scope::Root))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| match e {
            classify::Error::Unrecognized { line, reason } => {
                Error::UnrecognizedElement { path: path.clone(), line, reason }
            }
            classify::Error::NestedRule { line } => {
                Error::NestedRule { path: path.clone(), line }
            }
        })?;

    let mut attacher = CommentAttacher::new(&doc.comments);
    let feature_elements = classified
        .into_iter()
        .map(|c| element(c, &mut attacher))
        .collect();

    Ok(Feature {
        relative_folder: path,
        feature: SubFeature {
            name: feature.name.clone(),
            description: feature.description.clone(),
            feature_elements,
            tags: tags(&feature.tags),
            result: RunResult::default(),
        },
        result: RunResult::default(),
    })
}

/// Accounts the given normalized `feature` in the `summary`.
fn account(summary: &mut Summary, feature: &Feature) {
    fn walk(summary: &mut Summary, elements: &[FeatureElement]) {
        for el in elements {
            summary.scenarios.record_inconclusive();
            summary.record_tags(&el.tags);
            walk(summary, el.children());
        }
    }

    summary.features.record_inconclusive();
    summary.record_tags(&feature.feature.tags);
    summary.record_folder(folder_of(&feature.relative_folder));
    walk(summary, &feature.feature.feature_elements);
}

/// Returns the folder part of the given slash-separated `path`, or `.` for
/// documents right in the scan root.
#[must_use]
pub fn folder_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((folder, _)) if !folder.is_empty() => folder,
        _ => ".",
    }
}

/// Extracts the document path out of a per-document `err`or.
fn defect_path(err: &Error) -> &str {
    match err {
        Error::Parser(e) => e.path().unwrap_or_default(),
        Error::EmptyDocument { path }
        | Error::UnrecognizedElement { path, .. }
        | Error::NestedRule { path, .. } => path,
        Error::SourceDefects(_)
        | Error::DepthExceeded { .. }
        | Error::SheetNamesExhausted { .. }
        | Error::DuplicateDocument { .. }
        | Error::CellOccupied { .. }
        | Error::Config { .. }
        | Error::Io(_)
        | Error::Json(_) => "",
    }
}

/// Builds a [`FeatureElement`] out of a [`Classified`] node.
///
/// Comments are attached to the node itself first, then to its steps and
/// example blocks (or its nested elements), in source order.
fn element(node: Classified<'_>, attacher: &mut CommentAttacher<'_>) -> FeatureElement {
    let (line, name, description, tag_list) = match &node {
        Classified::Background(b) => (b.location.line, &b.name, &b.description, &[][..]),
        Classified::Scenario(s) | Classified::ScenarioOutline(s) => {
            (s.location.line, &s.name, &s.description, s.tags.as_slice())
        }
        Classified::Example(e) => {
            (e.location.line, &e.name, &e.description, e.tags.as_slice())
        }
        Classified::Rule(r, _) => {
            (r.location.line, &r.name, &r.description, r.tags.as_slice())
        }
    };
    let (name, description, tag_list) = (name.clone(), description.clone(), tags(tag_list));
    let Attached { before, after } = attacher.attach(line);

    let kind = match node {
        Classified::Background(b) => ElementKind::Background { steps: steps(&b.steps, attacher) },
        Classified::Scenario(s) => ElementKind::Scenario { steps: steps(&s.steps, attacher) },
        Classified::ScenarioOutline(s) => ElementKind::ScenarioOutline {
            steps: steps(&s.steps, attacher),
            examples: s.examples.iter().map(|e| example(e, attacher)).collect(),
        },
        Classified::Example(e) => ElementKind::Example { example: table(e) },
        Classified::Rule(_, children) => ElementKind::Rule {
            feature_elements: children
                .into_iter()
                .map(|c| element(c, attacher))
                .collect(),
        },
    };

    FeatureElement {
        name,
        description,
        tags: tag_list,
        line,
        before_comments: before,
        after_comments: after,
        result: RunResult::default(),
        kind,
    }
}

/// Builds [`Step`]s, attaching comments to each of them.
fn steps(steps: &[tree::Step], attacher: &mut CommentAttacher<'_>) -> Vec<Step> {
    steps
        .iter()
        .map(|s| {
            let Attached { before, after } = attacher.peek(s.location.line);
            let keyword_type = s
                .keyword_type
                .filter(|t| *t != KeywordType::Unknown)
                .unwrap_or_else(|| KeywordType::from_keyword(&s.keyword));
            Step {
                keyword: s.keyword.trim().to_owned(),
                raw_keyword: s.keyword.clone(),
                keyword_type,
                text: s.text.clone(),
                before_comments: before,
                after_comments: after,
                doc_string: s
                    .doc_string
                    .as_ref()
                    .map(|d| d.content.clone())
                    .unwrap_or_default(),
                data_table: s
                    .data_table
                    .as_ref()
                    .map(|t| t.rows.iter().map(tree::TableRow::values).collect())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Builds an [`Example`] block of a scenario outline, attaching comments to
/// it.
fn example(examples: &tree::Examples, attacher: &mut CommentAttacher<'_>) -> Example {
    let Attached { before, after } = attacher.peek(examples.location.line);
    Example { before_comments: before, after_comments: after, ..table(examples) }
}

/// Extracts the table of the given `examples` without any comments.
fn table(examples: &tree::Examples) -> Example {
    Example {
        header: examples
            .table_header
            .as_ref()
            .map(tree::TableRow::values)
            .unwrap_or_default(),
        data: examples.table_body.iter().map(tree::TableRow::values).collect(),
        before_comments: vec![],
        after_comments: vec![],
    }
}

/// Extracts tag names.
fn tags(tags: &[tree::Tag]) -> Vec<String> {
    tags.iter().map(|t| t.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use futures::{executor::block_on, stream};

    use super::*;

    fn step(line: usize, keyword: &str, text: &str) -> tree::Step {
        tree::Step {
            location: tree::Location::line(line),
            keyword: keyword.into(),
            text: text.into(),
            ..tree::Step::default()
        }
    }

    fn comment(line: usize, text: &str) -> tree::Comment {
        tree::Comment { location: tree::Location::line(line), text: text.into() }
    }

    fn outline_doc() -> GherkinDocument {
        GherkinDocument {
            uri: Some("billing/refund.feature".into()),
            feature: Some(tree::Feature {
                name: "Refunds".into(),
                tags: vec![tree::Tag { name: "@money".into(), ..tree::Tag::default() }],
                children: vec![
                    tree::Background {
                        location: tree::Location::line(3),
                        steps: vec![step(4, "Given ", "a paid invoice")],
                        ..tree::Background::default()
                    }
                    .into(),
                    tree::Scenario {
                        location: tree::Location::line(7),
                        name: "Refund <amount>".into(),
                        tags: vec![tree::Tag { name: "@slow".into(), ..tree::Tag::default() }],
                        steps: vec![
                            step(8, "When ", "refunding <amount>"),
                            step(9, "And ", "confirming"),
                        ],
                        examples: vec![tree::Examples {
                            location: tree::Location::line(12),
                            table_header: Some(tree::TableRow::new(13, ["amount"])),
                            table_body: vec![
                                tree::TableRow::new(14, ["10"]),
                                tree::TableRow::new(15, ["20"]),
                            ],
                            ..tree::Examples::default()
                        }],
                        ..tree::Scenario::default()
                    }
                    .into(),
                    tree::Rule {
                        location: tree::Location::line(17),
                        name: "Partial".into(),
                        children: vec![tree::Scenario {
                            location: tree::Location::line(18),
                            name: "Half".into(),
                            steps: vec![step(19, "Then ", "half is back")],
                            ..tree::Scenario::default()
                        }
                        .into()],
                        ..tree::Rule::default()
                    }
                    .into(),
                ],
                ..tree::Feature::default()
            }),
            comments: vec![
                comment(6, "# about refunds"),
                comment(10, "# after confirming"),
                comment(11, "# before examples"),
            ],
        }
    }

    #[test]
    fn builds_elements_in_source_order() {
        let feature = normalize_document(&outline_doc()).unwrap();

        let labels = feature
            .feature
            .feature_elements
            .iter()
            .map(FeatureElement::label)
            .collect::<Vec<_>>();
        assert_eq!(labels, ["Background", "Scenario Outline", "Rule"]);
        assert_eq!(feature.relative_folder, "billing/refund.feature");
        assert_eq!(feature.feature.tags, ["@money"]);
    }

    #[test]
    fn element_count_matches_parse_tree() {
        let doc = outline_doc();

        let feature = normalize_document(&doc).unwrap();

        let top_level = doc.feature.as_ref().unwrap().children.len();
        assert_eq!(feature.feature.feature_elements.len(), top_level);
        let total = feature
            .feature
            .feature_elements
            .iter()
            .map(FeatureElement::count)
            .sum::<usize>();
        assert_eq!(total, top_level + 1);
    }

    #[test]
    fn attaches_comments_in_encounter_order() {
        let feature = normalize_document(&outline_doc()).unwrap();

        let outline = &feature.feature.feature_elements[1];
        assert_eq!(outline.before_comments, ["# about refunds"]);
        assert!(outline.after_comments.is_empty());
        let confirming = &outline.steps()[1];
        assert_eq!(confirming.after_comments, ["# after confirming", "# before examples"]);
        assert!(outline.examples()[0].before_comments.is_empty());
    }

    #[test]
    fn last_step_does_not_steal_next_element_comment() {
        let doc = GherkinDocument {
            uri: Some("f.feature".into()),
            feature: Some(tree::Feature {
                name: "F".into(),
                children: vec![
                    tree::Scenario {
                        location: tree::Location::line(2),
                        name: "A".into(),
                        steps: vec![step(3, "Given ", "x")],
                        ..tree::Scenario::default()
                    }
                    .into(),
                    tree::Scenario {
                        location: tree::Location::line(5),
                        name: "B".into(),
                        ..tree::Scenario::default()
                    }
                    .into(),
                ],
                ..tree::Feature::default()
            }),
            comments: vec![comment(4, "# B is flaky")],
        };

        let feature = normalize_document(&doc).unwrap();

        let [a, b] = feature.feature.feature_elements.as_slice() else {
            panic!("expected two elements");
        };
        assert_eq!(b.before_comments, ["# B is flaky"]);
        assert_eq!(a.steps()[0].after_comments, ["# B is flaky"]);
    }

    #[test]
    fn resolves_steps_and_examples() {
        let feature = normalize_document(&outline_doc()).unwrap();

        let outline = &feature.feature.feature_elements[1];
        let steps = outline.steps();
        assert_eq!(steps[0].keyword, "When");
        assert_eq!(steps[0].raw_keyword, "When ");
        assert_eq!(steps[0].keyword_type, KeywordType::Action);
        assert_eq!(steps[1].keyword_type, KeywordType::Conjunction);
        let examples = outline.examples();
        assert_eq!(examples[0].header, ["amount"]);
        assert_eq!(examples[0].data, [["10"], ["20"]]);
    }

    #[test]
    fn summary_counts_every_element() {
        let normalized = block_on(normalize(
            stream::iter(vec![Ok(outline_doc())]),
            Configuration::now(),
        ))
        .unwrap();

        let summary = &normalized.report.summary;
        assert_eq!(summary.features.total, 1);
        assert_eq!(summary.scenarios.total, 4);
        assert_eq!(summary.scenarios.inconclusive, summary.scenarios.total);
        assert_eq!(summary.tags, ["@money", "@slow"]);
        assert_eq!(summary.folders, ["billing"]);
    }

    #[test]
    fn skips_defective_documents() {
        let mut nested = outline_doc();
        nested.uri = Some("broken.feature".into());
        let rule = nested.feature.as_mut().unwrap().children[2].rule.as_mut().unwrap();
        rule.children.push(tree::Rule::default().into());
        let unparsed = parser::Error::Parsing {
            path: "garbage.feature".into(),
            reason: "expected a feature at line 1".into(),
        };

        let normalized = block_on(normalize(
            stream::iter(vec![Ok(nested), Err(unparsed), Ok(outline_doc())]),
            Configuration::now(),
        ))
        .unwrap();

        assert_eq!(normalized.report.features.len(), 1);
        assert_eq!(normalized.report.summary.features.total, 1);
        let paths = normalized.defects.iter().map(|d| d.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, ["broken.feature", "garbage.feature"]);
        let err = normalized.into_report().unwrap_err();
        assert!(err.to_string().contains("2 document(s)"), "{err}");
    }

    #[test]
    fn stream_failure_aborts() {
        let failure = parser::Error::Stream { reason: "pipe closed".into() };

        let err = block_on(normalize(
            stream::iter(vec![Err(failure), Ok(outline_doc())]),
            Configuration::now(),
        ))
        .unwrap_err();

        assert!(matches!(err, Error::Parser(parser::Error::Stream { .. })));
    }

    #[test]
    fn empty_document_is_skipped() {
        let empty = GherkinDocument { uri: Some("blank.feature".into()), ..GherkinDocument::default() };

        let normalized = block_on(normalize(
            stream::iter(vec![Ok(empty), Ok(outline_doc())]),
            Configuration::now(),
        ))
        .unwrap();

        assert_eq!(normalized.report.features.len(), 1);
        assert_eq!(normalized.defects.iter().map(|d| d.path.as_str()).collect::<Vec<_>>(), ["blank.feature"]);
        assert!(normalized.defects.iter().next().unwrap().reason.contains("contains no feature"));
    }

    #[test]
    fn root_documents_have_dot_folder() {
        assert_eq!(folder_of("invoice.feature"), ".");
        assert_eq!(folder_of("billing/eu/invoice.feature"), "billing/eu");
    }
}
