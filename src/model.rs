// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Canonical document model, produced by [`normalize()`] and consumed by all
//! the [`writer`]s.
//!
//! Serializes into the normalized JSON report.
//!
//! [`normalize()`]: crate::normalize()
//! [`writer`]: crate::writer

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

pub use crate::parser::tree::KeywordType;

/// Name of the program, reported in the [`Configuration`].
pub const PROGRAM: &str = "picklesdoc";

/// Normalized report over all the parsed documents.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Normalized documents, in the order they were parsed.
    pub features: Vec<Feature>,

    /// Aggregate counters.
    pub summary: Summary,

    /// How this [`Report`] was generated.
    pub configuration: Configuration,
}

/// Run result of a document or an element.
///
/// No execution backend exists, so it's always all `false`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Whether it was executed.
    pub was_executed: bool,

    /// Whether the execution succeeded.
    pub was_successful: bool,

    /// Whether any result was provided.
    pub was_provided: bool,
}

/// Single normalized `.feature` document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Slash-separated path of the document relative to the scan root.
    pub relative_folder: String,

    /// Contents of the document.
    pub feature: SubFeature,

    /// Run result of the document.
    pub result: RunResult,
}

impl Feature {
    /// Returns the name of this [`Feature`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.feature.name
    }
}

/// Root grouping of a document's elements.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubFeature {
    /// Name of the feature.
    pub name: String,

    /// Description of the feature.
    pub description: String,

    /// Top-level elements, in source order.
    pub feature_elements: Vec<FeatureElement>,

    /// Tags of the feature.
    pub tags: Vec<String>,

    /// Run result of the feature.
    pub result: RunResult,
}

/// Background, scenario, scenario outline, examples group or rule of a
/// document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureElement {
    /// Name of the element.
    pub name: String,

    /// Description of the element.
    pub description: String,

    /// Tags of the element.
    pub tags: Vec<String>,

    /// Source line of the element.
    #[serde(skip)]
    pub line: usize,

    /// Comments directly above the element.
    pub before_comments: Vec<String>,

    /// Comments directly below the element's heading line.
    pub after_comments: Vec<String>,

    /// Run result of the element.
    pub result: RunResult,

    /// Kind of the element with its kind-specific contents.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl FeatureElement {
    /// Returns the heading label of this [`FeatureElement`]'s kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// Returns steps of this [`FeatureElement`], if it has any.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        match &self.kind {
            ElementKind::Background { steps }
            | ElementKind::Scenario { steps }
            | ElementKind::ScenarioOutline { steps, .. } => steps,
            ElementKind::Example { .. } | ElementKind::Rule { .. } => &[],
        }
    }

    /// Returns example blocks of this [`FeatureElement`], if it has any.
    #[must_use]
    pub fn examples(&self) -> &[Example] {
        match &self.kind {
            ElementKind::ScenarioOutline { examples, .. } => examples,
            ElementKind::Example { example } => std::slice::from_ref(example),
            ElementKind::Background { .. }
            | ElementKind::Scenario { .. }
            | ElementKind::Rule { .. } => &[],
        }
    }

    /// Returns elements nested into this [`FeatureElement`], if it's a rule.
    #[must_use]
    pub fn children(&self) -> &[FeatureElement] {
        match &self.kind {
            ElementKind::Rule { feature_elements } => feature_elements,
            ElementKind::Background { .. }
            | ElementKind::Scenario { .. }
            | ElementKind::ScenarioOutline { .. }
            | ElementKind::Example { .. } => &[],
        }
    }

    /// Indicates whether this [`FeatureElement`] is something a tester runs
    /// through.
    #[must_use]
    pub const fn is_scenario_shaped(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Scenario { .. }
                | ElementKind::ScenarioOutline { .. }
                | ElementKind::Example { .. },
        )
    }

    /// Returns the number of elements this [`FeatureElement`] accounts for,
    /// itself included.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Self::count).sum::<usize>()
    }
}

/// Kind of a [`FeatureElement`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "elementType", rename_all = "camelCase")]
pub enum ElementKind {
    /// `Background` fixture.
    Background {
        /// Steps of the background.
        steps: Vec<Step>,
    },

    /// Plain `Scenario`.
    Scenario {
        /// Steps of the scenario.
        steps: Vec<Step>,
    },

    /// `Scenario Outline` with at least one example block.
    ScenarioOutline {
        /// Templated steps of the outline.
        steps: Vec<Step>,

        /// Example blocks, never empty.
        examples: Vec<Example>,
    },

    /// Standalone `Examples` group.
    Example {
        /// The rows of the group.
        example: Example,
    },

    /// `Rule` grouping other elements one level deep.
    Rule {
        /// Nested elements, in source order.
        #[serde(rename = "featureElements")]
        feature_elements: Vec<FeatureElement>,
    },
}

impl ElementKind {
    /// Returns the heading label of this [`ElementKind`].
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Background { .. } => "Background",
            Self::Scenario { .. } => "Scenario",
            Self::ScenarioOutline { .. } => "Scenario Outline",
            Self::Example { .. } => "Examples",
            Self::Rule { .. } => "Rule",
        }
    }
}

/// Step of a scenario or background.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Keyword without surrounding whitespace.
    pub keyword: String,

    /// Keyword, as written.
    pub raw_keyword: String,

    /// Language-independent kind of the keyword.
    pub keyword_type: KeywordType,

    /// Text following the keyword.
    pub text: String,

    /// Comments directly above the step.
    pub before_comments: Vec<String>,

    /// Comments directly below the step.
    pub after_comments: Vec<String>,

    /// Attached doc string, empty if none.
    pub doc_string: String,

    /// Attached data table (header row included), empty if none.
    pub data_table: Vec<Vec<String>>,
}

/// Example block of a scenario outline.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    /// Header row.
    pub header: Vec<String>,

    /// Data rows.
    pub data: Vec<Vec<String>>,

    /// Comments directly above the block.
    pub before_comments: Vec<String>,

    /// Comments directly below the block's keyword line.
    pub after_comments: Vec<String>,
}

/// Aggregate counters of a [`Report`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Distinct tags, in encounter order.
    pub tags: Vec<String>,

    /// Distinct folders containing documents, in encounter order.
    pub folders: Vec<String>,

    /// Folders nothing was executed in.
    pub not_tested_folders: Vec<String>,

    /// Counters of elements.
    pub scenarios: Counters,

    /// Counters of documents.
    pub features: Counters,
}

impl Summary {
    /// Records the given `tags`, ignoring already seen ones.
    pub fn record_tags<'t>(&mut self, tags: impl IntoIterator<Item = &'t String>) {
        for tag in tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
    }

    /// Records the given `folder` as containing a document.
    ///
    /// Nothing is ever executed, so it's recorded as not tested as well.
    pub fn record_folder(&mut self, folder: &str) {
        if !self.folders.iter().any(|f| f == folder) {
            self.folders.push(folder.to_owned());
            self.not_tested_folders.push(folder.to_owned());
        }
    }
}

/// Monotonic counters of some entities.
///
/// Without execution data every entity is inconclusive, so `total` always
/// equals `inconclusive`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Counters {
    /// Number of all the entities.
    pub total: usize,

    /// Number of passed entities.
    pub passing: usize,

    /// Number of failed entities.
    pub failing: usize,

    /// Number of entities without a definite result.
    pub inconclusive: usize,
}

impl Counters {
    /// Records a single entity without a definite result.
    pub fn record_inconclusive(&mut self) {
        self.total += 1;
        self.inconclusive += 1;
    }
}

/// How a [`Report`] was generated.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Version of the program.
    pub version: String,

    /// Name of the program.
    pub program: String,

    /// Generation time in RFC 3339 format.
    pub generated_on: String,

    /// Generation time in milliseconds since the Unix epoch.
    pub generated_on_timestamp: u64,
}

impl Configuration {
    /// Creates a [`Configuration`] of a report generated at the given `time`.
    #[must_use]
    pub fn at(time: SystemTime) -> Self {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            program: PROGRAM.to_owned(),
            generated_on: humantime::format_rfc3339_seconds(time).to_string(),
            generated_on_timestamp: millis,
        }
    }

    /// Creates a [`Configuration`] of a report generated right now.
    #[must_use]
    pub fn now() -> Self {
        Self::at(SystemTime::now())
    }
}
