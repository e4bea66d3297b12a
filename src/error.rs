// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types of normalizing and rendering [Gherkin] documents.
//!
//! Three kinds of failures are distinguished:
//! - source defects: a document can't be parsed or its parse tree is
//!   malformed ([`Error::Parser`], [`Error::EmptyDocument`],
//!   [`Error::UnrecognizedElement`], [`Error::NestedRule`] and the aggregated
//!   [`Error::SourceDefects`]);
//! - structural limit violations: [`Error::DepthExceeded`],
//!   [`Error::SheetNamesExhausted`], [`Error::DuplicateDocument`] and
//!   [`Error::CellOccupied`];
//! - configuration errors: [`Error::Config`].
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use std::{fmt, io};

use derive_more::{Display, Error, From};
use itertools::Itertools as _;

use crate::parser;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error of all the `picklesdoc` operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Parse-tree source failed.
    #[display("{_0}")]
    #[from]
    Parser(parser::Error),

    /// Parse-tree source emitted a document without any feature in it.
    #[display("Document `{path}` contains no feature")]
    EmptyDocument {
        /// Path of the empty document.
        #[error(not(source))]
        path: String,
    },

    /// Child node whose kind can't be determined.
    #[display("Unrecognized element in `{path}` at line {line}: {reason}")]
    UnrecognizedElement {
        /// Path of the document containing the node.
        #[error(not(source))]
        path: String,

        /// Line of the node.
        line: usize,

        /// What's wrong with the node.
        reason: String,
    },

    /// `Rule` nested inside another `Rule`.
    #[display("Rule nested inside another rule in `{path}` at line {line}")]
    NestedRule {
        /// Path of the document containing the rule.
        #[error(not(source))]
        path: String,

        /// Line of the nested rule.
        line: usize,
    },

    /// Some documents were skipped during normalization.
    #[display("{_0}")]
    SourceDefects(#[error(not(source))] Defects),

    /// Folder hierarchy is deeper than the supported section levels.
    #[display(
        "`{path}` requires section depth {depth}, but at most {} levels are \
         supported (max folder structure depth is {})",
        crate::hierarchy::MAX_SECTION_DEPTH + 1,
        crate::hierarchy::MAX_SECTION_DEPTH,
    )]
    DepthExceeded {
        /// Relative path of the document being rendered.
        #[error(not(source))]
        path: String,

        /// Requested section depth.
        depth: usize,
    },

    /// No free numeric suffix is left for a sheet name.
    #[display(
        "Failed to find suitable sheet name for `{feature}` (too many sheets \
         named `{name}`)"
    )]
    SheetNamesExhausted {
        /// Base sheet name.
        #[error(not(source))]
        name: String,

        /// Name of the feature the sheet is created for.
        feature: String,
    },

    /// Several documents of the same report share a path, so they can't be
    /// told apart in a workbook.
    #[display("Document `{path}` occurs more than once")]
    DuplicateDocument {
        /// Relative path of the repeated document.
        #[error(not(source))]
        path: String,
    },

    /// Layout tried to write the same cell twice.
    #[display("Cell (row {row}, column {column}) of sheet `{sheet}` is already written")]
    CellOccupied {
        /// Name of the sheet.
        #[error(not(source))]
        sheet: String,

        /// 1-based row.
        row: u32,

        /// 1-based column.
        column: u32,
    },

    /// Invalid configuration, detected before any rendering.
    #[display("Invalid configuration: {reason}")]
    Config {
        /// Reason of the invalid configuration.
        #[error(not(source))]
        reason: String,
    },

    /// I/O failure.
    #[display("I/O operation failed: {_0}")]
    #[from]
    Io(io::Error),

    /// JSON serialization failure.
    #[display("JSON serialization failed: {_0}")]
    #[from]
    Json(serde_json::Error),
}

impl Error {
    /// Creates an [`Error::Config`].
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    /// Indicates whether this [`Error`] is caused by defective documents
    /// rather than by the source stream, structural limits or configuration.
    ///
    /// A single-document defect may be skipped while other documents are
    /// still normalized.
    #[must_use]
    pub fn is_source_defect(&self) -> bool {
        match self {
            Self::Parser(e) => e.is_per_document(),
            Self::EmptyDocument { .. }
            | Self::UnrecognizedElement { .. }
            | Self::NestedRule { .. }
            | Self::SourceDefects(_) => true,
            Self::DepthExceeded { .. }
            | Self::SheetNamesExhausted { .. }
            | Self::DuplicateDocument { .. }
            | Self::CellOccupied { .. }
            | Self::Config { .. }
            | Self::Io(_)
            | Self::Json(_) => false,
        }
    }
}

/// Single document skipped during normalization.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("{path}: {reason}")]
pub struct SourceDefect {
    /// Path of the skipped document.
    pub path: String,

    /// Why the document was skipped.
    pub reason: String,
}

/// All the [`SourceDefect`]s of a single run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Defects(pub Vec<SourceDefect>);

impl Defects {
    /// Returns the number of skipped documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether no document was skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the skipped documents.
    pub fn iter(&self) -> impl Iterator<Item = &SourceDefect> {
        self.0.iter()
    }
}

impl fmt::Display for Defects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} document(s) could not be normalized:\n  {}",
            self.0.len(),
            self.0.iter().join("\n  "),
        )
    }
}
