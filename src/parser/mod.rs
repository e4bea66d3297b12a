// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sources of parsed [Gherkin] documents.
//!
//! Tokenizing `.feature` files is not done by this crate: a [`Parser`] only
//! adapts some external parser into a [`Stream`] of [`GherkinDocument`]
//! events, which are then consumed by [`normalize()`].
//!
//! [`normalize()`]: crate::normalize()
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod basic;
pub mod ndjson;
pub mod tree;

use std::{io, sync::Arc};

use derive_more::{Display, Error};
use futures::Stream;

#[doc(inline)]
pub use self::{basic::Basic, ndjson::Ndjson, tree::GherkinDocument};

/// Source of parsed [`GherkinDocument`]s.
pub trait Parser<I> {
    /// Output [`Stream`] of parsed [`GherkinDocument`]s.
    ///
    /// Every item is either a single parsed document or a per-document
    /// [`Error`]. An [`Error::Stream`] item means the source itself broke and
    /// nothing after it should be consumed.
    type Output: Stream<Item = Result<GherkinDocument>> + 'static;

    /// Parses the given `input` into a [`Stream`] of [`GherkinDocument`]s.
    fn parse(self, input: I) -> Self::Output;
}

/// Result of parsing [Gherkin] documents.
///
/// [Gherkin]: https://cucumber.io/docs/gherkin/reference
pub type Result<T> = std::result::Result<T, Error>;

/// [`Parser`] error.
#[derive(Clone, Debug, Display, Error)]
pub enum Error {
    /// Failed to read a document.
    #[display("Failed to read `{path}`: {source}")]
    Reading {
        /// Path of the document.
        path: String,

        /// Underlying I/O error.
        source: Arc<io::Error>,
    },

    /// Failed to parse a document.
    #[display("Failed to parse `{path}`: {reason}")]
    Parsing {
        /// Path of the document.
        #[error(not(source))]
        path: String,

        /// Parser diagnostic, including the offending line.
        reason: String,
    },

    /// The source itself failed, so no further documents will follow.
    #[display("Parse-tree source failed: {reason}")]
    Stream {
        /// Reason of the failure.
        #[error(not(source))]
        reason: String,
    },
}

impl Error {
    /// Indicates whether this [`Error`] concerns a single document only.
    #[must_use]
    pub const fn is_per_document(&self) -> bool {
        matches!(self, Self::Reading { .. } | Self::Parsing { .. })
    }

    /// Returns path of the document this [`Error`] concerns, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Reading { path, .. } | Self::Parsing { path, .. } => {
                Some(path)
            }
            Self::Stream { .. } => None,
        }
    }
}
