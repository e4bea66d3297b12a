// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Parser`] of [Cucumber messages] `ndjson` streams.
//!
//! Allows to feed documents parsed by the official `gherkin` tool, e.g.:
//! ```bash
//! gherkin --no-source --no-pickles features/**/*.feature > docs.ndjson
//! ```
//!
//! [Cucumber messages]: https://github.com/cucumber/messages

use std::{io::BufRead, vec};

use futures::stream;
use serde::{Deserialize, Deserializer};

use super::{tree::Location, Error, GherkinDocument, Parser, Result};

/// [`Parser`] reading newline-delimited message envelopes.
///
/// `gherkinDocument` envelopes become documents and `parseError` envelopes
/// become [`Error::Parsing`] of the document they name, all the others are
/// skipped. Reading stops at the first line which can't be read, isn't a
/// valid JSON or carries a `null` document, emitting an [`Error::Stream`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Ndjson;

/// Single message envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    /// Parsed document, if this envelope carries one.
    ///
    /// `Some(None)` is an explicit `null` document, which breaks the stream.
    #[serde(default, deserialize_with = "nullable")]
    gherkin_document: Option<Option<GherkinDocument>>,

    /// Failure of parsing a document, if this envelope carries one.
    #[serde(default)]
    parse_error: Option<ParseError>,
}

/// Document the official tool failed to parse.
#[derive(Debug, Deserialize)]
struct ParseError {
    /// Where the failure happened.
    #[serde(default)]
    source: SourceReference,

    /// Why the document couldn't be parsed.
    #[serde(default)]
    message: String,
}

/// Position of a [`ParseError`].
#[derive(Debug, Default, Deserialize)]
struct SourceReference {
    /// Path of the failed document.
    #[serde(default)]
    uri: Option<String>,

    /// Position inside the document.
    #[serde(default)]
    location: Option<Location>,
}

/// Tells a present `null` apart from a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ParseError {
    /// Converts this [`ParseError`] into an [`Error::Parsing`], prefixing the
    /// message with the line unless it already names one.
    fn into_error(self) -> Error {
        let SourceReference { uri, location } = self.source;
        let reason = match location {
            Some(l) if !self.message.contains(&format!("({}:", l.line)) => {
                format!("line {}: {}", l.line, self.message)
            }
            _ => self.message,
        };
        Error::Parsing { path: uri.unwrap_or_default(), reason }
    }
}

impl<R: BufRead> Parser<R> for Ndjson {
    type Output = stream::Iter<vec::IntoIter<Result<GherkinDocument>>>;

    fn parse(self, input: R) -> Self::Output {
        let mut documents = Vec::new();

        for (idx, line) in input.lines().enumerate() {
            let envelope = line
                .map_err(|e| e.to_string())
                .and_then(|l| {
                    if l.trim().is_empty() {
                        Ok(None)
                    } else {
                        serde_json::from_str::<Envelope>(&l)
                            .map(Some)
                            .map_err(|e| e.to_string())
                    }
                });
            match envelope {
                Ok(Some(Envelope { gherkin_document: Some(Some(doc)), .. })) => {
                    documents.push(Ok(doc));
                }
                Ok(Some(Envelope { gherkin_document: Some(None), .. })) => {
                    documents.push(Err(Error::Stream {
                        reason: format!("null document at line {}", idx + 1),
                    }));
                    break;
                }
                Ok(Some(Envelope { parse_error: Some(e), .. })) => {
                    documents.push(Err(e.into_error()));
                }
                Ok(_) => {}
                Err(reason) => {
                    documents.push(Err(Error::Stream {
                        reason: format!("envelope at line {}: {reason}", idx + 1),
                    }));
                    break;
                }
            }
        }

        stream::iter(documents)
    }
}
