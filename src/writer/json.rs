// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Normalized JSON report [`Writer`] implementation.

use std::io;

use crate::{model::Report, Result, Writer};

/// [`Writer`] outputting a pretty-printed JSON [`Report`] into an
/// [`io::Write`] implementor.
#[derive(Clone, Debug)]
pub struct Json<Out: io::Write> {
    /// [`io::Write`] implementor to output the report into.
    output: Out,
}

impl<Out: io::Write> Json<Out> {
    /// Creates a new [`Json`] [`Writer`] outputting into the given `output`.
    #[must_use]
    pub const fn new(output: Out) -> Self {
        Self { output }
    }

    /// Returns the wrapped `output`.
    #[must_use]
    pub fn into_inner(self) -> Out {
        self.output
    }
}

impl<Out: io::Write> Writer for Json<Out> {
    type Output = ();

    fn write(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.output, report)?;
        writeln!(self.output)?;
        self.output.flush()?;
        Ok(())
    }
}

/// Renders the given [`Report`] as a pretty-printed JSON string.
///
/// # Errors
///
/// If the [`Report`] can't be serialized.
pub fn to_string(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
