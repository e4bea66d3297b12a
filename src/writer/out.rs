// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for writing status lines to a terminal.

use std::{borrow::Cow, io};

use console::{Style, Term};

/// [`Style`]s of status lines.
#[derive(Clone, Debug)]
pub struct Styles {
    /// [`Style`] for rendering successfully finished steps.
    pub ok: Style,

    /// [`Style`] for rendering failures.
    pub err: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether styling is applied at all.
    pub is_present: bool,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            ok: Style::new().green(),
            err: Style::new().red(),
            bold: Style::new().bold(),
            is_present: Term::stderr().features().is_attended()
                && console::colors_enabled_stderr(),
        }
    }
}

impl Styles {
    /// Creates new [`Styles`] detecting whether `stderr` is a terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates new [`Styles`] which never apply any styling.
    #[must_use]
    pub fn plain() -> Self {
        Self { is_present: false, ..Self::default() }
    }

    /// Colors `input` with [`Styles::ok`] color, if styling is present.
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.ok, input)
    }

    /// Colors `input` with [`Styles::err`] color, if styling is present.
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.err, input)
    }

    /// Makes `input` __bold__, if styling is present.
    #[must_use]
    pub fn bold<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.apply(&self.bold, input)
    }

    fn apply<'a>(
        &self,
        style: &Style,
        input: impl Into<Cow<'a, str>>,
    ) -> Cow<'a, str> {
        if self.is_present {
            style.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }
}

/// [`io::Write`] extension for easier writing of strings.
pub trait WriteStrExt: io::Write {
    /// Writes the given `string` into this writer.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_str(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_all(string.as_ref().as_bytes())
    }

    /// Writes the given `string` into this writer followed by a newline.
    ///
    /// # Errors
    ///
    /// If this writer fails to write the given `string`.
    fn write_line(&mut self, string: impl AsRef<str>) -> io::Result<()> {
        self.write_str(string.as_ref())
            .and_then(|()| self.write_str("\n"))
    }
}

impl<T: io::Write + ?Sized> WriteStrExt for T {}
