// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for rendering a normalized [`Report`] into artifacts.
//!
//! None of the [`Writer`]s touch the file system: they either write into
//! the provided [`io::Write`] implementor, or return the rendered artifact
//! for the caller to store.
//!
//! [`io::Write`]: std::io::Write

pub mod json;
pub mod out;
pub mod sheet;
pub mod tex;

use sealed::sealed;

use crate::{model::Report, Result};

#[doc(inline)]
pub use self::{json::Json, out::Styles, sheet::Sheet, tex::Tex};

/// Renderer of a normalized [`Report`].
pub trait Writer {
    /// Rendered artifact.
    type Output;

    /// Renders the given [`Report`].
    ///
    /// # Errors
    ///
    /// If the [`Report`] violates structural limits of the artifact, or the
    /// artifact can't be written.
    fn write(&mut self, report: &Report) -> Result<Self::Output>;
}

/// Extension of [`Report`] for rendering it with a [`Writer`].
#[sealed]
pub trait Ext {
    /// Renders this [`Report`] with the given [`Writer`].
    ///
    /// # Errors
    ///
    /// See [`Writer::write()`].
    fn render<W: Writer>(&self, writer: W) -> Result<W::Output>;
}

#[sealed]
impl Ext for Report {
    fn render<W: Writer>(&self, mut writer: W) -> Result<W::Output> {
        writer.write(self)
    }
}
