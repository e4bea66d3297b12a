// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Living documentation out of [Gherkin] feature files.
//!
//! The pipeline has three stages:
//! 1. A [`Parser`] turns an input path into a [`Stream`] of parsed documents.
//! 2. [`normalize()`] attaches comments, classifies elements and builds a
//!    single [`Report`] with its [`Summary`].
//! 3. A [`Writer`] renders the [`Report`]: as pretty [JSON], as a
//!    standalone [LaTeX] document, or as a spreadsheet [`Workbook`] laid out
//!    cell by cell.
//!
//! ```rust,ignore
//! use picklesdoc::{model::Configuration, parser::Basic, writer, Parser as _, WriterExt as _};
//!
//! let report = futures::executor::block_on(
//!     picklesdoc::normalize(Basic.parse("features"), Configuration::now()),
//! )?
//! .into_report()?;
//! let latex = report.render(writer::Tex::default())?;
//! ```
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference
//! [JSON]: https://www.json.org
//! [LaTeX]: https://www.latex-project.org
//! [`Report`]: model::Report
//! [`Stream`]: futures::Stream
//! [`Summary`]: model::Summary
//! [`Workbook`]: writer::sheet::Workbook

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    missing_debug_implementations,
    missing_docs,
    unused_results
)]

pub mod cli;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod writer;

pub use gherkin;

#[doc(inline)]
pub use self::{
    error::{Error, Result},
    normalize::{normalize, Normalized},
    parser::Parser,
    writer::{Ext as WriterExt, Writer},
};
