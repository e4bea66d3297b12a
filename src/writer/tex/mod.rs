// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! LaTeX document [`Writer`] implementation.
//!
//! Folders become nested sections (`\section`, `\subsection`,
//! `\subsubsection` and `\paragraph`), each document becomes a section one
//! level below its folder, and each element of a document becomes a
//! `tcolorbox` block.

pub mod sanitize;

use std::time::SystemTime;

use itertools::Itertools as _;
use smart_default::SmartDefault;

use crate::{
    hierarchy::{self, SectionLevel, Sections},
    model::{Example, Feature, FeatureElement, KeywordType, Report, Step, PROGRAM},
    Result, Writer,
};

#[doc(inline)]
pub use self::sanitize::sanitize;

/// Free-form strings of a LaTeX document front matter, and the folder base
/// depth.
#[derive(Clone, Debug, SmartDefault)]
pub struct TexOptions {
    /// Title of the document.
    #[default("Features Overview")]
    pub title: String,

    /// Author of the document.
    #[default(default_author())]
    pub author: String,

    /// Generation date of the document.
    #[default(today())]
    pub date: String,

    /// Number of leading folders to ignore when nesting sections.
    pub base_depth: usize,
}

/// Default author of a document: the program and its version.
#[must_use]
pub fn default_author() -> String {
    format!("{PROGRAM} v{}", env!("CARGO_PKG_VERSION"))
}

/// Today's date in `YYYY-MM-DD` format.
#[must_use]
pub fn today() -> String {
    let mut date = humantime::format_rfc3339_seconds(SystemTime::now()).to_string();
    date.truncate("YYYY-MM-DD".len());
    date
}

/// [`Writer`] rendering a [`Report`] as a standalone LaTeX document.
#[derive(Clone, Debug, Default)]
pub struct Tex {
    /// Front matter and nesting options.
    options: TexOptions,
}

impl Tex {
    /// Creates a new [`Tex`] [`Writer`] with the given [`TexOptions`].
    #[must_use]
    pub const fn new(options: TexOptions) -> Self {
        Self { options }
    }
}

impl Writer for Tex {
    type Output = String;

    fn write(&mut self, report: &Report) -> Result<String> {
        let body = body(&report.features, self.options.base_depth)?;
        tracing::debug!(
            features = report.features.len(),
            bytes = body.len(),
            "rendered LaTeX body",
        );
        Ok(document(&self.options, &body))
    }
}

/// Wraps the given `body` into a complete LaTeX document.
#[must_use]
pub fn document(options: &TexOptions, body: &str) -> String {
    let TexOptions { title, author, date, .. } = options;
    format!(
        r"\documentclass[11pt]{{article}}
\usepackage[T1]{{fontenc}}
\usepackage[dvipsnames,table]{{xcolor}}
\usepackage{{tcolorbox}}
\usepackage{{systeme}}
\usepackage{{times}}
\usepackage{{fancyhdr}}
\usepackage{{graphicx}}
\usepackage{{textcomp}}
\usepackage{{tabularx}}
\usepackage{{tocloft}}
\usepackage[hidelinks]{{hyperref}}

\usepackage[
    margin=0.7in,
    includefoot,
    footskip=30pt,
]{{geometry}}
\usepackage{{layout}}

\setcounter{{tocdepth}}{{2}}
\setlength{{\parindent}}{{0pt}}

\renewcommand{{\familydefault}}{{\sfdefault}}
\addtolength{{\cftsubsecnumwidth}}{{1em}}

\title{{{title}}}
\author{{{author}}}
\date{{{date}}}

\begin{{document}}
\maketitle
\tableofcontents

{body}

\end{{document}}
",
    )
}

/// Renders all the `features` as nested sections.
///
/// Every folder heading is emitted once, right before the first document
/// inside it.
///
/// # Errors
///
/// [`Error::DepthExceeded`] if any document is nested deeper than
/// [`hierarchy::MAX_SECTION_DEPTH`] folders.
///
/// [`Error::DepthExceeded`]: crate::Error::DepthExceeded
pub fn body(features: &[Feature], base_depth: usize) -> Result<String> {
    let mut sections = Sections::new();
    let mut out = Vec::with_capacity(features.len());

    for f in features {
        let segments = hierarchy::segments(&f.relative_folder, base_depth);
        let level = SectionLevel::at(segments.len(), &f.relative_folder)?;

        for (depth, folder) in sections.open(&segments) {
            let folder_level = SectionLevel::at(depth, &f.relative_folder)?;
            out.push(format!(r"\{folder_level}{{{}}}", sanitize(folder)));
        }
        out.push(feature(f, level));
    }

    Ok(out.join("\n"))
}

/// Renders a single document as a section of the given `level`.
fn feature(f: &Feature, level: SectionLevel) -> String {
    let sub = &f.feature;
    let tags = tags(&sub.tags);
    let par = if tags.is_empty() { "" } else { r"\par" };
    format!(
        "\\{level}{{{name}}}\n    {tags} {par}\n    {description}\n    {elements}\n",
        name = sanitize(&sub.name),
        description = description(&sub.description),
        elements = sub.feature_elements.iter().map(element).join("\n"),
    )
}

/// Renders a single element as a `tcolorbox` block, with the elements of a
/// `Rule` nested into it.
fn element(el: &FeatureElement) -> String {
    let steps = steps(el.steps());
    let steps = if steps.is_empty() { steps } else { format!(r"{steps} \par") };
    let nested = el.children().iter().map(element).join("\n");
    format!(
        "\\begin{{tcolorbox}}\n  {before}\n  {description}\n  {tags} \\par\n  \
         \\textbf{{{label}}}: {name} \\par\n  {steps}\n  {examples}\n  \
         {nested}{after}\n\\end{{tcolorbox}}\n",
        before = comments(&el.before_comments),
        description = description(&el.description),
        tags = tags(&el.tags),
        label = el.label(),
        name = sanitize(&el.name),
        examples = el.examples().iter().map(examples).join("\\par\n"),
        after = comments(&el.after_comments),
    )
}

/// Renders an example block as a shaded-header `tabularx` table.
fn examples(ex: &Example) -> String {
    let header = ex
        .header
        .iter()
        .map(|h| format!(r"\cellcolor{{blue!25}}\textbf{{{}}}", sanitize(h)))
        .join(" & ");
    let rows = ex
        .data
        .iter()
        .map(|row| format!(r"    {}\\ \hline", row.iter().map(|c| sanitize(c)).join(" & ")))
        .join("\n");
    format!(
        "\\textbf{{Examples}}:\\par\n  {before}\n  \\begin{{center}}\n    \
         \\begin{{tabularx}}{{\\textwidth}}{{ {columns}| }}\n    \\hline\n    \
         {header} \\\\\n    \\hline\n{rows}\n    \\end{{tabularx}}\n  \
         \\end{{center}}\n  {after}",
        before = comments(&ex.before_comments),
        columns = "| X ".repeat(ex.header.len()),
        after = comments(&ex.after_comments),
    )
}

/// Renders a description, turning blank lines into paragraph breaks.
fn description(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!(r"{} \par", sanitize(text.trim()).replace("\n\n", r"\par"))
}

/// Renders comments as gray italic lines.
fn comments(comments: &[String]) -> String {
    if comments.is_empty() {
        return String::new();
    }
    let lines = comments
        .iter()
        .map(|c| format!(r"\textcolor{{gray}}{{\emph{{{}}}}}", sanitize(c)))
        .join("\\par \n");
    format!(r"{lines} \par")
}

/// Renders tags as gray bold words.
fn tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!(r"\textcolor{{gray}}{{\textbf{{{}}}}}", sanitize(t)))
        .join(" ")
}

/// Renders steps as an `itemize` list with colored keywords.
fn steps(steps: &[Step]) -> String {
    if steps.is_empty() {
        return String::new();
    }
    let mut color = NEUTRAL_COLOR;
    let items = steps
        .iter()
        .map(|s| {
            color = keyword_color(s.keyword_type).unwrap_or(color);
            format!(
                r"    \item \textcolor{{{color}}}{{\textbf{{{}}}}} {}",
                sanitize(&s.keyword),
                sanitize(&s.text),
            )
        })
        .join("\n");
    format!("\\begin{{itemize}}\n    \\setlength\\itemsep{{-1mm}}\n{items}\n  \\end{{itemize}}")
}

/// Color of keywords which are neither primary nor continue a primary one.
const NEUTRAL_COLOR: &str = "black";

/// Returns the color of a primary keyword, or [`None`] for a conjunction,
/// which continues the color of the previous step.
const fn keyword_color(ty: KeywordType) -> Option<&'static str> {
    match ty {
        KeywordType::Context => Some("MidnightBlue"),
        KeywordType::Action => Some("LimeGreen"),
        KeywordType::Outcome => Some("Dandelion"),
        KeywordType::Unknown => Some(NEUTRAL_COLOR),
        KeywordType::Conjunction => None,
    }
}
