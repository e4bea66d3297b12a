// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI (command line interface) options and output path resolution.
//!
//! Paths are checked and resolved before any document is read, so a bad
//! configuration never leaves a half-written artifact behind.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::{
    writer::{sheet::SheetOptions, tex::TexOptions},
    Error, Result,
};

pub use clap::{Args, Parser, Subcommand};

/// Root CLI of the `picklesdoc` executable.
#[derive(clap::Parser, Clone, Debug)]
#[command(
    name = "picklesdoc",
    version,
    about = "Generate living documentation out of Gherkin feature files",
    long_about = None
)]
pub struct Opts {
    /// Increase logging verbosity (may be repeated).
    ///
    /// Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of leading folders to ignore when nesting sections and
    /// building the table of contents.
    #[arg(long, value_name = "N", default_value_t = 0, global = true)]
    pub base_depth: usize,

    /// Generate the artifact out of well-formed documents only, reporting
    /// the defective ones instead of failing.
    #[arg(long, global = true)]
    pub skip_defective: bool,

    /// Artifact to generate.
    #[command(subcommand)]
    pub command: Command,
}

/// Artifact to generate.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Convert the provided file or directory into a normalized JSON report.
    Json {
        /// Input and output paths.
        #[command(flatten)]
        paths: Paths,
    },

    /// Generate a LaTeX report of the feature or features.
    Tex {
        /// Input and output paths.
        #[command(flatten)]
        paths: Paths,

        /// Document front matter.
        #[command(flatten)]
        front: FrontMatter,
    },

    /// Lay the provided file or directory out onto a spreadsheet workbook,
    /// written as JSON for a spreadsheet encoder.
    Sheet {
        /// Input and output paths.
        #[command(flatten)]
        paths: Paths,

        /// Number of tester columns (for QA purposes).
        #[arg(long, value_name = "N", default_value_t = 0)]
        testers: u32,
    },
}

impl Command {
    /// Returns the input and output [`Paths`] of this [`Command`].
    #[must_use]
    pub const fn paths(&self) -> &Paths {
        match self {
            Self::Json { paths }
            | Self::Tex { paths, .. }
            | Self::Sheet { paths, .. } => paths,
        }
    }

    /// Returns the file extension of the generated artifact.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json { .. } => "json",
            Self::Tex { .. } => "tex",
            Self::Sheet { .. } => "sheet.json",
        }
    }

    /// Returns the human-readable name of the generated artifact.
    #[must_use]
    pub const fn artifact(&self) -> &'static str {
        match self {
            Self::Json { .. } => "JSON report",
            Self::Tex { .. } => "LaTeX document",
            Self::Sheet { .. } => "Workbook",
        }
    }

    /// Indicates whether the artifact goes to `stdout` when no output path is
    /// given.
    #[must_use]
    pub const fn prints_to_stdout(&self) -> bool {
        !matches!(self, Self::Sheet { .. })
    }
}

/// Input and output paths of a [`Command`].
#[derive(Args, Clone, Debug)]
pub struct Paths {
    /// Input feature file or directory.
    pub input: PathBuf,

    /// Output file or directory.
    ///
    /// JSON and LaTeX are printed to STDOUT if not specified.
    pub out: Option<PathBuf>,
}

/// Free-form front matter of a LaTeX document.
#[derive(Args, Clone, Debug, Default)]
pub struct FrontMatter {
    /// Title of the document [default: Features Overview].
    #[arg(long)]
    pub title: Option<String>,

    /// Author of the document [default: picklesdoc v<version>].
    #[arg(long)]
    pub author: Option<String>,

    /// Date of the document [default: today].
    #[arg(long)]
    pub date: Option<String>,
}

impl FrontMatter {
    /// Converts this [`FrontMatter`] into [`TexOptions`], using defaults for
    /// everything omitted.
    #[must_use]
    pub fn into_options(self, base_depth: usize) -> TexOptions {
        let defaults = TexOptions::default();
        TexOptions {
            title: self.title.unwrap_or(defaults.title),
            author: self.author.unwrap_or(defaults.author),
            date: self.date.unwrap_or(defaults.date),
            base_depth,
        }
    }
}

impl Opts {
    /// Returns the [`SheetOptions`] of these [`Opts`].
    #[must_use]
    pub const fn sheet_options(&self) -> SheetOptions {
        let testers = match self.command {
            Command::Sheet { testers, .. } => testers,
            Command::Json { .. } | Command::Tex { .. } => 0,
        };
        SheetOptions { testers, base_depth: self.base_depth }
    }
}

/// Where to put a generated artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Output {
    /// Standard output.
    Stdout,

    /// File at the given path, its parent directory already existing.
    File(PathBuf),
}

/// Checks that the `input` path exists.
///
/// # Errors
///
/// [`Error::Config`] if it doesn't.
pub fn check_input(input: &Path) -> Result<()> {
    if input.exists() {
        Ok(())
    } else {
        Err(Error::config(format!(
            "input `{}` does not exist",
            input.display(),
        )))
    }
}

/// Returns the default artifact file name for the given `time`:
/// `picklesdoc--YYYY-MM-DD--HH-mm-ss.<extension>`.
#[must_use]
pub fn default_file_name(extension: &str, time: SystemTime) -> String {
    let stamp = humantime::format_rfc3339_seconds(time).to_string();
    let (date, time) = stamp.split_at(stamp.len().min(10));
    let time = time.trim_start_matches('T').trim_end_matches('Z').replace(':', "-");
    format!("picklesdoc--{date}--{time}.{extension}")
}

/// Resolves where to put an artifact with the given `extension`, creating
/// the missing directories.
///
/// - no `out` path: [`Output::Stdout`] if `stdout` is allowed, or the
///   default file name in the working directory;
/// - existing directory: the default file name inside it;
/// - existing file: the file itself, to be overwritten;
/// - non-existing path without extension: the directory is created and the
///   default file name is put inside it;
/// - non-existing path with extension: its parent directories are created.
///
/// # Errors
///
/// [`Error::Config`] if a directory can't be created.
pub fn resolve_output(
    out: Option<&Path>,
    extension: &str,
    stdout: bool,
    time: SystemTime,
) -> Result<Output> {
    let default_name = default_file_name(extension, time);
    let Some(out) = out else {
        return Ok(if stdout {
            Output::Stdout
        } else {
            Output::File(PathBuf::from(default_name))
        });
    };

    if out.is_dir() {
        return Ok(Output::File(out.join(default_name)));
    }
    if out.exists() {
        return Ok(Output::File(out.to_path_buf()));
    }

    if out.extension().is_none() {
        create_dir(out)?;
        Ok(Output::File(out.join(default_name)))
    } else {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        Ok(Output::File(out.to_path_buf()))
    }
}

/// Creates the given `dir` with all its parents.
fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        Error::config(format!("cannot create directory `{}`: {e}", dir.display()))
    })
}
