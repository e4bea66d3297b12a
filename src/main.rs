// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `picklesdoc` executable.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::Path,
    time::SystemTime,
    vec,
};

use anyhow::Context as _;
use futures::{executor::block_on, stream};
use tracing_subscriber::EnvFilter;

use picklesdoc::{
    cli::{self, Command, Opts, Output, Parser as _},
    model::{Configuration, Report},
    parser::{self, Basic, GherkinDocument, Ndjson, Parser},
    writer::{out::WriteStrExt as _, Json, Sheet, Styles, Tex},
    WriterExt as _,
};

/// Parsed documents of any supported input.
type Documents = stream::Iter<vec::IntoIter<parser::Result<GherkinDocument>>>;

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_tracing(opts.verbose);
    run(opts)
}

/// Installs a [`tracing`] subscriber writing to `stderr`.
///
/// `RUST_LOG` takes precedence over the `verbose` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("picklesdoc={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(opts: Opts) -> anyhow::Result<()> {
    let styles = Styles::new();
    let mut status = io::stderr();
    let command = &opts.command;
    let paths = command.paths();

    cli::check_input(&paths.input)?;
    let output = cli::resolve_output(
        paths.out.as_deref(),
        command.extension(),
        command.prints_to_stdout(),
        SystemTime::now(),
    )?;

    status.write_line(styles.bold(format!("Generating {}...", command.artifact())))?;

    let normalized = block_on(picklesdoc::normalize(
        documents(&paths.input)?,
        Configuration::now(),
    ))?;
    let report = if opts.skip_defective {
        for d in normalized.defects.iter() {
            status.write_line(styles.err(format!("Skipped {d}")))?;
        }
        normalized.report
    } else {
        normalized.into_report()?
    };

    match command {
        Command::Json { .. } => write_json(&report, &output)?,
        Command::Tex { front, .. } => {
            let options = front.clone().into_options(opts.base_depth);
            emit(&output, &report.render(Tex::new(options))?)?;
        }
        Command::Sheet { .. } => {
            let workbook = report.render(Sheet::new(opts.sheet_options()))?;
            emit(&output, &serde_json::to_string_pretty(&workbook)?)?;
        }
    }

    if let Output::File(path) = &output {
        status.write_line(styles.ok(format!(
            "{} written to {}",
            command.artifact(),
            path.display(),
        )))?;
    }
    Ok(())
}

/// Parses the given `input` path: `.ndjson` files as message envelopes,
/// anything else as `.feature` files.
fn documents(input: &Path) -> anyhow::Result<Documents> {
    if input.is_file() && input.extension().is_some_and(|e| e == "ndjson") {
        let file = File::open(input)
            .with_context(|| format!("failed to open `{}`", input.display()))?;
        Ok(Ndjson.parse(BufReader::new(file)))
    } else {
        Ok(Basic.parse(input))
    }
}

fn write_json(report: &Report, output: &Output) -> anyhow::Result<()> {
    match output {
        Output::Stdout => report.render(Json::new(io::stdout().lock()))?,
        Output::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create `{}`", path.display()))?;
            report.render(Json::new(BufWriter::new(file)))?;
        }
    }
    Ok(())
}

/// Writes the rendered `text` into the given [`Output`].
fn emit(output: &Output, text: &str) -> anyhow::Result<()> {
    match output {
        Output::Stdout => {
            let mut out = io::stdout().lock();
            out.write_str(text)?;
            out.flush()?;
        }
        Output::File(path) => fs::write(path, text)
            .with_context(|| format!("failed to write `{}`", path.display()))?,
    }
    Ok(())
}
