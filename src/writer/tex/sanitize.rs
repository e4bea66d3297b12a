// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Escaping of LaTeX special characters.

use lazy_regex::regex;

/// Color of a highlighted `<placeholder>`.
pub const PLACEHOLDER_COLOR: &str = "VioletRed";

/// Returns the LaTeX replacement of a special `c`haracter.
const fn escape(c: char) -> Option<&'static str> {
    Some(match c {
        '\\' => r"\textbackslash{}",
        '{' => r"\{",
        '}' => r"\}",
        '$' => r"\$",
        '&' => r"\&",
        '#' => r"\#",
        '^' => r"\textasciicircum{}",
        '_' => r"\_",
        '~' => r"\textasciitilde{}",
        '%' => r"\%",
        '<' => r"\textless{}",
        '>' => r"\textgreater{}",
        '|' => r"\textbar{}",
        '"' => r"\textquotedbl{}",
        '\'' => r"\textquotesingle{}",
        '`' => r"\textasciigrave{}",
        _ => return None,
    })
}

/// Escapes all the LaTeX special characters of the given `input`, and then
/// highlights the first `<placeholder>` in it.
///
/// Must be applied exactly once: the escaped output is not a fixed point,
/// so sanitizing it again escapes the produced backslashes as well.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match escape(c) {
            Some(replacement) => escaped.push_str(replacement),
            None => escaped.push(c),
        }
    }

    regex!(r"\\textless\{\}(.*?)\\textgreater\{\}")
        .replace(&escaped, |caps: &regex::Captures<'_>| {
            format!(
                r"\textcolor{{{PLACEHOLDER_COLOR}}}{{\textless{{}}{}\textgreater{{}}}}",
                &caps[1],
            )
        })
        .into_owned()
}
