// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deciding the kind of heterogeneous [`tree::Child`] nodes.

use derive_more::{Display, Error};

use crate::parser::tree;

/// Where a [`tree::Child`] being classified lives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// Directly inside a `Feature`.
    Root,

    /// Inside a `Rule`, so no further grouping is allowed.
    InsideRule,
}

/// Classified [`tree::Child`] node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Classified<'n> {
    /// `Background` fixture.
    Background(&'n tree::Background),

    /// `Scenario` without example blocks.
    Scenario(&'n tree::Scenario),

    /// `Scenario Outline` with at least one example block.
    ScenarioOutline(&'n tree::Scenario),

    /// Standalone `Examples` group.
    Example(&'n tree::Examples),

    /// `Rule` with its already classified children.
    Rule(&'n tree::Rule, Vec<Classified<'n>>),
}

/// Error of classifying a [`tree::Child`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum Error {
    /// Node carries no recognizable payload, or several of them.
    #[display("{reason}")]
    Unrecognized {
        /// Line of the node, if known.
        line: usize,

        /// What's wrong with the node.
        #[error(not(source))]
        reason: String,
    },

    /// `Rule` inside another `Rule`.
    #[display("rule nested inside another rule")]
    NestedRule {
        /// Line of the nested rule.
        line: usize,
    },
}

/// Classifies the given `child`, recursing into `Rule` children once.
///
/// # Errors
///
/// - [`Error::Unrecognized`] if the `child` carries none or several payloads;
/// - [`Error::NestedRule`] if a `Rule` is found in [`Scope::InsideRule`].
pub fn classify(child: &tree::Child, scope: Scope) -> Result<Classified<'_>, Error> {
    let tree::Child { rule, background, scenario, examples } = child;
    let line = child.location().map_or(0, |l| l.line);

    let present = [
        rule.as_ref().map(|_| "rule"),
        background.as_ref().map(|_| "background"),
        scenario.as_ref().map(|_| "scenario"),
        examples.as_ref().map(|_| "examples"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();
    if present.len() > 1 {
        return Err(Error::Unrecognized {
            line,
            reason: format!("node is several elements at once: {}", present.join(", ")),
        });
    }

    match (rule, background, scenario, examples) {
        (Some(r), ..) => match scope {
            Scope::Root => r
                .children
                .iter()
                .map(|c| classify(c, Scope::InsideRule))
                .collect::<Result<_, _>>()
                .map(|children| Classified::Rule(r, children)),
            Scope::InsideRule => Err(Error::NestedRule { line: r.location.line }),
        },
        (_, Some(b), ..) => Ok(Classified::Background(b)),
        (.., Some(s), _) if s.examples.is_empty() => Ok(Classified::Scenario(s)),
        (.., Some(s), _) => Ok(Classified::ScenarioOutline(s)),
        (.., Some(e)) => Ok(Classified::Example(e)),
        (None, None, None, None) => Err(Error::Unrecognized {
            line,
            reason: "node is none of rule, background, scenario or examples".into(),
        }),
    }
}
