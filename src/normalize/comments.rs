// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reattaching free-floating comments to the nodes they annotate.

use std::collections::{BTreeMap, HashSet};

use crate::parser::tree;

/// Comments found around a single node.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attached {
    /// Comments directly above the node, top to bottom.
    pub before: Vec<String>,

    /// Comments directly below the node, top to bottom.
    pub after: Vec<String>,
}

/// Attaches the comments of a single document to its nodes by line
/// adjacency.
///
/// A comment attaches to a node only through an unbroken run of comment
/// lines between them. Every comment is attached to at most one element:
/// the element whose scan reaches it first keeps it, so elements must be
/// attached in encounter order. Steps and example blocks [`peek`] at the
/// comments instead: each comment goes to at most one of them, yet a
/// comment below the last step of an element still belongs to the element
/// right after it.
///
/// [`peek`]: CommentAttacher::peek
#[derive(Clone, Debug)]
pub struct CommentAttacher<'c> {
    /// Trimmed comment texts by their lines.
    by_line: BTreeMap<usize, &'c str>,

    /// Lines of comments attached to elements.
    claimed: HashSet<usize>,

    /// Lines of comments attached to steps and example blocks.
    peeked: HashSet<usize>,
}

impl<'c> CommentAttacher<'c> {
    /// Creates a new [`CommentAttacher`] over all the `comments` of a
    /// document.
    #[must_use]
    pub fn new(comments: &'c [tree::Comment]) -> Self {
        Self {
            by_line: comments
                .iter()
                .map(|c| (c.location.line, c.text.trim()))
                .collect(),
            claimed: HashSet::new(),
            peeked: HashSet::new(),
        }
    }

    /// Attaches the still unclaimed comments around the element at the given
    /// `line`, claiming them.
    pub fn attach(&mut self, line: usize) -> Attached {
        self.around(line, true)
    }

    /// Returns the still unclaimed comments around the step or example
    /// block at the given `line`, leaving them for the next element.
    pub fn peek(&mut self, line: usize) -> Attached {
        self.around(line, false)
    }

    fn around(&mut self, line: usize, claim: bool) -> Attached {
        let mut before = self.scan(line, claim, |l| l.checked_sub(1));
        before.reverse();
        let after = self.scan(line, claim, |l| l.checked_add(1));
        Attached { before, after }
    }

    /// Walks away from `line` with the given `step` while there is an
    /// unclaimed comment at every next line, taking each one.
    ///
    /// Element scans (`claim`) stop only at comments of other elements,
    /// peeking scans stop at any taken comment.
    fn scan(
        &mut self,
        line: usize,
        claim: bool,
        step: impl Fn(usize) -> Option<usize>,
    ) -> Vec<String> {
        let mut found = Vec::new();
        let mut current = line;
        while let Some(next) = step(current) {
            if self.claimed.contains(&next)
                || (!claim && self.peeked.contains(&next))
            {
                break;
            }
            let Some(text) = self.by_line.get(&next) else {
                break;
            };
            found.push((*text).to_owned());
            let taken = if claim { &mut self.claimed } else { &mut self.peeked };
            _ = taken.insert(next);
            current = next;
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comments(lines: &[(usize, &str)]) -> Vec<tree::Comment> {
        lines
            .iter()
            .map(|(line, text)| tree::Comment {
                location: tree::Location::line(*line),
                text: (*text).to_owned(),
            })
            .collect()
    }

    #[test]
    fn collects_contiguous_runs_in_display_order() {
        let all = comments(&[(2, "  # one"), (3, "# two"), (5, "# three"), (6, "# four")]);
        let mut attacher = CommentAttacher::new(&all);

        let got = attacher.attach(4);

        assert_eq!(got.before, ["# one", "# two"]);
        assert_eq!(got.after, ["# three", "# four"]);
    }

    #[test]
    fn stops_at_first_gap() {
        let all = comments(&[(1, "# far"), (3, "# near")]);
        let mut attacher = CommentAttacher::new(&all);

        let got = attacher.attach(4);

        assert_eq!(got.before, ["# near"]);
        assert!(got.after.is_empty());
    }

    #[test]
    fn sandwiched_comment_goes_to_first_scanner() {
        let all = comments(&[(11, "# between")]);
        let mut attacher = CommentAttacher::new(&all);

        let upper = attacher.attach(10);
        let lower = attacher.attach(12);

        assert_eq!(upper.after, ["# between"]);
        assert!(lower.before.is_empty());
    }

    #[test]
    fn peeking_leaves_comment_for_next_element() {
        let all = comments(&[(4, "# B is flaky")]);
        let mut attacher = CommentAttacher::new(&all);

        let _ = attacher.attach(2);
        let step = attacher.peek(3);
        let next = attacher.attach(5);

        assert_eq!(step.after, ["# B is flaky"]);
        assert_eq!(next.before, ["# B is flaky"]);
    }

    #[test]
    fn comment_between_steps_goes_to_upper_step() {
        let all = comments(&[(4, "# note")]);
        let mut attacher = CommentAttacher::new(&all);

        let _ = attacher.attach(2);
        let given = attacher.peek(3);
        let when = attacher.peek(5);

        assert_eq!(given.after, ["# note"]);
        assert!(when.before.is_empty());
    }

    #[test]
    fn peeking_skips_claimed_comments() {
        let all = comments(&[(3, "# under title")]);
        let mut attacher = CommentAttacher::new(&all);

        let element = attacher.attach(2);
        let step = attacher.peek(4);

        assert_eq!(element.after, ["# under title"]);
        assert!(step.before.is_empty());
    }

    #[test]
    fn does_not_underflow_at_first_line() {
        let all = comments(&[(2, "# below")]);
        let mut attacher = CommentAttacher::new(&all);

        let got = attacher.attach(1);

        assert!(got.before.is_empty());
        assert_eq!(got.after, ["# below"]);
    }

    #[test]
    fn no_comments_attach_nothing() {
        let mut attacher = CommentAttacher::new(&[]);

        assert_eq!(attacher.attach(3), Attached::default());
    }
}
