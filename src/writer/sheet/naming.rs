// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Unique sheet names.

use std::{collections::HashMap, ops::RangeInclusive};

use crate::{Error, Result};

/// Maximum length of a base sheet name, leaving room for a two-digit
/// suffix within the 31 characters spreadsheets allow.
pub const MAX_BASE_LEN: usize = 29;

/// Numeric suffixes tried on collisions.
pub const SUFFIXES: RangeInclusive<u32> = 2..=99;

/// Name of the table of contents sheet, never given to a document.
pub const TOC: &str = "TOC";

/// Name used when nothing is left of a document name.
pub const FALLBACK: &str = "SHEET";

/// Derives a base sheet name out of a display `name`.
///
/// Whitespace is stripped, characters spreadsheets forbid in sheet names
/// are replaced with `_`, and the result is uppercased and truncated.
#[must_use]
pub fn base_name(name: &str) -> String {
    let base = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '\\' | '/' | '*' | '[' | ']' | ':' | '?' => '_',
            c => c,
        })
        .collect::<String>()
        .to_uppercase()
        .chars()
        .take(MAX_BASE_LEN)
        .collect::<String>();
    if base.is_empty() {
        FALLBACK.to_owned()
    } else {
        base
    }
}

/// Registry of already given sheet names and their owners.
#[derive(Clone, Debug)]
pub struct SheetNames {
    /// Owners by given names. [`None`] marks a reserved name.
    owners: HashMap<String, Option<String>>,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self { owners: HashMap::from([(TOC.to_owned(), None)]) }
    }
}

impl SheetNames {
    /// Creates a new [`SheetNames`] registry with only the [`TOC`] name
    /// taken.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives a sheet name to the document with the given display `name`
    /// and `owner` path.
    ///
    /// Asking again for the same `owner` returns the same name.
    ///
    /// # Errors
    ///
    /// [`Error::SheetNamesExhausted`] if every suffix in [`SUFFIXES`] is
    /// already taken by other owners.
    pub fn assign(&mut self, name: &str, owner: &str) -> Result<String> {
        let base = base_name(name);
        let candidates = std::iter::once(base.clone())
            .chain(SUFFIXES.map(|i| format!("{base}{i}")));

        for candidate in candidates {
            match self.owners.get(&candidate) {
                None => {
                    _ = self
                        .owners
                        .insert(candidate.clone(), Some(owner.to_owned()));
                    return Ok(candidate);
                }
                Some(Some(o)) if o == owner => return Ok(candidate),
                Some(_) => {}
            }
        }

        Err(Error::SheetNamesExhausted { name: base, feature: name.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_names() {
        assert_eq!(base_name("Refund policy"), "REFUNDPOLICY");
        assert_eq!(base_name("a/b\\c*d[e]f:g?h"), "A_B_C_D_E_F_G_H");
        assert_eq!(base_name("   "), "SHEET");
        assert_eq!(base_name(&"x".repeat(40)).len(), MAX_BASE_LEN);
    }

    #[test]
    fn suffixes_collisions_of_other_owners() {
        let mut names = SheetNames::new();

        let first = names.assign("Name", "a/name.feature").unwrap();
        let second = names.assign("name", "b/name.feature").unwrap();
        let third = names.assign("NAME", "c/name.feature").unwrap();

        assert_eq!([first, second, third], ["NAME", "NAME2", "NAME3"]);
    }

    #[test]
    fn same_owner_reuses_name() {
        let mut names = SheetNames::new();
        let _ = names.assign("Name", "a/name.feature").unwrap();
        let second = names.assign("Name", "b/name.feature").unwrap();

        assert_eq!(names.assign("Name", "a/name.feature").unwrap(), "NAME");
        assert_eq!(names.assign("Name", "b/name.feature").unwrap(), second);
    }

    #[test]
    fn toc_is_reserved() {
        let mut names = SheetNames::new();

        assert_eq!(names.assign("toc", "toc.feature").unwrap(), "TOC2");
    }

    #[test]
    fn exhausting_suffixes_fails() {
        let mut names = SheetNames::new();
        for i in 0..99 {
            let _ = names.assign("Dup", &format!("{i}.feature")).unwrap();
        }

        let err = names.assign("Dup", "last.feature").unwrap_err();

        assert!(
            matches!(&err, Error::SheetNamesExhausted { name, .. } if name == "DUP"),
            "{err}",
        );
    }
}
