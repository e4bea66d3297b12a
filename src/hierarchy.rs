// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Folder hierarchy of normalized documents.
//!
//! Both the table of contents of a [`Workbook`] and the section nesting of a
//! LaTeX document are derived from the folders the documents live in.
//!
//! [`Workbook`]: crate::writer::sheet::Workbook

use std::collections::HashSet;

use derive_more::Display;
use linked_hash_map::LinkedHashMap;

use crate::{model::Feature, Error, Result};

/// Maximum folder nesting a document may have to be rendered as a section.
///
/// Folders occupy depths `0..=MAX_SECTION_DEPTH`, and so do documents.
pub const MAX_SECTION_DEPTH: usize = 3;

/// Splits the folder part of a slash-separated `relative_path` into
/// segments, dropping the first `base_depth` of them.
///
/// ```text
/// "a/b/c/feature.ext", 0 => ["a", "b", "c"]
/// "a/b/c/feature.ext", 1 => ["b", "c"]
/// ```
#[must_use]
pub fn segments(relative_path: &str, base_depth: usize) -> Vec<String> {
    let folder = relative_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    folder
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .skip(base_depth)
        .map(ToOwned::to_owned)
        .collect()
}

/// Node of a folder tree with the documents placed into it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HierarchyNode<'f> {
    /// Folder name of this node, empty for the root.
    pub segment: String,

    /// Documents directly in this folder, in insertion order.
    pub documents: Vec<&'f Feature>,

    /// Sub-folders, in insertion order.
    pub children: LinkedHashMap<String, HierarchyNode<'f>>,
}

impl<'f> HierarchyNode<'f> {
    /// Creates an empty [`HierarchyNode`] of the given folder `segment`.
    #[must_use]
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            documents: Vec::new(),
            children: LinkedHashMap::new(),
        }
    }

    /// Builds the whole tree out of the given `features`.
    #[must_use]
    pub fn build<I>(features: I, base_depth: usize) -> Self
    where
        I: IntoIterator<Item = &'f Feature>,
    {
        let mut root = Self::default();
        for f in features {
            root.insert(&segments(&f.relative_folder, base_depth), f);
        }
        root
    }

    /// Places the `document` at the given `path` of segments, creating the
    /// missing intermediate nodes.
    pub fn insert(&mut self, path: &[String], document: &'f Feature) {
        match path.split_first() {
            None => self.documents.push(document),
            Some((head, rest)) => self
                .children
                .entry(head.clone())
                .or_insert_with(|| Self::new(head.clone()))
                .insert(rest, document),
        }
    }

    /// Looks up the node at the given `path` of segments.
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&Self> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get(*head)?.get(rest),
        }
    }

    /// Returns the top-level folder nodes of a table of contents.
    ///
    /// If the whole input is a single folder without any documents directly
    /// in it, that folder is skipped and its sub-folders are returned
    /// instead.
    pub fn toc_roots(&self) -> Vec<&Self> {
        let mut top = self.children.values();
        match (top.next(), top.next()) {
            (Some(only), None)
                if self.documents.is_empty() && only.documents.is_empty() =>
            {
                only.children.values().collect()
            }
            _ => self.children.values().collect(),
        }
    }

    /// Returns the number of documents in this node and all its descendants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
            + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Indicates whether there are no documents in this subtree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Level of a document section.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SectionLevel {
    /// Top-level heading.
    #[display("section")]
    Section,

    /// Second-level heading.
    #[display("subsection")]
    Subsection,

    /// Third-level heading.
    #[display("subsubsection")]
    Subsubsection,

    /// Fourth-level heading.
    #[display("paragraph")]
    Paragraph,
}

impl SectionLevel {
    /// Resolves the [`SectionLevel`] of the given `depth`.
    ///
    /// # Errors
    ///
    /// [`Error::DepthExceeded`] if the `depth` is larger than
    /// [`MAX_SECTION_DEPTH`].
    pub fn at(depth: usize, path: &str) -> Result<Self> {
        match depth {
            0 => Ok(Self::Section),
            1 => Ok(Self::Subsection),
            2 => Ok(Self::Subsubsection),
            3 => Ok(Self::Paragraph),
            _ => Err(Error::DepthExceeded { path: path.to_owned(), depth }),
        }
    }
}

/// Tracker of already emitted folder headings.
///
/// Keyed by the full segment path, so equally named folders in different
/// parents are distinct.
#[derive(Clone, Debug, Default)]
pub struct Sections {
    /// Slash-joined paths of already opened folders.
    seen: HashSet<String>,
}

impl Sections {
    /// Creates a new empty [`Sections`] tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the folders of the given `segments`, returning depths and names
    /// of the ones not seen before, outermost first.
    pub fn open<'s>(&mut self, segments: &'s [String]) -> Vec<(usize, &'s str)> {
        let mut opened = Vec::new();
        let mut key = String::new();
        for (depth, segment) in segments.iter().enumerate() {
            if depth > 0 {
                key.push('/');
            }
            key.push_str(segment);
            if self.seen.insert(key.clone()) {
                opened.push((depth, segment.as_str()));
            }
        }
        opened
    }
}
