// SPDX-License-Identifier: MIT
//
// Document metadata and the page tree.
//
// Today only the title line is extracted. The `PageNode` tree is where
// section / subsection / paragraph structure will live once body text is
// laid out; for now its root only holds the staged `.TH` arguments.

use std::fmt;

// ─── Page Tree ───────────────────────────────────────────────────────────────

/// Nesting level of a [`PageNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLevel {
    Section,
    Subsection,
    Paragraph,
}

/// A node in the page tree: owned text plus ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    pub level: NodeLevel,
    pub text: String,
    pub children: Vec<PageNode>,
}

impl PageNode {
    /// A childless node.
    #[must_use]
    pub fn new(level: NodeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Append a child, returning a reference to it.
    pub fn push(&mut self, child: Self) -> &mut Self {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// Metadata extracted from a man page.
///
/// `title` and `section` are each set at most once. A document that never
/// gets a title is not valid; the scanner refuses to return one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    title: Option<String>,
    section: Option<String>,
    version: Option<String>,
    /// Staging slot for the raw `.TH` arguments.
    pub root: Option<PageNode>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Third `.TH` field. Not extracted yet.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Record the title. Returns `false` (and keeps the old one) if a
    /// title was already set.
    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        set_once(&mut self.title, title.into())
    }

    /// Record the section. Returns `false` if one was already set.
    pub fn set_section(&mut self, section: impl Into<String>) -> bool {
        set_once(&mut self.section, section.into())
    }

    /// Record the version. Returns `false` if one was already set.
    pub fn set_version(&mut self, version: impl Into<String>) -> bool {
        set_once(&mut self.version, version.into())
    }

    /// `title(section)`, the conventional man page heading.
    #[must_use]
    pub fn heading(&self) -> Heading<'_> {
        Heading(self)
    }
}

fn set_once(slot: &mut Option<String>, value: String) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

/// Display adapter for [`Document::heading`].
pub struct Heading<'a>(&'a Document);

impl fmt::Display for Heading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.0.title().unwrap_or_default(),
            self.0.section().unwrap_or_default()
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
