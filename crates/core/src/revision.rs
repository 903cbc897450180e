//! Revision vault: all generated material, gathered once the syllabus is done.

use crate::model::{Catalogue, Formula, StudyContent, StudyItem};
use crate::progress::aggregate_catalogue;

/// Generated material from every item that has content, in catalogue order.
#[derive(Debug, Clone, Copy)]
pub struct RevisionVault<'a> {
    entries: &'a Catalogue,
}

impl<'a> RevisionVault<'a> {
    #[must_use]
    pub fn collect(catalogue: &'a Catalogue) -> Self {
        Self { entries: catalogue }
    }

    /// The vault opens once overall progress rounds to 100 percent, so a
    /// large catalogue may unlock with a few items still open.
    #[must_use]
    pub fn is_unlocked(catalogue: &Catalogue) -> bool {
        aggregate_catalogue(catalogue).percent == 100
    }

    fn with_content(self) -> impl Iterator<Item = (&'a StudyItem, &'a StudyContent)> + 'a {
        self.entries
            .items()
            .filter_map(|item| item.content().map(|content| (item, content)))
    }

    /// Number of items contributing material.
    #[must_use]
    pub fn len(&self) -> usize {
        self.with_content().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.with_content().next().is_none()
    }

    /// `(item title, notes)` per item.
    pub fn notes(self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.with_content()
            .map(|(item, content)| (item.title(), content.notes.as_str()))
    }

    pub fn formulas(self) -> impl Iterator<Item = &'a Formula> + 'a {
        self.with_content()
            .flat_map(|(_, content)| content.formulas.iter())
    }

    pub fn tips(self) -> impl Iterator<Item = &'a str> + 'a {
        self.with_content()
            .flat_map(|(_, content)| content.tips.iter().map(String::as_str))
    }

    /// Single-point last-minute facts.
    pub fn revision_points(self) -> impl Iterator<Item = &'a str> + 'a {
        self.with_content()
            .flat_map(|(_, content)| content.last_minute_notes.iter().map(String::as_str))
    }
}
