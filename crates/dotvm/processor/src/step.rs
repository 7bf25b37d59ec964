// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Processing steps and the annotation-keyed element multimap

use indexmap::{IndexMap, IndexSet};

use crate::element::Element;

/// Elements grouped by the qualified name of the annotation they carry
///
/// Iteration follows insertion order, and an element appears at most once
/// per annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedElements<E: Element> {
    by_annotation: IndexMap<String, IndexSet<E>>,
}

impl<E: Element> Default for AnnotatedElements<E> {
    fn default() -> Self {
        Self { by_annotation: IndexMap::new() }
    }
}

impl<E: Element> AnnotatedElements<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element under an annotation; returns false if it was already there
    pub fn insert(&mut self, annotation: impl Into<String>, element: E) -> bool {
        self.by_annotation.entry(annotation.into()).or_default().insert(element)
    }

    /// Add every pair of `other`
    pub fn extend(&mut self, other: &AnnotatedElements<E>) {
        for (annotation, element) in other.iter() {
            self.insert(annotation, element.clone());
        }
    }

    /// Elements carrying the given annotation
    pub fn get(&self, annotation: &str) -> impl Iterator<Item = &E> {
        self.by_annotation.get(annotation).into_iter().flatten()
    }

    /// Annotations that have at least one element
    pub fn annotations(&self) -> impl Iterator<Item = &str> {
        self.by_annotation.keys().map(String::as_str)
    }

    /// All `(annotation, element)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> {
        self.by_annotation.iter().flat_map(|(annotation, elements)| elements.iter().map(move |e| (annotation.as_str(), e)))
    }

    /// Distinct elements regardless of annotation
    pub fn elements(&self) -> IndexSet<&E> {
        self.by_annotation.values().flatten().collect()
    }

    pub fn contains(&self, annotation: &str, element: &E) -> bool {
        self.by_annotation.get(annotation).is_some_and(|elements| elements.contains(element))
    }

    pub fn contains_element(&self, element: &E) -> bool {
        self.by_annotation.values().any(|elements| elements.contains(element))
    }

    /// Copy of this multimap keeping only the given annotations
    pub fn restricted_to(&self, annotations: &IndexSet<String>) -> Self {
        Self {
            by_annotation: self
                .by_annotation
                .iter()
                .filter(|(annotation, _)| annotations.contains(*annotation))
                .map(|(annotation, elements)| (annotation.clone(), elements.clone()))
                .collect(),
        }
    }

    /// Number of `(annotation, element)` pairs
    pub fn len(&self) -> usize {
        self.by_annotation.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_annotation.is_empty()
    }
}

impl<E: Element, S: Into<String>> FromIterator<(S, E)> for AnnotatedElements<E> {
    fn from_iter<I: IntoIterator<Item = (S, E)>>(iter: I) -> Self {
        let mut elements = Self::new();
        for (annotation, element) in iter {
            elements.insert(annotation, element);
        }
        elements
    }
}

/// A unit of processing logic for one or more annotations
///
/// Steps only ever see elements whose enclosing package or type is
/// well-formed. Elements a step cannot handle yet are returned from
/// [`Step::process`] and offered to the same step again next round.
pub trait Step<E: Element> {
    /// Name used in logs and round summaries
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Qualified names of the annotations this step processes
    fn annotations(&self) -> IndexSet<String>;

    /// Process the elements, keyed by annotations from [`Step::annotations`]
    ///
    /// Returns the elements (a subset of the input) that could not be
    /// processed in this round.
    fn process(&mut self, elements: &AnnotatedElements<E>) -> Vec<E>;
}

/// A [`Step`] backed by a closure
pub struct FnStep<F> {
    name: String,
    annotations: IndexSet<String>,
    process: F,
}

impl<F> FnStep<F> {
    pub fn new<I, S>(name: impl Into<String>, annotations: I, process: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            annotations: annotations.into_iter().map(Into::into).collect(),
            process,
        }
    }
}

impl<E, F> Step<E> for FnStep<F>
where
    E: Element,
    F: FnMut(&AnnotatedElements<E>) -> Vec<E>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn annotations(&self) -> IndexSet<String> {
        self.annotations.clone()
    }

    fn process(&mut self, elements: &AnnotatedElements<E>) -> Vec<E> {
        (self.process)(elements)
    }
}
