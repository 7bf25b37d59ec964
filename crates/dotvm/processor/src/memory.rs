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

//! In-memory program model
//!
//! A small host implementation of [`Element`] and [`SymbolTable`], used to
//! drive the processor without a real toolchain. The model is edited between
//! rounds and frozen with [`ProgramModel::snapshot`]. Handles taken from
//! different snapshots never compare equal, even for the same node, which is
//! exactly the handle churn the processor has to cope with.

use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::element::{Element, ElementKind, SymbolTable};
use crate::step::AnnotatedElements;

/// Stable identifier of a node in a [`ProgramModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    kind: ElementKind,
    name: String,
    display: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    parameters: Vec<NodeId>,
    type_parameters: Vec<NodeId>,
    annotations: IndexSet<String>,
    removed: bool,
}

/// Mutable program model
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    nodes: Vec<Node>,
    generation: u64,
}

impl ProgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ElementKind, name: impl Into<String>, display: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            name: name.into(),
            display: display.into(),
            parent,
            children: Vec::new(),
            parameters: Vec::new(),
            type_parameters: Vec::new(),
            annotations: IndexSet::new(),
            removed: false,
        });
        id
    }

    fn attach(&mut self, kind: ElementKind, parent: NodeId, name: &str, display: String) -> NodeId {
        let id = self.push(kind, name, display, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Add a package; its simple name is the last segment of `name`
    pub fn add_package(&mut self, name: &str) -> NodeId {
        let simple = name.rsplit('.').next().unwrap_or(name).to_string();
        self.push(ElementKind::Package, simple, name, None)
    }

    /// Add a type to a package or (as a nested type) to another type
    pub fn add_type(&mut self, parent: NodeId, kind: ElementKind, name: &str) -> NodeId {
        let parent_name = &self.nodes[parent.0].display;
        let display = if parent_name.is_empty() { name.to_string() } else { format!("{}.{}", parent_name, name) };
        self.attach(kind, parent, name, display)
    }

    pub fn add_class(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add_type(parent, ElementKind::Class, name)
    }

    pub fn add_interface(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add_type(parent, ElementKind::Interface, name)
    }

    pub fn add_record(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add_type(parent, ElementKind::Record, name)
    }

    pub fn add_annotation_type(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add_type(parent, ElementKind::AnnotationType, name)
    }

    /// Add a field, enum constant or record component
    pub fn add_member(&mut self, owner: NodeId, kind: ElementKind, name: &str) -> NodeId {
        self.attach(kind, owner, name, name.to_string())
    }

    pub fn add_field(&mut self, owner: NodeId, name: &str) -> NodeId {
        self.add_member(owner, ElementKind::Field, name)
    }

    /// Add a method printed as `signature`, e.g. `m(int)`
    pub fn add_method(&mut self, owner: NodeId, name: &str, signature: &str) -> NodeId {
        self.attach(ElementKind::Method, owner, name, signature.to_string())
    }

    /// Add a method at a given position among the owner's enclosed elements
    pub fn add_method_at(&mut self, owner: NodeId, position: usize, name: &str, signature: &str) -> NodeId {
        let id = self.push(ElementKind::Method, name, signature, Some(owner));
        let children = &mut self.nodes[owner.0].children;
        children.insert(position.min(children.len()), id);
        id
    }

    pub fn add_constructor(&mut self, owner: NodeId, signature: &str) -> NodeId {
        self.attach(ElementKind::Constructor, owner, "<init>", signature.to_string())
    }

    /// Add an enclosed element of any kind, e.g. an initializer block
    pub fn add_other(&mut self, parent: NodeId, kind: ElementKind, name: &str) -> NodeId {
        self.attach(kind, parent, name, name.to_string())
    }

    pub fn add_parameter(&mut self, executable: NodeId, name: &str) -> NodeId {
        let id = self.push(ElementKind::Parameter, name, name, Some(executable));
        self.nodes[executable.0].parameters.push(id);
        id
    }

    pub fn add_type_parameter(&mut self, owner: NodeId, signature: &str) -> NodeId {
        let id = self.push(ElementKind::TypeParameter, signature, signature, Some(owner));
        self.nodes[owner.0].type_parameters.push(id);
        id
    }

    pub fn annotate(&mut self, id: NodeId, annotation: &str) -> &mut Self {
        self.nodes[id.0].annotations.insert(annotation.to_string());
        self
    }

    pub fn remove_annotation(&mut self, id: NodeId, annotation: &str) -> &mut Self {
        self.nodes[id.0].annotations.shift_remove(annotation);
        self
    }

    /// Change the printable identity of a node
    pub fn set_display(&mut self, id: NodeId, display: &str) {
        self.nodes[id.0].display = display.to_string();
    }

    /// Detach a node and everything below it from the program
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent {
            let parent = &mut self.nodes[parent.0];
            parent.children.retain(|child| *child != id);
            parent.parameters.retain(|child| *child != id);
            parent.type_parameters.retain(|child| *child != id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let node = &mut self.nodes[next.0];
            node.removed = true;
            pending.extend(node.children.iter().chain(&node.parameters).chain(&node.type_parameters).copied());
        }
    }

    /// Freeze the current state; handles of each snapshot are distinct
    pub fn snapshot(&mut self) -> ProgramSnapshot {
        self.generation += 1;
        let mut packages = HashMap::new();
        let mut types = HashMap::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.removed {
                continue;
            }
            if node.kind.is_package() {
                packages.entry(node.display.clone()).or_insert(NodeId(index));
            } else if node.kind.is_type() {
                types.entry(node.display.clone()).or_insert(NodeId(index));
            }
        }
        ProgramSnapshot {
            data: Arc::new(SnapshotData {
                generation: self.generation,
                nodes: self.nodes.clone(),
                packages,
                types,
            }),
        }
    }
}

#[derive(Debug)]
struct SnapshotData {
    generation: u64,
    nodes: Vec<Node>,
    packages: HashMap<String, NodeId>,
    types: HashMap<String, NodeId>,
}

/// Immutable view of a [`ProgramModel`] for one round
#[derive(Debug, Clone)]
pub struct ProgramSnapshot {
    data: Arc<SnapshotData>,
}

impl ProgramSnapshot {
    /// Handle of a node in this snapshot, if the node existed when it was taken
    pub fn element(&self, id: NodeId) -> Option<MemoryElement> {
        (id.0 < self.data.nodes.len()).then(|| self.handle(id))
    }

    fn handle(&self, id: NodeId) -> MemoryElement {
        MemoryElement {
            snapshot: Arc::clone(&self.data),
            id,
        }
    }

    pub fn generation(&self) -> u64 {
        self.data.generation
    }

    /// Every reachable element carrying one of the given annotations
    pub fn discover<'a>(&self, annotations: impl IntoIterator<Item = &'a str>) -> AnnotatedElements<MemoryElement> {
        let annotations: Vec<&str> = annotations.into_iter().collect();
        let mut found = AnnotatedElements::new();
        for (index, node) in self.data.nodes.iter().enumerate() {
            if node.removed {
                continue;
            }
            for annotation in &annotations {
                if node.annotations.contains(*annotation) {
                    found.insert(*annotation, self.handle(NodeId(index)));
                }
            }
        }
        found
    }
}

impl SymbolTable<MemoryElement> for ProgramSnapshot {
    fn package_element(&self, name: &str) -> Option<MemoryElement> {
        self.data.packages.get(name).map(|id| self.handle(*id))
    }

    fn type_element(&self, name: &str) -> Option<MemoryElement> {
        self.data.types.get(name).map(|id| self.handle(*id))
    }
}

/// Handle to a node of a [`ProgramSnapshot`]
#[derive(Clone)]
pub struct MemoryElement {
    snapshot: Arc<SnapshotData>,
    id: NodeId,
}

impl MemoryElement {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.snapshot.generation
    }

    fn node(&self) -> &Node {
        &self.snapshot.nodes[self.id.0]
    }

    fn handles(&self, ids: &[NodeId]) -> Vec<MemoryElement> {
        ids.iter()
            .map(|id| MemoryElement {
                snapshot: Arc::clone(&self.snapshot),
                id: *id,
            })
            .collect()
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot.generation == other.snapshot.generation && self.id == other.id
    }
}

impl Eq for MemoryElement {}

impl Hash for MemoryElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.snapshot.generation.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("generation", &self.snapshot.generation)
            .field("id", &self.id.0)
            .field("kind", &self.node().kind)
            .field("display", &self.node().display)
            .finish()
    }
}

impl fmt::Display for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node().display)
    }
}

impl Element for MemoryElement {
    fn kind(&self) -> ElementKind {
        self.node().kind
    }

    fn simple_name(&self) -> String {
        self.node().name.clone()
    }

    fn enclosing_element(&self) -> Option<Self> {
        self.node().parent.map(|parent| MemoryElement {
            snapshot: Arc::clone(&self.snapshot),
            id: parent,
        })
    }

    fn enclosed_elements(&self) -> Vec<Self> {
        self.handles(&self.node().children)
    }

    fn parameters(&self) -> Vec<Self> {
        self.handles(&self.node().parameters)
    }

    fn type_parameters(&self) -> Vec<Self> {
        self.handles(&self.node().type_parameters)
    }

    fn is_annotated_with(&self, annotation: &str) -> bool {
        self.node().annotations.contains(annotation)
    }
}
