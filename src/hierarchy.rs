//! Named transform hierarchies for articulated models.
//!
//! A [`Hierarchy`] stores its nodes in a flat vector plus a name → index map.
//! Each node holds a transform relative to its parent; after the local
//! transforms of a frame have been written,
//! [`update_local_to_global_coordinates`](Hierarchy::update_local_to_global_coordinates)
//! resolves every node in one forward pass.
//!
//! That single pass is only correct because insertion order is a topological
//! order: [`add`](Hierarchy::add) refuses any node whose parent has not been
//! inserted yet. The parent of the first node is the root sentinel (usually
//! [`GLOBAL_FRAME`]) and may never itself name a node.
//!
//! # Example
//!
//! ```
//! use marionette::{AffineTransform, Hierarchy, GLOBAL_FRAME, Vec3};
//!
//! let mut arm: Hierarchy<&str> = Hierarchy::new();
//! arm.add_at("torso mesh", "torso", GLOBAL_FRAME, Vec3::ZERO).unwrap();
//! arm.add_at("upper mesh", "shoulder", "torso", Vec3::new(0.5, 0.0, 0.0)).unwrap();
//! arm.add_at("lower mesh", "elbow", "shoulder", Vec3::new(0.4, 0.0, 0.0)).unwrap();
//!
//! arm["torso"].transform.translation = Vec3::new(0.0, 0.0, 1.0);
//! arm.update_local_to_global_coordinates();
//!
//! let elbow = arm["elbow"].global_transform();
//! assert!((elbow.translation - Vec3::new(0.9, 0.0, 1.0)).length() < 1e-6);
//! ```

use std::collections::{HashMap, HashSet};
use std::ops::{Index, IndexMut};

use glam::Vec3;
use tracing::debug;

use crate::error::{Result, RigError};
use crate::transform::AffineTransform;

/// Conventional parent name of a hierarchy's root.
pub const GLOBAL_FRAME: &str = "global_frame";

/// One rigid part of a hierarchy.
#[derive(Clone, Debug)]
pub struct HierarchyNode<P> {
    /// Opaque data carried by the node, typically what a renderer draws.
    pub payload: P,
    /// Transform relative to the parent's frame.
    pub transform: AffineTransform,
    name: String,
    parent: String,
    global_transform: AffineTransform,
}

impl<P> HierarchyNode<P> {
    pub fn new(
        payload: P,
        name: impl Into<String>,
        parent: impl Into<String>,
        transform: AffineTransform,
    ) -> Self {
        Self {
            payload,
            transform,
            name: name.into(),
            parent: parent.into(),
            global_transform: AffineTransform::IDENTITY,
        }
    }

    /// Node whose local transform is a pure translation.
    pub fn at(
        payload: P,
        name: impl Into<String>,
        parent: impl Into<String>,
        translation: Vec3,
    ) -> Self {
        Self::new(
            payload,
            name,
            parent,
            AffineTransform::from_translation(translation),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// World-space transform computed by the last propagation.
    pub fn global_transform(&self) -> &AffineTransform {
        &self.global_transform
    }
}

/// A forest of named nodes stored parents-first.
#[derive(Clone, Debug)]
pub struct Hierarchy<P> {
    name_map: HashMap<String, usize>,
    elements: Vec<HierarchyNode<P>>,
}

impl<P> Default for Hierarchy<P> {
    fn default() -> Self {
        Self {
            name_map: HashMap::new(),
            elements: Vec::new(),
        }
    }
}

impl<P> Hierarchy<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node after all existing ones.
    ///
    /// Fails if the name is already taken, if the parent is neither the root
    /// sentinel nor an existing node, or if the name equals the root sentinel.
    /// A rejected node leaves the hierarchy unchanged.
    pub fn add_node(&mut self, node: HierarchyNode<P>) -> Result<()> {
        if self.name_map.contains_key(&node.name) {
            return Err(RigError::DuplicateNode(node.name));
        }

        let index = self.elements.len();
        debug!(node = %node.name, parent = %node.parent, index, "adding hierarchy node");
        self.name_map.insert(node.name.clone(), index);
        self.elements.push(node);

        if let Err(err) = self.validate() {
            if let Some(rejected) = self.elements.pop() {
                self.name_map.remove(&rejected.name);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Shortcut for [`add_node`](Self::add_node).
    pub fn add(
        &mut self,
        payload: P,
        name: impl Into<String>,
        parent: impl Into<String>,
        transform: AffineTransform,
    ) -> Result<()> {
        self.add_node(HierarchyNode::new(payload, name, parent, transform))
    }

    /// Shortcut taking an initial translation instead of a full transform.
    pub fn add_at(
        &mut self,
        payload: P,
        name: impl Into<String>,
        parent: impl Into<String>,
        translation: Vec3,
    ) -> Result<()> {
        self.add_node(HierarchyNode::at(payload, name, parent, translation))
    }

    /// Checks every structural invariant of the hierarchy.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.elements.first() else {
            return Ok(());
        };

        if self.elements.len() != self.name_map.len() {
            return Err(RigError::IncoherentIndex(format!(
                "{} nodes but {} indexed names",
                self.elements.len(),
                self.name_map.len()
            )));
        }

        if self.name_map.contains_key(&root.parent) {
            return Err(RigError::RootParentInHierarchy(root.parent.clone()));
        }

        for (name, &index) in &self.name_map {
            match self.elements.get(index) {
                Some(node) if node.name == *name => {}
                Some(node) => {
                    return Err(RigError::IncoherentIndex(format!(
                        "name [{name}] maps to index {index} holding [{}]",
                        node.name
                    )));
                }
                None => {
                    return Err(RigError::IncoherentIndex(format!(
                        "name [{name}] maps to missing index {index}"
                    )));
                }
            }
        }

        let mut visited: HashSet<&str> = HashSet::with_capacity(self.elements.len() + 1);
        visited.insert(root.parent.as_str());
        for (index, node) in self.elements.iter().enumerate() {
            if !visited.contains(node.parent.as_str()) {
                return Err(RigError::ParentNotDefined {
                    node: node.name.clone(),
                    parent: node.parent.clone(),
                    index,
                });
            }
            visited.insert(node.name.as_str());
        }

        Ok(())
    }

    /// Parent name shared by the root nodes, if any node exists.
    pub fn root_parent(&self) -> Option<&str> {
        self.elements.first().map(|root| root.parent.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Names of all nodes in storage order.
    pub fn names(&self) -> Vec<String> {
        self.elements.iter().map(|node| node.name.clone()).collect()
    }

    fn not_found(&self, name: &str) -> RigError {
        RigError::NodeNotFound {
            name: name.to_string(),
            available: self.names(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&HierarchyNode<P>> {
        self.name_map
            .get(name)
            .and_then(|&index| self.elements.get(index))
            .ok_or_else(|| self.not_found(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut HierarchyNode<P>> {
        match self.name_map.get(name) {
            Some(&index) if index < self.elements.len() => Ok(&mut self.elements[index]),
            _ => Err(self.not_found(name)),
        }
    }

    /// Nodes in storage order (parents before children).
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode<P>> {
        self.elements.iter()
    }

    /// Mutable access to every payload, in storage order.
    pub fn payloads_mut(&mut self) -> impl Iterator<Item = &mut P> {
        self.elements.iter_mut().map(|node| &mut node.payload)
    }

    /// Resolves every node's global transform from the local ones.
    ///
    /// Roots copy their local transform; every other node becomes
    /// `global(parent) * local`. Runs in storage order without re-checking it.
    pub fn update_local_to_global_coordinates(&mut self) {
        let Some(root_parent) = self.elements.first().map(|root| root.parent.clone()) else {
            return;
        };

        for k in 0..self.elements.len() {
            let parent_global = if self.elements[k].parent == root_parent {
                None
            } else {
                self.name_map
                    .get(&self.elements[k].parent)
                    .map(|&parent| self.elements[parent].global_transform)
            };

            let node = &mut self.elements[k];
            node.global_transform = match parent_global {
                Some(parent) => parent * node.transform,
                None => node.transform,
            };
        }
    }

    /// World-space bones as `(parent origin, child origin)` pairs.
    pub fn skeleton_segments(&self) -> Vec<(Vec3, Vec3)> {
        self.elements
            .iter()
            .filter_map(|node| {
                let &parent = self.name_map.get(&node.parent)?;
                Some((
                    self.elements[parent].global_transform.translation,
                    node.global_transform.translation,
                ))
            })
            .collect()
    }
}

impl<P> Index<&str> for Hierarchy<P> {
    type Output = HierarchyNode<P>;

    /// Panics when `name` is unknown; use [`Hierarchy::get`] to handle that case.
    fn index(&self, name: &str) -> &HierarchyNode<P> {
        match self.get(name) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<P> IndexMut<&str> for Hierarchy<P> {
    fn index_mut(&mut self, name: &str) -> &mut HierarchyNode<P> {
        match self.get_mut(name) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }
}
