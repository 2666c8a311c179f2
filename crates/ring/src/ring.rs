// Copyright 2025 ScopeDB <contact@scopedb.io>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::Configuration;
use crate::Node;
use crate::RingError;
use crate::Slot;
use crate::VirtualNode;
use crate::node::virtual_node_name;
use crate::placement::Placement;
use crate::placement::successor;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Occupant {
    /// A real node and the number of replicas it spawned.
    Real { node: Node, replicas: u32 },
    Virtual(VirtualNode),
}

impl Occupant {
    fn slot(&self) -> Slot<'_> {
        match self {
            Occupant::Real { node, .. } => Slot::Real(node),
            Occupant::Virtual(vnode) => Slot::Virtual(vnode),
        }
    }
}

/// A consistent hash ring storing one flat entry per position.
///
/// Real nodes remember how many replicas they spawned. Since replica names are
/// derived from the parent name and an index, removing a node recomputes the
/// positions of its replicas instead of scanning the ring.
///
/// # Examples
///
/// ```
/// use annulus_ring::Node;
/// use annulus_ring::Ring;
///
/// let nodes = ["node-1", "node-2", "node-3"].map(|name| Node::new(name).unwrap());
/// let ring = Ring::with_nodes(Default::default(), nodes).unwrap();
/// assert_eq!(ring.size(), 3);
/// assert_eq!(ring.find_node("key1").unwrap(), ring.find_node("key1").unwrap());
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Ring {
    configuration: Configuration,
    nodes: BTreeMap<u32, Occupant>,
}

impl Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("configuration", &self.configuration)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl Ring {
    /// Creates an empty ring.
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            nodes: BTreeMap::new(),
        }
    }

    /// Creates a ring seeded with `nodes`, each spawning the configured number of replicas.
    pub fn with_nodes<I>(configuration: Configuration, nodes: I) -> Result<Self, RingError>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut ring = Self::new(configuration);
        for node in nodes {
            ring.add_node(node)?;
        }
        Ok(ring)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Number of entries, real and virtual.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), RingError> {
        self.add_node_with_replicas(node, self.configuration.replica_count())
    }

    /// Adds `node` along with `replicas` virtual nodes.
    ///
    /// Nothing is inserted if any of the positions is already taken.
    pub fn add_node_with_replicas(&mut self, node: Node, replicas: u32) -> Result<(), RingError> {
        let Placement {
            position,
            virtual_nodes,
        } = Placement::plan(&self.configuration, &self.nodes, &node, replicas)?;

        log::debug!("adding node {node} at position {position} with {replicas} replicas");
        self.nodes.insert(position, Occupant::Real { node, replicas });
        for (vposition, vnode) in virtual_nodes {
            self.nodes.insert(vposition, Occupant::Virtual(vnode));
        }
        Ok(())
    }

    /// Removes `node` and all its replicas. Returns whether the node was present.
    pub fn remove_node(&mut self, node: &Node) -> bool {
        let position = self.configuration.position(node.name());
        let replicas = match self.nodes.get(&position) {
            Some(Occupant::Real {
                node: current,
                replicas,
            }) if current == node => *replicas,
            _ => return false,
        };

        self.nodes.remove(&position);
        for index in 0..replicas {
            let vposition = self
                .configuration
                .position(&virtual_node_name(node.name(), index));
            self.nodes.remove(&vposition);
        }
        log::debug!("removed node {node} at position {position} with {replicas} replicas");
        true
    }

    /// Finds the node owning `key`.
    ///
    /// That is the root of the first entry at or after the key's position,
    /// wrapping around to the smallest position.
    pub fn find_node(&self, key: &str) -> Result<&Node, RingError> {
        let position = self.configuration.position(key);
        successor(&self.nodes, position)
            .map(|occupant| occupant.slot().root_node())
            .ok_or(RingError::EmptyRing)
    }

    /// Whether `node` is a real member of the ring.
    pub fn contains(&self, node: &Node) -> bool {
        let position = self.configuration.position(node.name());
        matches!(
            self.nodes.get(&position),
            Some(Occupant::Real { node: current, .. }) if current == node
        )
    }

    /// Real members in position order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter_map(|occupant| match occupant {
            Occupant::Real { node, .. } => Some(node),
            Occupant::Virtual(_) => None,
        })
    }

    /// Every entry in position order.
    pub fn slots(&self) -> impl Iterator<Item = (u32, Slot<'_>)> {
        self.nodes
            .iter()
            .map(|(position, occupant)| (*position, occupant.slot()))
    }
}
