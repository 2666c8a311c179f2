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
use crate::placement::Placement;
use crate::placement::successor;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClusterNode {
    Real {
        node: Node,
        virtual_nodes: Vec<VirtualNode>,
    },
    Virtual(VirtualNode),
}

impl ClusterNode {
    fn slot(&self) -> Slot<'_> {
        match self {
            ClusterNode::Real { node, .. } => Slot::Real(node),
            ClusterNode::Virtual(vnode) => Slot::Virtual(vnode),
        }
    }

    fn is_member(&self, node: &Node) -> bool {
        matches!(self, ClusterNode::Real { node: current, .. } if current == node)
    }
}

/// A consistent hash ring grouping each real node with the virtual nodes it spawned.
///
/// Removing a node walks the replica list kept in its own entry, so the cost
/// depends on its replica count only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    configuration: Configuration,
    ring: BTreeMap<u32, ClusterNode>,
}

impl Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("configuration", &self.configuration)
            .field("ring", &self.ring)
            .finish()
    }
}

impl Cluster {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            ring: BTreeMap::new(),
        }
    }

    pub fn with_nodes<I>(configuration: Configuration, nodes: I) -> Result<Self, RingError>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut cluster = Self::new(configuration);
        for node in nodes {
            cluster.add_node(node)?;
        }
        Ok(cluster)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn size(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
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
        } = Placement::plan(&self.configuration, &self.ring, &node, replicas)?;

        log::debug!("adding node {node} at position {position} with {replicas} replicas");
        let mut owned = Vec::with_capacity(virtual_nodes.len());
        for (vposition, vnode) in virtual_nodes {
            self.ring.insert(vposition, ClusterNode::Virtual(vnode.clone()));
            owned.push(vnode);
        }
        self.ring.insert(
            position,
            ClusterNode::Real {
                node,
                virtual_nodes: owned,
            },
        );
        Ok(())
    }

    /// Removes `node` and all its replicas. Returns whether the node was present.
    pub fn remove_node(&mut self, node: &Node) -> bool {
        let position = self.configuration.position(node.name());
        let virtual_nodes = match self.ring.get_mut(&position) {
            Some(ClusterNode::Real {
                node: current,
                virtual_nodes,
            }) if current == node => std::mem::take(virtual_nodes),
            _ => return false,
        };

        self.ring.remove(&position);
        for vnode in &virtual_nodes {
            self.ring.remove(&self.configuration.position(&vnode.name()));
        }
        log::debug!(
            "removed node {node} at position {position} with {} replicas",
            virtual_nodes.len()
        );
        true
    }

    /// Finds the node owning `key`, wrapping around past the largest position.
    pub fn find_node(&self, key: &str) -> Result<&Node, RingError> {
        let position = self.configuration.position(key);
        successor(&self.ring, position)
            .map(|entry| entry.slot().root_node())
            .ok_or(RingError::EmptyRing)
    }

    pub fn contains(&self, node: &Node) -> bool {
        let position = self.configuration.position(node.name());
        self.ring
            .get(&position)
            .is_some_and(|entry| entry.is_member(node))
    }

    /// Virtual nodes spawned by `node`, or `None` if it is not a member.
    pub fn virtual_nodes(&self, node: &Node) -> Option<&[VirtualNode]> {
        let position = self.configuration.position(node.name());
        match self.ring.get(&position) {
            Some(ClusterNode::Real {
                node: current,
                virtual_nodes,
            }) if current == node => Some(virtual_nodes),
            _ => None,
        }
    }

    /// Real members in position order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.ring.values().filter_map(|entry| match entry {
            ClusterNode::Real { node, .. } => Some(node),
            ClusterNode::Virtual(_) => None,
        })
    }

    /// Every entry in position order.
    pub fn slots(&self) -> impl Iterator<Item = (u32, Slot<'_>)> {
        self.ring
            .iter()
            .map(|(position, entry)| (*position, entry.slot()))
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_compact_debug_snapshot;

    use super::*;
    use crate::HashFunction;
    use crate::Ring;

    #[derive(Debug)]
    struct ParseInt;

    impl HashFunction for ParseInt {
        fn compute(&self, value: &str) -> i32 {
            value.parse().unwrap()
        }
    }

    /// Real names are integers; replica `i` of node `n` lands at `n * 100 + i + 1`.
    #[derive(Debug)]
    struct Spread;

    impl HashFunction for Spread {
        fn compute(&self, value: &str) -> i32 {
            match value.strip_prefix("@@@") {
                None => value.parse().unwrap(),
                Some(rest) => {
                    let mut parts = rest.split("@@@");
                    let parent: i32 = parts.next().unwrap().parse().unwrap();
                    let index: i32 = parts.next().unwrap().parse().unwrap();
                    parent * 100 + index + 1
                }
            }
        }
    }

    fn node(name: &str) -> Node {
        Node::new(name).unwrap()
    }

    fn find(cluster: &Cluster, key: &str) -> String {
        cluster.find_node(key).unwrap().name().to_string()
    }

    #[test]
    fn test_find_node_with_wraparound() {
        let configuration = Configuration::builder().hash_function(ParseInt).build();
        let mut cluster = Cluster::new(configuration);
        cluster.add_node(node("2")).unwrap();
        cluster.add_node(node("4")).unwrap();
        cluster.add_node(node("8")).unwrap();

        for (key, owner) in [("0", "2"), ("3", "4"), ("5", "8"), ("8", "8"), ("9", "2")] {
            assert_eq!(find(&cluster, key), owner, "key {key}");
        }

        assert!(cluster.remove_node(&node("4")));
        assert_eq!(find(&cluster, "3"), "8");

        assert!(cluster.remove_node(&node("8")));
        assert_eq!(find(&cluster, "3"), "2");
        assert_eq!(find(&cluster, "10"), "2");
    }

    #[test]
    fn test_debug_rendering() {
        let configuration = Configuration::builder()
            .hash_function(Spread)
            .replica_count(1)
            .build();
        let mut cluster = Cluster::new(configuration);
        cluster.add_node(node("1")).unwrap();
        cluster.add_node_with_replicas(node("2"), 0).unwrap();
        assert_compact_debug_snapshot!(
            cluster,
            @r#"Cluster { configuration: Configuration { hash_function: Spread, replica_count: 1 }, ring: {1: Real { node: Node("1"), virtual_nodes: [VirtualNode { parent: Node("1"), index: 0 }] }, 2: Real { node: Node("2"), virtual_nodes: [] }, 101: Virtual(VirtualNode { parent: Node("1"), index: 0 })} }"#
        );

        // position 101 belongs to a replica of "1", past the real node "2"
        assert_eq!(find(&cluster, "50"), "1");
        assert_eq!(find(&cluster, "2"), "2");
        assert_eq!(find(&cluster, "102"), "1");
    }

    #[test]
    fn test_virtual_nodes() {
        let configuration = Configuration::builder().replica_count(2).build();
        let mut cluster = Cluster::with_nodes(
            configuration,
            [node("192.168.1.1"), node("192.168.1.2"), node("192.168.1.3")],
        )
        .unwrap();
        assert_eq!(cluster.size(), 9);

        cluster.add_node_with_replicas(node("192.168.1.4"), 5).unwrap();
        assert_eq!(cluster.size(), 15);

        let vnodes = cluster.virtual_nodes(&node("192.168.1.4")).unwrap();
        assert_eq!(vnodes.len(), 5);
        assert!(vnodes.iter().enumerate().all(|(i, vnode)| {
            vnode.index() == i as u32 && vnode.parent_node().name() == "192.168.1.4"
        }));
        assert_eq!(cluster.virtual_nodes(&node("192.168.1.5")), None);
    }

    #[test]
    fn test_remove_node_and_its_virtual_nodes() {
        let mut cluster = Cluster::default();
        cluster.add_node_with_replicas(node("192.168.1.1"), 3).unwrap();
        cluster.add_node_with_replicas(node("192.168.1.2"), 4).unwrap();
        cluster.add_node_with_replicas(node("192.168.1.3"), 5).unwrap();
        assert_eq!(cluster.size(), 15);

        assert!(cluster.remove_node(&node("192.168.1.2")));
        assert_eq!(cluster.size(), 10);
        assert!(!cluster.contains(&node("192.168.1.2")));

        assert!(cluster.remove_node(&node("192.168.1.3")));
        assert_eq!(cluster.size(), 4);

        assert!(!cluster.remove_node(&node("192.168.1.3")));
        assert_eq!(cluster.size(), 4);

        assert!(cluster.remove_node(&node("192.168.1.1")));
        assert_eq!(cluster.size(), 0);
        assert!(cluster.is_empty());
        assert_eq!(cluster.find_node("key"), Err(RingError::EmptyRing));
    }

    #[test]
    fn test_duplicate_node_leaves_cluster_unchanged() {
        let configuration = Configuration::builder()
            .hash_function(Spread)
            .replica_count(1)
            .build();
        let mut cluster = Cluster::with_nodes(configuration, [node("1")]).unwrap();
        assert_eq!(
            cluster.add_node(node("1")),
            Err(RingError::DuplicateNode {
                name: "1".to_string(),
                position: 1,
            })
        );
        // replica 0 of "1" already sits at 101
        assert_eq!(
            cluster.add_node_with_replicas(node("101"), 0),
            Err(RingError::DuplicateNode {
                name: "101".to_string(),
                position: 101,
            })
        );
        assert_eq!(cluster.size(), 2);
        assert!(!cluster.remove_node(&node("101")));
        assert_eq!(cluster.size(), 2);
    }

    #[test]
    fn test_agrees_with_ring() {
        let configuration = Configuration::builder().replica_count(8).build();
        let names = ["node-1", "node-2", "node-3", "node-4", "node-5"];
        let mut cluster =
            Cluster::with_nodes(configuration.clone(), names.map(|name| node(name))).unwrap();
        let mut ring = Ring::with_nodes(configuration, names.map(|name| node(name))).unwrap();
        assert_eq!(cluster.size(), ring.size());
        assert_eq!(
            cluster.nodes().collect::<Vec<_>>(),
            ring.nodes().collect::<Vec<_>>()
        );

        cluster.remove_node(&node("node-3"));
        ring.remove_node(&node("node-3"));
        assert_eq!(cluster.size(), ring.size());

        for i in 0..500 {
            let key = format!("key-{i}");
            assert_eq!(cluster.find_node(&key), ring.find_node(&key), "key {key}");
        }
    }

    #[test]
    fn test_equality() {
        let configuration = Configuration::builder().replica_count(4).build();
        let nodes = [node("node-1"), node("node-2")];
        let cluster = Cluster::with_nodes(configuration.clone(), nodes.clone()).unwrap();
        let mut reversed = nodes.clone();
        reversed.reverse();
        let reordered = Cluster::with_nodes(configuration, reversed).unwrap();
        assert_eq!(cluster, reordered);

        let mut changed = cluster.clone();
        changed.add_node(node("node-3")).unwrap();
        assert_ne!(cluster, changed);
        assert!(changed.remove_node(&node("node-3")));
        assert_eq!(cluster, changed);

        // equal layouts under distinct hash function instances
        let rebuilt =
            Cluster::with_nodes(Configuration::builder().replica_count(4).build(), nodes).unwrap();
        assert_eq!(
            cluster.slots().map(|(p, _)| p).collect::<Vec<_>>(),
            rebuilt.slots().map(|(p, _)| p).collect::<Vec<_>>()
        );
        assert_ne!(cluster, rebuilt);
    }
}
