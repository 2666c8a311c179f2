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
use std::collections::BTreeSet;

use crate::Configuration;
use crate::Node;
use crate::RingError;
use crate::VirtualNode;

/// Every position a node would occupy, validated before anything is inserted.
pub(crate) struct Placement {
    pub position: u32,
    pub virtual_nodes: Vec<(u32, VirtualNode)>,
}

impl Placement {
    /// Computes the positions of `node` and of its `replicas` virtual nodes.
    ///
    /// Fails with [`RingError::DuplicateNode`] if any position is already taken
    /// in `occupied` or by another position of the same placement.
    pub fn plan<V>(
        configuration: &Configuration,
        occupied: &BTreeMap<u32, V>,
        node: &Node,
        replicas: u32,
    ) -> Result<Self, RingError> {
        let position = configuration.position(node.name());
        if occupied.contains_key(&position) {
            return Err(RingError::DuplicateNode {
                name: node.name().to_string(),
                position,
            });
        }

        let mut taken = BTreeSet::from([position]);
        let mut virtual_nodes = Vec::with_capacity(replicas as usize);
        for index in 0..replicas {
            let vnode = VirtualNode::new(node.clone(), index);
            let name = vnode.name();
            let vposition = configuration.position(&name);
            if occupied.contains_key(&vposition) || !taken.insert(vposition) {
                return Err(RingError::DuplicateNode {
                    name,
                    position: vposition,
                });
            }
            virtual_nodes.push((vposition, vnode));
        }

        Ok(Self {
            position,
            virtual_nodes,
        })
    }
}

/// Finds the entry at `position` or the next one clockwise, wrapping around to
/// the smallest position.
pub(crate) fn successor<V>(entries: &BTreeMap<u32, V>, position: u32) -> Option<&V> {
    entries
        .range(position..)
        .next()
        .or_else(|| entries.iter().next())
        .map(|(_, entry)| entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashFunction;

    #[derive(Debug)]
    struct Constant;

    impl HashFunction for Constant {
        fn compute(&self, _: &str) -> i32 {
            7
        }
    }

    #[test]
    fn test_successor() {
        let entries = BTreeMap::from([(2u32, "a"), (4, "b"), (8, "c")]);
        assert_eq!(successor(&entries, 0), Some(&"a"));
        assert_eq!(successor(&entries, 2), Some(&"a"));
        assert_eq!(successor(&entries, 3), Some(&"b"));
        assert_eq!(successor(&entries, 8), Some(&"c"));
        assert_eq!(successor(&entries, 9), Some(&"a"));
        assert_eq!(successor(&entries, u32::MAX), Some(&"a"));
        assert_eq!(successor(&BTreeMap::<u32, ()>::new(), 1), None);
    }

    #[test]
    fn test_plan_rejects_self_collision() {
        let configuration = Configuration::builder().hash_function(Constant).build();
        let node = Node::new("node-1").unwrap();
        let occupied = BTreeMap::<u32, ()>::new();

        let placement = Placement::plan(&configuration, &occupied, &node, 0).unwrap();
        assert_eq!(placement.position, 7);
        assert!(placement.virtual_nodes.is_empty());

        let err = Placement::plan(&configuration, &occupied, &node, 1)
            .err()
            .unwrap();
        assert_eq!(
            err,
            RingError::DuplicateNode {
                name: "@@@node-1@@@0@@@".to_string(),
                position: 7,
            }
        );
    }
}
