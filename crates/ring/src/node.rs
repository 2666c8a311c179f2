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

use std::fmt;
use std::str::FromStr;

use crate::RingError;

/// A named member of the ring.
///
/// The name may be anything meaningful to the caller (logical name, ip address,
/// etc.) as long as it is not blank. Two nodes are equal iff their names are.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    name: String,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Result<Self, RingError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RingError::InvalidArgument(
                "node name must be defined".to_string(),
            ));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A real node is its own root.
    pub fn root_node(&self) -> &Node {
        self
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.name).finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Node {
    type Err = RingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Node::new(s)
    }
}

impl TryFrom<&str> for Node {
    type Error = RingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Node::new(value)
    }
}

/// A replica of a real node placed at its own ring position.
///
/// Replicas are numbered `0..n` per parent, so the same node list and
/// configuration always produce the same layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualNode {
    parent: Node,
    index: u32,
}

impl VirtualNode {
    pub(crate) fn new(parent: Node, index: u32) -> Self {
        Self { parent, index }
    }

    pub fn name(&self) -> String {
        virtual_node_name(self.parent.name(), self.index)
    }

    pub fn parent_node(&self) -> &Node {
        &self.parent
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn root_node(&self) -> &Node {
        self.parent.root_node()
    }
}

pub(crate) fn virtual_node_name(parent: &str, index: u32) -> String {
    format!("@@@{parent}@@@{index}@@@")
}

/// A view of one ring position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Real(&'a Node),
    Virtual(&'a VirtualNode),
}

impl<'a> Slot<'a> {
    /// The real node that owns this position.
    pub fn root_node(&self) -> &'a Node {
        match *self {
            Slot::Real(node) => node.root_node(),
            Slot::Virtual(vnode) => vnode.root_node(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Slot::Virtual(_))
    }
}
