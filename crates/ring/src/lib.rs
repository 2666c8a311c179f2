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

//! Consistent hash ring for routing string keys to a changing set of nodes.
//!
//! Two structures are provided. [`Ring`] stores one flat entry per position
//! and recomputes replica positions on removal. [`Cluster`] groups every real
//! node with the virtual nodes it spawned. Both resolve a key to the first
//! entry at or after its position, wrapping around to the smallest position.
//!
//! Neither structure synchronizes access: mutation takes `&mut self`, and
//! callers sharing a ring across threads must wrap it themselves.
//!
//! # Examples
//!
//! ```
//! use annulus_ring::Configuration;
//! use annulus_ring::Node;
//! use annulus_ring::Ring;
//!
//! let configuration = Configuration::builder().replica_count(16).build();
//! let mut ring = Ring::new(configuration);
//! ring.add_node(Node::new("node-1").unwrap()).unwrap();
//! ring.add_node(Node::new("node-2").unwrap()).unwrap();
//! assert_eq!(ring.size(), 34);
//!
//! let owner = ring.find_node("key1").unwrap();
//! assert!(owner.name() == "node-1" || owner.name() == "node-2");
//! ```

mod cluster;
mod config;
mod error;
mod hash;
mod node;
mod placement;
mod ring;

pub use cluster::Cluster;
pub use config::Configuration;
pub use config::ConfigurationBuilder;
pub use error::RingError;
pub use hash::Fnv1a32;
pub use hash::HashFunction;
pub use hash::HashFunctionKind;
pub use hash::Murmur3;
pub use hash::StringHash;
pub use node::Node;
pub use node::Slot;
pub use node::VirtualNode;
pub use ring::Ring;
