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

use std::fmt::Debug;
use std::sync::Arc;

use crate::Fnv1a32;
use crate::HashFunction;

const DEFAULT_REPLICA_COUNT: u32 = 0;

/// Placement settings shared by [`crate::Ring`] and [`crate::Cluster`].
#[derive(Clone)]
pub struct Configuration {
    hash_function: Arc<dyn HashFunction>,
    replica_count: u32,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    pub fn hash_function(&self) -> &Arc<dyn HashFunction> {
        &self.hash_function
    }

    /// Number of virtual nodes spawned for a node added without an explicit count.
    pub fn replica_count(&self) -> u32 {
        self.replica_count
    }

    /// Maps a name or key onto the ring.
    ///
    /// The raw hash is reinterpreted as unsigned rather than folded with `abs`,
    /// so every raw value has a distinct position.
    pub(crate) fn position(&self, value: &str) -> u32 {
        self.hash_function.compute(value) as u32
    }
}

impl Default for Configuration {
    fn default() -> Self {
        ConfigurationBuilder::new().build()
    }
}

/// Configurations are equal when they share one hash function instance and
/// spawn the same number of replicas.
impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.replica_count == other.replica_count
            && Arc::ptr_eq(&self.hash_function, &other.hash_function)
    }
}

impl Eq for Configuration {}

impl Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("hash_function", &self.hash_function)
            .field("replica_count", &self.replica_count)
            .finish()
    }
}

pub struct ConfigurationBuilder {
    hash_function: Arc<dyn HashFunction>,
    replica_count: u32,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            hash_function: Arc::new(Fnv1a32),
            replica_count: DEFAULT_REPLICA_COUNT,
        }
    }

    pub fn hash_function<H>(self, hash_function: H) -> Self
    where
        H: HashFunction + 'static,
    {
        self.shared_hash_function(Arc::new(hash_function))
    }

    pub fn shared_hash_function(mut self, hash_function: Arc<dyn HashFunction>) -> Self {
        self.hash_function = hash_function;
        self
    }

    pub fn replica_count(mut self, replica_count: u32) -> Self {
        self.replica_count = replica_count;
        self
    }

    pub fn build(self) -> Configuration {
        Configuration {
            hash_function: self.hash_function,
            replica_count: self.replica_count,
        }
    }
}
