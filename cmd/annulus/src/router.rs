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

use std::path::PathBuf;

use annulus_ring::Cluster;
use annulus_ring::Node;
use annulus_ring::Ring;
use annulus_ring::RingError;
use annulus_ring::Slot;
use exn::Result;
use exn::ResultExt;

use crate::Error;
use crate::config::Config;
use crate::config::LoadConfigResult;
use crate::config::RingVariant;
use crate::config::load_config;
use crate::telemetry;

/// The ring variant selected by the config file.
#[derive(Debug)]
pub enum Router {
    Ring(Ring),
    Cluster(Cluster),
}

impl Router {
    /// Loads the config file, sets up logging and builds the ring it describes.
    pub fn bootstrap(config_file: PathBuf) -> Result<Self, Error> {
        let LoadConfigResult { config, warnings } = load_config(config_file)?;
        telemetry::init(&config.telemetry)?;
        for warning in warnings {
            log::warn!("{warning}");
        }
        log::info!("annulus is starting with loaded config: {config:#?}");

        let router = Router::build(&config)?;
        log::debug!("ring layout: {router:?}");
        Ok(router)
    }

    pub fn build(config: &Config) -> Result<Self, Error> {
        let configuration = config.ring.build_configuration();
        let mut router = match config.ring.variant {
            RingVariant::Ring => Router::Ring(Ring::new(configuration)),
            RingVariant::Cluster => Router::Cluster(Cluster::new(configuration)),
        };

        for node in &config.nodes {
            Node::new(node.name.as_str())
                .and_then(|n| router.add_node(n, node.replicas))
                .or_raise(|| Error(format!("failed to add node {:?}", node.name)))?;
        }
        Ok(router)
    }

    fn add_node(
        &mut self,
        node: Node,
        replicas: Option<u32>,
    ) -> std::result::Result<(), RingError> {
        match (self, replicas) {
            (Router::Ring(ring), Some(replicas)) => ring.add_node_with_replicas(node, replicas),
            (Router::Ring(ring), None) => ring.add_node(node),
            (Router::Cluster(cluster), Some(replicas)) => {
                cluster.add_node_with_replicas(node, replicas)
            }
            (Router::Cluster(cluster), None) => cluster.add_node(node),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Router::Ring(ring) => ring.size(),
            Router::Cluster(cluster) => cluster.size(),
        }
    }

    pub fn find_node(&self, key: &str) -> std::result::Result<&Node, RingError> {
        match self {
            Router::Ring(ring) => ring.find_node(key),
            Router::Cluster(cluster) => cluster.find_node(key),
        }
    }

    pub fn slots(&self) -> Vec<(u32, Slot<'_>)> {
        match self {
            Router::Ring(ring) => ring.slots().collect(),
            Router::Cluster(cluster) => cluster.slots().collect(),
        }
    }
}
