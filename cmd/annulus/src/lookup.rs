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

use clap::ValueHint;
use exn::Result;
use exn::ResultExt;

use crate::Error;
use crate::router::Router;

#[derive(Debug, clap::Parser)]
pub struct CommandLookup {
    #[clap(short, long, help = "Path to config file", value_hint = ValueHint::FilePath)]
    config_file: PathBuf,
    /// Keys to resolve.
    #[clap(required = true)]
    keys: Vec<String>,
}

impl CommandLookup {
    pub fn run(self) -> Result<(), Error> {
        let router = Router::bootstrap(self.config_file)?;
        for line in resolve(&router, &self.keys)? {
            println!("{line}");
        }
        Ok(())
    }
}

fn resolve(router: &Router, keys: &[String]) -> Result<Vec<String>, Error> {
    keys.iter()
        .map(|key| {
            let node = router
                .find_node(key)
                .or_raise(|| Error(format!("failed to find node for key {key}")))?;
            log::debug!("resolved key {key} to node {node}");
            Ok(format!("{key} -> {node}"))
        })
        .collect()
}
