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

use crate::Error;
use crate::router::Router;

#[derive(Debug, clap::Parser)]
pub struct CommandShow {
    #[clap(short, long, help = "Path to config file", value_hint = ValueHint::FilePath)]
    config_file: PathBuf,
}

impl CommandShow {
    pub fn run(self) -> Result<(), Error> {
        let router = Router::bootstrap(self.config_file)?;
        log::info!("ring has {} positions", router.size());
        for line in render(&router) {
            println!("{line}");
        }
        Ok(())
    }
}

fn render(router: &Router) -> Vec<String> {
    router
        .slots()
        .into_iter()
        .map(|(position, slot)| {
            let owner = slot.root_node();
            if slot.is_virtual() {
                format!("{position} {owner} [virtual]")
            } else {
                format!("{position} {owner}")
            }
        })
        .collect()
}
