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

use clap::Parser;
use exn::Result;
use thiserror::Error;

mod config;
mod lookup;
mod router;
mod show;
mod telemetry;

#[derive(Debug, clap::Parser)]
#[command(name = "annulus", version)]
struct Command {
    #[clap(subcommand)]
    cmd: SubCommand,
}

impl Command {
    pub fn run(self) -> Result<(), Error> {
        match self.cmd {
            SubCommand::Lookup(cmd) => cmd.run(),
            SubCommand::Show(cmd) => cmd.run(),
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum SubCommand {
    /// Resolve keys to the nodes owning them.
    Lookup(lookup::CommandLookup),
    /// Print every position of the ring.
    Show(show::CommandShow),
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Error(String);

fn main() -> Result<(), Error> {
    let cmd = Command::parse();
    cmd.run()
}
