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

use exn::Result;
use exn::bail;
use logforth::append;
use logforth::filter::EnvFilter;
use logforth::filter::env_filter::EnvFilterBuilder;

use crate::Error;
use crate::config::TelemetryConfig;

pub fn init(config: &TelemetryConfig) -> Result<(), Error> {
    let Some(stderr) = &config.logs.stderr else {
        return Ok(());
    };

    let filter = make_rust_log_filter_with_default_env(&stderr.filter)?;
    logforth::builder()
        .dispatch(|d| d.filter(filter).append(append::Stderr::default()))
        .apply();
    Ok(())
}

fn make_rust_log_filter(filter: &str) -> Result<EnvFilter, Error> {
    match EnvFilterBuilder::new().try_parse(filter.trim()) {
        Ok(builder) => Ok(EnvFilter::new(builder)),
        Err(err) => bail!(Error(format!("failed to parse log filter {filter}: {err}"))),
    }
}

fn make_rust_log_filter_with_default_env(filter: &str) -> Result<EnvFilter, Error> {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        make_rust_log_filter(&filter)
    } else {
        make_rust_log_filter(filter)
    }
}
