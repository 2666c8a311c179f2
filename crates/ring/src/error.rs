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

use thiserror::Error;

/// Errors raised by ring and cluster operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// An argument failed validation, e.g. a blank node name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The position computed for `name` is already taken.
    #[error("node {name} collides with an existing entry at position {position}")]
    DuplicateNode { name: String, position: u32 },
    /// A lookup was attempted on a ring without entries.
    #[error("cannot find node from an empty ring")]
    EmptyRing,
}
