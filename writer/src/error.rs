// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use thiserror::Error;

/// Returned by `WriterConfigBuilder::build` when the accumulated values break one of the writer configuration invariants.
///
/// Only the first violated invariant is reported.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidConfigurationError {
    #[error("Backoff times must be non-negative, initial backoff was {value} ms")]
    NegativeInitialBackoff { value: i32 },
    #[error("Backoff times must be non-negative, max backoff was {value} ms")]
    NegativeMaxBackoff { value: i32 },
    #[error("Backoff multiplier must be non-negative, was {value}")]
    NegativeBackoffMultiplier { value: i32 },
    #[error("Retry attempts must be non-negative, was {value}")]
    NegativeRetryAttempts { value: i32 },
    #[error("Transaction timeout must be at least {min} ms, was {value} ms")]
    TransactionTimeoutTooShort { value: i64, min: i64 },
}

/// Errors raised while decoding or loading a writer configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WriterConfigError {
    #[error("Invalid writer configuration: {0}")]
    InvalidConfiguration(#[from] InvalidConfigurationError),
    #[error("Unsupported writer configuration version: {0}")]
    UnsupportedVersion(u8),
    #[error("Invalid writer configuration bytes, expected {expected} bytes, got {actual}")]
    InvalidBytes { expected: usize, actual: usize },
    #[error("Invalid boolean value {value} for field {field}")]
    InvalidBoolean { field: &'static str, value: u8 },
    #[error("Invalid writer configuration arguments: {0}")]
    InvalidArguments(String),
}
