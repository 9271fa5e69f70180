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

pub mod args;
mod builder;
mod writer_config;

pub use args::WriterConfigArgs;
pub use builder::{
    WriterConfigBuilder, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF_MILLIS,
    DEFAULT_MAX_BACKOFF_MILLIS, DEFAULT_RETRY_ATTEMPTS, DEFAULT_TRANSACTION_TIMEOUT_MILLIS,
    MIN_TRANSACTION_TIMEOUT_MILLIS,
};
pub use writer_config::{WriterConfig, WRITER_CONFIG_VERSION};
