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

//! Loading the writer configuration from command-line arguments and environment variables.

use crate::config::builder::WriterConfigBuilder;
use crate::config::writer_config::WriterConfig;
use crate::error::WriterConfigError;
use clap::Parser;
use std::ffi::OsString;

/// Writer configuration overrides taken from the command line, falling back to `IGGY_WRITER_*` environment variables.
///
/// Every argument is optional, anything not provided keeps the builder default.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "writer", about = "Event stream writer configuration")]
pub struct WriterConfigArgs {
    /// Initial backoff in milliseconds used in the retry logic of the writer
    #[arg(
        long,
        env = "IGGY_WRITER_INITIAL_BACKOFF_MILLIS",
        allow_negative_numbers = true
    )]
    pub initial_backoff_millis: Option<i32>,

    /// Maximum backoff in milliseconds used in the retry logic of the writer
    #[arg(
        long,
        env = "IGGY_WRITER_MAX_BACKOFF_MILLIS",
        allow_negative_numbers = true
    )]
    pub max_backoff_millis: Option<i32>,

    /// Maximum retry attempts performed by the writer before giving up
    #[arg(long, env = "IGGY_WRITER_RETRY_ATTEMPTS", allow_negative_numbers = true)]
    pub retry_attempts: Option<i32>,

    /// Backoff multiplier used in the retry logic of the writer
    #[arg(
        long,
        env = "IGGY_WRITER_BACKOFF_MULTIPLIER",
        allow_negative_numbers = true
    )]
    pub backoff_multiplier: Option<i32>,

    /// Enable connection pooling for the writer
    #[arg(long, env = "IGGY_WRITER_CONNECTION_POOLING_ENABLED")]
    pub connection_pooling_enabled: Option<bool>,

    /// Transaction lease renewal period in milliseconds
    #[arg(
        long,
        env = "IGGY_WRITER_TRANSACTION_TIMEOUT_MILLIS",
        allow_negative_numbers = true
    )]
    pub transaction_timeout_millis: Option<i64>,

    /// Periodically note the wall-clock time
    #[arg(long, env = "IGGY_WRITER_AUTO_NOTE_TIME_ENABLED")]
    pub auto_note_time_enabled: Option<bool>,

    /// Process events larger than the maximum event size as large events
    #[arg(long, env = "IGGY_WRITER_LARGE_EVENTS_ENABLED")]
    pub large_events_enabled: Option<bool>,
}

impl WriterConfigArgs {
    /// Parses the arguments (the first one being the program name) and builds the configuration.
    pub fn load<I, T>(args: I) -> Result<WriterConfig, WriterConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = Self::try_parse_from(args)
            .map_err(|error| WriterConfigError::InvalidArguments(error.to_string()))?;
        Ok(args.into_builder().build()?)
    }

    /// Applies the provided values on top of a fresh builder.
    pub fn into_builder(self) -> WriterConfigBuilder {
        let mut builder = WriterConfigBuilder::new();
        if let Some(value) = self.initial_backoff_millis {
            builder = builder.initial_backoff_millis(value);
        }
        if let Some(value) = self.max_backoff_millis {
            builder = builder.max_backoff_millis(value);
        }
        if let Some(value) = self.retry_attempts {
            builder = builder.retry_attempts(value);
        }
        if let Some(value) = self.backoff_multiplier {
            builder = builder.backoff_multiplier(value);
        }
        if let Some(value) = self.connection_pooling_enabled {
            builder = builder.connection_pooling_enabled(value);
        }
        if let Some(value) = self.transaction_timeout_millis {
            builder = builder.transaction_timeout_millis(value);
        }
        if let Some(value) = self.auto_note_time_enabled {
            builder = builder.auto_note_time_enabled(value);
        }
        if let Some(value) = self.large_events_enabled {
            builder = builder.large_events_enabled(value);
        }
        builder
    }
}
