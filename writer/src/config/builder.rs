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

use crate::config::writer_config::WriterConfig;
use crate::error::InvalidConfigurationError;
use crate::validatable::Validatable;
use serde::Deserialize;
use tracing::{debug, error};

pub const DEFAULT_INITIAL_BACKOFF_MILLIS: i32 = 1;
pub const DEFAULT_MAX_BACKOFF_MILLIS: i32 = 20_000;
pub const DEFAULT_RETRY_ATTEMPTS: i32 = 10;
pub const DEFAULT_BACKOFF_MULTIPLIER: i32 = 10;
pub const DEFAULT_TRANSACTION_TIMEOUT_MILLIS: i64 = 600 * 1000 - 1;
/// The shortest accepted transaction lease renewal period (10 seconds).
pub const MIN_TRANSACTION_TIMEOUT_MILLIS: i64 = 10_000;

/// The builder for the `WriterConfig` instance.
///
/// Setters only record the value, all the checks happen in `build`. Any field left unset resolves to its default.
/// The builder is not consumed by `build`, so it can be built again or cloned to derive other configurations.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WriterConfigBuilder {
    initial_backoff_millis: Option<i32>,
    max_backoff_millis: Option<i32>,
    retry_attempts: Option<i32>,
    backoff_multiplier: Option<i32>,
    connection_pooling_enabled: Option<bool>,
    transaction_timeout_millis: Option<i64>,
    auto_note_time_enabled: Option<bool>,
    large_events_enabled: Option<bool>,
}

impl WriterConfigBuilder {
    /// Creates a new `WriterConfigBuilder` without any overrides.
    pub fn new() -> Self {
        WriterConfigBuilder::default()
    }

    /// Sets the initial backoff in milliseconds used in the retry logic of the writer. Defaults to 1 ms.
    pub fn initial_backoff_millis(mut self, value: i32) -> Self {
        self.initial_backoff_millis = Some(value);
        self
    }

    /// Sets the maximum backoff in milliseconds used in the retry logic of the writer. Defaults to 20000 ms.
    pub fn max_backoff_millis(mut self, value: i32) -> Self {
        self.max_backoff_millis = Some(value);
        self
    }

    /// Sets the maximum retry attempts performed by the writer before giving up. Defaults to 10.
    pub fn retry_attempts(mut self, value: i32) -> Self {
        self.retry_attempts = Some(value);
        self
    }

    /// Sets the backoff multiplier used in the retry logic of the writer. Defaults to 10.
    pub fn backoff_multiplier(mut self, value: i32) -> Self {
        self.backoff_multiplier = Some(value);
        self
    }

    /// Enables or disables connection pooling for the writer. Disabled by default.
    pub fn connection_pooling_enabled(mut self, value: bool) -> Self {
        self.connection_pooling_enabled = Some(value);
        self
    }

    /// Sets the transaction lease renewal period in milliseconds. Defaults to 599999 ms, must be at least 10000 ms.
    pub fn transaction_timeout_millis(mut self, value: i64) -> Self {
        self.transaction_timeout_millis = Some(value);
        self
    }

    /// Enables or disables periodically noting the wall-clock time. Disabled by default.
    pub fn auto_note_time_enabled(mut self, value: bool) -> Self {
        self.auto_note_time_enabled = Some(value);
        self
    }

    /// Enables or disables large event processing. Disabled by default.
    pub fn large_events_enabled(mut self, value: bool) -> Self {
        self.large_events_enabled = Some(value);
        self
    }

    /// Build the `WriterConfig` instance.
    /// This method returns an error for the first violated invariant, checked in the order:
    /// initial backoff, max backoff, backoff multiplier, retry attempts, transaction timeout.
    pub fn build(&self) -> Result<WriterConfig, InvalidConfigurationError> {
        let config = self.resolve();
        if let Err(error) = check(&config) {
            error!("Invalid writer configuration: {error}");
            return Err(error);
        }

        debug!("Built writer configuration: {config}");
        Ok(config)
    }

    /// Applies the defaults to every field that was not overridden, without validating.
    pub(crate) fn resolve(&self) -> WriterConfig {
        WriterConfig {
            initial_backoff_millis: self
                .initial_backoff_millis
                .unwrap_or(DEFAULT_INITIAL_BACKOFF_MILLIS),
            max_backoff_millis: self
                .max_backoff_millis
                .unwrap_or(DEFAULT_MAX_BACKOFF_MILLIS),
            retry_attempts: self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            backoff_multiplier: self
                .backoff_multiplier
                .unwrap_or(DEFAULT_BACKOFF_MULTIPLIER),
            connection_pooling_enabled: self.connection_pooling_enabled.unwrap_or(false),
            transaction_timeout_millis: self
                .transaction_timeout_millis
                .unwrap_or(DEFAULT_TRANSACTION_TIMEOUT_MILLIS),
            auto_note_time_enabled: self.auto_note_time_enabled.unwrap_or(false),
            large_events_enabled: self.large_events_enabled.unwrap_or(false),
        }
    }
}

impl Validatable<InvalidConfigurationError> for WriterConfigBuilder {
    fn validate(&self) -> Result<(), InvalidConfigurationError> {
        check(&self.resolve())
    }
}

fn check(config: &WriterConfig) -> Result<(), InvalidConfigurationError> {
    if config.initial_backoff_millis < 0 {
        return Err(InvalidConfigurationError::NegativeInitialBackoff {
            value: config.initial_backoff_millis,
        });
    }

    if config.max_backoff_millis < 0 {
        return Err(InvalidConfigurationError::NegativeMaxBackoff {
            value: config.max_backoff_millis,
        });
    }

    if config.backoff_multiplier < 0 {
        return Err(InvalidConfigurationError::NegativeBackoffMultiplier {
            value: config.backoff_multiplier,
        });
    }

    if config.retry_attempts < 0 {
        return Err(InvalidConfigurationError::NegativeRetryAttempts {
            value: config.retry_attempts,
        });
    }

    if config.transaction_timeout_millis < MIN_TRANSACTION_TIMEOUT_MILLIS {
        return Err(InvalidConfigurationError::TransactionTimeoutTooShort {
            value: config.transaction_timeout_millis,
            min: MIN_TRANSACTION_TIMEOUT_MILLIS,
        });
    }

    Ok(())
}
