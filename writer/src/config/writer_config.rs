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

use crate::bytes_serializable::BytesSerializable;
use crate::config::builder::WriterConfigBuilder;
use crate::error::WriterConfigError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use humantime::format_duration;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

/// Current version of the binary representation produced by `to_bytes`.
pub const WRITER_CONFIG_VERSION: u8 = 1;

// version + 4 x i32 + bool + i64 + 2 x bool
const WRITER_CONFIG_V1_SIZE: usize = 1 + 4 * 4 + 1 + 8 + 1 + 1;

/// The configuration of the event stream writer.
///
/// Instances can only be obtained through `WriterConfigBuilder::build`, `Default`, or by decoding a persisted
/// configuration, all of which validate the values, so every live `WriterConfig` satisfies:
/// - `initial_backoff_millis >= 0`
/// - `max_backoff_millis >= 0`
/// - `backoff_multiplier >= 0`
/// - `retry_attempts >= 0`
/// - `transaction_timeout_millis >= MIN_TRANSACTION_TIMEOUT_MILLIS`
///
/// Missing fields of a persisted configuration are backfilled with their defaults when it is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WriterConfigBuilder")]
pub struct WriterConfig {
    pub(crate) initial_backoff_millis: i32,
    pub(crate) max_backoff_millis: i32,
    pub(crate) retry_attempts: i32,
    pub(crate) backoff_multiplier: i32,
    pub(crate) connection_pooling_enabled: bool,
    pub(crate) transaction_timeout_millis: i64,
    pub(crate) auto_note_time_enabled: bool,
    pub(crate) large_events_enabled: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfigBuilder::new().resolve()
    }
}

impl WriterConfig {
    /// Creates a new `WriterConfigBuilder` with no overrides.
    pub fn builder() -> WriterConfigBuilder {
        WriterConfigBuilder::new()
    }

    /// Creates a builder populated with the values of this configuration.
    pub fn to_builder(&self) -> WriterConfigBuilder {
        WriterConfigBuilder::new()
            .initial_backoff_millis(self.initial_backoff_millis)
            .max_backoff_millis(self.max_backoff_millis)
            .retry_attempts(self.retry_attempts)
            .backoff_multiplier(self.backoff_multiplier)
            .connection_pooling_enabled(self.connection_pooling_enabled)
            .transaction_timeout_millis(self.transaction_timeout_millis)
            .auto_note_time_enabled(self.auto_note_time_enabled)
            .large_events_enabled(self.large_events_enabled)
    }

    /// Initial backoff in milliseconds used in the retry logic of the writer.
    pub fn initial_backoff_millis(&self) -> i32 {
        self.initial_backoff_millis
    }

    /// Maximum backoff in milliseconds used in the retry logic of the writer.
    pub fn max_backoff_millis(&self) -> i32 {
        self.max_backoff_millis
    }

    /// Maximum retry attempts performed by the writer before giving up.
    pub fn retry_attempts(&self) -> i32 {
        self.retry_attempts
    }

    /// Backoff multiplier used in the retry logic of the writer.
    pub fn backoff_multiplier(&self) -> i32 {
        self.backoff_multiplier
    }

    /// Whether the writer reuses pooled connections.
    pub fn connection_pooling_enabled(&self) -> bool {
        self.connection_pooling_enabled
    }

    /// The transaction lease renewal period in milliseconds.
    ///
    /// In every period the writer must send at least one ping to keep an open transaction alive, otherwise
    /// the transaction is aborted. The value is also the basis of the maximum time a transaction may stay open,
    /// which the controller caps at the lower of one day and 1000 times this period. That cap, as well as the
    /// controller-wide maximum lease, is enforced on the controller side and not by this configuration.
    pub fn transaction_timeout_millis(&self) -> i64 {
        self.transaction_timeout_millis
    }

    /// Whether the writer periodically notes the current wall-clock time.
    pub fn auto_note_time_enabled(&self) -> bool {
        self.auto_note_time_enabled
    }

    /// Whether events larger than the maximum single event size are processed as large events.
    pub fn large_events_enabled(&self) -> bool {
        self.large_events_enabled
    }

    pub fn initial_backoff(&self) -> Duration {
        // Non-negative by construction.
        Duration::from_millis(self.initial_backoff_millis as u64)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_millis as u64)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_millis as u64)
    }
}

impl Display for WriterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "initial_backoff: {}, max_backoff: {}, retry_attempts: {}, backoff_multiplier: {}, connection_pooling_enabled: {}, transaction_timeout: {}, auto_note_time_enabled: {}, large_events_enabled: {}",
            format_duration(self.initial_backoff()),
            format_duration(self.max_backoff()),
            self.retry_attempts,
            self.backoff_multiplier,
            self.connection_pooling_enabled,
            format_duration(self.transaction_timeout()),
            self.auto_note_time_enabled,
            self.large_events_enabled
        )
    }
}

impl TryFrom<WriterConfigBuilder> for WriterConfig {
    type Error = crate::error::InvalidConfigurationError;

    fn try_from(builder: WriterConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// Binary layout (little endian), version 1:
///
/// | version | initial_backoff | max_backoff | retry_attempts | backoff_multiplier | pooling | txn_timeout | note_time | large_events |
/// |   u8    |       i32       |     i32     |      i32       |        i32         |   u8    |     i64     |    u8     |      u8      |
///
/// Fields are only ever appended. A payload that ends on a field boundary is decoded with the missing fields
/// backfilled from the defaults.
impl BytesSerializable for WriterConfig {
    fn from_bytes(bytes: Bytes) -> Result<Self, WriterConfigError> {
        if bytes.is_empty() {
            return Err(WriterConfigError::InvalidBytes {
                expected: 1,
                actual: 0,
            });
        }

        let total = bytes.len();
        let mut reader = FieldReader {
            bytes,
            position: 0,
        };
        let version = reader.bytes.get_u8();
        reader.position += 1;
        if version != WRITER_CONFIG_VERSION {
            return Err(WriterConfigError::UnsupportedVersion(version));
        }

        let mut builder = WriterConfigBuilder::new();
        if let Some(value) = reader.read_i32()? {
            builder = builder.initial_backoff_millis(value);
        }
        if let Some(value) = reader.read_i32()? {
            builder = builder.max_backoff_millis(value);
        }
        if let Some(value) = reader.read_i32()? {
            builder = builder.retry_attempts(value);
        }
        if let Some(value) = reader.read_i32()? {
            builder = builder.backoff_multiplier(value);
        }
        if let Some(value) = reader.read_bool("connection_pooling_enabled")? {
            builder = builder.connection_pooling_enabled(value);
        }
        if let Some(value) = reader.read_i64()? {
            builder = builder.transaction_timeout_millis(value);
        }
        if let Some(value) = reader.read_bool("auto_note_time_enabled")? {
            builder = builder.auto_note_time_enabled(value);
        }
        if let Some(value) = reader.read_bool("large_events_enabled")? {
            builder = builder.large_events_enabled(value);
        }

        if reader.bytes.has_remaining() {
            return Err(WriterConfigError::InvalidBytes {
                expected: WRITER_CONFIG_V1_SIZE,
                actual: total,
            });
        }

        Ok(builder.build()?)
    }

    fn write_to_buffer(&self, buf: &mut BytesMut) {
        buf.put_u8(WRITER_CONFIG_VERSION);
        buf.put_i32_le(self.initial_backoff_millis);
        buf.put_i32_le(self.max_backoff_millis);
        buf.put_i32_le(self.retry_attempts);
        buf.put_i32_le(self.backoff_multiplier);
        buf.put_u8(self.connection_pooling_enabled as u8);
        buf.put_i64_le(self.transaction_timeout_millis);
        buf.put_u8(self.auto_note_time_enabled as u8);
        buf.put_u8(self.large_events_enabled as u8);
    }

    fn get_buffer_size(&self) -> usize {
        WRITER_CONFIG_V1_SIZE
    }
}

struct FieldReader {
    bytes: Bytes,
    position: usize,
}

impl FieldReader {
    fn ensure(&self, size: usize) -> Result<bool, WriterConfigError> {
        let remaining = self.bytes.remaining();
        if remaining == 0 {
            return Ok(false);
        }
        if remaining < size {
            return Err(WriterConfigError::InvalidBytes {
                expected: self.position + size,
                actual: self.position + remaining,
            });
        }
        Ok(true)
    }

    fn read_i32(&mut self) -> Result<Option<i32>, WriterConfigError> {
        if !self.ensure(4)? {
            return Ok(None);
        }
        self.position += 4;
        Ok(Some(self.bytes.get_i32_le()))
    }

    fn read_i64(&mut self) -> Result<Option<i64>, WriterConfigError> {
        if !self.ensure(8)? {
            return Ok(None);
        }
        self.position += 8;
        Ok(Some(self.bytes.get_i64_le()))
    }

    fn read_bool(&mut self, field: &'static str) -> Result<Option<bool>, WriterConfigError> {
        if !self.ensure(1)? {
            return Ok(None);
        }
        self.position += 1;
        match self.bytes.get_u8() {
            0 => Ok(Some(false)),
            1 => Ok(Some(true)),
            value => Err(WriterConfigError::InvalidBoolean { field, value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidConfigurationError;

    fn custom_config() -> WriterConfig {
        WriterConfig::builder()
            .initial_backoff_millis(5)
            .max_backoff_millis(30_000)
            .retry_attempts(3)
            .backoff_multiplier(2)
            .connection_pooling_enabled(true)
            .transaction_timeout_millis(10_000)
            .auto_note_time_enabled(true)
            .large_events_enabled(true)
            .build()
            .unwrap()
    }

    #[test]
    fn default_config_should_equal_fresh_builder_output() {
        let config = WriterConfig::default();
        assert_eq!(config, WriterConfig::builder().build().unwrap());
    }

    #[test]
    fn to_builder_should_reproduce_the_same_config() {
        let config = custom_config();
        assert_eq!(config.to_builder().build().unwrap(), config);
    }

    #[test]
    fn to_builder_should_allow_deriving_a_variant() {
        let config = custom_config();
        let variant = config.to_builder().retry_attempts(7).build().unwrap();
        assert_eq!(variant.retry_attempts(), 7);
        assert_eq!(variant.max_backoff_millis(), 30_000);
        assert_ne!(variant, config);
    }

    #[test]
    fn durations_should_match_millis() {
        let config = WriterConfig::default();
        assert_eq!(config.initial_backoff(), Duration::from_millis(1));
        assert_eq!(config.max_backoff(), Duration::from_secs(20));
        assert_eq!(config.transaction_timeout(), Duration::from_millis(599_999));
    }

    #[test]
    fn display_should_be_deterministic() {
        let config = WriterConfig::default();
        assert_eq!(
            config.to_string(),
            "initial_backoff: 1ms, max_backoff: 20s, retry_attempts: 10, backoff_multiplier: 10, connection_pooling_enabled: false, transaction_timeout: 9m 59s 999ms, auto_note_time_enabled: false, large_events_enabled: false"
        );
        assert_eq!(config.to_string(), WriterConfig::default().to_string());
    }

    #[test]
    fn should_be_serialized_as_bytes() {
        let config = custom_config();
        let bytes = config.to_bytes();

        assert_eq!(bytes.len(), WRITER_CONFIG_V1_SIZE);
        assert_eq!(bytes[0], WRITER_CONFIG_VERSION);
        assert_eq!(i32::from_le_bytes(bytes[1..5].try_into().unwrap()), 5);
        assert_eq!(i32::from_le_bytes(bytes[5..9].try_into().unwrap()), 30_000);
        assert_eq!(i32::from_le_bytes(bytes[9..13].try_into().unwrap()), 3);
        assert_eq!(i32::from_le_bytes(bytes[13..17].try_into().unwrap()), 2);
        assert_eq!(bytes[17], 1);
        assert_eq!(i64::from_le_bytes(bytes[18..26].try_into().unwrap()), 10_000);
        assert_eq!(bytes[26], 1);
        assert_eq!(bytes[27], 1);
    }

    #[test]
    fn should_be_deserialized_from_bytes() {
        let config = custom_config();
        let decoded = WriterConfig::from_bytes(config.to_bytes()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn payload_ending_on_field_boundary_should_backfill_defaults() {
        let config = custom_config();
        // Keep the version and the four numeric fields only.
        let bytes = config.to_bytes().slice(..17);

        let decoded = WriterConfig::from_bytes(bytes).unwrap();

        assert_eq!(decoded.initial_backoff_millis(), 5);
        assert_eq!(decoded.backoff_multiplier(), 2);
        assert!(!decoded.connection_pooling_enabled());
        assert_eq!(decoded.transaction_timeout_millis(), 599_999);
        assert!(!decoded.large_events_enabled());
    }

    #[test]
    fn version_only_payload_should_decode_to_defaults() {
        let bytes = Bytes::from_static(&[WRITER_CONFIG_VERSION]);
        assert_eq!(
            WriterConfig::from_bytes(bytes).unwrap(),
            WriterConfig::default()
        );
    }

    #[test]
    fn payload_cut_mid_field_should_fail() {
        let bytes = WriterConfig::default().to_bytes().slice(..3);
        assert_eq!(
            WriterConfig::from_bytes(bytes).unwrap_err(),
            WriterConfigError::InvalidBytes {
                expected: 5,
                actual: 3
            }
        );
    }

    #[test]
    fn empty_payload_should_fail() {
        assert!(WriterConfig::from_bytes(Bytes::new()).is_err());
    }

    #[test]
    fn trailing_bytes_should_fail() {
        let mut bytes = BytesMut::new();
        WriterConfig::default().write_to_buffer(&mut bytes);
        bytes.put_u8(0);
        assert_eq!(
            WriterConfig::from_bytes(bytes.freeze()).unwrap_err(),
            WriterConfigError::InvalidBytes {
                expected: WRITER_CONFIG_V1_SIZE,
                actual: WRITER_CONFIG_V1_SIZE + 1
            }
        );
    }

    #[test]
    fn unknown_version_should_fail() {
        let mut bytes = BytesMut::from(&WriterConfig::default().to_bytes()[..]);
        bytes[0] = 2;
        assert_eq!(
            WriterConfig::from_bytes(bytes.freeze()).unwrap_err(),
            WriterConfigError::UnsupportedVersion(2)
        );
    }

    #[test]
    fn invalid_boolean_should_fail() {
        let mut bytes = BytesMut::from(&WriterConfig::default().to_bytes()[..]);
        bytes[17] = 2;
        assert_eq!(
            WriterConfig::from_bytes(bytes.freeze()).unwrap_err(),
            WriterConfigError::InvalidBoolean {
                field: "connection_pooling_enabled",
                value: 2
            }
        );
    }

    #[test]
    fn decoded_values_should_be_validated() {
        let mut bytes = BytesMut::new();
        bytes.put_u8(WRITER_CONFIG_VERSION);
        bytes.put_i32_le(1);
        bytes.put_i32_le(20_000);
        bytes.put_i32_le(-1);

        assert_eq!(
            WriterConfig::from_bytes(bytes.freeze()).unwrap_err(),
            WriterConfigError::InvalidConfiguration(
                InvalidConfigurationError::NegativeRetryAttempts { value: -1 }
            )
        );
    }
}
