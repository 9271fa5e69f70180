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

//! Configuration of the event stream writer: retry backoff, transaction lease timing, connection pooling,
//! automatic time notes and large event handling.
//!
//! ```
//! use writer_config::prelude::*;
//!
//! let config = WriterConfig::builder()
//!     .retry_attempts(3)
//!     .transaction_timeout_millis(30_000)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.retry_attempts(), 3);
//! ```

pub mod bytes_serializable;
pub mod config;
pub mod error;
pub mod prelude;
pub mod validatable;
