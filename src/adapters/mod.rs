//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements            | Connects to                 |
//! |----------------|-----------------------|-----------------------------|
//! | `board`        | AhrsLink, ObjectStore | the three adapters below    |
//! |                | Clock                 |                             |
//! | `spi_link`     | AhrsLink              | coprocessor over SPI        |
//! | `memory_store` | ObjectStore           | in-memory records           |
//! | `time`         | Clock                 | esp_timer / std Instant     |
//! | `log_sink`     | EventSink             | serial log output           |

pub mod board;
pub mod log_sink;
pub mod memory_store;
pub mod spi_link;
pub mod time;
