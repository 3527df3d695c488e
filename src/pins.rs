//! GPIO / peripheral assignments for the coprocessor link.
//!
//! Single source of truth: the binary references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// SPI2 (FSPI) to the AHRS coprocessor
// ---------------------------------------------------------------------------

/// Serial clock.
pub const AHRS_SPI_SCLK_GPIO: i32 = 12;
/// Master out, coprocessor in.
pub const AHRS_SPI_MOSI_GPIO: i32 = 11;
/// Master in, coprocessor out.
pub const AHRS_SPI_MISO_GPIO: i32 = 13;
/// Chip select (active low, driven by the SPI device driver).
pub const AHRS_SPI_CS_GPIO: i32 = 10;

/// Bus clock.  The coprocessor's SPI slave tops out above this; lower it
/// on long harnesses.
pub const AHRS_SPI_BAUDRATE_HZ: u32 = 1_000_000;
