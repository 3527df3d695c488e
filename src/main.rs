//! AHRS comms firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  SpiLink (AhrsLink)   MemoryObjectStore   MonotonicClock     │
//! │          └────────────── Board ───────────────┘              │
//! │  LogEventSink (EventSink)          Watchdog                  │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │        AhrsCommsService (session FSM, pure logic)      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::Result;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::config::Config as SpiConfig;
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_svc::hal::units::Hertz;
use log::info;

use ahrscomms::adapters::board::Board;
use ahrscomms::adapters::log_sink::LogEventSink;
use ahrscomms::adapters::memory_store::MemoryObjectStore;
use ahrscomms::adapters::spi_link::SpiLink;
use ahrscomms::adapters::time::MonotonicClock;
use ahrscomms::app::service::AhrsCommsService;
use ahrscomms::config::CommsConfig;
use ahrscomms::drivers::watchdog::Watchdog;
use ahrscomms::pins;
use ahrscomms::tracker::ConfigSyncTracker;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AHRS comms v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = CommsConfig::default();
    config.validate()?;

    // ── 3. SPI2 to the coprocessor ────────────────────────────
    let peripherals = Peripherals::take()?;
    // SAFETY: the pin numbers come from `pins` and nothing else claims them.
    let (sclk, mosi, miso, cs) = unsafe {
        (
            AnyIOPin::new(pins::AHRS_SPI_SCLK_GPIO),
            AnyIOPin::new(pins::AHRS_SPI_MOSI_GPIO),
            AnyIOPin::new(pins::AHRS_SPI_MISO_GPIO),
            AnyIOPin::new(pins::AHRS_SPI_CS_GPIO),
        )
    };
    let driver = SpiDriver::new(
        peripherals.spi2,
        sclk,
        mosi,
        Some(miso),
        &SpiDriverConfig::new(),
    )?;
    let spi = SpiDeviceDriver::new(
        driver,
        Some(cs),
        &SpiConfig::new().baudrate(Hertz(pins::AHRS_SPI_BAUDRATE_HZ)),
    )?;

    // ── 4. Object store + change tracking ─────────────────────
    let tracker = Arc::new(ConfigSyncTracker::new());
    let mut store = MemoryObjectStore::new();
    ConfigSyncTracker::connect(&tracker, &mut store);

    // ── 5. Session ────────────────────────────────────────────
    let mut board = Board::new(SpiLink::new(spi, &config), store, MonotonicClock::new());
    let mut service = AhrsCommsService::new(config, tracker)?;
    let mut sink = LogEventSink::new();
    let mut watchdog = Watchdog::default();

    service.run(&mut board, &mut sink, || watchdog.feed())
}
