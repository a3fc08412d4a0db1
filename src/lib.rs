//! Lunar almanac: per-day moon phase, illumination and sidereal sign, plus
//! the folk, Tibetan, biodynamic and Mesoamerican labels read from them.
//!
//! ```
//! use chrono::NaiveDate;
//! use lunar_almanac::{compute_astro, compute_tradition, MoonPhase};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let astro = compute_astro(date);
//! let tradition = compute_tradition(&astro, date);
//!
//! assert_eq!(astro.phase, MoonPhase::WaningGibbous);
//! assert_eq!(tradition.commentary.len(), 4);
//! ```

pub mod astronomical;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod date_utils;
pub mod error;
pub mod tradition;

pub use astronomical::{compute_astro, AstroCalculator, AstroData, Element, MoonPhase, ZodiacSign};
pub use cache::Metrics;
pub use calendar::{Almanac, DayData, MonthGrid, WEEKDAY_HEADERS};
pub use config::Config;
pub use error::{AlmanacError, Result};
pub use tradition::{
    compute_tradition, BiodynamicType, TraditionData, TraditionMapper, Veintena, VeintenaPlacement,
};
