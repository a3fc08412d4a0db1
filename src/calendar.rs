use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Duration, FixedOffset, NaiveDate};
use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::astronomical::{AstroCalculator, AstroData, MoonPhase};
use crate::cache::{CalendarCache, Metrics};
use crate::config::Config;
use crate::date_utils::{days_in_month, first_of_month};
use crate::error::Result;
use crate::tradition::{TraditionData, TraditionMapper};

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Everything shown for one calendar cell or detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DayData {
    pub astro: AstroData,
    pub tradition: TraditionData,
}

impl DayData {
    pub fn compute(
        calculator: &AstroCalculator,
        mapper: &TraditionMapper,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Self> {
        let astro = calculator.compute_day(date, offset)?;
        let tradition = mapper.map(&astro);
        Ok(Self { astro, tradition })
    }
}

/// A month laid out Sunday-first, the way a wall calendar shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st (0 when the month starts on a Sunday).
    pub leading_blanks: u32,
    pub days: Vec<DayData>,
}

impl MonthGrid {
    pub fn cells(&self) -> impl Iterator<Item = Option<&DayData>> + '_ {
        std::iter::repeat(None)
            .take(self.leading_blanks as usize)
            .chain(self.days.iter().map(Some))
    }

    pub fn weeks(&self) -> Vec<Vec<Option<&DayData>>> {
        let cells: Vec<_> = self.cells().collect();
        cells.chunks(7).map(|week| week.to_vec()).collect()
    }

    pub fn day(&self, day: u32) -> Option<&DayData> {
        self.days.get(day.checked_sub(1)? as usize)
    }

    pub fn days_in_phase(&self, phase: MoonPhase) -> impl Iterator<Item = &DayData> + '_ {
        self.days.iter().filter(move |d| d.astro.phase == phase)
    }

    pub fn previous_month(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    pub fn next_month(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }
}

/// Cached, parallel front door to the lunar and tradition calculations.
pub struct Almanac {
    calculator: AstroCalculator,
    mapper: TraditionMapper,
    offset: FixedOffset,
    cache: Arc<RwLock<CalendarCache>>,
    metrics: Arc<Metrics>,
}

impl Almanac {
    pub fn new(config: &Config) -> Result<Self> {
        let offset = config.utc_offset()?;
        info!(
            utc_offset_minutes = config.utc_offset_minutes,
            cache_capacity = config.cache_capacity.get(),
            "almanac initialised"
        );

        Ok(Self {
            calculator: AstroCalculator,
            mapper: TraditionMapper::new(),
            offset,
            cache: Arc::new(RwLock::new(CalendarCache::new(config.cache_capacity))),
            metrics: Arc::new(Metrics::new()),
        })
    }

    pub fn day(&self, date: NaiveDate) -> Result<DayData> {
        if let Some(hit) = self.cache.write().get_day(&date) {
            self.metrics.record_cache_hit();
            return Ok(hit);
        }
        self.metrics.record_cache_miss();

        let start = Instant::now();
        let data = DayData::compute(&self.calculator, &self.mapper, date, self.offset)?;
        self.metrics.record_calculation(start.elapsed(), 1);

        self.cache.write().put_day(data.clone());
        Ok(data)
    }

    pub fn month(&self, year: i32, month: u32) -> Result<MonthGrid> {
        let first = first_of_month(year, month)?;
        let count = days_in_month(year, month)?;

        let mut days = Vec::with_capacity(count as usize);
        let mut missing = Vec::new();
        {
            let mut cache = self.cache.write();
            for offset in 0..count {
                let date = first + Duration::days(i64::from(offset));
                match cache.get_day(&date) {
                    Some(hit) => {
                        self.metrics.record_cache_hit();
                        days.push(hit);
                    }
                    None => {
                        self.metrics.record_cache_miss();
                        missing.push(date);
                    }
                }
            }
        }

        let start = Instant::now();
        let computed = missing
            .par_iter()
            .map(|date| DayData::compute(&self.calculator, &self.mapper, *date, self.offset))
            .collect::<Result<Vec<_>>>()?;
        self.metrics
            .record_calculation(start.elapsed(), computed.len() as u64);
        debug!(year, month, computed = computed.len(), cached = days.len(), "month assembled");

        {
            let mut cache = self.cache.write();
            for data in &computed {
                cache.put_day(data.clone());
            }
        }

        days.extend(computed);
        days.sort_by_key(|d| d.astro.date);

        Ok(MonthGrid {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn cached_days(&self) -> usize {
        self.cache.read().len()
    }
}
