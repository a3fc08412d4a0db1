//! Low-order lunar ephemeris: synodic age, illumination, phase and the
//! sidereal sign of the Moon for a given instant.
//!
//! The longitude series is the truncated mean-element expansion with eleven
//! periodic terms. Expect errors around a degree.

use std::f64::consts::PI;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::trace;

use crate::config::{AYANAMSA_DEGREES, REFERENCE_NEW_MOON_MS, SYNODIC_MONTH_DAYS};
use crate::date_utils::{
    centuries_since_j2000, julian_date, local_midnight, normalize_degrees, MS_PER_DAY,
};
use crate::error::Result;

// Phase boundaries, in days of lunar age
pub const NEW_MOON_END: f64 = 1.0;
pub const NEW_MOON_START: f64 = 28.53;
pub const WAXING_CRESCENT_END: f64 = 6.4;
pub const FIRST_QUARTER_END: f64 = 8.4;
pub const WAXING_GIBBOUS_END: f64 = 13.8;
pub const FULL_MOON_END: f64 = 15.8;
pub const WANING_GIBBOUS_END: f64 = 21.1;
pub const LAST_QUARTER_END: f64 = 23.1;

/// Ages below this are drawn lit on the right-hand limb.
pub const WAXING_LIMIT: f64 = 14.8;

const DEGREES_PER_SIGN: f64 = 30.0;

// Periodic longitude terms: (amplitude, M, M_sun, D) multipliers
const LONGITUDE_TERMS: [(f64, f64, f64, f64); 11] = [
    (6.289, 1.0, 0.0, 0.0),
    (-1.274, 1.0, 0.0, -2.0),
    (0.658, 0.0, 0.0, 2.0),
    (-0.186, 0.0, 1.0, 0.0),
    (-0.059, 2.0, 0.0, -2.0),
    (-0.057, 1.0, 1.0, -2.0),
    (0.053, 1.0, 0.0, 2.0),
    (0.046, 0.0, -1.0, 2.0),
    (0.041, 1.0, -1.0, 0.0),
    (-0.035, 0.0, 0.0, 1.0),
    (-0.031, 1.0, 1.0, 0.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::New,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::Full,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    /// Classify a lunar age in days. Each boundary belongs to the later phase.
    pub fn from_age(age: f64) -> Self {
        if age < NEW_MOON_END || age > NEW_MOON_START {
            MoonPhase::New
        } else if age < WAXING_CRESCENT_END {
            MoonPhase::WaxingCrescent
        } else if age < FIRST_QUARTER_END {
            MoonPhase::FirstQuarter
        } else if age < WAXING_GIBBOUS_END {
            MoonPhase::WaxingGibbous
        } else if age < FULL_MOON_END {
            MoonPhase::Full
        } else if age < WANING_GIBBOUS_END {
            MoonPhase::WaningGibbous
        } else if age < LAST_QUARTER_END {
            MoonPhase::LastQuarter
        } else {
            MoonPhase::WaningCrescent
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::Full => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub const fn glyph(self) -> &'static str {
        match self {
            MoonPhase::New => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::Full => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classical element of a zodiac sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub const fn name(self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Air => "Air",
            Element::Water => "Water",
        }
    }
}

/// The 12 signs in ecliptic order, 30 degrees each, starting from Aries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign containing a sidereal longitude (any value, wrapped to [0, 360)).
    pub fn from_sidereal_longitude(longitude: f64) -> Self {
        let index = (normalize_degrees(longitude) / DEGREES_PER_SIGN).floor() as usize;
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub const fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub const fn element(self) -> Element {
        match self {
            ZodiacSign::Aries | ZodiacSign::Leo | ZodiacSign::Sagittarius => Element::Fire,
            ZodiacSign::Taurus | ZodiacSign::Virgo | ZodiacSign::Capricorn => Element::Earth,
            ZodiacSign::Gemini | ZodiacSign::Libra | ZodiacSign::Aquarius => Element::Air,
            ZodiacSign::Cancer | ZodiacSign::Scorpio | ZodiacSign::Pisces => Element::Water,
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mean lunar and solar elements in degrees (not normalized).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    pub moon_longitude: f64,
    pub moon_anomaly: f64,
    pub sun_anomaly: f64,
    pub latitude_argument: f64,
    pub elongation: f64,
}

impl MeanElements {
    pub fn at(centuries: f64) -> Self {
        let t = centuries;
        Self {
            moon_longitude: 218.316 + 481_267.8813 * t,
            moon_anomaly: 134.963 + 477_198.8676 * t,
            sun_anomaly: 357.528 + 35_999.0503 * t,
            latitude_argument: 93.272 + 483_202.0175 * t,
            elongation: 297.850 + 445_267.1115 * t,
        }
    }
}

/// Tropical ecliptic longitude of the Moon in [0, 360).
pub fn moon_longitude(jd: f64) -> f64 {
    let elements = MeanElements::at(centuries_since_j2000(jd));

    let correction: f64 = LONGITUDE_TERMS
        .iter()
        .map(|&(amplitude, m, m_sun, d)| {
            let argument = m * elements.moon_anomaly
                + m_sun * elements.sun_anomaly
                + d * elements.elongation;
            amplitude * argument.to_radians().sin()
        })
        .sum();

    normalize_degrees(elements.moon_longitude + correction)
}

/// Illuminated fraction as a whole percentage, from the synodic cycle position.
pub fn illumination_percent(cycle_fraction: f64) -> u8 {
    let lit = 0.5 * (1.0 - (cycle_fraction * 2.0 * PI).cos());
    (lit * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Round to one decimal by the exact binary value, so 0.95 (stored just
/// below) gives 0.9. Exact ties such as 0.25 round up.
fn round_to_tenth(value: f64) -> f64 {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters.rem_euclid(2.0) == 1.0 {
        return (value * 10.0).ceil() / 10.0;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarAge {
    /// Days since the last mean new moon, in [0, synodic month).
    pub days: f64,
    /// Position within the synodic cycle, in [0, 1).
    pub cycle_fraction: f64,
}

/// Astronomical facts for one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct AstroData {
    pub date: NaiveDate,
    pub instant: DateTime<Utc>,
    pub julian_day: f64,
    pub phase: MoonPhase,
    pub illumination_percent: u8,
    /// Lunar age in days, rounded to one decimal.
    pub age: f64,
    pub tropical_longitude: f64,
    pub sidereal_longitude: f64,
    pub zodiac: ZodiacSign,
    pub is_sidereal: bool,
}

impl AstroData {
    pub fn is_waxing(&self) -> bool {
        self.age < WAXING_LIMIT
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AstroCalculator;

impl AstroCalculator {
    /// Days since the reference new moon, folded into one synodic month.
    pub fn lunar_age(&self, instant: DateTime<Utc>) -> LunarAge {
        let diff_days =
            (instant.timestamp_millis() - REFERENCE_NEW_MOON_MS) as f64 / MS_PER_DAY;
        let cycles = diff_days / SYNODIC_MONTH_DAYS;
        let mut fraction = cycles - cycles.floor();
        // floor() of a tiny negative value can leave exactly 1.0
        if fraction >= 1.0 {
            fraction = 0.0;
        }
        LunarAge {
            days: fraction * SYNODIC_MONTH_DAYS,
            cycle_fraction: fraction,
        }
    }

    pub fn sidereal_longitude(&self, tropical_longitude: f64) -> f64 {
        normalize_degrees(tropical_longitude - AYANAMSA_DEGREES)
    }

    /// Evaluate `instant`, labelled with the civil `date` it stands for.
    pub fn compute(&self, date: NaiveDate, instant: DateTime<Utc>) -> AstroData {
        let julian_day = julian_date(instant);
        let tropical_longitude = moon_longitude(julian_day);
        let sidereal_longitude = self.sidereal_longitude(tropical_longitude);
        let age = self.lunar_age(instant);

        let data = AstroData {
            date,
            instant,
            julian_day,
            phase: MoonPhase::from_age(age.days),
            illumination_percent: illumination_percent(age.cycle_fraction),
            age: round_to_tenth(age.days),
            tropical_longitude,
            sidereal_longitude,
            zodiac: ZodiacSign::from_sidereal_longitude(sidereal_longitude),
            is_sidereal: true,
        };

        trace!(%date, phase = %data.phase, age = data.age, zodiac = %data.zodiac, "computed lunar state");
        data
    }

    pub fn compute_instant(&self, instant: DateTime<Utc>) -> AstroData {
        self.compute(instant.date_naive(), instant)
    }

    /// Evaluate a civil date at local midnight in `offset`.
    pub fn compute_day(&self, date: NaiveDate, offset: FixedOffset) -> Result<AstroData> {
        let instant = local_midnight(date, offset)?;
        Ok(self.compute(date, instant))
    }
}

/// Lunar state of a date at UTC midnight, with the default constants.
pub fn compute_astro(date: NaiveDate) -> AstroData {
    let instant = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    AstroCalculator::default().compute(date, instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_new_moon() {
        let calc = AstroCalculator::default();
        let astro = calc.compute_instant(utc(2000, 1, 6, 12, 24));

        assert_eq!(astro.age, 0.0);
        assert_eq!(astro.phase, MoonPhase::New);
        assert_eq!(astro.illumination_percent, 0);
        assert_eq!(astro.zodiac, ZodiacSign::Sagittarius);
        assert!(astro.is_sidereal);
        assert!(astro.is_waxing());
    }

    #[test]
    fn test_half_cycle_is_full() {
        let calc = AstroCalculator::default();
        let astro = calc.compute_instant(utc(2000, 1, 21, 6, 52));

        assert_eq!(astro.age, 14.8);
        assert_eq!(astro.phase, MoonPhase::Full);
        assert_eq!(astro.illumination_percent, 100);
        assert_eq!(astro.zodiac, ZodiacSign::Cancer);
    }

    #[test]
    fn test_known_dates() {
        let astro = compute_astro(date(2024, 1, 1));
        assert_eq!(astro.phase, MoonPhase::WaningGibbous);
        assert_eq!(astro.age, 19.4);
        assert_eq!(astro.illumination_percent, 77);
        assert_eq!(astro.zodiac, ZodiacSign::Leo);
        assert!(!astro.is_waxing());

        // before the reference epoch
        let astro = compute_astro(date(1999, 12, 31));
        assert_eq!(astro.phase, MoonPhase::LastQuarter);
        assert_eq!(astro.age, 23.0);
        assert_eq!(astro.illumination_percent, 41);
        assert_eq!(astro.zodiac, ZodiacSign::Libra);

        let astro = compute_astro(date(2000, 2, 5));
        assert_eq!(astro.age, 29.5);
        assert_eq!(astro.phase, MoonPhase::New);
        assert_eq!(astro.illumination_percent, 0);
        assert_eq!(astro.zodiac, ZodiacSign::Capricorn);
    }

    #[test]
    fn test_longitude_at_j2000() {
        let elements = MeanElements::at(0.0);
        assert_eq!(elements.moon_longitude, 218.316);
        assert_eq!(elements.latitude_argument, 93.272);

        let longitude = moon_longitude(2_451_545.0);
        assert!((longitude - 223.511).abs() < 0.01, "got {longitude}");
    }

    #[test]
    fn test_phase_boundaries_are_half_open() {
        let cases = [
            (0.0, MoonPhase::New),
            (0.999, MoonPhase::New),
            (1.0, MoonPhase::WaxingCrescent),
            (6.399, MoonPhase::WaxingCrescent),
            (6.4, MoonPhase::FirstQuarter),
            (8.4, MoonPhase::WaxingGibbous),
            (13.8, MoonPhase::Full),
            (15.8, MoonPhase::WaningGibbous),
            (21.1, MoonPhase::LastQuarter),
            (23.1, MoonPhase::WaningCrescent),
            (28.53, MoonPhase::WaningCrescent),
            (28.531, MoonPhase::New),
            (29.5, MoonPhase::New),
        ];
        for (age, expected) in cases {
            assert_eq!(MoonPhase::from_age(age), expected, "age {age}");
        }
    }

    #[test]
    fn test_phase_partition_is_ordered() {
        // Sweeping the cycle visits each phase once, in order, then returns to New
        let mut seen = vec![MoonPhase::from_age(0.0)];
        let mut age = 0.0;
        while age < SYNODIC_MONTH_DAYS {
            let phase = MoonPhase::from_age(age);
            if seen.last() != Some(&phase) {
                seen.push(phase);
            }
            age += 0.005;
        }
        let mut expected = MoonPhase::ALL.to_vec();
        expected.push(MoonPhase::New);
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_sign_is_constant_within_sector() {
        for (index, sign) in ZodiacSign::ALL.iter().enumerate() {
            let start = index as f64 * 30.0;
            for step in 0..60 {
                let longitude = start + step as f64 * 0.5;
                assert_eq!(ZodiacSign::from_sidereal_longitude(longitude), *sign);
            }
            assert_eq!(ZodiacSign::from_sidereal_longitude(start + 29.999), *sign);
        }
        assert_eq!(ZodiacSign::from_sidereal_longitude(360.0), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_sidereal_longitude(-0.5), ZodiacSign::Pisces);
    }

    #[test]
    fn test_ayanamsa_shift() {
        let calc = AstroCalculator::default();
        assert_eq!(calc.sidereal_longitude(24.0), 0.0);
        assert_eq!(calc.sidereal_longitude(10.0), 346.0);
        assert_eq!(
            ZodiacSign::from_sidereal_longitude(calc.sidereal_longitude(10.0)),
            ZodiacSign::Pisces
        );
    }

    #[test]
    fn test_illumination_tracks_age() {
        let calc = AstroCalculator::default();
        let synodic = SYNODIC_MONTH_DAYS;
        let start = utc(2024, 1, 1, 0, 0);

        for hours in (0..24 * 400).step_by(7) {
            let instant = start + Duration::hours(hours);
            let age = calc.lunar_age(instant);
            let percent = illumination_percent(age.cycle_fraction);
            assert!(percent <= 100);
            if percent == 0 {
                assert!(age.days < 1.0 || age.days > synodic - 1.0, "dark at age {}", age.days);
            }
            if percent == 100 {
                assert!((age.days - synodic / 2.0).abs() < 1.0, "full at age {}", age.days);
            }
        }
    }

    #[test]
    fn test_age_wraps_once_per_cycle() {
        let start = date(2024, 1, 1);
        let mut wraps = Vec::new();
        let mut previous = compute_astro(start).age;

        for offset in 1..120 {
            let age = compute_astro(start + Duration::days(offset)).age;
            if age < previous {
                wraps.push(offset);
            } else {
                assert!(age - previous > 0.85 && age - previous < 1.15);
            }
            previous = age;
        }

        assert_eq!(wraps.len(), 4);
        for pair in wraps.windows(2) {
            let gap = (pair[1] - pair[0]) as f64;
            assert!((gap - SYNODIC_MONTH_DAYS).abs() <= 1.0, "gap {gap}");
        }
    }

    #[test]
    fn test_age_rounds_by_exact_value() {
        // 0.95 is stored as 0.9499999...
        assert_eq!(round_to_tenth(0.95), 0.9);
        assert_eq!(round_to_tenth(1.05), 1.1);
        assert_eq!(round_to_tenth(0.25), 0.3);
        assert_eq!(round_to_tenth(14.75), 14.8);
        assert_eq!(round_to_tenth(29.46), 29.5);
        assert_eq!(round_to_tenth(0.04), 0.0);
        assert_eq!(round_to_tenth(19.4), 19.4);

        let age = round_to_tenth(0.95);
        assert_eq!(MoonPhase::from_age(age), MoonPhase::New);
        assert_eq!(crate::tradition::tibetan_day(age), 1);
    }

    #[test]
    fn test_local_midnight_offset() {
        let calc = AstroCalculator::default();
        let offset = FixedOffset::east_opt(-5 * 3600).unwrap();
        let astro = calc.compute_day(date(2024, 1, 1), offset).unwrap();

        assert_eq!(astro.date, date(2024, 1, 1));
        assert_eq!(astro.instant, utc(2024, 1, 1, 5, 0));
        assert_eq!(astro, calc.compute(date(2024, 1, 1), utc(2024, 1, 1, 5, 0)));
    }
}
