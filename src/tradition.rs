//! Cross-cultural labels derived from the lunar state of a day.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use tracing::trace;

use crate::astronomical::{
    AstroData, Element, MoonPhase, ZodiacSign, FULL_MOON_END, NEW_MOON_END, WAXING_GIBBOUS_END,
};
use crate::date_utils::day_of_year;

/// Folk names of the full moon, January first.
pub const WESTERN_MOON_NAMES: [&str; 12] = [
    "Wolf Moon",
    "Snow Moon",
    "Worm Moon",
    "Pink Moon",
    "Flower Moon",
    "Strawberry Moon",
    "Buck Moon",
    "Sturgeon Moon",
    "Corn Moon",
    "Hunter's Moon",
    "Beaver Moon",
    "Cold Moon",
];

const VEINTENA_LENGTH: u32 = 20;
const FIRST_VEINTENA_DAY: u32 = 20;
const YEAR_END_TITITL_DAY: u32 = 360;
const JANUARY_TITITL_LAST_DAY: u32 = 19;

// Waxing/waning split for ages outside the New and Full bands
const WAXING_COMMENTARY_LIMIT: f64 = 14.0;

lazy_static! {
    /// Day-of-year ranges for the veintenas that fall wholly inside the year.
    static ref VEINTENA_RANGES: Vec<(RangeInclusive<u32>, Veintena)> = Veintena::SOLAR_ORDER
        .iter()
        .take(17)
        .enumerate()
        .map(|(i, v)| {
            let start = FIRST_VEINTENA_DAY + i as u32 * VEINTENA_LENGTH;
            (start..=start + VEINTENA_LENGTH - 1, *v)
        })
        .collect();
}

const SIGNIFICANT_TIBETAN_DAYS: [u32; 5] = [8, 10, 15, 25, 30];

/// Maria Thun's crop focus for the sign the Moon stands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiodynamicType {
    Root,
    Leaf,
    Flower,
    Fruit,
    Unspecified,
}

impl BiodynamicType {
    pub fn from_zodiac(sign: ZodiacSign) -> Self {
        match sign.element() {
            Element::Fire => BiodynamicType::Fruit,
            Element::Earth => BiodynamicType::Root,
            Element::Air => BiodynamicType::Flower,
            Element::Water => BiodynamicType::Leaf,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BiodynamicType::Root => "Root",
            BiodynamicType::Leaf => "Leaf",
            BiodynamicType::Flower => "Flower",
            BiodynamicType::Fruit => "Fruit",
            BiodynamicType::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for BiodynamicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The eighteen 20-day periods of the Mexica solar year plus the five empty days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Veintena {
    Izcalli,
    Atlacacauallo,
    Tlacaxipehualiztli,
    Tozoztontli,
    HueyTozoztli,
    Toxcatl,
    Etzalcualiztli,
    Tecuilhuitontli,
    HueyTecuilhuitl,
    Tlaxochimaco,
    Xocotlhuetzi,
    Ochpaniztli,
    Teotleco,
    Tepeilhuitl,
    Quecholli,
    Panquetzaliztli,
    Atemoztli,
    Tititl,
    Nemontemi,
}

impl Veintena {
    /// Order through a Gregorian year, starting at Izcalli on day 20.
    pub const SOLAR_ORDER: [Veintena; 19] = [
        Veintena::Izcalli,
        Veintena::Atlacacauallo,
        Veintena::Tlacaxipehualiztli,
        Veintena::Tozoztontli,
        Veintena::HueyTozoztli,
        Veintena::Toxcatl,
        Veintena::Etzalcualiztli,
        Veintena::Tecuilhuitontli,
        Veintena::HueyTecuilhuitl,
        Veintena::Tlaxochimaco,
        Veintena::Xocotlhuetzi,
        Veintena::Ochpaniztli,
        Veintena::Teotleco,
        Veintena::Tepeilhuitl,
        Veintena::Quecholli,
        Veintena::Panquetzaliztli,
        Veintena::Atemoztli,
        Veintena::Tititl,
        Veintena::Nemontemi,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Veintena::Izcalli => "Izcalli",
            Veintena::Atlacacauallo => "Atlacacauallo",
            Veintena::Tlacaxipehualiztli => "Tlacaxipehualiztli",
            Veintena::Tozoztontli => "Tozoztontli",
            Veintena::HueyTozoztli => "Huey Tozoztli",
            Veintena::Toxcatl => "Toxcatl",
            Veintena::Etzalcualiztli => "Etzalcualiztli",
            Veintena::Tecuilhuitontli => "Tecuilhuitontli",
            Veintena::HueyTecuilhuitl => "Huey Tecuilhuitl",
            Veintena::Tlaxochimaco => "Tlaxochimaco",
            Veintena::Xocotlhuetzi => "Xocotlhuetzi",
            Veintena::Ochpaniztli => "Ochpaniztli",
            Veintena::Teotleco => "Teotleco",
            Veintena::Tepeilhuitl => "Tepeilhuitl",
            Veintena::Quecholli => "Quecholli",
            Veintena::Panquetzaliztli => "Panquetzaliztli",
            Veintena::Atemoztli => "Atemoztli",
            Veintena::Tititl => "Tititl",
            Veintena::Nemontemi => "Nemontemi (Empty Days)",
        }
    }
}

/// Where a date sits in the veintena cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VeintenaPlacement {
    pub veintena: Veintena,
    /// Early January, still inside the Tititl that began the previous December.
    pub carried_over: bool,
}

impl VeintenaPlacement {
    /// Fixed illustrative correlation; not a scholarly reconstruction.
    pub fn for_date(date: NaiveDate) -> Self {
        if date.month() == 1 {
            return if date.day() <= JANUARY_TITITL_LAST_DAY {
                Self::carried(Veintena::Tititl)
            } else {
                Self::plain(Veintena::Izcalli)
            };
        }

        let day = day_of_year(date);
        if day >= YEAR_END_TITITL_DAY || day <= JANUARY_TITITL_LAST_DAY {
            return Self::plain(Veintena::Tititl);
        }

        VEINTENA_RANGES
            .iter()
            .find(|(range, _)| range.contains(&day))
            .map(|(_, veintena)| Self::plain(*veintena))
            .unwrap_or(Self::plain(Veintena::Nemontemi))
    }

    fn plain(veintena: Veintena) -> Self {
        Self {
            veintena,
            carried_over: false,
        }
    }

    fn carried(veintena: Veintena) -> Self {
        Self {
            veintena,
            carried_over: true,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.carried_over {
            "Tititl (stretching from Dec)"
        } else {
            self.veintena.name()
        }
    }
}

impl fmt::Display for VeintenaPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tradition labels and commentary for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct TraditionData {
    pub western_name: Option<&'static str>,
    pub veintena: VeintenaPlacement,
    pub tibetan_day: u32,
    pub biodynamic_type: BiodynamicType,
    /// Biodynamic, Tibetan day, phase, veintena; always in that order.
    pub commentary: Vec<String>,
}

/// Tibetan lunar day, counting the new moon as day 1.
pub fn tibetan_day(age: f64) -> u32 {
    age.max(0.0).floor() as u32 + 1
}

pub fn is_significant_tibetan_day(day: u32) -> bool {
    SIGNIFICANT_TIBETAN_DAYS.contains(&day)
}

pub fn western_moon_name(date: NaiveDate) -> Option<&'static str> {
    WESTERN_MOON_NAMES.get(date.month0() as usize).copied()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TraditionMapper;

impl TraditionMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map(&self, astro: &AstroData) -> TraditionData {
        self.map_date(astro, astro.date)
    }

    /// Labels for `date`, using the lunar state in `astro`.
    pub fn map_date(&self, astro: &AstroData, date: NaiveDate) -> TraditionData {
        let western_name = western_moon_name(date);
        let veintena = VeintenaPlacement::for_date(date);
        let tibetan_day = tibetan_day(astro.age);
        let biodynamic_type = BiodynamicType::from_zodiac(astro.zodiac);

        let commentary = vec![
            biodynamic_commentary(astro.zodiac, biodynamic_type),
            tibetan_commentary(tibetan_day),
            phase_commentary(astro),
            veintena_commentary(&veintena),
        ];

        trace!(%date, veintena = %veintena, tibetan_day, biodynamic = %biodynamic_type, "mapped traditions");

        TraditionData {
            western_name,
            veintena,
            tibetan_day,
            biodynamic_type,
            commentary,
        }
    }
}

pub fn compute_tradition(astro: &AstroData, date: NaiveDate) -> TraditionData {
    TraditionMapper::new().map_date(astro, date)
}

fn biodynamic_commentary(zodiac: ZodiacSign, kind: BiodynamicType) -> String {
    format!(
        "Based on the Maria Thun biodynamic tradition, this period (Moon in {zodiac}) is traditionally associated with {kind} crops."
    )
}

fn tibetan_commentary(day: u32) -> String {
    if is_significant_tibetan_day(day) {
        format!(
            "According to the Tibetan Lunar Calendar, Day {day} is considered a significant practice day (Tsog or similar observance)."
        )
    } else {
        format!("According to the Tibetan Lunar Calendar, this is Lunar Day {day}.")
    }
}

fn phase_commentary(astro: &AstroData) -> String {
    let age = astro.age;
    if astro.phase == MoonPhase::New || age < NEW_MOON_END {
        concat!(
            "Based on Western folk traditions, the New Moon is traditionally associated with new beginnings and stillness. ",
            "Some traditions advise caution with active harvesting during this dark phase."
        )
        .to_string()
    } else if astro.phase == MoonPhase::Full || (age > WAXING_GIBBOUS_END && age < FULL_MOON_END) {
        "According to Western herbalism, the Full Moon period is often selected for harvesting above-ground parts due to peak vitality."
            .to_string()
    } else if age < WAXING_COMMENTARY_LIMIT {
        "Based on historical alchemy and herbalism, the waxing phase is traditionally associated with drawing in, growth, and accumulation."
            .to_string()
    } else {
        "Based on historical alchemy and herbalism, the waning phase is traditionally associated with release, drying, and root focus."
            .to_string()
    }
}

fn veintena_commentary(veintena: &VeintenaPlacement) -> String {
    format!(
        "Based on reconstructed Mesoamerican calendars, this date falls within the {veintena} veintena. Note: These are solar-agricultural periods, not lunar."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astronomical::{compute_astro, AstroCalculator};
    use chrono::{Duration, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_biodynamic_by_element() {
        use ZodiacSign::*;
        let expected = [
            (Aries, BiodynamicType::Fruit),
            (Taurus, BiodynamicType::Root),
            (Gemini, BiodynamicType::Flower),
            (Cancer, BiodynamicType::Leaf),
            (Leo, BiodynamicType::Fruit),
            (Virgo, BiodynamicType::Root),
            (Libra, BiodynamicType::Flower),
            (Scorpio, BiodynamicType::Leaf),
            (Sagittarius, BiodynamicType::Fruit),
            (Capricorn, BiodynamicType::Root),
            (Aquarius, BiodynamicType::Flower),
            (Pisces, BiodynamicType::Leaf),
        ];
        assert_eq!(expected.len(), ZodiacSign::ALL.len());
        for (sign, kind) in expected {
            assert_eq!(BiodynamicType::from_zodiac(sign), kind, "{sign}");
        }
        assert!(ZodiacSign::ALL
            .iter()
            .all(|s| BiodynamicType::from_zodiac(*s) != BiodynamicType::Unspecified));
    }

    #[test]
    fn test_western_names_follow_month() {
        assert_eq!(western_moon_name(date(2024, 1, 31)), Some("Wolf Moon"));
        assert_eq!(western_moon_name(date(2024, 10, 1)), Some("Hunter's Moon"));
        assert_eq!(western_moon_name(date(2024, 12, 15)), Some("Cold Moon"));
    }

    #[test]
    fn test_veintena_table() {
        let cases = [
            (date(2024, 1, 1), "Tititl (stretching from Dec)"),
            (date(2024, 1, 19), "Tititl (stretching from Dec)"),
            (date(2024, 1, 20), "Izcalli"),
            (date(2024, 2, 8), "Izcalli"),
            (date(2024, 2, 9), "Atlacacauallo"),
            (date(2023, 3, 21), "Tozoztontli"),
            (date(2023, 7, 1), "Huey Tecuilhuitl"),
            (date(2024, 12, 24), "Atemoztli"),
            (date(2024, 12, 25), "Tititl"),
            (date(2023, 12, 26), "Tititl"),
            (date(2024, 12, 31), "Tititl"),
        ];
        for (day, label) in cases {
            assert_eq!(VeintenaPlacement::for_date(day).label(), label, "{day}");
        }
    }

    #[test]
    fn test_every_day_has_an_in_year_veintena() {
        // The residual Nemontemi label is unreachable with this correlation
        let mut day = date(2024, 1, 1);
        while day.year() == 2024 {
            let placement = VeintenaPlacement::for_date(day);
            assert_ne!(placement.veintena, Veintena::Nemontemi, "{day}");
            assert_eq!(placement.carried_over, day.month() == 1 && day.day() <= 19);
            day += Duration::days(1);
        }
        assert_eq!(VEINTENA_RANGES.len(), 17);
        assert_eq!(VEINTENA_RANGES[16], (340..=359, Veintena::Atemoztli));
    }

    #[test]
    fn test_tibetan_day() {
        assert_eq!(tibetan_day(0.0), 1);
        assert_eq!(tibetan_day(7.9), 8);
        assert_eq!(tibetan_day(14.8), 15);
        assert_eq!(tibetan_day(29.5), 30);
        assert!(is_significant_tibetan_day(30));
        assert!(!is_significant_tibetan_day(9));
    }

    #[test]
    fn test_commentary_order_and_count() {
        let mut day = date(2024, 1, 1);
        for _ in 0..60 {
            let astro = compute_astro(day);
            let tradition = compute_tradition(&astro, day);
            assert_eq!(tradition.commentary.len(), 4, "{day}");
            assert!(tradition.commentary[0].starts_with("Based on the Maria Thun"));
            assert!(tradition.commentary[1].starts_with("According to the Tibetan Lunar Calendar"));
            assert!(tradition.commentary[3].starts_with("Based on reconstructed Mesoamerican"));
            day += Duration::days(1);
        }
    }

    #[test]
    fn test_new_moon_commentary() {
        let calc = AstroCalculator::default();
        let astro = calc.compute_instant(Utc.with_ymd_and_hms(2000, 1, 6, 12, 24, 0).unwrap());
        let tradition = TraditionMapper::new().map(&astro);

        assert_eq!(tradition.tibetan_day, 1);
        assert_eq!(tradition.biodynamic_type, BiodynamicType::Fruit);
        assert_eq!(tradition.western_name, Some("Wolf Moon"));
        assert_eq!(
            tradition.commentary[0],
            "Based on the Maria Thun biodynamic tradition, this period (Moon in Sagittarius) is traditionally associated with Fruit crops."
        );
        assert_eq!(
            tradition.commentary[1],
            "According to the Tibetan Lunar Calendar, this is Lunar Day 1."
        );
        assert!(tradition.commentary[2].contains("new beginnings and stillness"));
        assert!(tradition.commentary[2].ends_with("during this dark phase."));
        assert!(tradition.commentary[3].contains("the Tititl (stretching from Dec) veintena"));
    }

    #[test]
    fn test_full_moon_commentary() {
        let calc = AstroCalculator::default();
        let astro = calc.compute_instant(Utc.with_ymd_and_hms(2000, 1, 21, 6, 52, 0).unwrap());
        let tradition = TraditionMapper::new().map(&astro);

        assert_eq!(tradition.tibetan_day, 15);
        assert_eq!(tradition.biodynamic_type, BiodynamicType::Leaf);
        assert!(tradition.commentary[1].contains("Day 15 is considered a significant practice day"));
        assert!(tradition.commentary[2].contains("Full Moon period"));
        assert!(tradition.commentary[3].contains("the Izcalli veintena"));
    }

    #[test]
    fn test_waxing_and_waning_commentary() {
        // 2024-01-01 sits at age 19.4, waning gibbous in Leo
        let astro = compute_astro(date(2024, 1, 1));
        let tradition = compute_tradition(&astro, astro.date);
        assert_eq!(tradition.tibetan_day, 20);
        assert!(tradition.commentary[2].contains("waning phase"));

        let mut waxing = astro.clone();
        waxing.age = 5.2;
        waxing.phase = MoonPhase::from_age(5.2);
        let tradition = compute_tradition(&waxing, waxing.date);
        assert_eq!(tradition.tibetan_day, 6);
        assert!(tradition.commentary[2].contains("waxing phase"));
    }
}
