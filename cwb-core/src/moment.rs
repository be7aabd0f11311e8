use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

/// Coarse day/night classification driving the dashboard theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    Day,
    Night,
}

impl Moment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Moment::Day => "day",
            Moment::Night => "night",
        }
    }
}

impl std::fmt::Display for Moment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representative sunrise/sunset for Taipei, minutes after local midnight,
/// one entry per month. Intra-month drift is under fifteen minutes, which is
/// well inside what a day/night toggle needs.
const MONTHLY_SUN: [(u32, u32); 12] = [
    (398, 1041), // Jan 06:38 / 17:21
    (390, 1065), // Feb 06:30 / 17:45
    (367, 1082), // Mar 06:07 / 18:02
    (337, 1095), // Apr 05:37 / 18:15
    (314, 1108), // May 05:14 / 18:28
    (306, 1123), // Jun 05:06 / 18:43
    (314, 1127), // Jul 05:14 / 18:47
    (329, 1112), // Aug 05:29 / 18:32
    (342, 1082), // Sep 05:42 / 18:02
    (354, 1049), // Oct 05:54 / 17:29
    (370, 1027), // Nov 06:10 / 17:07
    (388, 1024), // Dec 06:28 / 17:04
];

/// Per-city shift in minutes relative to the Taipei baseline. Eastern cities
/// see the sun earlier. Cities absent from this list use the baseline.
const CITY_SHIFT_MIN: &[(&str, i32)] = &[
    ("宜蘭", -3),
    ("花蓮", -3),
    ("臺東", -2),
    ("基隆", -1),
    ("臺北", 0),
    ("新北", 0),
    ("桃園", 1),
    ("新竹", 2),
    ("苗栗", 2),
    ("臺中", 3),
    ("彰化", 3),
    ("雲林", 4),
    ("嘉義", 4),
    ("臺南", 5),
    ("高雄", 5),
    ("屏東", 5),
    ("澎湖", 7),
    ("金門", 10),
];

fn taipei() -> FixedOffset {
    // UTC+8, no DST; the constant is always a valid offset.
    FixedOffset::east_opt(8 * 3600).expect("UTC+8 offset")
}

/// Classify `now` as day or night for the given sunrise-table city.
///
/// Total over all inputs: unknown city names fall back to the Taipei
/// baseline rather than failing (the resolver already rejects cities
/// outside the supported set).
pub fn moment_of(sunrise_city_name: &str, now: DateTime<Utc>) -> Moment {
    let local = now.with_timezone(&taipei());
    let minute_of_day = local.hour() * 60 + local.minute();

    let (sunrise, sunset) = MONTHLY_SUN[local.month0() as usize];
    let shift = CITY_SHIFT_MIN
        .iter()
        .find(|(city, _)| *city == sunrise_city_name)
        .map_or(0, |(_, shift)| *shift);

    let sunrise = sunrise.saturating_add_signed(shift);
    let sunset = sunset.saturating_add_signed(shift);

    if minute_of_day >= sunrise && minute_of_day < sunset {
        Moment::Day
    } else {
        Moment::Night
    }
}
