use anyhow::Result;

/// Identifiers for one supported city.
///
/// The two upstream datasets key on different administrative granularities:
/// `city_name` is the county/city name the 36h forecast expects, while
/// `location_name` is the observation station name. `sunrise_city_name` keys
/// the sunrise/sunset table used for the day/night theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub city_name: &'static str,
    pub location_name: &'static str,
    pub sunrise_city_name: &'static str,
}

const LOCATIONS: &[Location] = &[
    Location { city_name: "基隆市", location_name: "基隆", sunrise_city_name: "基隆" },
    Location { city_name: "臺北市", location_name: "臺北", sunrise_city_name: "臺北" },
    Location { city_name: "新北市", location_name: "板橋", sunrise_city_name: "新北" },
    Location { city_name: "桃園市", location_name: "新屋", sunrise_city_name: "桃園" },
    Location { city_name: "新竹市", location_name: "新竹", sunrise_city_name: "新竹" },
    Location { city_name: "苗栗縣", location_name: "竹南", sunrise_city_name: "苗栗" },
    Location { city_name: "臺中市", location_name: "臺中", sunrise_city_name: "臺中" },
    Location { city_name: "彰化縣", location_name: "彰師大", sunrise_city_name: "彰化" },
    Location { city_name: "雲林縣", location_name: "斗六", sunrise_city_name: "雲林" },
    Location { city_name: "嘉義市", location_name: "嘉義", sunrise_city_name: "嘉義" },
    Location { city_name: "臺南市", location_name: "臺南", sunrise_city_name: "臺南" },
    Location { city_name: "高雄市", location_name: "高雄", sunrise_city_name: "高雄" },
    Location { city_name: "屏東縣", location_name: "恆春", sunrise_city_name: "屏東" },
    Location { city_name: "宜蘭縣", location_name: "宜蘭", sunrise_city_name: "宜蘭" },
    Location { city_name: "花蓮縣", location_name: "花蓮", sunrise_city_name: "花蓮" },
    Location { city_name: "臺東縣", location_name: "臺東", sunrise_city_name: "臺東" },
    Location { city_name: "澎湖縣", location_name: "澎湖", sunrise_city_name: "澎湖" },
    Location { city_name: "金門縣", location_name: "金門", sunrise_city_name: "金門" },
];

/// Resolve a display city name to its upstream identifiers.
///
/// Fails loudly on unsupported input rather than silently defaulting.
pub fn resolve(display_city_name: &str) -> Result<Location> {
    LOCATIONS
        .iter()
        .copied()
        .find(|location| location.city_name == display_city_name)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported city '{display_city_name}'. Supported cities: {}.",
                supported_cities().join(", ")
            )
        })
}

/// Display names of every supported city, in table order.
pub fn supported_cities() -> Vec<&'static str> {
    LOCATIONS.iter().map(|location| location.city_name).collect()
}
