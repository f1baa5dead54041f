use regex::Regex;

// How much a column name looks like the name of a location column.
// Exact canonical names are certain, the other steps are arbitrary but
// ordered. They give the name weights 1.0, 0.86, 0.8, 0.6 and 0.53.
pub const EXACT_SIMILARITY: f64 = 1.0;
pub const VARIANT_SIMILARITY: f64 = 0.72;
pub const COMPOUND_SIMILARITY: f64 = 0.6;
pub const GLUED_SIMILARITY: f64 = 0.2;
pub const EMBEDDED_SIMILARITY: f64 = 0.06;

/// Weight of a column without any header.
pub const NO_HEADER_WEIGHT: f64 = 0.5;
/// Weight of a column whose header has nothing to do with the location.
pub const UNRELATED_HEADER_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoType {
    Latitude,
    Longitude,
    Position,
}

struct HeaderNames {
    canonical: &'static [&'static str],
    aliases: &'static [&'static str],
    numbered: &'static once_cell::sync::Lazy<Regex>,
}

static LATITUDE_NUMBERED_REGEX: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"^(LAT|LATITUDE)[_\s\-.]?\d+$").expect("Failed to compile latitude regex")
});

static LONGITUDE_NUMBERED_REGEX: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"^(LON|LONGITUDE|LNG|LONG)[_\s\-.]?\d+$")
        .expect("Failed to compile longitude regex")
});

static POSITION_NUMBERED_REGEX: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"^(POSITION|POS|LOCATION|COORDINATES|COORDS|COORD)[_\s\-.]?\d+$")
        .expect("Failed to compile position regex")
});

static LATITUDE_NAMES: HeaderNames = HeaderNames {
    canonical: &["LAT", "LATITUDE"],
    aliases: &[],
    numbered: &LATITUDE_NUMBERED_REGEX,
};

static LONGITUDE_NAMES: HeaderNames = HeaderNames {
    canonical: &["LON", "LONGITUDE"],
    aliases: &["LNG", "LONG"],
    numbered: &LONGITUDE_NUMBERED_REGEX,
};

static POSITION_NAMES: HeaderNames = HeaderNames {
    canonical: &[
        "POSITION",
        "POS",
        "LOCATION",
        "COORDINATES",
        "COORDS",
        "LATLON",
        "LONLAT",
        "LATLNG",
        "LATLONG",
    ],
    aliases: &["COORD", "LOC", "GPS", "GEOPOSITION", "GEOLOCATION"],
    numbered: &POSITION_NUMBERED_REGEX,
};

fn header_names(geo_type: GeoType) -> &'static HeaderNames {
    match geo_type {
        GeoType::Latitude => &LATITUDE_NAMES,
        GeoType::Longitude => &LONGITUDE_NAMES,
        GeoType::Position => &POSITION_NAMES,
    }
}

/// Upper-cased words of a column name, split on separators and on
/// lower-to-upper case changes ("stationLat" has two words).
fn words(column_name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lowercase = false;
    for c in column_name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lowercase = false;
            continue;
        }
        if c.is_uppercase() && previous_lowercase && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lowercase = c.is_lowercase();
        current.extend(c.to_uppercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Similarity in `[0, 1]` between a column name and the names used for a
/// kind of location column.
pub fn name_similarity(geo_type: GeoType, column_name: &str) -> f64 {
    let names = header_names(geo_type);
    let normalized = column_name
        .trim()
        .trim_matches(['"', '\''])
        .trim()
        .to_uppercase();
    if normalized.is_empty() {
        return 0.0;
    }

    let is_known = |word: &str| names.canonical.contains(&word) || names.aliases.contains(&word);

    if names.canonical.contains(&normalized.as_str()) {
        return EXACT_SIMILARITY;
    }
    if names.aliases.contains(&normalized.as_str()) || names.numbered.is_match(&normalized) {
        return VARIANT_SIMILARITY;
    }

    let words = words(column_name);
    if words.len() > 1 && words.iter().any(|word| is_known(word)) {
        return COMPOUND_SIMILARITY;
    }

    let glued = words.concat();
    if names.canonical.iter().any(|name| glued.ends_with(name))
        || names
            .canonical
            .iter()
            .filter(|name| name.len() >= 6)
            .any(|name| glued.starts_with(name))
    {
        return GLUED_SIMILARITY;
    }

    if names
        .canonical
        .iter()
        .filter(|name| name.len() >= 6)
        .any(|name| glued.contains(name))
    {
        return EMBEDDED_SIMILARITY;
    }

    0.0
}

/// Multiplier applied to a parse ratio according to the column name.
///
/// `None` means the sample has no header.
pub fn name_weight(geo_type: GeoType, column_name: Option<&str>) -> f64 {
    match column_name {
        None => NO_HEADER_WEIGHT,
        Some(name) => {
            let similarity = name_similarity(geo_type, name);
            if similarity == 0.0 {
                UNRELATED_HEADER_WEIGHT
            } else {
                NO_HEADER_WEIGHT + (1.0 - NO_HEADER_WEIGHT) * similarity
            }
        }
    }
}
