use serde::Serialize;

/// One administrative area with its fixed KMA grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocationEntry {
    /// Romanized name, e.g. "Gyeonggi-do".
    pub area: &'static str,
    /// Official Korean name, e.g. "서울특별시".
    pub area_korean: &'static str,
    /// Short Korean name; this is the canonical display name.
    pub korean_name: &'static str,
    pub nx: u16,
    pub ny: u16,
    /// Mid-term forecast area number.
    pub region_code: &'static str,
}

/// Short name of the entry returned when nothing matches.
pub const DEFAULT_LOCATION: &str = "서울";

const fn entry(
    area: &'static str,
    area_korean: &'static str,
    korean_name: &'static str,
    nx: u16,
    ny: u16,
    region_code: &'static str,
) -> LocationEntry {
    LocationEntry {
        area,
        area_korean,
        korean_name,
        nx,
        ny,
        region_code,
    }
}

/// Built-in table of provincial capitals and metropolitan cities.
pub const LOCATIONS: &[LocationEntry] = &[
    entry("Seoul", "서울특별시", "서울", 60, 127, "11B00000"),
    entry("Busan", "부산광역시", "부산", 98, 76, "11H20000"),
    entry("Daegu", "대구광역시", "대구", 89, 90, "11H10000"),
    entry("Incheon", "인천광역시", "인천", 55, 124, "11B00000"),
    entry("Gwangju", "광주광역시", "광주", 58, 74, "11F20000"),
    entry("Daejeon", "대전광역시", "대전", 67, 100, "11C20000"),
    entry("Ulsan", "울산광역시", "울산", 102, 84, "11H20000"),
    entry("Sejong-si", "세종특별자치시", "세종", 66, 103, "11C20000"),
    entry("Gyeonggi-do", "경기도", "경기도", 60, 120, "11B00000"),
    entry("Gangwon-do", "강원특별자치도", "강원도", 73, 134, "11D10000"),
    entry("Chungcheongbuk-do", "충청북도", "충청북도", 69, 107, "11C10000"),
    entry("Chungcheongnam-do", "충청남도", "충청남도", 68, 100, "11C20000"),
    entry("Jeollabuk-do", "전북특별자치도", "전라북도", 63, 89, "11F10000"),
    entry("Jeollanam-do", "전라남도", "전라남도", 51, 67, "11F20000"),
    entry("Gyeongsangbuk-do", "경상북도", "경상북도", 89, 91, "11H10000"),
    entry("Gyeongsangnam-do", "경상남도", "경상남도", 91, 77, "11H20000"),
    entry("Jeju-do", "제주특별자치도", "제주", 52, 38, "11G00000"),
];

/// Two-character provincial abbreviations that no table name contains.
/// Checked in order; the first one contained in the input wins.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("충남", "충청남도"),
    ("충북", "충청북도"),
    ("경남", "경상남도"),
    ("경북", "경상북도"),
    ("전남", "전라남도"),
    ("전북", "전라북도"),
    ("강원", "강원도"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Substring,
    Abbreviation,
    Default,
}

/// Outcome of a lookup. Always carries a usable entry; `note` is set when the
/// resolver had to fall back to the default location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entry: LocationEntry,
    pub matched_by: MatchKind,
    pub note: Option<String>,
}

impl Resolution {
    pub fn nx(&self) -> u16 {
        self.entry.nx
    }

    pub fn ny(&self) -> u16 {
        self.entry.ny
    }

    /// Canonical display name of the resolved area.
    pub fn name(&self) -> &'static str {
        self.entry.korean_name
    }

    pub fn is_fallback(&self) -> bool {
        self.matched_by == MatchKind::Default
    }
}

/// Maps free-text place names onto a fixed location table.
#[derive(Debug, Clone, Copy)]
pub struct LocationResolver {
    entries: &'static [LocationEntry],
    default: LocationEntry,
}

impl Default for LocationResolver {
    fn default() -> Self {
        // The built-in table always contains the default; see tests.
        Self {
            entries: LOCATIONS,
            default: LOCATIONS[0],
        }
    }
}

impl LocationResolver {
    /// Build a resolver over `entries`. Returns `None` when the table lacks
    /// the default location, since resolution could not then be total.
    pub fn new(entries: &'static [LocationEntry]) -> Option<Self> {
        let default = *entries.iter().find(|e| e.korean_name == DEFAULT_LOCATION)?;
        Some(Self { entries, default })
    }

    pub fn entries(&self) -> &'static [LocationEntry] {
        self.entries
    }

    pub fn default_entry(&self) -> LocationEntry {
        self.default
    }

    pub fn resolve(&self, name: &str) -> Resolution {
        let query = name.trim();
        let query_lower = query.to_lowercase();

        // Every field of every entry is tried for an exact hit first, so a
        // short name like "광주" is never shadowed by a substring of another.
        if let Some(entry) = self.entries.iter().find(|e| {
            e.area.to_lowercase() == query_lower || e.area_korean == query || e.korean_name == query
        }) {
            return found(*entry, MatchKind::Exact);
        }

        if let Some(entry) = self.entries.iter().find(|e| {
            e.area.to_lowercase().contains(&query_lower)
                || e.area_korean.contains(query)
                || e.korean_name.contains(query)
        }) {
            return found(*entry, MatchKind::Substring);
        }

        let abbreviated = ABBREVIATIONS
            .iter()
            .find(|(abbr, _)| query.contains(abbr))
            .and_then(|(_, target)| self.entries.iter().find(|e| e.korean_name == *target));
        if let Some(entry) = abbreviated {
            return found(*entry, MatchKind::Abbreviation);
        }

        let note = format!(
            "location '{query}' not found; falling back to {}",
            self.default.korean_name
        );
        tracing::warn!(query, fallback = self.default.korean_name, "unknown location");

        Resolution {
            entry: self.default,
            matched_by: MatchKind::Default,
            note: Some(note),
        }
    }
}

fn found(entry: LocationEntry, matched_by: MatchKind) -> Resolution {
    tracing::debug!(location = entry.korean_name, ?matched_by, "resolved location");
    Resolution {
        entry,
        matched_by,
        note: None,
    }
}
