//! Legal land-category (jimok) codes

/// `(numeric code, single-character alias, display name)` for all 28 categories
pub const LAND_CATEGORIES: [(&str, &str, &str); 28] = [
    ("01", "전", "전"),
    ("02", "답", "답"),
    ("03", "과", "과수원"),
    ("04", "목", "목장용지"),
    ("05", "임", "임야"),
    ("06", "광", "광천지"),
    ("07", "염", "염전"),
    ("08", "대", "대"),
    ("09", "장", "공장용지"),
    ("10", "학", "학교용지"),
    ("11", "차", "주차장"),
    ("12", "주", "주유소용지"),
    ("13", "창", "창고용지"),
    ("14", "도", "도로"),
    ("15", "철", "철도용지"),
    ("16", "제", "제방"),
    ("17", "천", "하천"),
    ("18", "구", "구거"),
    ("19", "유", "유지"),
    ("20", "양", "양어장"),
    ("21", "수", "수도용지"),
    ("22", "공", "공원"),
    ("23", "체", "체육용지"),
    ("24", "원", "유원지"),
    ("25", "종", "종교용지"),
    ("26", "사", "사적지"),
    ("27", "묘", "묘지"),
    ("28", "잡", "잡종지"),
];

/// Display name for a land-category code or alias.
///
/// Total: unknown input (including full names) comes back unchanged.
pub fn land_category_name(code: &str) -> &str {
    LAND_CATEGORIES
        .iter()
        .find(|(numeric, alias, _)| *numeric == code || *alias == code)
        .map(|(_, _, name)| *name)
        .unwrap_or(code)
}
