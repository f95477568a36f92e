//! Dong/ho label normalization and unit matching

/// First run of ASCII digits without leading zeros (`"103동"` → `"103"`).
///
/// Labels without digits come back trimmed.
pub fn normalize_label(label: &str) -> String {
    let label = label.trim();
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return label.to_string();
    }
    match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        stripped => stripped.to_string(),
    }
}

/// The unit a caller asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitQuery {
    pub dong: String,
    pub ho: String,
    dong_key: String,
    ho_key: String,
}

impl UnitQuery {
    pub fn new(dong: &str, ho: &str) -> Self {
        Self {
            dong: dong.trim().to_string(),
            ho: ho.trim().to_string(),
            dong_key: normalize_label(dong),
            ho_key: normalize_label(ho),
        }
    }

    pub fn has_ho(&self) -> bool {
        !self.ho_key.is_empty()
    }

    /// Ho must agree; an empty dong matches any dong, otherwise the
    /// normalized labels must contain one another.
    pub fn matches(&self, dong: &str, ho: &str) -> bool {
        if !self.has_ho() || normalize_label(ho) != self.ho_key {
            return false;
        }
        if self.dong_key.is_empty() {
            return true;
        }
        let candidate = normalize_label(dong);
        candidate.contains(&self.dong_key) || self.dong_key.contains(&candidate)
    }

    /// `dongNm` filters to try in order: as given, `{n}동`, `{n}`, then none.
    pub fn dong_variants(&self) -> Vec<Option<String>> {
        let mut variants: Vec<Option<String>> = Vec::new();
        if !self.dong.is_empty() {
            let mut candidates = vec![self.dong.clone()];
            if self.dong_key.chars().all(|c| c.is_ascii_digit()) {
                candidates.push(format!("{}동", self.dong_key));
                candidates.push(self.dong_key.clone());
            }
            for candidate in candidates {
                let candidate = Some(candidate);
                if !variants.contains(&candidate) {
                    variants.push(candidate);
                }
            }
        }
        variants.push(None);
        variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("103동"), "103");
        assert_eq!(normalize_label("904호"), "904");
        assert_eq!(normalize_label(" 제0101호 "), "101");
        assert_eq!(normalize_label("B동"), "B동");
        assert_eq!(normalize_label("000"), "0");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn test_matching() {
        let query = UnitQuery::new("103동", "904");
        assert!(query.matches("103", "904호"));
        assert!(query.matches("제103동", "904"));
        assert!(!query.matches("104동", "904"));
        assert!(!query.matches("103동", "905"));
    }

    #[test]
    fn test_empty_dong_is_wildcard() {
        let query = UnitQuery::new("", "1201");
        assert!(query.matches("101동", "1201호"));
        assert!(query.matches("", "1201"));
    }

    #[test]
    fn test_missing_ho_never_matches() {
        let query = UnitQuery::new("101", "");
        assert!(!query.has_ho());
        assert!(!query.matches("101", ""));
    }

    #[test]
    fn test_dong_variants() {
        let query = UnitQuery::new("103동", "904");
        assert_eq!(
            query.dong_variants(),
            vec![Some("103동".to_string()), Some("103".to_string()), None]
        );

        let query = UnitQuery::new("103", "904");
        assert_eq!(
            query.dong_variants(),
            vec![Some("103".to_string()), Some("103동".to_string()), None]
        );

        assert_eq!(
            UnitQuery::new("B동", "904").dong_variants(),
            vec![Some("B동".to_string()), None]
        );
        assert_eq!(UnitQuery::new("", "904").dong_variants(), vec![None]);
    }
}
