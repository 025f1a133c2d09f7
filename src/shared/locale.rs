use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported market locales.
///
/// The set is closed: both routing (`/{locale}/...`) and translation rows
/// only ever use these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Locale {
    #[serde(rename = "en-MY")]
    EnMy,
    #[serde(rename = "ms-MY")]
    MsMy,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl Locale {
    /// Every supported locale, in cache-eviction order.
    pub const ALL: [Locale; 3] = [Locale::EnMy, Locale::MsMy, Locale::ZhCn];

    /// Fallback locale used for name resolution and admin breadcrumbs.
    pub const DEFAULT: Locale = Locale::EnMy;

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::EnMy => "en-MY",
            Locale::MsMy => "ms-MY",
            Locale::ZhCn => "zh-CN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en-MY" => Some(Locale::EnMy),
            "ms-MY" => Some(Locale::MsMy),
            "zh-CN" => Some(Locale::ZhCn),
            _ => None,
        }
    }

    /// Locale selection for public routes: unsupported values fall back to
    /// the default locale instead of erroring.
    pub fn from_path(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::DEFAULT)
    }

    /// Ordered candidate locales for name resolution: the requested locale
    /// first, then the default (skipped when they coincide). The final slug
    /// fallback lives with the caller, keeping resolution total.
    pub fn fallback_chain(self) -> Vec<Locale> {
        if self == Self::DEFAULT {
            vec![self]
        } else {
            vec![self, Self::DEFAULT]
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_locales() {
        assert_eq!(Locale::parse("en-MY"), Some(Locale::EnMy));
        assert_eq!(Locale::parse("ms-MY"), Some(Locale::MsMy));
        assert_eq!(Locale::parse("zh-CN"), Some(Locale::ZhCn));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Locale::parse("en"), None);
        assert_eq!(Locale::parse("en-US"), None);
        assert_eq!(Locale::parse(""), None);
        assert_eq!(Locale::parse("EN-MY"), None);
    }

    #[test]
    fn test_from_path_falls_back_to_default() {
        assert_eq!(Locale::from_path("zh-CN"), Locale::ZhCn);
        assert_eq!(Locale::from_path("fr-FR"), Locale::DEFAULT);
        assert_eq!(Locale::from_path(""), Locale::DEFAULT);
    }

    #[test]
    fn test_fallback_chain_is_deduplicated() {
        assert_eq!(Locale::ZhCn.fallback_chain(), vec![Locale::ZhCn, Locale::EnMy]);
        assert_eq!(Locale::EnMy.fallback_chain(), vec![Locale::EnMy]);
    }
}
