use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recognition data for one currency's notes.
///
/// Token lists are ordered; the classifier walks them in declaration order,
/// so reordering a list can change which denomination is reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyProfile {
    /// ISO-style identifier reported in results (`USD`, `EUR`, ...).
    pub code: String,
    /// Currency signs and names.
    pub symbols: Vec<String>,
    /// Face-value tokens.
    pub denominations: Vec<String>,
    /// Phrases printed only on this currency's notes.
    pub keywords: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to parse profile TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Profile table is empty")]
    Empty,
    #[error("Profile code must not be empty")]
    EmptyCode,
    #[error("Duplicate profile code: {0}")]
    DuplicateCode(String),
    #[error("Profile {code} has an empty token in `{field}`")]
    EmptyToken { code: String, field: &'static str },
}

pub const BUILTIN_PROFILES: &[(&str, &[&str], &[&str], &[&str])] = &[
    (
        "USD",
        &["$", "USD", "DOLLAR", "DOLLARS"],
        &["ONE", "1", "FIVE", "5", "TEN", "10", "TWENTY", "20", "FIFTY", "50", "HUNDRED", "100"],
        &["FEDERAL RESERVE", "THIS NOTE IS LEGAL TENDER", "TREASURY", "UNITED STATES"],
    ),
    (
        "EUR",
        &["€", "EUR", "EURO", "EUROS"],
        &["5", "10", "20", "50", "100", "200", "500"],
        &["EUROPEAN CENTRAL BANK", "BCE ECB EZB EKP"],
    ),
    (
        "GBP",
        &["£", "GBP", "POUND", "POUNDS"],
        &["5", "10", "20", "50"],
        &["BANK OF ENGLAND", "I PROMISE TO PAY"],
    ),
];

impl CurrencyProfile {
    pub fn new(
        code: &str,
        symbols: &[&str],
        denominations: &[&str],
        keywords: &[&str],
    ) -> Self {
        let owned = |tokens: &[&str]| -> Vec<String> { tokens.iter().map(|t| t.to_string()).collect() };
        Self {
            code: code.to_string(),
            symbols: owned(symbols),
            denominations: owned(denominations),
            keywords: owned(keywords),
        }
    }

    /// The built-in USD, EUR, GBP table, in that order.
    pub fn builtin() -> &'static [CurrencyProfile] {
        static TABLE: OnceLock<Vec<CurrencyProfile>> = OnceLock::new();
        TABLE.get_or_init(|| {
            BUILTIN_PROFILES
                .iter()
                .map(|(code, symbols, denominations, keywords)| {
                    CurrencyProfile::new(code, symbols, denominations, keywords)
                })
                .collect()
        })
    }

    /// Denominator of the confidence formula. Denominations are not counted.
    pub fn weight_base(&self) -> usize {
        self.symbols.len() + self.keywords.len() + 1
    }
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default, rename = "profile")]
    profiles: Vec<CurrencyProfile>,
}

/// An ordered, validated profile table loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    profiles: Vec<CurrencyProfile>,
}

impl ProfileSet {
    pub fn builtin() -> Self {
        Self { profiles: CurrencyProfile::builtin().to_vec() }
    }

    /// Parse a `[[profile]]` array. Tokens are upper-cased so they can match
    /// normalized text; table order is kept.
    pub fn from_toml(toml_content: &str) -> Result<Self, ProfileError> {
        let file: ProfileFile = toml::from_str(toml_content)?;
        Self::new(file.profiles)
    }

    pub fn new(profiles: Vec<CurrencyProfile>) -> Result<Self, ProfileError> {
        if profiles.is_empty() {
            return Err(ProfileError::Empty);
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let code = profile.code.trim().to_uppercase();
            if code.is_empty() {
                return Err(ProfileError::EmptyCode);
            }
            if !seen.insert(code.clone()) {
                return Err(ProfileError::DuplicateCode(code));
            }
            normalized.push(CurrencyProfile {
                symbols: upper_tokens(&code, "symbols", profile.symbols)?,
                denominations: upper_tokens(&code, "denominations", profile.denominations)?,
                keywords: upper_tokens(&code, "keywords", profile.keywords)?,
                code,
            });
        }
        Ok(Self { profiles: normalized })
    }

    pub fn as_slice(&self) -> &[CurrencyProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::builtin()
    }
}

// An empty token would match every input.
fn upper_tokens(
    code: &str,
    field: &'static str,
    tokens: Vec<String>,
) -> Result<Vec<String>, ProfileError> {
    tokens
        .into_iter()
        .map(|t| {
            if t.is_empty() {
                Err(ProfileError::EmptyToken { code: code.to_string(), field })
            } else {
                Ok(t.to_uppercase())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_is_usd_eur_gbp() {
        let codes: Vec<&str> = CurrencyProfile::builtin().iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["USD", "EUR", "GBP"]);
    }

    #[test]
    fn builtin_weight_bases() {
        let table = CurrencyProfile::builtin();
        assert_eq!(table[0].weight_base(), 9);
        assert_eq!(table[1].weight_base(), 7);
        assert_eq!(table[2].weight_base(), 7);
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(CurrencyProfile::builtin(), CurrencyProfile::builtin()));
    }

    #[test]
    fn from_toml_keeps_order_and_uppercases() {
        let toml = r#"
            [[profile]]
            code = "jpy"
            symbols = ["¥", "yen"]
            denominations = ["1000", "5000"]
            keywords = ["nippon ginko"]

            [[profile]]
            code = "CHF"
            symbols = ["CHF"]
            denominations = ["10"]
            keywords = []
        "#;
        let set = ProfileSet::from_toml(toml).unwrap();
        assert_eq!(set.len(), 2);
        let jpy = &set.as_slice()[0];
        assert_eq!(jpy.code, "JPY");
        assert_eq!(jpy.symbols, vec!["¥", "YEN"]);
        assert_eq!(jpy.keywords, vec!["NIPPON GINKO"]);
        assert_eq!(set.as_slice()[1].code, "CHF");
    }

    #[test]
    fn from_toml_rejects_duplicate_codes() {
        let toml = r#"
            [[profile]]
            code = "USD"
            symbols = []
            denominations = ["1"]
            keywords = []

            [[profile]]
            code = "usd"
            symbols = []
            denominations = ["5"]
            keywords = []
        "#;
        assert!(matches!(
            ProfileSet::from_toml(toml),
            Err(ProfileError::DuplicateCode(c)) if c == "USD"
        ));
    }

    #[test]
    fn from_toml_rejects_empty_token() {
        let toml = r#"
            [[profile]]
            code = "USD"
            symbols = ["$", ""]
            denominations = ["1"]
            keywords = []
        "#;
        assert!(matches!(
            ProfileSet::from_toml(toml),
            Err(ProfileError::EmptyToken { field: "symbols", .. })
        ));
    }

    #[test]
    fn from_toml_rejects_empty_table() {
        assert!(matches!(ProfileSet::from_toml(""), Err(ProfileError::Empty)));
    }

    #[test]
    fn from_toml_reports_parse_errors() {
        assert!(matches!(
            ProfileSet::from_toml("[[profile]]\ncode = 5"),
            Err(ProfileError::Parse(_))
        ));
    }
}
