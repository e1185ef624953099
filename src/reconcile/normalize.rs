//! Player name normalization.
//!
//! Scraped sites and the fantasy API spell the same player differently:
//! "C.J. McCollum" vs "CJ McCollum", "Luka Dončić" vs "Luka Doncic",
//! "Jaren Jackson Jr." vs "Jaren Jackson". The normalizer reduces a name to a
//! comparison key so those variants collide. Every rule can be switched off.

use serde::{Deserialize, Serialize};

/// Configurable name normalization rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameNormalizer {
    pub fold_case: bool,
    pub transliterate: bool,
    pub strip_punctuation: bool,
    /// Trailing name tokens to drop, compared after case folding and
    /// punctuation stripping.
    pub suffixes: Vec<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self {
            fold_case: true,
            transliterate: true,
            strip_punctuation: true,
            suffixes: ["jr", "sr", "ii", "iii", "iv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl NameNormalizer {
    /// Reduce `name` to its comparison key.
    ///
    /// ```rust
    /// use hoops_sync::reconcile::NameNormalizer;
    ///
    /// let n = NameNormalizer::default();
    /// assert_eq!(n.normalize("T.J. Warren"), n.normalize("TJ Warren"));
    /// assert_eq!(n.normalize("Jaren Jackson Jr."), "jaren jackson");
    /// ```
    pub fn normalize(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        for c in name.chars() {
            let c = if self.transliterate { fold_diacritic(c) } else { c };
            if self.strip_punctuation {
                match c {
                    '.' | '\'' | '\u{2019}' => continue,
                    c if c.is_alphanumeric() || c.is_whitespace() => out.push(c),
                    _ => out.push(' '),
                }
            } else {
                out.push(c);
            }
        }

        if self.fold_case {
            out = out.to_lowercase();
        }

        let mut tokens: Vec<&str> = out.split_whitespace().collect();
        while tokens.len() > 1 {
            let last = tokens[tokens.len() - 1];
            if self.is_suffix(last) {
                tokens.pop();
            } else {
                break;
            }
        }
        tokens.join(" ")
    }

    fn is_suffix(&self, token: &str) -> bool {
        self.suffixes.iter().any(|s| {
            if self.fold_case {
                s.eq_ignore_ascii_case(token)
            } else {
                s == token
            }
        })
    }
}

/// Map common Latin letters with diacritics to their ASCII base letter.
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ď' | 'đ' => 'd',
        'Ď' | 'Đ' => 'D',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'ğ' | 'ģ' => 'g',
        'Ğ' | 'Ģ' => 'G',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' | 'İ' => 'I',
        'ķ' => 'k',
        'Ķ' => 'K',
        'ĺ' | 'ļ' | 'ľ' | 'ł' => 'l',
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ł' => 'L',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => 'O',
        'ŕ' | 'ř' => 'r',
        'Ŕ' | 'Ř' => 'R',
        'ś' | 'ş' | 'š' | 'ș' => 's',
        'Ś' | 'Ş' | 'Š' | 'Ș' => 'S',
        'ţ' | 'ť' | 'ț' => 't',
        'Ţ' | 'Ť' | 'Ț' => 'T',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' | 'Ų' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' | 'Ÿ' => 'Y',
        'ź' | 'ż' | 'ž' => 'z',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_periods_and_case() {
        let n = NameNormalizer::default();
        assert_eq!(n.normalize("C.J. McCollum"), "cj mccollum");
        assert_eq!(n.normalize("CJ McCollum"), "cj mccollum");
    }

    #[test]
    fn test_strips_generational_suffixes() {
        let n = NameNormalizer::default();
        assert_eq!(n.normalize("Gary Trent Jr."), "gary trent");
        assert_eq!(n.normalize("Robert Williams III"), "robert williams");
        assert_eq!(n.normalize("Marvin Bagley III"), n.normalize("Marvin Bagley"));
    }

    #[test]
    fn test_trailing_initial_v_is_kept_by_default() {
        let n = NameNormalizer::default();
        assert_eq!(n.normalize("Marcus V"), "marcus v");
        assert_ne!(n.normalize("Marcus V"), n.normalize("Marcus"));

        let n = NameNormalizer {
            suffixes: vec!["v".to_string()],
            ..NameNormalizer::default()
        };
        assert_eq!(n.normalize("Marcus V"), "marcus");
    }

    #[test]
    fn test_single_token_suffix_is_kept() {
        let n = NameNormalizer::default();
        assert_eq!(n.normalize("V"), "v");
    }

    #[test]
    fn test_transliterates_diacritics() {
        let n = NameNormalizer::default();
        assert_eq!(n.normalize("Luka Dončić"), "luka doncic");
        assert_eq!(n.normalize("Kristaps Porziņģis"), "kristaps porzingis");
        assert_eq!(n.normalize("Jonas Valančiūnas"), "jonas valanciunas");
    }

    #[test]
    fn test_apostrophes_and_hyphens() {
        let n = NameNormalizer::default();
        assert_eq!(n.normalize("De'Aaron Fox"), "deaaron fox");
        assert_eq!(n.normalize("Shai Gilgeous-Alexander"), "shai gilgeous alexander");
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let n = NameNormalizer {
            fold_case: false,
            transliterate: false,
            strip_punctuation: false,
            suffixes: Vec::new(),
        };
        assert_eq!(n.normalize("  T.J.   Warren Jr. "), "T.J. Warren Jr.");
    }
}
