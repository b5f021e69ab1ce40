//! Keyword-based category classification.
//!
//! Category strings from the place source are free text, so the classifier
//! matches case-insensitive substrings of the category and the name. Cafe
//! keywords are checked first: a "브런치 카페" is a cafe even though it also
//! mentions food.

use crate::traits::{CategoryClass, CategoryClassifier};

/// Default cafe keywords.
pub const DEFAULT_CAFE_KEYWORDS: &[&str] = &["카페", "coffee"];

/// Default dining keywords.
pub const DEFAULT_DINING_KEYWORDS: &[&str] = &[
    "음식", "식당", "맛집", "한식", "중식", "일식", "양식", "분식", "고기", "구이", "국밥", "치킨",
    "피자", "파스타", "레스토랑", "주점", "술집", "포차", "이자카야", "바",
];

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    cafe: Vec<String>,
    dining: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAFE_KEYWORDS, DEFAULT_DINING_KEYWORDS)
    }
}

impl KeywordClassifier {
    pub fn new<S: AsRef<str>>(cafe: &[S], dining: &[S]) -> Self {
        Self {
            cafe: normalize(cafe),
            dining: normalize(dining),
        }
    }
}

fn normalize<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn matches_any(haystacks: &[&str], keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| haystacks.iter().any(|h| h.contains(keyword.as_str())))
}

impl CategoryClassifier for KeywordClassifier {
    fn classify(&self, category: Option<&str>, name: &str) -> CategoryClass {
        let category = category.unwrap_or_default().to_lowercase();
        let name = name.to_lowercase();
        let haystacks = [category.as_str(), name.as_str()];

        if matches_any(&haystacks, &self.cafe) {
            CategoryClass::Cafe
        } else if matches_any(&haystacks, &self.dining) {
            CategoryClass::Dining
        } else {
            CategoryClass::Other
        }
    }
}
