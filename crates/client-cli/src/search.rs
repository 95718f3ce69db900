//! Keyword search over the navigation sections and generator themes

use shared::{Language, Theme};

use crate::i18n::{self, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Section,
    Theme,
}

/// What selecting a hit does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    Navigate(Section),
    /// Open the generator with this theme selected
    SelectTheme(Theme),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub category: Category,
    pub label: &'static str,
    pub action: SearchAction,
}

struct Entry {
    hit: SearchHit,
    keywords: &'static [&'static str],
}

/// Sections first in navigation order, then themes
fn index(lang: Language) -> Vec<Entry> {
    let strings = i18n::strings(lang);
    let sections = Section::ALL.into_iter().map(|section| Entry {
        hit: SearchHit {
            category: Category::Section,
            label: strings.section(section),
            action: SearchAction::Navigate(section),
        },
        keywords: strings.section_keywords(section),
    });
    let themes = Theme::ALL.into_iter().map(|theme| Entry {
        hit: SearchHit {
            category: Category::Theme,
            label: strings.theme(theme),
            action: SearchAction::SelectTheme(theme),
        },
        keywords: strings.theme_keywords(theme),
    });
    sections.chain(themes).collect()
}

/// Case-insensitive substring match on labels and keywords, in table order.
///
/// A blank query returns nothing; callers close the result list for it rather
/// than showing an empty state.
pub fn search(query: &str, lang: Language) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    index(lang)
        .into_iter()
        .filter(|entry| {
            entry.hit.label.to_lowercase().contains(&needle)
                || entry
                    .keywords
                    .iter()
                    .any(|k| k.to_lowercase().contains(&needle))
        })
        .map(|entry| entry.hit)
        .collect()
}

/// Whether results should be shown at all for this query
pub fn is_open(query: &str) -> bool {
    !query.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_is_closed_and_empty() {
        for q in ["", "   ", "\t\n"] {
            assert!(search(q, Language::En).is_empty());
            assert!(!is_open(q));
        }
    }

    #[test]
    fn test_same_query_same_order() {
        let first = search("po", Language::En);
        let second = search("po", Language::En);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_matches_labels_case_insensitively() {
        let hits = search("PRICING", Language::En);
        assert_eq!(hits[0].action, SearchAction::Navigate(Section::Pricing));
        assert_eq!(hits[0].category, Category::Section);
    }

    #[test]
    fn test_matches_keywords() {
        let hits = search("credits", Language::En);
        assert!(hits
            .iter()
            .any(|h| h.action == SearchAction::Navigate(Section::Pricing)));

        let hits = search("retro", Language::En);
        assert_eq!(
            hits,
            vec![SearchHit {
                category: Category::Theme,
                label: "Vintage",
                action: SearchAction::SelectTheme(Theme::Vintage),
            }]
        );
    }

    #[test]
    fn test_sections_come_before_themes() {
        let hits = search("o", Language::En);
        let first_theme = hits.iter().position(|h| h.category == Category::Theme).unwrap();
        assert!(hits[first_theme..].iter().all(|h| h.category == Category::Theme));
    }

    #[test]
    fn test_language_specific_tables() {
        let hits = search("тариф", Language::Ru);
        assert_eq!(hits[0].label, "Тарифы");
        assert!(search("тариф", Language::En).is_empty());
    }

    #[test]
    fn test_no_typo_tolerance() {
        assert!(search("pricnig", Language::En).is_empty());
    }
}
