/// Whether `c` falls in the Arabic Unicode block (U+0600..=U+06FF).
#[inline]
pub fn is_arabic_char(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}')
}

/// True iff the text contains at least one Arabic-block code point.
/// Used to route a query to the Arabic or the English name index.
pub fn is_arabic_script(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

/// Which bilingual name index a query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameLanguage {
    English,
    Arabic,
}

impl NameLanguage {
    pub fn detect(text: &str) -> Self {
        if is_arabic_script(text) {
            NameLanguage::Arabic
        } else {
            NameLanguage::English
        }
    }

    /// Reference record field holding the name in this language.
    pub fn name_field(&self) -> &'static str {
        match self {
            NameLanguage::English => "name_en",
            NameLanguage::Arabic => "name_ar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_arabic_anywhere_in_text() {
        assert!(is_arabic_script("بنادول"));
        assert!(is_arabic_script("Panadol بنادول 500"));
        assert!(is_arabic_script("\u{0600}"));
        assert!(is_arabic_script("x\u{06FF}"));
    }

    #[test]
    fn latin_digits_and_empty_are_not_arabic() {
        assert!(!is_arabic_script(""));
        assert!(!is_arabic_script("Panadol Extra 500"));
        // Arabic presentation forms sit outside the basic block
        assert!(!is_arabic_script("\u{FE8D}"));
        assert!(!is_arabic_script("\u{0700}"));
    }

    #[test]
    fn language_routes_to_name_field() {
        assert_eq!(NameLanguage::detect("أسبرين").name_field(), "name_ar");
        assert_eq!(NameLanguage::detect("aspirin").name_field(), "name_en");
        assert_eq!(NameLanguage::detect(""), NameLanguage::English);
    }
}
