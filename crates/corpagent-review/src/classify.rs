use serde::{Deserialize, Serialize};

pub const UNKNOWN_TYPE: &str = "Unknown";

/// Document types in detection priority order, each with its lowercase
/// keywords in matching order.
pub const DOC_TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("Articles of Association", &["articles of association", "articles of incorporation", "aoa"]),
    ("Memorandum of Association", &["memorandum of association", "memorandum of understanding", "moa", "mou"]),
    ("Board Resolution", &["board resolution", "resolution of the board", "board of directors resolution"]),
    ("Shareholder Resolution", &["shareholder resolution", "resolution of the shareholders"]),
    ("Incorporation Application Form", &["incorporation application", "application for incorporation", "incorporation form"]),
    ("UBO Declaration Form", &["ubo declaration", "ultimate beneficial owner", "ubo"]),
    ("Register of Members and Directors", &["register of members", "register of directors", "register of members and directors"]),
    ("Change of Registered Address Notice", &["change of registered address", "registered address notice", "change of address notice"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub detected_type: String,
    pub matched_keywords: Vec<String>,
}

pub fn known_types() -> impl Iterator<Item = &'static str> {
    DOC_TYPE_KEYWORDS.iter().map(|(t, _)| *t)
}

/// The first type in table order with any keyword present in the text.
/// Keywords match as plain substrings, so short ones like `aoa` can fire
/// inside longer words.
pub fn detect_document_type(text: &str) -> Detection {
    let lowered = text.to_lowercase();
    for (doc_type, keywords) in DOC_TYPE_KEYWORDS {
        if let Some(kw) = keywords.iter().find(|kw| lowered.contains(*kw)) {
            return Detection { detected_type: doc_type.to_string(), matched_keywords: vec![kw.to_string()] };
        }
    }
    Detection { detected_type: UNKNOWN_TYPE.to_string(), matched_keywords: vec![] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_wins_over_text_order() {
        let d = detect_document_type("This Board Resolution adopts the Articles of Association.");
        assert_eq!(d.detected_type, "Articles of Association");
        assert_eq!(d.matched_keywords, vec!["articles of association"]);
    }

    #[test]
    fn first_keyword_of_the_type_is_recorded() {
        let d = detect_document_type("ULTIMATE BENEFICIAL OWNER details; see UBO Declaration attached");
        assert_eq!(d.detected_type, "UBO Declaration Form");
        assert_eq!(d.matched_keywords, vec!["ubo declaration"]);
    }

    #[test]
    fn nothing_matches() {
        let d = detect_document_type("Minutes of the annual picnic");
        assert_eq!(d.detected_type, UNKNOWN_TYPE);
        assert!(d.matched_keywords.is_empty());
    }
}
