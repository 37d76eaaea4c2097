/// Entry of the closed language list offered by the front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageEntry {
    pub key: &'static str,
    pub label: &'static str,
    /// Syntax tokens tried in order against the syntax set.
    pub candidates: &'static [&'static str],
}

pub const DEFAULT_LANGUAGE: &str = "javascript";

pub static LANGUAGES: [LanguageEntry; 18] = [
    LanguageEntry { key: "javascript", label: "JavaScript", candidates: &["js", "JavaScript"] },
    // Falls back to the JavaScript grammar when no TypeScript grammar is loaded.
    LanguageEntry { key: "typescript", label: "TypeScript", candidates: &["ts", "TypeScript", "js"] },
    LanguageEntry { key: "python", label: "Python", candidates: &["py", "Python"] },
    LanguageEntry { key: "java", label: "Java", candidates: &["java", "Java"] },
    LanguageEntry { key: "c", label: "C", candidates: &["c", "C"] },
    LanguageEntry { key: "cpp", label: "C++", candidates: &["cpp", "C++"] },
    LanguageEntry { key: "rust", label: "Rust", candidates: &["rs", "Rust"] },
    LanguageEntry { key: "go", label: "Go", candidates: &["go", "Go"] },
    LanguageEntry { key: "csharp", label: "C#", candidates: &["cs", "C#"] },
    LanguageEntry { key: "swift", label: "Swift", candidates: &["swift", "Swift"] },
    LanguageEntry { key: "kotlin", label: "Kotlin", candidates: &["kt", "Kotlin"] },
    LanguageEntry { key: "php", label: "PHP", candidates: &["php", "PHP"] },
    LanguageEntry { key: "ruby", label: "Ruby", candidates: &["rb", "Ruby"] },
    LanguageEntry { key: "sql", label: "SQL", candidates: &["sql", "SQL"] },
    LanguageEntry { key: "html", label: "HTML", candidates: &["html", "HTML"] },
    LanguageEntry { key: "css", label: "CSS", candidates: &["css", "CSS"] },
    LanguageEntry { key: "json", label: "JSON", candidates: &["json", "JSON"] },
    LanguageEntry { key: "xml", label: "XML", candidates: &["xml", "XML"] },
];

pub fn find_language(key: &str) -> Option<&'static LanguageEntry> {
    let key = key.trim();
    LANGUAGES
        .iter()
        .find(|entry| entry.key.eq_ignore_ascii_case(key))
}
