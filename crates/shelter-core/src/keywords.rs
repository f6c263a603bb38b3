//! Keyword predicates over free-text shelter fields.
//!
//! Flags such as `ada` and `pets_ok` are derived from notes and hours
//! text. Each predicate works on a [`TextBlob`], which lowercases and
//! joins the inputs once so the keyword lists can be matched directly.

/// Keywords that mark a shelter as wheelchair / ADA accessible.
pub const ADA_KEYWORDS: &[&str] = &["ada", "accessible", "wheelchair"];

/// Keywords that mark a shelter as accepting pets.
pub const PET_KEYWORDS: &[&str] = &["pet", "animal"];

/// Lowercased concatenation of free-text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlob(String);

impl TextBlob {
    /// Builds a blob from any number of optional text fields.
    ///
    /// Missing fields are skipped; present ones are joined with a space so
    /// a keyword can never be formed across two fields.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let joined = fields
            .into_iter()
            .flatten()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        Self(joined)
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if any keyword occurs as a substring.
    pub fn contains_any(&self, keywords: &[&str]) -> bool {
        keywords
            .iter()
            .any(|keyword| self.0.contains(&keyword.to_lowercase()))
    }
}

/// True if the text mentions accessibility.
pub fn is_ada_accessible(blob: &TextBlob) -> bool {
    blob.contains_any(ADA_KEYWORDS)
}

/// True if the text mentions pets or animals.
pub fn allows_pets(blob: &TextBlob) -> bool {
    blob.contains_any(PET_KEYWORDS)
}
