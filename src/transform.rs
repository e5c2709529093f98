// ABOUTME: Text transformations applied before content reaches the templates
// ABOUTME: Wraps no-break words in marker spans and rewrites relative deck asset paths

/// Class carried by the span wrapped around no-break words
pub const NO_BREAK_CLASS: &str = "no-break";

/// Relative asset prefix used inside deck Markdown
pub const RELATIVE_ASSET_PREFIX: &str = "./assets/";

/// Wrap every literal occurrence of each word in a no-break span.
///
/// Words are applied in list order and matched literally. Empty words are
/// skipped. Applying this twice is only idempotent when no word occurs inside
/// another word's wrapped form (a word such as `span` would match the markup
/// produced for earlier words).
pub fn wrap_no_break<S: AsRef<str>>(text: &str, words: &[S]) -> String {
    words
        .iter()
        .map(|word| word.as_ref())
        .filter(|word| !word.is_empty())
        .fold(text.to_string(), |acc, word: &str| {
            acc.replace(
                word,
                &format!(r#"<span class="{}">{}</span>"#, NO_BREAK_CLASS, word),
            )
        })
}

/// Rewrite `./assets/` references in deck Markdown to the deck's site path.
///
/// This is a plain textual substitution: fenced code blocks are rewritten
/// exactly like prose.
pub fn rewrite_asset_refs(markdown: &str, deck_id: &str) -> String {
    markdown.replace(RELATIVE_ASSET_PREFIX, &deck_assets_url(deck_id))
}

/// Site path under which a deck's assets are published, with trailing slash
pub fn deck_assets_url(deck_id: &str) -> String {
    format!("/slides/{}/assets/", deck_id)
}
