//! CSS selector parsing and extraction helpers.

use scraper::{ElementRef, Selector};

/// Parses a CSS selector that must succeed (for compile-time constants).
///
/// # Panics
///
/// Panics if the selector cannot be parsed (indicates a programming error).
pub fn parse_selector_unsafe(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}' in {}: {}. This is a programming error.",
            selector_str, context, e
        )
    })
}

/// Parses a list of selector strings, in order.
pub fn parse_selectors(selector_strs: &[&str], context: &str) -> Vec<Selector> {
    selector_strs
        .iter()
        .map(|s| parse_selector_unsafe(s, context))
        .collect()
}

/// Text of the first element matched by the first selector that yields
/// non-blank text.
pub fn first_text(element: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        element.select(selector).find_map(|matched| {
            let text = matched.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some(text)
        })
    })
}

/// Value of `attr` on the first element matched by the first selector that
/// carries a non-blank value.
pub fn first_attr(element: ElementRef<'_>, selectors: &[Selector], attr: &str) -> Option<String> {
    selectors.iter().find_map(|selector| {
        element.select(selector).find_map(|matched| {
            matched
                .value()
                .attr(attr)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    })
}
