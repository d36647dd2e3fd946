//! Color literal harvesting from raw CSS text.
//!
//! Matches are returned exactly as written. No case or whitespace
//! normalization happens, so deduplication downstream is textual.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})|rgba?\([^)]+\)|hsla?\([^)]+\)")
        .expect("valid regex")
});

/// Collect every hex, `rgb()`, `rgba()`, `hsl()` and `hsla()` literal in `text`,
/// in source order, duplicates included.
pub fn harvest(text: &str) -> Vec<String> {
    COLOR_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Order-preserving set of color literals.
#[derive(Debug, Default)]
pub(crate) struct Palette {
    seen: HashSet<String>,
    colors: Vec<String>,
}

impl Palette {
    pub(crate) fn extend(&mut self, colors: impl IntoIterator<Item = String>) {
        for color in colors {
            if self.seen.insert(color.clone()) {
                self.colors.push(color);
            }
        }
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvests_all_syntaxes_in_order() {
        let css = ".a{color:#fff} .b{color:rgb(1, 2, 3)} .c{background:hsla(120,50%,50%,.3)} \
                   .d{border-color:rgba(0,0,0,0.5)} .e{fill:hsl(0 100% 50%)} .f{color:#A0B1C2}";
        assert_eq!(
            harvest(css),
            vec![
                "#fff",
                "rgb(1, 2, 3)",
                "hsla(120,50%,50%,.3)",
                "rgba(0,0,0,0.5)",
                "hsl(0 100% 50%)",
                "#A0B1C2",
            ]
        );
    }

    #[test]
    fn keeps_duplicates_and_case() {
        assert_eq!(
            harvest("#FFF #fff #FFF"),
            vec!["#FFF", "#fff", "#FFF"]
        );
    }

    #[test]
    fn ignores_non_colors() {
        assert!(harvest("body { margin: 0; font-family: serif }").is_empty());
        assert!(harvest("#xyz").is_empty());
    }

    #[test]
    fn palette_dedups_textually() {
        let mut palette = Palette::default();
        palette.extend(harvest("#FFF #fff #FFF rgb(0,0,0)"));
        palette.extend(harvest("rgb(0,0,0) rgb(0, 0, 0)"));
        assert_eq!(
            palette.into_vec(),
            vec!["#FFF", "#fff", "rgb(0,0,0)", "rgb(0, 0, 0)"]
        );
    }
}
