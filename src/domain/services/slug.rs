use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Turns free text into a lowercase ASCII slug.
///
/// Accented letters are decomposed and their marks dropped. Any run of characters
/// outside `[a-z0-9]` becomes a single hyphen, and the result never starts or ends
/// with one. Returns an empty string when nothing ASCII-mappable remains.
pub fn generate(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.nfd() {
        if is_combining_mark(c) {
            continue;
        }

        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_accents() {
        assert_eq!(generate("Café d'été 2024!"), "cafe-d-ete-2024");
        assert_eq!(generate("Réunion à Saint-Étienne"), "reunion-a-saint-etienne");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(generate("  Hello -- World__v1.0  "), "hello-world-v1-0");
        assert_eq!(generate("a...b"), "a-b");
    }

    #[test]
    fn never_emits_edge_hyphens() {
        assert_eq!(generate("-leading"), "leading");
        assert_eq!(generate("trailing-"), "trailing");
        assert_eq!(generate("!!!"), "");
    }

    #[test]
    fn empty_for_unmappable_input() {
        assert_eq!(generate(""), "");
        assert_eq!(generate("日本語"), "");
    }

    #[test]
    fn idempotent_on_own_output() {
        for input in ["Café d'été 2024!", "Reunion", "Open Source Day #3", "ÀÉÎÕÜ ç"] {
            let once = generate(input);
            assert_eq!(generate(&once), once);
        }
    }
}
