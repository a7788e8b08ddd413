//! Presentation helpers for predicted species names.
//!
//! Labels come out of the predictor lowercase; these only affect what the
//! user sees.

const ARTWORK_BASE_URL: &str = "https://img.pokemondb.net/artwork/large";

/// Capitalize the first letter of every word and lowercase the rest.
///
/// Any non-letter starts a new word, so `"farfetch'd"` becomes `"Farfetch'D"`
/// and `"mr. mime"` becomes `"Mr. Mime"`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Official artwork location for a species.
pub fn image_url(name: &str) -> String {
    format!(
        "{}/{}.jpg",
        ARTWORK_BASE_URL,
        name.to_lowercase().replace(' ', "-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("bulbasaur"), "Bulbasaur");
        assert_eq!(title_case("mr. mime"), "Mr. Mime");
        assert_eq!(title_case("ho-oh"), "Ho-Oh");
        assert_eq!(title_case("farfetch'd"), "Farfetch'D");
        assert_eq!(title_case("PORYGON2z"), "Porygon2Z");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn image_url_hyphenates_spaces() {
        assert_eq!(
            image_url("bulbasaur"),
            "https://img.pokemondb.net/artwork/large/bulbasaur.jpg"
        );
        assert_eq!(
            image_url("Mr. Mime"),
            "https://img.pokemondb.net/artwork/large/mr.-mime.jpg"
        );
    }
}
