use std::sync::LazyLock;

use regex::Regex;

static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^|\]]*\|)?([^\]]+)\]\]").expect("wiki link pattern is valid")
});

const DISCARDED_LINK_MARKERS: [&str; 3] = ["|", "Category:", "File:"];
const MARKUP_TOKEN_MARKERS: [&str; 5] = [":", "{{", "}}", "|", "="];

/// Pulls out-link titles from raw wiki markup.
pub trait LinkExtractor {
    fn extract_links(&self, content: &str) -> Vec<String>;
}

/// `[[target]]` / `[[target|label]]` extraction. Section anchors on piped
/// targets are stripped; category, file and malformed targets are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupLinkExtractor;

impl LinkExtractor for MarkupLinkExtractor {
    fn extract_links(&self, content: &str) -> Vec<String> {
        WIKI_LINK
            .captures_iter(content)
            .filter_map(|captures| {
                let target = match captures.get(1).map(|piped| piped.as_str()) {
                    None | Some("") => captures.get(2)?.as_str(),
                    Some(piped) => {
                        let target = &piped[..piped.len() - 1];
                        match target.find('#') {
                            Some(anchor) => &target[..anchor],
                            None => target,
                        }
                    }
                };
                Some(target.to_owned())
            })
            .filter(|link| {
                !DISCARDED_LINK_MARKERS
                    .iter()
                    .any(|marker| link.contains(marker))
            })
            .collect()
    }
}

/// For metadata-only sources that never carry content.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLinks;

impl LinkExtractor for NoLinks {
    fn extract_links(&self, _content: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Prose word count: lower-cased whitespace tokens that are not markup.
pub fn count_words(content: &str) -> usize {
    content
        .to_lowercase()
        .split_whitespace()
        .filter(|token| {
            !MARKUP_TOKEN_MARKERS
                .iter()
                .any(|marker| token.contains(marker))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_piped_and_anchored_links() {
        let content = "The [[Boston Marathon]] bombing near [[Copley Square|Copley]] \
                       and [[Boylston Street#History|the street]].";
        assert_eq!(
            MarkupLinkExtractor.extract_links(content),
            vec![
                "Boston Marathon".to_owned(),
                "Copley Square".to_owned(),
                "Boylston Street".to_owned(),
            ]
        );
    }

    #[test]
    fn drops_category_and_file_links() {
        let content = "[[Category:2013 crimes]] [[File:Finish line.jpg|thumb]] [[Boston]]";
        assert_eq!(
            MarkupLinkExtractor.extract_links(content),
            vec!["Boston".to_owned()]
        );
    }

    #[test]
    fn counts_prose_words_only() {
        let content = "{{Infobox}} The race was held in [[Boston]]. ref=x key:value a|b";
        assert_eq!(count_words(content), 6);
        assert_eq!(count_words(""), 0);
    }
}
