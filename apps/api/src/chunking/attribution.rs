use std::collections::HashSet;

/// Lowercased word sets for each page, for locating chunks.
pub struct PageIndex {
    pages: Vec<HashSet<String>>,
}

fn words(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

impl PageIndex {
    pub fn new(pages: &[String]) -> Self {
        Self {
            pages: pages.iter().map(|p| words(p)).collect(),
        }
    }

    /// 1-based number of the first page sharing more than half of the
    /// chunk's distinct words, ignoring case. Falls back to page 1.
    pub fn locate(&self, content: &str) -> usize {
        let words = words(content);
        if words.is_empty() {
            return 1;
        }

        self.pages
            .iter()
            .position(|page| words.intersection(page).count() * 2 > words.len())
            .map(|idx| idx + 1)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<String> {
        vec![
            "Jane Doe\nSoftware engineer with ten years of backend work.".to_string(),
            "Led the payments platform migration. Mentored four engineers.".to_string(),
        ]
    }

    #[test]
    fn test_chunk_from_second_page_resolves_to_page_two() {
        let pages = pages();
        let index = PageIndex::new(&pages);
        assert_eq!(index.locate("Led the payments platform migration."), 2);
    }

    #[test]
    fn test_first_qualifying_page_wins() {
        let pages = vec!["alpha beta gamma".to_string(), "alpha beta gamma delta".to_string()];
        let index = PageIndex::new(&pages);
        assert_eq!(index.locate("alpha beta gamma"), 1);
    }

    #[test]
    fn test_exactly_half_is_not_enough() {
        let pages = vec!["zzz".to_string(), "one two".to_string()];
        let index = PageIndex::new(&pages);
        assert_eq!(index.locate("one two three four"), 1);
        assert_eq!(index.locate("one two three"), 2);
    }

    #[test]
    fn test_case_differences_still_match() {
        let pages = pages();
        let index = PageIndex::new(&pages);
        assert_eq!(index.locate("LED THE PAYMENTS PLATFORM MIGRATION."), 2);
        assert_eq!(index.locate("mentored four Engineers."), 2);
    }

    #[test]
    fn test_unmatched_chunk_defaults_to_page_one() {
        let pages = pages();
        let index = PageIndex::new(&pages);
        assert_eq!(index.locate("Completely unrelated words here"), 1);
        assert_eq!(index.locate(""), 1);
    }
}
