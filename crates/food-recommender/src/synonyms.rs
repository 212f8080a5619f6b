/// Query-token canonicalization through the synonym table.
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct SynonymMap {
    table: HashMap<String, String>,
    canonical: HashSet<String>,
}

impl SynonymMap {
    /// Build from the raw asset table. Keys and targets are lowercased and trimmed.
    ///
    /// When several raw keys normalize to the same token, a key that is already in
    /// normal form wins; otherwise the first key in byte order wins.
    pub fn new(raw: &HashMap<String, String>) -> Self {
        let sorted: BTreeMap<&str, &str> = raw
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();

        let mut table: HashMap<String, String> = HashMap::with_capacity(sorted.len());
        let mut normalized: Vec<(String, String, bool)> = Vec::with_capacity(sorted.len());
        for (from, to) in sorted {
            let key = from.trim().to_lowercase();
            let target = to.trim().to_lowercase();
            if key.is_empty() || target.is_empty() {
                continue;
            }
            let exact = key == from;
            normalized.push((key, target, exact));
        }
        for pass_exact in [true, false] {
            for (key, target, exact) in &normalized {
                if *exact == pass_exact {
                    table.entry(key.clone()).or_insert_with(|| target.clone());
                }
            }
        }

        let canonical = table.values().cloned().collect();
        Self { table, canonical }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Canonical form of one raw token, or `None` for a blank token.
    ///
    /// A token that is already a canonical target is returned unchanged, so applying
    /// this twice gives the same result as applying it once.
    pub fn canonicalize(&self, raw: &str) -> Option<String> {
        let token = raw.trim().to_lowercase();
        if token.is_empty() {
            return None;
        }
        if self.canonical.contains(&token) {
            return Some(token);
        }
        match self.table.get(&token) {
            Some(target) => Some(target.clone()),
            None => Some(token),
        }
    }

    /// Canonicalize every ingredient and join them into one query string.
    pub fn normalize_query<S: AsRef<str>>(&self, ingredients: &[S]) -> String {
        ingredients
            .iter()
            .filter_map(|ing| self.canonicalize(ing.as_ref()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synonyms(pairs: &[(&str, &str)]) -> SynonymMap {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        SynonymMap::new(&raw)
    }

    #[test]
    fn maps_through_table_after_lowercase_and_trim() {
        let map = synonyms(&[("tomatoes", "tomato"), ("Whole Milk", "milk")]);
        assert_eq!(map.canonicalize("  Tomatoes ").as_deref(), Some("tomato"));
        assert_eq!(map.canonicalize("whole milk").as_deref(), Some("milk"));
        assert_eq!(map.canonicalize("Basil").as_deref(), Some("basil"));
        assert_eq!(map.canonicalize("   "), None);
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let map = synonyms(&[
            ("tomatoes", "tomato"),
            ("tomato", "tomato"),
            ("milk", "dairy"),
            ("cream", "milk"),
        ]);
        for raw in ["tomatoes", "tomato", "cream", "milk", "flour"] {
            let once = map.canonicalize(raw).expect("non-blank");
            let twice = map.canonicalize(&once).expect("non-blank");
            assert_eq!(once, twice, "not idempotent for {raw}");
        }
    }

    #[test]
    fn colliding_keys_resolve_the_same_way_every_time() {
        for _ in 0..50 {
            let map = synonyms(&[("Tomatoes", "tomato"), ("tomatoes ", "passata")]);
            assert_eq!(map.canonicalize("tomatoes").as_deref(), Some("tomato"));
        }

        for _ in 0..50 {
            let map = synonyms(&[
                ("Tomatoes", "tomato"),
                ("tomatoes", "pomodoro"),
                (" TOMATOES", "passata"),
            ]);
            assert_eq!(map.canonicalize("Tomatoes").as_deref(), Some("pomodoro"));
            assert_eq!(map.len(), 1);
        }
    }

    #[test]
    fn normalize_query_joins_tokens() {
        let map = synonyms(&[("tomatoes", "tomato")]);
        assert_eq!(
            map.normalize_query(&["Tomatoes", " cheese ", "", "Flour"]),
            "tomato cheese flour"
        );
    }
}
