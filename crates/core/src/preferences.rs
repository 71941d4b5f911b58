//! Category preference selection for the curated product grid.
//!
//! Selected category ids travel in the query string as a comma separated
//! list (`?categories=1,2,5`).

use crate::types::CategoryId;

/// Parse a comma separated id list, skipping anything that is not an id.
/// Duplicates are dropped; first occurrence order is kept.
#[must_use]
pub fn parse_category_ids(raw: &str) -> Vec<CategoryId> {
    let mut ids: Vec<CategoryId> = Vec::new();
    for id in raw
        .split(',')
        .filter_map(|part| part.parse::<CategoryId>().ok())
    {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Encode ids for the `categories` query parameter.
#[must_use]
pub fn category_query(ids: &[CategoryId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_invalid_parts() {
        let ids = parse_category_ids("1, 2,x,,3,2");
        assert_eq!(
            ids,
            vec![CategoryId::new(1), CategoryId::new(2), CategoryId::new(3)]
        );
        assert!(parse_category_ids("").is_empty());
    }

    #[test]
    fn test_category_query() {
        let ids = [CategoryId::new(4), CategoryId::new(9)];
        assert_eq!(category_query(&ids), "4,9");
        assert_eq!(category_query(&[]), "");
        assert_eq!(parse_category_ids(&category_query(&ids)), ids);
    }
}
