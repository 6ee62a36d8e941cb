//! Presentation mapping from stored rows to API records.
//!
//! Every query that returns projects goes through [`ProjectView::from_row`],
//! so the link-map normalization and tag attachment behave identically no
//! matter which endpoint produced the row.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ProjectRow, TagRef, WorkExperienceRow};

/// Project as served: the stored links blob parsed into a string map, with
/// the eagerly-loaded category and skill tags attached.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub links: BTreeMap<String, String>,
    pub categories: Vec<TagRef>,
    pub skills: Vec<TagRef>,
}

impl ProjectView {
    pub fn from_row(row: ProjectRow, categories: Vec<TagRef>, skills: Vec<TagRef>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            links: parse_links(row.links.as_deref()),
            categories,
            skills,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkExperienceView {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub categories: Vec<TagRef>,
}

impl WorkExperienceView {
    pub fn from_row(row: WorkExperienceRow, categories: Vec<TagRef>) -> Self {
        Self {
            id: row.id,
            company: row.company,
            position: row.position,
            start_date: row.start_date,
            end_date: row.end_date,
            description: row.description,
            categories,
        }
    }
}

/// Parses a stored links blob into a label → URL map.
///
/// The API boundary always serves a map, `{}` when the column is NULL or
/// does not parse as a string-to-string object, never `null`.
pub fn parse_links(blob: Option<&str>) -> BTreeMap<String, String> {
    blob.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_links_absent() {
        assert!(parse_links(None).is_empty());
    }

    #[test]
    fn test_parse_links_valid_map() {
        let links = parse_links(Some(r#"{"github": "https://github.com/x/y"}"#));
        assert_eq!(links.len(), 1);
        assert_eq!(links["github"], "https://github.com/x/y");
    }

    #[test]
    fn test_parse_links_empty_object() {
        assert!(parse_links(Some("{}")).is_empty());
    }

    #[test]
    fn test_parse_links_malformed_json() {
        assert!(parse_links(Some("{not json")).is_empty());
    }

    #[test]
    fn test_parse_links_non_string_values() {
        // A map with non-string values is not a valid link map
        assert!(parse_links(Some(r#"{"stars": 42}"#)).is_empty());
    }

    #[test]
    fn test_from_row_carries_tags_through() {
        let row = ProjectRow {
            id: 7,
            title: "AR Campus Navigation".to_string(),
            description: "Indoor navigation with cloud anchors.".to_string(),
            links: None,
        };
        let categories = vec![TagRef {
            id: 1,
            name: "AR/VR Development".to_string(),
        }];
        let skills = vec![TagRef {
            id: 4,
            name: "Unity".to_string(),
        }];

        let view = ProjectView::from_row(row, categories, skills);
        assert_eq!(view.id, 7);
        assert!(view.links.is_empty());
        assert_eq!(view.categories[0].name, "AR/VR Development");
        assert_eq!(view.skills[0].name, "Unity");
    }
}
