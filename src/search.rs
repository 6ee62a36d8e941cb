//! Free-text substring search across projects and skills.

use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::Skill;
use crate::present::ProjectView;
use crate::projects::{assemble_views, project_row};
use crate::skills::skills_matching;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub projects: Vec<ProjectView>,
    pub skills: Vec<Skill>,
}

/// Projects whose title or description contains `query` plus skills whose
/// name contains it, both case-insensitive. A blank query yields empty
/// lists rather than an error. `cap` bounds each list; it is a configured
/// safety valve, not a relevance cut.
pub async fn search_content(pool: &SqlitePool, query: &str, cap: i64) -> Result<SearchResponse> {
    if query.trim().is_empty() {
        return Ok(SearchResponse {
            projects: Vec::new(),
            skills: Vec::new(),
        });
    }

    let rows = sqlx::query(
        r#"
        SELECT id, title, description, links
        FROM projects
        WHERE title LIKE '%' || ? || '%' OR description LIKE '%' || ? || '%'
        ORDER BY id ASC
        LIMIT ?
        "#,
    )
    .bind(query)
    .bind(query)
    .bind(cap)
    .fetch_all(pool)
    .await?;

    let projects = assemble_views(pool, rows.iter().map(project_row).collect()).await?;
    let skills = skills_matching(pool, query, cap).await?;

    Ok(SearchResponse { projects, skills })
}
