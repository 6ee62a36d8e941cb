//! Category aggregation across projects and work experience.

use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::experience::work_history;
use crate::present::{ProjectView, WorkExperienceView};
use crate::projects::{assemble_views, project_row};

#[derive(Debug, Serialize)]
pub struct CategoryContent {
    pub projects: Vec<ProjectView>,
    pub work_experience: Vec<WorkExperienceView>,
}

/// Everything tagged with a category whose name contains `name`,
/// case-insensitive: projects (id order) and work experience
/// (most-recent-first). Returns `None` when both lists are empty; a
/// category with no linked content is indistinguishable from a category
/// that does not exist.
pub async fn by_category(pool: &SqlitePool, name: &str) -> Result<Option<CategoryContent>> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT p.id, p.title, p.description, p.links
        FROM projects p
        JOIN project_categories pc ON pc.project_id = p.id
        JOIN categories c ON c.id = pc.category_id
        WHERE c.name LIKE '%' || ? || '%'
        ORDER BY p.id ASC
        "#,
    )
    .bind(name)
    .fetch_all(pool)
    .await?;

    let projects = assemble_views(pool, rows.iter().map(project_row).collect()).await?;
    let work_experience = work_history(pool, Some(name)).await?;

    if projects.is_empty() && work_experience.is_empty() {
        return Ok(None);
    }

    Ok(Some(CategoryContent {
        projects,
        work_experience,
    }))
}
