//! Project listing with eager tag attachment.
//!
//! Project queries run in two steps: the parent rows are fetched by
//! whatever filter the caller needs, then the category and skill tags for
//! all returned ids come back in one bulk query per junction and are merged
//! in memory. No per-row secondary queries.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::models::{ProjectRow, TagRef};
use crate::present::ProjectView;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

const PROJECT_CATEGORY_TAGS_SQL: &str = r#"
    SELECT pc.project_id AS parent_id, c.id, c.name
    FROM project_categories pc
    JOIN categories c ON c.id = pc.category_id
    WHERE pc.project_id IN ({ids})
    ORDER BY pc.project_id, c.id
"#;

const PROJECT_SKILL_TAGS_SQL: &str = r#"
    SELECT ps.project_id AS parent_id, s.id, s.name
    FROM project_skills ps
    JOIN skills s ON s.id = ps.skill_id
    WHERE ps.project_id IN ({ids})
    ORDER BY ps.project_id, s.id
"#;

/// All projects ordered by id, optionally filtered to those exercising a
/// skill whose name contains `skill` (case-insensitive), paginated by
/// offset/limit.
pub async fn list_projects(
    pool: &SqlitePool,
    skill: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<Vec<ProjectView>> {
    let rows = match skill {
        Some(skill) => {
            sqlx::query(
                r#"
                SELECT DISTINCT p.id, p.title, p.description, p.links
                FROM projects p
                JOIN project_skills ps ON ps.project_id = p.id
                JOIN skills s ON s.id = ps.skill_id
                WHERE s.name LIKE '%' || ? || '%'
                ORDER BY p.id ASC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(skill)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, title, description, links FROM projects ORDER BY id ASC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    assemble_views(pool, rows.iter().map(project_row).collect()).await
}

/// Converts a raw result row into a [`ProjectRow`]. Shared by every query
/// that selects `id, title, description, links` from `projects`.
pub(crate) fn project_row(row: &SqliteRow) -> ProjectRow {
    ProjectRow {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        links: row.get("links"),
    }
}

/// Attaches categories and skills to a batch of project rows and maps them
/// through the presentation layer.
pub(crate) async fn assemble_views(
    pool: &SqlitePool,
    rows: Vec<ProjectRow>,
) -> Result<Vec<ProjectView>> {
    let ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
    let mut categories = fetch_tag_map(pool, PROJECT_CATEGORY_TAGS_SQL, &ids).await?;
    let mut skills = fetch_tag_map(pool, PROJECT_SKILL_TAGS_SQL, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let cats = categories.remove(&row.id).unwrap_or_default();
            let sks = skills.remove(&row.id).unwrap_or_default();
            ProjectView::from_row(row, cats, sks)
        })
        .collect())
}

/// Bulk-fetches tag rows for a set of parent ids through a junction.
///
/// `sql_template` must select `(parent_id, id, name)` and contain an
/// `IN ({ids})` clause; the placeholder expands to one bind per parent id.
pub(crate) async fn fetch_tag_map(
    pool: &SqlitePool,
    sql_template: &str,
    parent_ids: &[i64],
) -> Result<HashMap<i64, Vec<TagRef>>> {
    if parent_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = sql_template.replace("{ids}", &placeholders(parent_ids.len()));
    let mut query = sqlx::query(&sql);
    for id in parent_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;

    let mut map: HashMap<i64, Vec<TagRef>> = HashMap::new();
    for row in &rows {
        let parent_id: i64 = row.get("parent_id");
        map.entry(parent_id).or_default().push(TagRef {
            id: row.get("id"),
            name: row.get("name"),
        });
    }
    Ok(map)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
