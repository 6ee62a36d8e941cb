//! Work-experience retrieval with category tags.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::models::WorkExperienceRow;
use crate::present::WorkExperienceView;
use crate::projects::fetch_tag_map;

const WORK_EXPERIENCE_CATEGORY_TAGS_SQL: &str = r#"
    SELECT wc.work_experience_id AS parent_id, c.id, c.name
    FROM work_experience_categories wc
    JOIN categories c ON c.id = wc.category_id
    WHERE wc.work_experience_id IN ({ids})
    ORDER BY wc.work_experience_id, c.id
"#;

/// Work experience ordered most-recent-first, optionally filtered to
/// entries tagged with a category whose name contains `category`
/// (case-insensitive). Category tags are attached in bulk.
pub async fn work_history(
    pool: &SqlitePool,
    category: Option<&str>,
) -> Result<Vec<WorkExperienceView>> {
    let rows = match category {
        Some(category) => {
            sqlx::query(
                r#"
                SELECT DISTINCT w.id, w.company, w.position, w.start_date, w.end_date, w.description
                FROM work_experience w
                JOIN work_experience_categories wc ON wc.work_experience_id = w.id
                JOIN categories c ON c.id = wc.category_id
                WHERE c.name LIKE '%' || ? || '%'
                ORDER BY w.start_date DESC
                "#,
            )
            .bind(category)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, company, position, start_date, end_date, description
                FROM work_experience
                ORDER BY start_date DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    let entries: Vec<WorkExperienceRow> = rows
        .iter()
        .map(|row| WorkExperienceRow {
            id: row.get("id"),
            company: row.get("company"),
            position: row.get("position"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            description: row.get("description"),
        })
        .collect();

    let ids: Vec<i64> = entries.iter().map(|w| w.id).collect();
    let mut categories = fetch_tag_map(pool, WORK_EXPERIENCE_CATEGORY_TAGS_SQL, &ids).await?;

    Ok(entries
        .into_iter()
        .map(|row| {
            let cats = categories.remove(&row.id).unwrap_or_default();
            WorkExperienceView::from_row(row, cats)
        })
        .collect())
}
