//! Skill queries and the one runtime write path.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::models::Skill;

/// Skills flagged as top skills, in insertion order.
pub async fn top_skills(pool: &SqlitePool) -> Result<Vec<Skill>> {
    let rows = sqlx::query(
        "SELECT id, name, is_top_skill FROM skills WHERE is_top_skill = 1 ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(skill_row).collect())
}

/// Every skill, top skills first, alphabetical within each group. This is
/// the ordering the full-profile listing uses.
pub async fn all_skills_ranked(pool: &SqlitePool) -> Result<Vec<Skill>> {
    let rows = sqlx::query(
        "SELECT id, name, is_top_skill FROM skills ORDER BY is_top_skill DESC, name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(skill_row).collect())
}

/// Skills whose name contains `query`, case-insensitive, capped at `limit`.
pub async fn skills_matching(pool: &SqlitePool, query: &str, limit: i64) -> Result<Vec<Skill>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, is_top_skill
        FROM skills
        WHERE name LIKE '%' || ? || '%'
        ORDER BY id ASC
        LIMIT ?
        "#,
    )
    .bind(query)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(skill_row).collect())
}

/// Inserts a new skill. Returns `None` when the name is already taken.
/// The UNIQUE constraint arbitrates, so two concurrent creates of the same
/// name end with exactly one row.
pub async fn create_skill(
    pool: &SqlitePool,
    name: &str,
    is_top_skill: bool,
) -> Result<Option<Skill>> {
    let result = sqlx::query("INSERT INTO skills (name, is_top_skill) VALUES (?, ?)")
        .bind(name)
        .bind(is_top_skill)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(Some(Skill {
            id: done.last_insert_rowid(),
            name: name.to_string(),
            is_top_skill,
        })),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn skill_row(row: &sqlx::sqlite::SqliteRow) -> Skill {
    Skill {
        id: row.get("id"),
        name: row.get("name"),
        is_top_skill: row.get("is_top_skill"),
    }
}
