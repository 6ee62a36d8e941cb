//! Offline seed-data loader.
//!
//! Reads a JSON seed file and loads it into the store. The profile, links,
//! skills, and categories upsert by their unique keys; projects, work
//! experience, education, and the junction rows are wiped and reloaded so
//! re-running `me-api seed` converges on the file's content instead of
//! accumulating duplicates.
//!
//! Junction associations are expressed by name in the file and resolved to
//! ids at load time; an association naming an unknown category or skill
//! aborts the load.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Config;
use crate::db;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub profile: SeedProfile,
    #[serde(default)]
    pub links: Vec<SeedLink>,
    #[serde(default)]
    pub skills: Vec<SeedSkill>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub education: Vec<SeedEducation>,
    #[serde(default)]
    pub work_experience: Vec<SeedWorkExperience>,
    #[serde(default)]
    pub projects: Vec<SeedProject>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProfile {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedSkill {
    pub name: String,
    #[serde(default)]
    pub is_top_skill: bool,
}

#[derive(Debug, Deserialize)]
pub struct SeedEducation {
    pub institution: String,
    pub degree: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SeedWorkExperience {
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProject {
    pub title: String,
    pub description: String,
    /// Typed string → string here, so a malformed link map fails parsing
    /// before anything touches the store.
    #[serde(default)]
    pub links: BTreeMap<String, String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

pub async fn run_seed(config: &Config, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read seed file: {}", file.display()))?;
    let seed: SeedFile =
        serde_json::from_str(&content).with_context(|| "Failed to parse seed file")?;

    let pool = db::connect(config).await?;

    sqlx::query(
        r#"
        INSERT INTO profile (id, name, email) VALUES (1, ?, ?)
        ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email
        "#,
    )
    .bind(&seed.profile.name)
    .bind(&seed.profile.email)
    .execute(&pool)
    .await?;

    for link in &seed.links {
        sqlx::query(
            r#"
            INSERT INTO links (name, url) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET url = excluded.url
            "#,
        )
        .bind(&link.name)
        .bind(&link.url)
        .execute(&pool)
        .await?;
    }

    for skill in &seed.skills {
        sqlx::query(
            r#"
            INSERT INTO skills (name, is_top_skill) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET is_top_skill = excluded.is_top_skill
            "#,
        )
        .bind(&skill.name)
        .bind(skill.is_top_skill)
        .execute(&pool)
        .await?;
    }

    for category in &seed.categories {
        sqlx::query("INSERT INTO categories (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(category)
            .execute(&pool)
            .await?;
    }

    // Wipe and reload the positional tables, junctions first so the
    // foreign keys stay satisfied throughout.
    for table in [
        "project_categories",
        "project_skills",
        "work_experience_categories",
        "projects",
        "work_experience",
        "education",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&pool)
            .await?;
    }

    for education in &seed.education {
        sqlx::query(
            "INSERT INTO education (institution, degree, start_date, end_date) VALUES (?, ?, ?, ?)",
        )
        .bind(&education.institution)
        .bind(&education.degree)
        .bind(education.start_date)
        .bind(education.end_date)
        .execute(&pool)
        .await?;
    }

    for work in &seed.work_experience {
        let done = sqlx::query(
            r#"
            INSERT INTO work_experience (company, position, start_date, end_date, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&work.company)
        .bind(&work.position)
        .bind(work.start_date)
        .bind(work.end_date)
        .bind(&work.description)
        .execute(&pool)
        .await?;
        let work_id = done.last_insert_rowid();

        for category in &work.categories {
            let category_id = category_id(&pool, category).await?;
            sqlx::query(
                "INSERT OR IGNORE INTO work_experience_categories (work_experience_id, category_id) VALUES (?, ?)",
            )
            .bind(work_id)
            .bind(category_id)
            .execute(&pool)
            .await?;
        }
    }

    for project in &seed.projects {
        // An empty map stores as NULL; the read path renders both as {}
        let links_blob = if project.links.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&project.links)?)
        };

        let done =
            sqlx::query("INSERT INTO projects (title, description, links) VALUES (?, ?, ?)")
                .bind(&project.title)
                .bind(&project.description)
                .bind(links_blob)
                .execute(&pool)
                .await?;
        let project_id = done.last_insert_rowid();

        for category in &project.categories {
            let category_id = category_id(&pool, category).await?;
            sqlx::query(
                "INSERT OR IGNORE INTO project_categories (project_id, category_id) VALUES (?, ?)",
            )
            .bind(project_id)
            .bind(category_id)
            .execute(&pool)
            .await?;
        }

        for skill in &project.skills {
            let skill_id = skill_id(&pool, skill).await?;
            sqlx::query(
                "INSERT OR IGNORE INTO project_skills (project_id, skill_id) VALUES (?, ?)",
            )
            .bind(project_id)
            .bind(skill_id)
            .execute(&pool)
            .await?;
        }
    }

    println!(
        "seeded: {} skills, {} categories, {} projects, {} work experience, {} education, {} links",
        seed.skills.len(),
        seed.categories.len(),
        seed.projects.len(),
        seed.work_experience.len(),
        seed.education.len(),
        seed.links.len()
    );

    pool.close().await;
    Ok(())
}

async fn category_id(pool: &SqlitePool, name: &str) -> Result<i64> {
    let row = sqlx::query("SELECT id FROM categories WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => Ok(row.get("id")),
        None => bail!("unknown category in seed file: {}", name),
    }
}

async fn skill_id(pool: &SqlitePool, name: &str) -> Result<i64> {
    let row = sqlx::query("SELECT id FROM skills WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => Ok(row.get("id")),
        None => bail!("unknown skill in seed file: {}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_file_parses_minimal() {
        let seed: SeedFile = serde_json::from_str(
            r#"{"profile": {"name": "A", "email": "a@example.com"}}"#,
        )
        .unwrap();
        assert_eq!(seed.profile.name, "A");
        assert!(seed.projects.is_empty());
    }

    #[test]
    fn test_seed_file_rejects_non_string_link_values() {
        let result: std::result::Result<SeedFile, _> = serde_json::from_str(
            r#"{
                "profile": {"name": "A", "email": "a@example.com"},
                "projects": [{"title": "T", "description": "D", "links": {"stars": 42}}]
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_file_parses_dates() {
        let seed: SeedFile = serde_json::from_str(
            r#"{
                "profile": {"name": "A", "email": "a@example.com"},
                "work_experience": [{
                    "company": "C", "position": "P",
                    "start_date": "2024-11-01", "end_date": null,
                    "description": "d", "categories": []
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(
            seed.work_experience[0].start_date,
            NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()
        );
        assert!(seed.work_experience[0].end_date.is_none());
    }
}
