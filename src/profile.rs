//! Full-profile assembly.
//!
//! One response carrying everything a portfolio front end renders on first
//! load: the owner row plus all skills, projects, work experience,
//! education, and outbound links.

use anyhow::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::experience::work_history;
use crate::models::{Education, Link, Profile, Skill};
use crate::present::{ProjectView, WorkExperienceView};
use crate::projects::{assemble_views, project_row};
use crate::skills::all_skills_ranked;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub name: String,
    pub email: String,
    pub skills: Vec<Skill>,
    pub projects: Vec<ProjectView>,
    pub work_experience: Vec<WorkExperienceView>,
    pub education: Vec<Education>,
    pub links: Vec<Link>,
}

/// The singleton profile with all of its content attached. Returns `None`
/// when the profile row is absent (unseeded database).
pub async fn full_profile(pool: &SqlitePool) -> Result<Option<ProfileResponse>> {
    let row = sqlx::query("SELECT id, name, email FROM profile WHERE id = 1")
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let owner = Profile {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    };

    let skills = all_skills_ranked(pool).await?;

    let link_rows = sqlx::query("SELECT id, name, url FROM links ORDER BY id ASC")
        .fetch_all(pool)
        .await?;
    let links: Vec<Link> = link_rows
        .iter()
        .map(|r| Link {
            id: r.get("id"),
            name: r.get("name"),
            url: r.get("url"),
        })
        .collect();

    let education_rows = sqlx::query(
        "SELECT id, institution, degree, start_date, end_date FROM education ORDER BY start_date DESC",
    )
    .fetch_all(pool)
    .await?;
    let education: Vec<Education> = education_rows
        .iter()
        .map(|r| Education {
            id: r.get("id"),
            institution: r.get("institution"),
            degree: r.get("degree"),
            start_date: r.get("start_date"),
            end_date: r.get("end_date"),
        })
        .collect();

    let work_experience = work_history(pool, None).await?;

    let project_rows =
        sqlx::query("SELECT id, title, description, links FROM projects ORDER BY id ASC")
            .fetch_all(pool)
            .await?;
    let projects = assemble_views(pool, project_rows.iter().map(project_row).collect()).await?;

    Ok(Some(ProfileResponse {
        name: owner.name,
        email: owner.email,
        skills,
        projects,
        work_experience,
        education,
        links,
    }))
}
