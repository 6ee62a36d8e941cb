//! Row-level entity types for the portfolio store.
//!
//! These mirror the SQLite schema one-to-one. The shapes the API serves
//! (projects with their parsed link map and attached tags) live in
//! [`crate::present`].

use chrono::NaiveDate;
use serde::Serialize;

/// Singleton owner row (id = 1).
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub is_top_skill: bool,
}

/// Outbound profile link (LinkedIn, GitHub, ...). Distinct from the
/// per-project link map stored on [`ProjectRow`].
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Education {
    pub id: i64,
    pub institution: String,
    pub degree: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Project as stored: `links` is the raw JSON text blob (or NULL).
#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub links: Option<String>,
}

/// Work experience as stored; `end_date` NULL means ongoing.
#[derive(Debug, Clone)]
pub struct WorkExperienceRow {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// An id + name pair for a category or skill attached to a parent row.
#[derive(Debug, Clone, Serialize)]
pub struct TagRef {
    pub id: i64,
    pub name: String,
}
