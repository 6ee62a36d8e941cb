//! # me-api
//!
//! A personal portfolio content API backed by SQLite.
//!
//! The service stores one profile's skills, projects, work experience,
//! education, outbound links, and a shared category taxonomy, and exposes
//! read endpoints (plus one authenticated write endpoint) for a front end
//! to render.
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌──────────┐
//! │ seed.json │──▶│ init + seed  │──▶│  SQLite  │
//! └───────────┘   └──────────────┘   └────┬─────┘
//!                                         │
//!                                         ▼
//!                                   ┌──────────┐
//!                                   │   HTTP   │
//!                                   │ (me-api) │
//!                                   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! me-api init                   # create database
//! me-api seed data/seed.json    # load portfolio content
//! me-api serve                  # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Row-level entity types |
//! | [`present`] | Row-to-API presentation mapping |
//! | [`skills`] | Top-skill listing and skill creation |
//! | [`projects`] | Project listing with eager tag attachment |
//! | [`experience`] | Work-experience retrieval |
//! | [`search`] | Substring search over projects and skills |
//! | [`categories`] | Category aggregation |
//! | [`profile`] | Full-profile assembly |
//! | [`auth`] | HTTP Basic credential verification |
//! | [`seed`] | Offline seed-data loader |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod auth;
pub mod categories;
pub mod config;
pub mod db;
pub mod experience;
pub mod migrate;
pub mod models;
pub mod present;
pub mod profile;
pub mod projects;
pub mod search;
pub mod seed;
pub mod server;
pub mod skills;
