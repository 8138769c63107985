// Table definitions for the community platform schema.
// The DDL itself is owned by the platform's migrations; these only describe
// the columns this crate reads and writes.

use crate::db::table::{Column, ColumnType::*, TableDef, TableRegistry};

/// chapters table: one row per college/corporate chapter role
pub static CHAPTERS: TableDef = TableDef {
    name: "chapters",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("type", Text),
        Column::new("org_name", Text),
        Column::new("primary_organisation", Text),
        Column::new("sessions", Int),
        Column::new("discord_role_id", BigInt),
        Column::new("created_at", TimestampTz),
    ],
};

/// contributors_registration table: members who linked their GitHub account
pub static CONTRIBUTORS_REGISTRATION: TableDef = TableDef {
    name: "contributors_registration",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("discord_id", BigInt),
        Column::new("github_id", BigInt),
        Column::new("github_url", Text),
        Column::new("discord_username", Text),
        Column::new("joined_at", Timestamp),
        Column::new("email", Text),
        Column::new("name", Text),
    ],
};

/// contributors_discord table: roster synced from the Discord guild
pub static CONTRIBUTORS_DISCORD: TableDef = TableDef {
    name: "contributors_discord",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("discord_id", BigInt),
        Column::new("github_id", BigInt),
        Column::new("github_url", Text),
        Column::new("discord_username", Text),
        Column::new("joined_at", Timestamp),
        Column::new("email", Text),
        Column::new("field_name", Text),
        Column::new("chapter", Text),
        Column::new("gender", Text),
        Column::new("is_active", Bool),
    ],
};

/// leaderboard table
pub static LEADERBOARD: TableDef = TableDef {
    name: "leaderboard",
    primary_key: "discord_id",
    columns: &[
        Column::new("discord_id", BigInt),
        Column::new("github_id", BigInt),
        Column::new("github_url", Text),
        Column::new("apprentice_badge", Bool),
        Column::new("converser_badge", Bool),
        Column::new("rockstar_badge", Bool),
        Column::new("enthusiast_badge", Bool),
        Column::new("rising_star_badge", Bool),
        Column::new("github_x_discord_badge", Bool),
        Column::new("points", Int),
        Column::new("bronze_badge", Bool),
        Column::new("silver_badge", Bool),
        Column::new("gold_badge", Bool),
        Column::new("ruby_badge", Bool),
        Column::new("diamond_badge", Bool),
        Column::new("certificate_link", Text),
    ],
};

/// vc_logs table: voice channel join/leave actions
pub static VC_LOGS: TableDef = TableDef {
    name: "vc_logs",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("created_at", TimestampTz),
        Column::new("discord_id", BigInt),
        Column::new("discord_name", Text),
        Column::new("option", Text),
    ],
};

/// dmp_orgs table
pub static DMP_ORGS: TableDef = TableDef {
    name: "dmp_orgs",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("created_at", TimestampTz),
        Column::new("name", Text),
        Column::new("description", Text),
        Column::new("link", Text),
        Column::new("repo_owner", Text),
    ],
};

/// dmp_issues table
pub static DMP_ISSUES: TableDef = TableDef {
    name: "dmp_issues",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("issue_url", Text),
        Column::new("issue_number", BigInt),
        Column::new("mentor_username", Text),
        Column::new("contributor_username", Text),
        Column::new("title", Text),
        Column::new("org_id", BigInt),
        Column::new("description", Text),
        Column::new("repo", Text),
        Column::new("repo_owner", Text),
        Column::new("year", Int),
    ],
};

/// dmp_issue_updates table: issue comments mirrored from GitHub
pub static DMP_ISSUE_UPDATES: TableDef = TableDef {
    name: "dmp_issue_updates",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("created_at", TimestampTz),
        Column::new("body_text", Text),
        Column::new("comment_link", Text),
        Column::new("comment_id", BigInt),
        Column::new("comment_api", Text),
        Column::new("comment_updated_at", TimestampTz),
        Column::new("dmp_id", BigInt),
        Column::new("created_by", Text),
    ],
};

/// dmp_pr_updates table
pub static DMP_PR_UPDATES: TableDef = TableDef {
    name: "dmp_pr_updates",
    primary_key: "id",
    columns: &[
        Column::new("id", BigInt),
        Column::new("created_at", TimestampTz),
        Column::new("pr_id", BigInt),
        Column::new("status", Text),
        Column::new("title", Text),
        Column::new("pr_updated_at", TimestampTz),
        Column::new("merged_at", TimestampTz),
        Column::new("closed_at", TimestampTz),
        Column::new("dmp_id", BigInt),
        Column::new("link", Text),
    ],
};

pub static ALL_TABLES: [&TableDef; 9] = [
    &CHAPTERS,
    &CONTRIBUTORS_REGISTRATION,
    &CONTRIBUTORS_DISCORD,
    &LEADERBOARD,
    &VC_LOGS,
    &DMP_ORGS,
    &DMP_ISSUES,
    &DMP_ISSUE_UPDATES,
    &DMP_PR_UPDATES,
];

pub fn registry() -> TableRegistry {
    TableRegistry::new(&ALL_TABLES)
}
