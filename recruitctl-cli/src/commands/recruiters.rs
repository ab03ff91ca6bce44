//! Recruiter commands: recruiter, clear, recruiters, stats, staff

use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use recruitctl_core::{candidate_labels, RecruitmentStore, StatsIndex};
use serde::Serialize;
use tracing::{info, warn};

use crate::render::{day, day_or_never, truncate_reply};

#[derive(Parser, Debug)]
pub struct RecruiterArgs {
    /// Recruiter label
    pub label: String,
}

#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Recruiter whose recruits (and their activities) are deleted
    pub recruiter: String,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct StaffArgs {
    /// Staff member as `tag[,username[,display name]]` (repeatable)
    #[arg(long = "member", short, required = true, value_name = "TAG[,NAME[,DISPLAY]]")]
    pub members: Vec<StaffMember>,
}

/// A platform member whose stored labels may be in any of several formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub tag: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

impl StaffMember {
    fn candidates(&self) -> Vec<String> {
        candidate_labels(
            &self.tag,
            self.username.as_deref(),
            self.display_name.as_deref(),
        )
    }

    fn name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.tag)
    }

    fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.name())
    }
}

impl FromStr for StaffMember {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ',').map(str::trim);
        let tag = parts.next().unwrap_or_default();
        if tag.is_empty() {
            return Err("staff member tag cannot be empty".to_string());
        }
        let mut optional = || parts.next().filter(|p| !p.is_empty()).map(str::to_owned);
        let username = optional();
        let display_name = optional();
        Ok(Self {
            tag: tag.to_owned(),
            username,
            display_name,
        })
    }
}

pub async fn run_recruiter(store: &dyn RecruitmentStore, args: RecruiterArgs) -> Result<String> {
    let members = store.list_members_by_recruiter(&args.label).await?;

    let mut reply = format!("Recruiter: {}\n", args.label);
    if members.is_empty() {
        reply.push_str("No recruits registered for this recruiter");
        return Ok(reply);
    }

    reply.push_str(&format!("Recruits: {}\n\n", members.len()));
    for member in &members {
        let activities = store.count_activities(member.id).await?;
        reply.push_str(&format!(
            "- {}: joined {}, activities: {}\n",
            member.label,
            day(member.registered_at),
            activities
        ));
    }

    Ok(truncate_reply(reply))
}

pub async fn run_clear(store: &dyn RecruitmentStore, args: ClearArgs) -> Result<String> {
    let deleted = store
        .clear_recruiter(&args.recruiter)
        .await
        .with_context(|| format!("Failed to clear recruiter {}", args.recruiter))?;

    if deleted == 0 {
        return Ok("No recruits to delete".to_string());
    }
    info!(recruiter = %args.recruiter, deleted, "cleared recruiter");
    Ok(format!(
        "Deleted {} recruits and all their activities from recruiter {}",
        deleted, args.recruiter
    ))
}

#[derive(Debug, Serialize)]
struct RecruiterListEntry {
    recruiter_label: String,
    active_count: i64,
    last_recruitment_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn run_recruiters(store: &dyn RecruitmentStore, args: ListArgs) -> Result<String> {
    let counts = store.list_all_recruiters_with_active_counts().await?;
    let last = store.list_recruiters_last_activity().await?;

    let entries: Vec<RecruiterListEntry> = counts
        .into_iter()
        .map(|c| RecruiterListEntry {
            last_recruitment_at: last
                .iter()
                .find(|l| l.recruiter_label == c.recruiter_label)
                .map(|l| l.last_recruitment_at),
            recruiter_label: c.recruiter_label,
            active_count: c.active_count,
        })
        .collect();

    if args.json {
        return Ok(serde_json::to_string_pretty(&entries)?);
    }
    if entries.is_empty() {
        return Ok("No recruiters registered".to_string());
    }

    let mut reply = String::from("Recruiters:\n\n");
    for entry in &entries {
        reply.push_str(&format!(
            "{} - active recruits: {} - last recruitment: {}\n",
            entry.recruiter_label,
            entry.active_count,
            day_or_never(entry.last_recruitment_at)
        ));
    }
    Ok(truncate_reply(reply))
}

pub async fn run_stats(store: &dyn RecruitmentStore, args: ListArgs) -> Result<String> {
    let stats = store.get_full_stats().await?;

    let drift = store.list_member_recruiter_counts().await?;
    for row in &drift {
        if !stats.iter().any(|s| s.recruiter_label == row.recruiter_label) {
            warn!(recruiter = %row.recruiter_label, "members reference a recruiter with no rollup row");
        }
    }

    if args.json {
        return Ok(serde_json::to_string_pretty(&stats)?);
    }
    if stats.is_empty() {
        return Ok("No recruiters registered".to_string());
    }

    let mut reply = String::from("Recruiter stats:\n\n");
    for s in &stats {
        reply.push_str(&format!(
            "{} - active: {} - lifetime: {} - last recruitment: {} - since: {}\n",
            s.recruiter_label,
            s.active_count,
            s.lifetime_count,
            day_or_never(s.last_recruitment_at),
            day(s.created_at)
        ));
    }
    Ok(truncate_reply(reply))
}

pub async fn run_staff(store: &dyn RecruitmentStore, args: StaffArgs) -> Result<String> {
    let index = StatsIndex::new(store.get_full_stats().await?);

    let mut reply = String::from("Staff members:\n\n");
    for staff in &args.members {
        let (active, lifetime, last) = match index.lookup(&staff.candidates()) {
            Some(s) => (s.active_count, s.lifetime_count, s.last_recruitment_at),
            None => (0, 0, None),
        };
        reply.push_str(&format!(
            "{} ({}) - active recruits: {} - lifetime: {} - last activity: {}\n",
            staff.shown_name(),
            staff.name(),
            active,
            lifetime,
            day_or_never(last)
        ));
    }
    Ok(truncate_reply(reply))
}
