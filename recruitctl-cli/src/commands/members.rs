//! Member commands: register, activity, member, delete

use anyhow::{Context, Result};
use clap::Parser;
use recruitctl_core::{ActivityDetail, Label, RecruitmentStore};
use tracing::info;

use crate::render::{day, truncate_reply};

#[derive(Parser, Debug)]
pub struct RegisterArgs {
    /// Label of the recruited member
    pub member: String,

    /// Label of the recruiter credited with the recruit
    #[arg(long, short)]
    pub recruiter: String,
}

#[derive(Parser, Debug)]
pub struct ActivityArgs {
    /// Label of a registered member
    pub member: String,

    /// Free-text activity note
    pub detail: String,
}

#[derive(Parser, Debug)]
pub struct MemberArgs {
    /// Label of the member to show
    pub label: String,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Label of the member to delete (with all its activities)
    pub label: String,
}

pub async fn run_register(store: &dyn RecruitmentStore, args: RegisterArgs) -> Result<String> {
    let member = Label::new(&args.member).context("Invalid member label")?;
    let recruiter = Label::new(&args.recruiter).context("Invalid recruiter label")?;

    let created = store
        .register_member(&member, &recruiter)
        .await
        .context("Failed to register member")?;
    info!(member_id = created.id, recruiter = %recruiter, "registered member");

    Ok(format!(
        "New member registered: {} by {}",
        created.label, created.recruiter_label
    ))
}

pub async fn run_activity(store: &dyn RecruitmentStore, args: ActivityArgs) -> Result<String> {
    let detail = ActivityDetail::new(&args.detail).context("Invalid activity detail")?;

    let Some(member) = store.find_member_by_label(&args.member).await? else {
        return Ok("Member not found. Register it first with `recruitctl register`".to_string());
    };

    store
        .add_activity(member.id, &detail)
        .await
        .context("Failed to add activity")?;

    Ok(format!("Activity added to {}: {}", member.label, detail.as_str()))
}

pub async fn run_member(store: &dyn RecruitmentStore, args: MemberArgs) -> Result<String> {
    let Some(member) = store.find_member_by_label(&args.label).await? else {
        return Ok("Member not found".to_string());
    };
    let activities = store.list_activities(member.id).await?;

    let mut reply = format!(
        "Member: {}\nRecruiter: {}\nJoined: {}\nActivities: {}\n\n",
        member.label,
        member.recruiter_label,
        day(member.registered_at),
        activities.len()
    );

    if !activities.is_empty() {
        reply.push_str("Activities:\n");
        for activity in &activities {
            reply.push_str(&format!("- {}: {}\n", day(activity.occurred_at), activity.detail));
        }
    }

    Ok(truncate_reply(reply))
}

pub async fn run_delete(store: &dyn RecruitmentStore, args: DeleteArgs) -> Result<String> {
    if store
        .delete_member(&args.label)
        .await
        .context("Failed to delete member")?
    {
        Ok(format!(
            "Member {} and all its activities were deleted",
            args.label
        ))
    } else {
        Ok("Member not found".to_string())
    }
}
