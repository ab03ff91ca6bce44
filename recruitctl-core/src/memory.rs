//! In-process store for tests and dry runs
//!
//! Mirrors the SQL store's semantics (ordering, monotonic backfill, cleared
//! rows keeping their history) behind the same trait. One mutex guards the
//! whole state, so every operation is atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::db::time;
use crate::error::{Result, StoreError};
use crate::models::{
    Activity, ActivityDetail, BackfillReport, Label, Member, MemberId, RecruiterCount,
    RecruiterLastActivity, RecruiterStats,
};
use crate::store::RecruitmentStore;

#[derive(Debug, Clone)]
struct Rollup {
    last_recruitment_at: Option<DateTime<Utc>>,
    lifetime_count: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    next_member_id: i64,
    next_activity_id: i64,
    members: BTreeMap<MemberId, Member>,
    activities: BTreeMap<i64, Activity>,
    recruiters: BTreeMap<String, Rollup>,
}

impl State {
    fn active_count(&self, recruiter: &str) -> i64 {
        self.members
            .values()
            .filter(|m| m.recruiter_label == recruiter)
            .count() as i64
    }

    fn stats(&self, label: &str, rollup: &Rollup) -> RecruiterStats {
        RecruiterStats {
            recruiter_label: label.to_owned(),
            active_count: self.active_count(label),
            lifetime_count: rollup.lifetime_count,
            last_recruitment_at: rollup.last_recruitment_at,
            created_at: rollup.created_at,
        }
    }

    fn remove_member(&mut self, id: MemberId) -> bool {
        self.activities.retain(|_, a| a.member_id != id);
        self.members.remove(&id).is_some()
    }
}

/// Memory-backed [`RecruitmentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member row as if it had been registered at `at`, without
    /// touching the rollup. Simulates history written before the rollup
    /// table existed.
    #[cfg(test)]
    async fn insert_history(&self, label: &Label, recruiter: &Label, at: DateTime<Utc>) -> Member {
        let mut state = self.state.lock().await;
        state.next_member_id += 1;
        let member = Member {
            id: state.next_member_id,
            label: label.as_str().to_owned(),
            recruiter_label: recruiter.as_str().to_owned(),
            registered_at: at,
        };
        state.members.insert(member.id, member.clone());
        member
    }
}

#[async_trait]
impl RecruitmentStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn backfill_from_history(&self) -> Result<BackfillReport> {
        let mut state = self.state.lock().await;

        // label -> (count, max registered_at, min registered_at)
        let mut history: BTreeMap<String, (i64, DateTime<Utc>, DateTime<Utc>)> = BTreeMap::new();
        for member in state.members.values() {
            history
                .entry(member.recruiter_label.clone())
                .and_modify(|(count, last, first)| {
                    *count += 1;
                    *last = (*last).max(member.registered_at);
                    *first = (*first).min(member.registered_at);
                })
                .or_insert((1, member.registered_at, member.registered_at));
        }

        for (label, (count, last, first)) in &history {
            let rollup = state.recruiters.entry(label.clone()).or_insert(Rollup {
                last_recruitment_at: Some(*last),
                lifetime_count: *count,
                created_at: *first,
            });
            if rollup.last_recruitment_at.map_or(true, |stored| stored < *last) {
                rollup.last_recruitment_at = Some(*last);
            }
            if rollup.lifetime_count < *count {
                rollup.lifetime_count = *count;
            }
        }

        Ok(BackfillReport {
            recruiters_scanned: history.len() as u64,
        })
    }

    async fn register_member(&self, label: &Label, recruiter: &Label) -> Result<Member> {
        let now = time::now();
        let mut state = self.state.lock().await;

        state.next_member_id += 1;
        let member = Member {
            id: state.next_member_id,
            label: label.as_str().to_owned(),
            recruiter_label: recruiter.as_str().to_owned(),
            registered_at: now,
        };
        state.members.insert(member.id, member.clone());

        state
            .recruiters
            .entry(recruiter.as_str().to_owned())
            .and_modify(|r| {
                r.last_recruitment_at = Some(now);
                r.lifetime_count += 1;
            })
            .or_insert(Rollup {
                last_recruitment_at: Some(now),
                lifetime_count: 1,
                created_at: now,
            });

        Ok(member)
    }

    async fn find_member_by_label(&self, label: &str) -> Result<Option<Member>> {
        let state = self.state.lock().await;
        Ok(state.members.values().find(|m| m.label == label).cloned())
    }

    async fn find_member_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        let state = self.state.lock().await;
        Ok(state.members.get(&id).cloned())
    }

    async fn list_members_by_recruiter(&self, recruiter: &str) -> Result<Vec<Member>> {
        let state = self.state.lock().await;
        let mut members: Vec<Member> = state
            .members
            .values()
            .filter(|m| m.recruiter_label == recruiter)
            .cloned()
            .collect();
        members.sort_by_key(|m| (m.registered_at, m.id));
        Ok(members)
    }

    async fn delete_member(&self, label: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(id) = state.members.values().find(|m| m.label == label).map(|m| m.id) else {
            return Ok(false);
        };
        Ok(state.remove_member(id))
    }

    async fn clear_recruiter(&self, recruiter: &str) -> Result<u64> {
        let mut state = self.state.lock().await;
        let ids: Vec<MemberId> = state
            .members
            .values()
            .filter(|m| m.recruiter_label == recruiter)
            .map(|m| m.id)
            .collect();

        let mut deleted = 0;
        for id in ids {
            if state.remove_member(id) {
                deleted += 1;
            }
        }

        if let Some(rollup) = state.recruiters.get_mut(recruiter) {
            rollup.lifetime_count = 0;
        }
        Ok(deleted)
    }

    async fn add_activity(
        &self,
        member_id: MemberId,
        detail: &ActivityDetail,
    ) -> Result<Activity> {
        let now = time::now();
        let mut state = self.state.lock().await;

        if !state.members.contains_key(&member_id) {
            return Err(StoreError::constraint(format!(
                "member {} does not exist",
                member_id
            )));
        }

        state.next_activity_id += 1;
        let activity = Activity {
            id: state.next_activity_id,
            member_id,
            detail: detail.as_str().to_owned(),
            occurred_at: now,
        };
        state.activities.insert(activity.id, activity.clone());
        Ok(activity)
    }

    async fn list_activities(&self, member_id: MemberId) -> Result<Vec<Activity>> {
        let state = self.state.lock().await;
        let mut activities: Vec<Activity> = state
            .activities
            .values()
            .filter(|a| a.member_id == member_id)
            .cloned()
            .collect();
        activities.sort_by_key(|a| (a.occurred_at, a.id));
        Ok(activities)
    }

    async fn count_activities(&self, member_id: MemberId) -> Result<u64> {
        let state = self.state.lock().await;
        Ok(state
            .activities
            .values()
            .filter(|a| a.member_id == member_id)
            .count() as u64)
    }

    async fn list_all_recruiters_with_active_counts(&self) -> Result<Vec<RecruiterCount>> {
        let state = self.state.lock().await;
        Ok(state
            .recruiters
            .keys()
            .map(|label| RecruiterCount {
                recruiter_label: label.clone(),
                active_count: state.active_count(label),
            })
            .collect())
    }

    async fn list_member_recruiter_counts(&self) -> Result<Vec<RecruiterCount>> {
        let state = self.state.lock().await;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for member in state.members.values() {
            *counts.entry(member.recruiter_label.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(label, active_count)| RecruiterCount {
                recruiter_label: label.to_owned(),
                active_count,
            })
            .collect())
    }

    async fn list_recruiters_last_activity(&self) -> Result<Vec<RecruiterLastActivity>> {
        let state = self.state.lock().await;
        Ok(state
            .recruiters
            .iter()
            .filter_map(|(label, r)| {
                r.last_recruitment_at.map(|at| RecruiterLastActivity {
                    recruiter_label: label.clone(),
                    last_recruitment_at: at,
                })
            })
            .collect())
    }

    async fn get_full_stats(&self) -> Result<Vec<RecruiterStats>> {
        let state = self.state.lock().await;
        Ok(state
            .recruiters
            .iter()
            .map(|(label, rollup)| state.stats(label, rollup))
            .collect())
    }

    async fn get_recruiter_stats(&self, recruiter: &str) -> Result<Option<RecruiterStats>> {
        let state = self.state.lock().await;
        Ok(state
            .recruiters
            .get(recruiter)
            .map(|rollup| state.stats(recruiter, rollup)))
    }
}
