//! Aggregates over a user's non-archived campaigns.
//!
//! Inputs are the campaigns returned by
//! [`CampaignStore::list_all_for_owner`](crate::store::CampaignStore::list_all_for_owner);
//! the functions here never filter by owner themselves.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use crate::campaign::{Campaign, CampaignStatus, Objective};
use crate::types::{DbId, Timestamp};

/// Number of campaigns shown in "recent" lists.
pub const RECENT_LIMIT: usize = 5;
/// Campaigns ending within this many days need attention.
pub const ATTENTION_WINDOW_DAYS: i64 = 7;

/// Lightweight projection used in stats and dashboard lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub id: DbId,
    pub name: String,
    pub status: CampaignStatus,
    pub objective: Objective,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub budget: f64,
    pub content_count: usize,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Campaign> for CampaignSummary {
    fn from(c: &Campaign) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            status: c.status,
            objective: c.objective,
            start_date: c.start_date,
            end_date: c.end_date,
            budget: c.budget,
            content_count: c.content.len(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub total_campaigns: usize,
    pub active_campaigns: usize,
    pub draft_campaigns: usize,
    pub completed_campaigns: usize,
    pub total_budget: f64,
    pub total_spend: f64,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub total_conversions: i64,
    pub avg_ctr: f64,
    pub avg_cpc: f64,
    pub avg_roi: f64,
    pub by_objective: BTreeMap<String, usize>,
    pub recent_campaigns: Vec<CampaignSummary>,
}

/// Compute stats. Averages are plain means over campaigns (0 when empty).
pub fn campaign_stats(campaigns: &[Campaign]) -> CampaignStats {
    let mut stats = CampaignStats {
        total_campaigns: campaigns.len(),
        ..Default::default()
    };

    for c in campaigns {
        match c.status {
            CampaignStatus::Active => stats.active_campaigns += 1,
            CampaignStatus::Draft => stats.draft_campaigns += 1,
            CampaignStatus::Completed => stats.completed_campaigns += 1,
            _ => {}
        }
        stats.total_budget += c.budget;
        stats.total_spend += c.metrics.spend;
        stats.total_impressions = stats.total_impressions.saturating_add(c.metrics.impressions);
        stats.total_clicks = stats.total_clicks.saturating_add(c.metrics.clicks);
        stats.total_conversions = stats.total_conversions.saturating_add(c.metrics.conversions);
        stats.avg_ctr += c.metrics.ctr;
        stats.avg_cpc += c.metrics.cpc;
        stats.avg_roi += c.metrics.roi;
        *stats
            .by_objective
            .entry(c.objective.as_str().to_string())
            .or_default() += 1;
    }

    if !campaigns.is_empty() {
        let n = campaigns.len() as f64;
        stats.avg_ctr /= n;
        stats.avg_cpc /= n;
        stats.avg_roi /= n;
    }

    stats.recent_campaigns = most_recent(campaigns, |c| c.updated_at);
    stats
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub active_campaigns: Vec<CampaignSummary>,
    pub recent_campaigns: Vec<CampaignSummary>,
    pub attention_needed: Vec<CampaignSummary>,
}

/// Build the dashboard as of `now`.
///
/// - active: status active and `now` within the campaign dates
/// - recent: the five most recently created
/// - attention: not completed, ending between now and seven days from now
pub fn dashboard(campaigns: &[Campaign], now: Timestamp) -> Dashboard {
    let horizon = now + Duration::days(ATTENTION_WINDOW_DAYS);

    let active_campaigns = campaigns
        .iter()
        .filter(|c| c.status == CampaignStatus::Active && c.is_running_at(now))
        .map(CampaignSummary::from)
        .collect();

    let mut attention: Vec<&Campaign> = campaigns
        .iter()
        .filter(|c| {
            !matches!(c.status, CampaignStatus::Completed | CampaignStatus::Archived)
                && c.end_date >= now
                && c.end_date <= horizon
        })
        .collect();
    attention.sort_by_key(|c| (c.end_date, c.id));

    Dashboard {
        active_campaigns,
        recent_campaigns: most_recent(campaigns, |c| c.created_at),
        attention_needed: attention.into_iter().map(CampaignSummary::from).collect(),
    }
}

fn most_recent(campaigns: &[Campaign], key: impl Fn(&Campaign) -> Timestamp) -> Vec<CampaignSummary> {
    let mut sorted: Vec<&Campaign> = campaigns.iter().collect();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| b.id.cmp(&a.id)));
    sorted
        .into_iter()
        .take(RECENT_LIMIT)
        .map(CampaignSummary::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::campaign::{compute_metrics, CampaignMetrics, CreateCampaign, NewCampaign};

    fn campaign(id: DbId, status: CampaignStatus, objective: Objective, now: Timestamp) -> Campaign {
        let input = CreateCampaign {
            name: format!("Campaign {id}"),
            description: None,
            objective,
            persona_id: 1,
            start_date: now,
            end_date: now + Duration::days(30),
            budget: Some(100.0),
            currency: None,
            tone: None,
            keywords: None,
            target_audience: None,
            generation_settings: None,
            tags: None,
        };
        let mut c = NewCampaign::from_input(1, input, now)
            .unwrap()
            .into_campaign(id, now + Duration::seconds(id));
        c.status = status;
        c
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = campaign_stats(&[]);
        assert_eq!(stats.total_campaigns, 0);
        assert_eq!(stats.avg_ctr, 0.0);
        assert!(stats.recent_campaigns.is_empty());
    }

    #[test]
    fn stats_counts_sums_and_means() {
        let now = Utc::now();
        let mut a = campaign(1, CampaignStatus::Active, Objective::Awareness, now);
        a.metrics = compute_metrics(&CampaignMetrics {
            impressions: 100,
            clicks: 10,
            spend: 50.0,
            roi: 2.0,
            ..Default::default()
        });
        let b = campaign(2, CampaignStatus::Draft, Objective::Awareness, now);
        let c = campaign(3, CampaignStatus::Completed, Objective::Conversion, now);

        let stats = campaign_stats(&[a, b, c]);
        assert_eq!(stats.total_campaigns, 3);
        assert_eq!(
            (stats.active_campaigns, stats.draft_campaigns, stats.completed_campaigns),
            (1, 1, 1)
        );
        assert_eq!(stats.total_budget, 300.0);
        assert_eq!(stats.total_clicks, 10);
        assert!((stats.avg_ctr - 10.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_roi - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.by_objective.get("awareness"), Some(&2));
        assert_eq!(stats.by_objective.get("conversion"), Some(&1));
    }

    #[test]
    fn counter_totals_saturate() {
        let now = Utc::now();
        let huge = |id| {
            let mut c = campaign(id, CampaignStatus::Active, Objective::Awareness, now);
            c.metrics = compute_metrics(&CampaignMetrics {
                impressions: i64::MAX,
                clicks: i64::MAX,
                conversions: i64::MAX,
                ..Default::default()
            });
            c
        };
        let stats = campaign_stats(&[huge(1), huge(2)]);
        assert_eq!(stats.total_impressions, i64::MAX);
        assert_eq!(stats.total_clicks, i64::MAX);
        assert_eq!(stats.total_conversions, i64::MAX);
    }

    #[test]
    fn recent_is_capped_at_five_newest_first() {
        let now = Utc::now();
        let all: Vec<Campaign> = (1..=7)
            .map(|id| campaign(id, CampaignStatus::Draft, Objective::Retention, now))
            .collect();
        let stats = campaign_stats(&all);
        let ids: Vec<DbId> = stats.recent_campaigns.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn dashboard_sections() {
        let now = Utc::now();
        let running = campaign(1, CampaignStatus::Active, Objective::Awareness, now - Duration::days(1));

        let mut ending = campaign(2, CampaignStatus::Paused, Objective::Awareness, now - Duration::days(20));
        ending.end_date = now + Duration::days(3);

        let mut done = campaign(3, CampaignStatus::Completed, Objective::Awareness, now - Duration::days(20));
        done.end_date = now + Duration::days(2);

        let mut future = campaign(4, CampaignStatus::Active, Objective::Awareness, now);
        future.start_date = now + Duration::days(10);
        future.end_date = now + Duration::days(40);

        let board = dashboard(&[running, ending, done, future], now);
        let ids = |list: &[CampaignSummary]| list.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(&board.active_campaigns), vec![1]);
        assert_eq!(ids(&board.attention_needed), vec![2]);
        assert_eq!(board.recent_campaigns.len(), 4);
    }
}
