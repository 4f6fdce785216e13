use adpilot_core::ab_test::{NewAbTest, TestType};
use adpilot_core::campaign::{
    AddCollaborator, CampaignStatus, CollaboratorRole, MetricsPatch, UpdateCampaign,
};
use adpilot_core::content::{ContentType, NewContent, Platform};
use adpilot_core::error::CoreError;
use adpilot_core::generation::GenerateVariationsRequest;
use adpilot_core::notify::events;
use adpilot_core::store::CampaignStore;
use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serde_json::json;

use super::*;

fn manual_post(body: &str) -> NewContent {
    NewContent {
        content_type: ContentType::SocialPost,
        platform: Platform::Twitter,
        subject_line: None,
        content_body: body.into(),
        visual_url: None,
        hashtags: vec!["#q4".into()],
        quality_score: None,
    }
}

async fn share(h: &Harness, campaign_id: DbId, user_id: DbId, role: CollaboratorRole) {
    h.services
        .campaigns
        .add_collaborator(campaign_id, OWNER, AddCollaborator { user_id, role })
        .await
        .expect("add collaborator");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_empty_draft() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;

    assert_eq!(campaign.status, CampaignStatus::Draft);
    assert!(campaign.content.is_empty());
    assert_eq!(campaign.metrics.ctr, 0.0);
    assert!(!campaign.is_archived);

    let json = serde_json::to_value(&campaign).unwrap();
    assert_eq!(json["status"], "draft");
    assert_eq!(json["content"], json!([]));
    assert_eq!(json["metrics"]["ctr"], 0.0);
}

#[tokio::test]
async fn create_with_missing_persona_is_not_found() {
    let h = Harness::new();
    let err = h
        .services
        .campaigns
        .create(OWNER, campaign_input(999))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Persona", id: 999 });
}

#[tokio::test]
async fn create_with_someone_elses_persona_is_forbidden() {
    let h = Harness::new();
    let persona = h.persona(STRANGER).await;
    let err = h
        .services
        .campaigns
        .create(OWNER, campaign_input(persona.id))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));
}

#[tokio::test]
async fn create_with_predefined_persona_is_allowed() {
    let h = Harness::new();
    h.services.personas.seed_predefined().await.unwrap();
    let predefined = h.services.personas.list(OWNER, None).await.unwrap();
    let campaign = h
        .services
        .campaigns
        .create(OWNER, campaign_input(predefined[0].id))
        .await
        .unwrap();
    assert_eq!(campaign.persona_id, predefined[0].id);
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stranger_cannot_mutate_and_campaign_is_unchanged() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    let c = &h.services.campaigns;

    let rename = UpdateCampaign {
        name: Some("Hijacked".into()),
        ..Default::default()
    };
    assert_matches!(c.update(campaign.id, STRANGER, rename).await, Err(CoreError::Forbidden(_)));
    assert_matches!(c.archive(campaign.id, STRANGER).await, Err(CoreError::Forbidden(_)));
    assert_matches!(c.delete(campaign.id, STRANGER).await, Err(CoreError::Forbidden(_)));
    assert_matches!(
        c.add_content(campaign.id, STRANGER, manual_post("hi")).await,
        Err(CoreError::Forbidden(_))
    );
    assert_matches!(c.get(campaign.id, STRANGER).await, Err(CoreError::Forbidden(_)));

    assert_eq!(h.store.campaign(campaign.id).unwrap(), campaign);
}

#[tokio::test]
async fn viewer_reads_but_cannot_edit() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    share(&h, campaign.id, VIEWER, CollaboratorRole::Viewer).await;

    assert!(h.services.campaigns.get(campaign.id, VIEWER).await.is_ok());
    let err = h
        .services
        .campaigns
        .add_content(campaign.id, VIEWER, manual_post("hello"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));
}

#[tokio::test]
async fn editor_can_edit_but_not_delete() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    share(&h, campaign.id, EDITOR, CollaboratorRole::Editor).await;

    let updated = h
        .services
        .campaigns
        .update(
            campaign.id,
            EDITOR,
            UpdateCampaign {
                keywords: Some("autumn, launch".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.keywords.as_deref(), Some("autumn, launch"));

    let err = h.services.campaigns.delete(campaign.id, EDITOR).await.unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));
}

#[tokio::test]
async fn switching_to_unreadable_persona_is_forbidden() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    let foreign = h.persona(STRANGER).await;

    let err = h
        .services
        .campaigns
        .update(
            campaign.id,
            OWNER,
            UpdateCampaign {
                persona_id: Some(foreign.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn archive_then_delete_conflicts() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;

    let archived = h.services.campaigns.archive(campaign.id, OWNER).await.unwrap();
    assert_eq!(archived.status, CampaignStatus::Archived);
    assert!(archived.is_archived);

    let err = h.services.campaigns.delete(campaign.id, OWNER).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert!(h.store.campaign(campaign.id).is_some());
}

#[tokio::test]
async fn owner_deletes_draft() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    h.services.campaigns.delete(campaign.id, OWNER).await.unwrap();
    assert!(h.store.campaign(campaign.id).is_none());
}

#[tokio::test]
async fn active_campaign_cannot_be_deleted() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    for status in [CampaignStatus::Generating, CampaignStatus::Active] {
        h.services
            .campaigns
            .update(
                campaign.id,
                OWNER,
                UpdateCampaign {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    let err = h.services.campaigns.delete(campaign.id, OWNER).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

#[tokio::test]
async fn illegal_transition_leaves_status_unchanged() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    let err = h
        .services
        .campaigns
        .update(
            campaign.id,
            OWNER,
            UpdateCampaign {
                status: Some(CampaignStatus::Paused),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(h.store.campaign(campaign.id).unwrap().status, CampaignStatus::Draft);
}

#[tokio::test]
async fn update_recomputes_metrics_and_keeps_content() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    h.services
        .campaigns
        .add_content(campaign.id, OWNER, manual_post("First post"))
        .await
        .unwrap();

    let updated = h
        .services
        .campaigns
        .update(
            campaign.id,
            OWNER,
            UpdateCampaign {
                metrics: Some(MetricsPatch {
                    impressions: Some(400),
                    clicks: Some(20),
                    conversions: Some(4),
                    spend: Some(100.0),
                    roi: None,
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!((updated.metrics.ctr - 5.0).abs() < 1e-9);
    assert!((updated.metrics.cpc - 5.0).abs() < 1e-9);
    assert!((updated.metrics.cpa - 25.0).abs() < 1e-9);
    assert_eq!(updated.content.len(), 1);
}

// ---------------------------------------------------------------------------
// Embedded collections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_content_assigns_identity_and_notifies() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    share(&h, campaign.id, VIEWER, CollaboratorRole::Viewer).await;

    let item = h
        .services
        .campaigns
        .add_content(campaign.id, OWNER, manual_post("Autumn is here"))
        .await
        .unwrap();
    assert_eq!(item.quality_score, 0);

    let stored = h.store.campaign(campaign.id).unwrap();
    assert_eq!(stored.content, vec![item]);

    let sent = h.notifier.sent();
    let added = sent.iter().find(|n| n.event == events::CONTENT_ADDED).unwrap();
    assert_eq!(added.recipients, vec![OWNER, VIEWER]);
}

#[tokio::test]
async fn invalid_content_is_rejected() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    let mut input = manual_post("x");
    input.hashtags = vec!["missing-hash".into()];
    let err = h
        .services
        .campaigns
        .add_content(campaign.id, OWNER, input)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::InvalidFields(_));
    assert!(h.store.campaign(campaign.id).unwrap().content.is_empty());
}

#[tokio::test]
async fn archived_campaign_rejects_content() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    h.services.campaigns.archive(campaign.id, OWNER).await.unwrap();
    let err = h
        .services
        .campaigns
        .add_content(campaign.id, OWNER, manual_post("late"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

#[tokio::test]
async fn ab_test_is_appended() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    let test = h
        .services
        .campaigns
        .add_ab_test(
            campaign.id,
            OWNER,
            NewAbTest {
                test_name: "Subject lines".into(),
                test_type: TestType::SubjectLine,
                variant_a: json!("Save now"),
                variant_b: json!("Last chance"),
                end_date: Utc::now() + Duration::days(5),
            },
        )
        .await
        .unwrap();
    assert_eq!(h.store.campaign(campaign.id).unwrap().ab_tests, vec![test]);
}

#[tokio::test]
async fn collaborator_rules() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    let c = &h.services.campaigns;

    let add = |user_id| AddCollaborator {
        user_id,
        role: CollaboratorRole::Editor,
    };
    assert_matches!(c.add_collaborator(campaign.id, OWNER, add(OWNER)).await, Err(CoreError::Conflict(_)));
    c.add_collaborator(campaign.id, OWNER, add(EDITOR)).await.unwrap();
    assert_matches!(c.add_collaborator(campaign.id, OWNER, add(EDITOR)).await, Err(CoreError::Conflict(_)));
    assert_matches!(
        c.add_collaborator(campaign.id, EDITOR, add(VIEWER)).await,
        Err(CoreError::Forbidden(_))
    );

    let after = c.remove_collaborator(campaign.id, OWNER, EDITOR).await.unwrap();
    assert!(after.collaborators.is_empty());
    assert_matches!(
        c.remove_collaborator(campaign.id, OWNER, EDITOR).await,
        Err(CoreError::NotFound { entity: "Collaborator", .. })
    );
}

// ---------------------------------------------------------------------------
// Concurrent writers
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_all_survive() {
    let h = Harness::new();
    let (campaign, persona) = h.campaign(OWNER).await;
    let (campaign_id, persona_id) = (campaign.id, persona.id);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let services = h.services.clone();
        tasks.push(tokio::spawn(async move {
            services
                .campaigns
                .add_content(campaign_id, OWNER, manual_post(&format!("Post {i}")))
                .await
                .map(|_| 1)
        }));
    }
    for _ in 0..4 {
        let services = h.services.clone();
        tasks.push(tokio::spawn(async move {
            services
                .generation
                .generate_variations(
                    OWNER,
                    GenerateVariationsRequest {
                        campaign_id,
                        persona_id,
                        content_type: ContentType::AdCopy,
                        variations: Some(3),
                        platform: None,
                        custom_instructions: None,
                    },
                )
                .await
                .map(|items| items.len())
        }));
    }

    let mut appended = 0;
    for task in tasks {
        appended += task.await.expect("task").expect("append");
    }
    assert_eq!(appended, 8 + 4 * 3);
    assert_eq!(h.store.campaign(campaign.id).unwrap().content.len(), 20);
}

#[tokio::test]
async fn save_from_stale_read_keeps_later_appends() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;

    // An update that read the campaign before the append landed.
    let mut stale = h.store.find_campaign(campaign.id).await.unwrap().unwrap();
    h.services
        .campaigns
        .add_content(campaign.id, OWNER, manual_post("Appended mid-update"))
        .await
        .unwrap();
    stale.name = "Renamed".into();
    let saved = h.store.save_campaign(&stale).await.unwrap();

    assert_eq!(saved.name, "Renamed");
    assert_eq!(saved.content.len(), 1);
    assert_eq!(h.store.campaign(campaign.id).unwrap().content.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn updates_racing_appends_never_drop_content() {
    let h = Harness::new();
    let (campaign, _) = h.campaign(OWNER).await;
    let campaign_id = campaign.id;

    let mut tasks = Vec::new();
    for i in 0..10 {
        let services = h.services.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                services
                    .campaigns
                    .add_content(campaign_id, OWNER, manual_post(&format!("Post {i}")))
                    .await
                    .map(|_| ())
            } else {
                services
                    .campaigns
                    .update(
                        campaign_id,
                        OWNER,
                        UpdateCampaign {
                            keywords: Some(format!("round {i}")),
                            ..Default::default()
                        },
                    )
                    .await
                    .map(|_| ())
            }
        }));
    }
    for task in tasks {
        task.await.expect("task").expect("write");
    }
    assert_eq!(h.store.campaign(campaign.id).unwrap().content.len(), 5);
}
