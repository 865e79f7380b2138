//! Integration tests for `SqliteStore` and the services running on top of it,
//! against an in-memory database.

use betterpedia_core::{
  Error as CoreError, ErrorKind, ReputationService, ThreadService, UserId,
  badge::{Badge, BadgeStats, Tier},
  comment::NewComment,
  identity::Actor,
  store::{BadgeStore, CommentStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn services() -> (ThreadService<SqliteStore, SqliteStore>, SqliteStore) {
  let s = store().await;
  let threads = ThreadService::new(s.clone(), ReputationService::new(s.clone()));
  (threads, s)
}

// ─── Comment store ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_comment() {
  let s = store().await;

  let created = s.create(NewComment::new(1, 10, "First!")).await.unwrap();
  assert_eq!(created.author_id, 1);
  assert_eq!(created.article_id, 10);
  assert!(created.parent_id.is_none());
  assert!(!created.deleted);

  let fetched = s.get(created.comment_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_comment_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn create_rejects_blank_content() {
  let s = store().await;
  let err = s.create(NewComment::new(1, 10, "   ")).await.unwrap_err();
  assert_eq!(CoreError::from(err).kind(), ErrorKind::Validation);
  assert!(s.list_by_article(10, true).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_missing_parent_fails() {
  let s = store().await;
  let parent = Uuid::new_v4();
  let err = s
    .create(NewComment::reply(1, 10, parent, "orphan"))
    .await
    .unwrap_err();
  assert!(matches!(CoreError::from(err), CoreError::ParentNotFound(id) if id == parent));
  assert!(s.list_by_article(10, true).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_reply_under_deleted_parent_is_allowed() {
  let s = store().await;
  let parent = s.create(NewComment::new(1, 10, "parent")).await.unwrap();
  assert!(s.soft_delete(parent.comment_id).await.unwrap());

  let reply = s
    .create(NewComment::reply(2, 10, parent.comment_id, "still replying"))
    .await
    .unwrap();
  assert_eq!(reply.parent_id, Some(parent.comment_id));
}

#[tokio::test]
async fn list_by_article_is_oldest_first_and_respects_flag() {
  let s = store().await;
  let a = s.create(NewComment::new(1, 10, "a")).await.unwrap();
  let b = s.create(NewComment::new(2, 10, "b")).await.unwrap();
  let c = s.create(NewComment::new(3, 10, "c")).await.unwrap();
  s.create(NewComment::new(1, 99, "elsewhere")).await.unwrap();
  s.soft_delete(b.comment_id).await.unwrap();

  let visible: Vec<Uuid> = s
    .list_by_article(10, false)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.comment_id)
    .collect();
  assert_eq!(visible, vec![a.comment_id, c.comment_id]);

  let all: Vec<Uuid> = s
    .list_by_article(10, true)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.comment_id)
    .collect();
  assert_eq!(all, vec![a.comment_id, b.comment_id, c.comment_id]);
}

#[tokio::test]
async fn list_top_level_excludes_replies() {
  let s = store().await;
  let top = s.create(NewComment::new(1, 10, "top")).await.unwrap();
  s.create(NewComment::reply(2, 10, top.comment_id, "reply")).await.unwrap();

  let tops = s.list_top_level_by_article(10).await.unwrap();
  assert_eq!(tops.len(), 1);
  assert_eq!(tops[0].comment_id, top.comment_id);
}

#[tokio::test]
async fn list_replies_returns_direct_children_only() {
  let s = store().await;
  let root = s.create(NewComment::new(1, 10, "root")).await.unwrap();
  let child = s
    .create(NewComment::reply(2, 10, root.comment_id, "child"))
    .await
    .unwrap();
  s.create(NewComment::reply(3, 10, child.comment_id, "grandchild"))
    .await
    .unwrap();

  let replies = s.list_replies(root.comment_id).await.unwrap();
  assert_eq!(replies.len(), 1);
  assert_eq!(replies[0].comment_id, child.comment_id);
}

#[tokio::test]
async fn list_by_author_is_newest_first() {
  let s = store().await;
  let first = s.create(NewComment::new(5, 10, "first")).await.unwrap();
  let second = s.create(NewComment::new(5, 11, "second")).await.unwrap();
  s.create(NewComment::new(6, 10, "someone else")).await.unwrap();

  let mine: Vec<Uuid> = s
    .list_by_author(5)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.comment_id)
    .collect();
  assert_eq!(mine, vec![second.comment_id, first.comment_id]);
}

#[tokio::test]
async fn counts_ignore_deleted_comments() {
  let s = store().await;
  let a = s.create(NewComment::new(1, 10, "a")).await.unwrap();
  s.create(NewComment::new(1, 10, "b")).await.unwrap();
  s.create(NewComment::new(2, 10, "c")).await.unwrap();
  s.soft_delete(a.comment_id).await.unwrap();

  assert_eq!(s.count_visible_by_article(10).await.unwrap(), 2);
  assert_eq!(s.count_visible_by_author(1).await.unwrap(), 1);
  assert_eq!(s.count_visible_by_article(404).await.unwrap(), 0);
}

#[tokio::test]
async fn update_changes_content_and_timestamp_only() {
  let s = store().await;
  let created = s.create(NewComment::new(1, 10, "typo")).await.unwrap();

  let updated = s
    .update(created.comment_id, "fixed".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.content, "fixed");
  assert!(updated.updated_at >= created.updated_at);
  assert_eq!(updated.created_at, created.created_at);
  assert_eq!(updated.parent_id, created.parent_id);
  assert_eq!(updated.author_id, created.author_id);
}

#[tokio::test]
async fn update_of_deleted_or_missing_comment_returns_none() {
  let s = store().await;
  let created = s.create(NewComment::new(1, 10, "gone soon")).await.unwrap();
  s.soft_delete(created.comment_id).await.unwrap();

  assert!(s.update(created.comment_id, "revived?".into()).await.unwrap().is_none());
  assert!(s.update(Uuid::new_v4(), "nobody".into()).await.unwrap().is_none());
  let stored = s.get(created.comment_id).await.unwrap().unwrap();
  assert_eq!(stored.content, "gone soon");
}

#[tokio::test]
async fn soft_delete_flips_once() {
  let s = store().await;
  let created = s.create(NewComment::new(1, 10, "bye")).await.unwrap();

  assert!(s.soft_delete(created.comment_id).await.unwrap());
  assert!(!s.soft_delete(created.comment_id).await.unwrap());
  assert!(!s.soft_delete(Uuid::new_v4()).await.unwrap());

  let stored = s.get(created.comment_id).await.unwrap().unwrap();
  assert!(stored.deleted);
}

// ─── Badge store ─────────────────────────────────────────────────────────────

fn badge(user_id: UserId, tier: Tier, count: u32) -> Badge {
  let mut b = Badge::initial(user_id, chrono::Utc::now());
  b.tier = tier;
  b.contribution_count = count;
  b
}

#[tokio::test]
async fn find_missing_badge_returns_none() {
  let s = store().await;
  assert!(s.find_by_user(1).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_if_absent_keeps_existing_row() {
  let s = store().await;
  let first = s.insert_if_absent(badge(1, Tier::Gold, 55)).await.unwrap();
  let second = s.insert_if_absent(badge(1, Tier::Bronze, 0)).await.unwrap();

  assert_eq!(second, first);
  assert_eq!(second.tier, Tier::Gold);
  assert_eq!(second.contribution_count, 55);
}

#[tokio::test]
async fn save_inserts_then_overwrites() {
  let s = store().await;
  let saved = s.save(badge(3, Tier::Silver, 21)).await.unwrap();
  assert_eq!(s.find_by_user(3).await.unwrap().unwrap(), saved);

  let mut changed = saved.clone();
  changed.contribution_count = 22;
  s.save(changed).await.unwrap();

  let stored = s.find_by_user(3).await.unwrap().unwrap();
  assert_eq!(stored.contribution_count, 22);
  assert_eq!(stored.awarded_at, saved.awarded_at);
  assert_eq!(s.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn upsert_applies_closure_and_persists() {
  let s = store().await;
  s.save(badge(4, Tier::Bronze, 1)).await.unwrap();

  let updated = s
    .upsert_with(4, |b| b.contribution_count += 10)
    .await
    .unwrap();
  assert_eq!(updated.contribution_count, 11);
  assert_eq!(s.find_by_user(4).await.unwrap().unwrap(), updated);
}

#[tokio::test]
async fn upsert_starts_a_missing_badge_from_bronze() {
  let s = store().await;
  let created = s
    .upsert_with(8, |b| {
      assert_eq!(b.tier, Tier::Bronze);
      assert_eq!(b.contribution_count, 0);
      b.contribution_count += 1;
    })
    .await
    .unwrap();
  assert_eq!(created.contribution_count, 1);
  assert_eq!(s.find_by_user(8).await.unwrap().unwrap(), created);
  assert_eq!(s.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_badge_reports_whether_it_existed() {
  let s = store().await;
  s.save(badge(2, Tier::Bronze, 0)).await.unwrap();

  assert!(BadgeStore::delete(&s, 2).await.unwrap());
  assert!(!BadgeStore::delete(&s, 2).await.unwrap());
  assert!(s.find_by_user(2).await.unwrap().is_none());
}

#[tokio::test]
async fn badge_listings_are_ordered_by_contribution() {
  let s = store().await;
  s.save(badge(1, Tier::Silver, 25)).await.unwrap();
  s.save(badge(2, Tier::Gold, 70)).await.unwrap();
  s.save(badge(3, Tier::Silver, 40)).await.unwrap();
  s.save(badge(4, Tier::Bronze, 2)).await.unwrap();

  let ordered: Vec<UserId> = s
    .list_all_ordered_by_contribution()
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.user_id)
    .collect();
  assert_eq!(ordered, vec![2, 3, 1, 4]);

  let silver: Vec<UserId> = s
    .list_by_tier(Tier::Silver)
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.user_id)
    .collect();
  assert_eq!(silver, vec![3, 1]);

  assert!(s.list_by_tier(Tier::Platinum).await.unwrap().is_empty());
}

// ─── Thread service ──────────────────────────────────────────────────────────

#[tokio::test]
async fn post_comment_creates_visible_top_level_comment() {
  let (threads, _) = services().await;

  let comment = threads.post_comment(1, 100, "Nice article".into()).await.unwrap();
  assert!(comment.parent_id.is_none());
  assert!(!comment.deleted);
  assert_eq!(comment.content, "Nice article");

  let tops = threads.top_level_for_article(100).await.unwrap();
  assert!(tops.iter().any(|c| c.comment_id == comment.comment_id));
}

#[tokio::test]
async fn post_comment_credits_a_contribution() {
  let (threads, _) = services().await;
  threads.post_comment(1, 100, "one".into()).await.unwrap();
  threads.post_comment(1, 101, "two".into()).await.unwrap();

  let badge = threads.reputation().badge_for(1).await.unwrap().unwrap();
  assert_eq!(badge.contribution_count, 2);
}

#[tokio::test]
async fn post_comment_rejects_blank_content_without_crediting() {
  let (threads, _) = services().await;
  let err = threads.post_comment(1, 100, " \n ".into()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(threads.reputation().badge_for(1).await.unwrap().is_none());
}

#[tokio::test]
async fn post_reply_links_to_parent_and_credits() {
  let (threads, _) = services().await;
  let parent = threads.post_comment(1, 100, "question?".into()).await.unwrap();
  let reply = threads
    .post_reply(2, 100, parent.comment_id, "answer".into())
    .await
    .unwrap();

  assert_eq!(reply.parent_id, Some(parent.comment_id));
  let replies = threads.replies_of(parent.comment_id).await.unwrap();
  assert_eq!(replies, vec![reply]);

  let badge = threads.reputation().badge_for(2).await.unwrap().unwrap();
  assert_eq!(badge.contribution_count, 1);
}

#[tokio::test]
async fn post_reply_to_missing_parent_is_not_found() {
  let (threads, _) = services().await;
  let err = threads
    .post_reply(2, 100, Uuid::new_v4(), "hello?".into())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::ParentNotFound(_)));
  assert!(threads.reputation().badge_for(2).await.unwrap().is_none());
}

#[tokio::test]
async fn post_reply_keeps_callers_article_id() {
  let (threads, _) = services().await;
  let parent = threads.post_comment(1, 100, "on article 100".into()).await.unwrap();
  let reply = threads
    .post_reply(2, 200, parent.comment_id, "filed under 200".into())
    .await
    .unwrap();
  assert_eq!(reply.article_id, 200);
}

#[tokio::test]
async fn edits_never_change_the_parent() {
  let (threads, _) = services().await;
  let parent = threads.post_comment(1, 100, "root".into()).await.unwrap();
  let reply = threads
    .post_reply(2, 100, parent.comment_id, "v1".into())
    .await
    .unwrap();

  for version in ["v2", "v3", "v4"] {
    let edited = threads
      .edit_comment(2, reply.comment_id, version.into())
      .await
      .unwrap();
    assert_eq!(edited.content, version);
    assert_eq!(edited.parent_id, Some(parent.comment_id));
  }
}

#[tokio::test]
async fn only_the_author_may_edit() {
  let (threads, _) = services().await;
  let comment = threads.post_comment(1, 100, "mine".into()).await.unwrap();

  for other in [2, 3, -1] {
    let err = threads
      .edit_comment(other, comment.comment_id, "hijacked".into())
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
  }

  let stored = threads.get_comment(comment.comment_id).await.unwrap();
  assert_eq!(stored.content, "mine");
}

#[tokio::test]
async fn edit_rejects_blank_content() {
  let (threads, _) = services().await;
  let comment = threads.post_comment(1, 100, "draft".into()).await.unwrap();
  let err = threads
    .edit_comment(1, comment.comment_id, "".into())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn edit_of_missing_or_deleted_comment_is_not_found() {
  let (threads, _) = services().await;
  let err = threads
    .edit_comment(1, Uuid::new_v4(), "x".into())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let comment = threads.post_comment(1, 100, "soon gone".into()).await.unwrap();
  threads.delete_comment(Actor::user(1), comment.comment_id).await.unwrap();
  let err = threads
    .edit_comment(1, comment.comment_id, "back".into())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::CommentNotFound(_)));
}

#[tokio::test]
async fn delete_authorisation_matrix() {
  let (threads, _) = services().await;

  let by_author = threads.post_comment(1, 100, "a".into()).await.unwrap();
  assert!(threads.delete_comment(Actor::user(1), by_author.comment_id).await.unwrap());

  let by_admin = threads.post_comment(1, 100, "b".into()).await.unwrap();
  assert!(threads.delete_comment(Actor::admin(9), by_admin.comment_id).await.unwrap());

  let by_stranger = threads.post_comment(1, 100, "c".into()).await.unwrap();
  let err = threads
    .delete_comment(Actor::user(2), by_stranger.comment_id)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Authorization);
  assert!(!threads.get_comment(by_stranger.comment_id).await.unwrap().deleted);
}

#[tokio::test]
async fn delete_missing_or_repeated_returns_false() {
  let (threads, _) = services().await;
  assert!(!threads.delete_comment(Actor::admin(1), Uuid::new_v4()).await.unwrap());

  let comment = threads.post_comment(1, 100, "once".into()).await.unwrap();
  assert!(threads.delete_comment(Actor::user(1), comment.comment_id).await.unwrap());
  assert!(!threads.delete_comment(Actor::user(1), comment.comment_id).await.unwrap());
}

#[tokio::test]
async fn soft_deleted_comment_is_hidden_but_retrievable() {
  let (threads, store) = services().await;
  let comment = threads.post_comment(1, 100, "hidden soon".into()).await.unwrap();
  threads.delete_comment(Actor::user(1), comment.comment_id).await.unwrap();

  assert!(threads.comments_for_article(100).await.unwrap().is_empty());
  assert!(store.list_by_article(100, false).await.unwrap().is_empty());
  assert_eq!(store.list_by_article(100, true).await.unwrap().len(), 1);

  let fetched = threads.get_comment(comment.comment_id).await.unwrap();
  assert!(fetched.deleted);
  assert_eq!(threads.count_for_article(100).await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_a_parent_keeps_its_replies_visible() {
  let (threads, _) = services().await;
  let c1 = threads.post_comment(1, 1, "C1".into()).await.unwrap();
  let c2 = threads
    .post_reply(2, 1, c1.comment_id, "C2".into())
    .await
    .unwrap();

  assert!(threads.delete_comment(Actor::user(1), c1.comment_id).await.unwrap());

  let replies = threads.replies_of(c1.comment_id).await.unwrap();
  assert_eq!(replies.len(), 1);
  assert_eq!(replies[0].comment_id, c2.comment_id);

  let fetched = threads.get_comment(c2.comment_id).await.unwrap();
  assert!(!fetched.deleted);

  let tops = threads.top_level_for_article(1).await.unwrap();
  assert!(tops.iter().all(|c| c.comment_id != c1.comment_id));
}

#[tokio::test]
async fn replies_of_hides_deleted_replies_and_needs_a_parent() {
  let (threads, _) = services().await;
  let root = threads.post_comment(1, 1, "root".into()).await.unwrap();
  let keep = threads.post_reply(2, 1, root.comment_id, "keep".into()).await.unwrap();
  let dropped = threads.post_reply(3, 1, root.comment_id, "drop".into()).await.unwrap();
  threads.delete_comment(Actor::user(3), dropped.comment_id).await.unwrap();

  let replies = threads.replies_of(root.comment_id).await.unwrap();
  assert_eq!(replies, vec![keep]);

  let err = threads.replies_of(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn comments_by_author_are_visible_and_newest_first() {
  let (threads, _) = services().await;
  let older = threads.post_comment(7, 1, "older".into()).await.unwrap();
  let removed = threads.post_comment(7, 2, "removed".into()).await.unwrap();
  let newer = threads.post_comment(7, 3, "newer".into()).await.unwrap();
  threads.delete_comment(Actor::user(7), removed.comment_id).await.unwrap();

  let mine: Vec<Uuid> = threads
    .comments_by_author(7)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.comment_id)
    .collect();
  assert_eq!(mine, vec![newer.comment_id, older.comment_id]);
  assert_eq!(threads.count_by_author(7).await.unwrap(), 2);
}

// ─── Reputation service ──────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_initialize_creates_bronze_once() {
  let s = store().await;
  let reputation = ReputationService::new(s.clone());

  let first = reputation.get_or_initialize(5).await.unwrap();
  assert_eq!(first.tier, Tier::Bronze);
  assert_eq!(first.contribution_count, 0);

  let second = reputation.get_or_initialize(5).await.unwrap();
  assert_eq!(second, first);
  assert_eq!(s.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn increment_promotes_exactly_at_thresholds() {
  let reputation = ReputationService::new(store().await);

  for call in 1..=100u32 {
    let badge = reputation.increment_contribution(1).await.unwrap();
    assert_eq!(badge.contribution_count, call);
    let expected = match call {
      0..=19 => Tier::Bronze,
      20..=49 => Tier::Silver,
      50..=99 => Tier::Gold,
      _ => Tier::Platinum,
    };
    assert_eq!(badge.tier, expected, "after {call} increments");
  }
}

#[tokio::test]
async fn twenty_posts_reach_silver() {
  let (threads, _) = services().await;
  for i in 0..20 {
    threads
      .post_comment(42, 1, format!("comment {i}"))
      .await
      .unwrap();
  }

  let badge = threads.reputation().badge_for(42).await.unwrap().unwrap();
  assert_eq!(badge.tier, Tier::Silver);
  assert_eq!(badge.contribution_count, 20);
}

#[tokio::test]
async fn set_tier_pins_without_touching_count() {
  let reputation = ReputationService::new(store().await);
  for _ in 0..3 {
    reputation.increment_contribution(1).await.unwrap();
  }

  let pinned = reputation.set_tier(1, Tier::Platinum).await.unwrap();
  assert_eq!(pinned.tier, Tier::Platinum);
  assert_eq!(pinned.contribution_count, 3);

  let read_back = reputation.badge_for(1).await.unwrap().unwrap();
  assert_eq!(read_back.tier, Tier::Platinum);

  // The next increment re-derives from the count and drops the pin.
  let next = reputation.increment_contribution(1).await.unwrap();
  assert_eq!(next.contribution_count, 4);
  assert_eq!(next.tier, Tier::Bronze);
}

#[tokio::test]
async fn set_tier_initialises_a_missing_badge() {
  let reputation = ReputationService::new(store().await);
  let badge = reputation.set_tier(77, Tier::Gold).await.unwrap();
  assert_eq!(badge.tier, Tier::Gold);
  assert_eq!(badge.contribution_count, 0);
}

#[tokio::test]
async fn set_contribution_count_recomputes_tier() {
  let reputation = ReputationService::new(store().await);
  reputation.set_tier(1, Tier::Platinum).await.unwrap();

  let steps = [
    (0, Tier::Bronze),
    (20, Tier::Silver),
    (50, Tier::Gold),
    (100, Tier::Platinum),
    (19, Tier::Bronze),
  ];
  for (count, tier) in steps {
    let badge = reputation.set_contribution_count(1, count).await.unwrap();
    assert_eq!(i64::from(badge.contribution_count), count);
    assert_eq!(badge.tier, tier, "count {count}");
  }
}

#[tokio::test]
async fn increment_after_badge_deletion_starts_over() {
  let reputation = ReputationService::new(store().await);
  reputation.set_contribution_count(6, 30).await.unwrap();
  assert!(reputation.delete_badge(6).await.unwrap());

  let badge = reputation.increment_contribution(6).await.unwrap();
  assert_eq!(badge.contribution_count, 1);
  assert_eq!(badge.tier, Tier::Bronze);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn increments_racing_badge_deletion_never_fail() {
  let reputation = ReputationService::new(store().await);

  let tasks: Vec<_> = (0..40)
    .map(|i| {
      let reputation = reputation.clone();
      tokio::spawn(async move {
        if i % 4 == 0 {
          reputation.delete_badge(13).await.map(|_| ())
        } else {
          reputation.increment_contribution(13).await.map(|_| ())
        }
      })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }
}

#[tokio::test]
async fn set_contribution_count_rejects_negative() {
  let reputation = ReputationService::new(store().await);
  let err = reputation.set_contribution_count(1, -1).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(reputation.badge_for(1).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_badge_is_idempotent() {
  let reputation = ReputationService::new(store().await);
  reputation.get_or_initialize(3).await.unwrap();

  assert!(reputation.delete_badge(3).await.unwrap());
  assert!(!reputation.delete_badge(3).await.unwrap());
  assert!(reputation.badge_for(3).await.unwrap().is_none());
}

#[tokio::test]
async fn stats_partition_badges_by_tier() {
  let reputation = ReputationService::new(store().await);
  for (user, count) in [(1, 5), (2, 25), (3, 60), (4, 110)] {
    reputation.set_contribution_count(user, count).await.unwrap();
  }

  let stats = reputation.stats().await.unwrap();
  assert_eq!(stats, BadgeStats {
    bronze_count:   1,
    silver_count:   1,
    gold_count:     1,
    platinum_count: 1,
  });
}

#[tokio::test]
async fn stats_reflect_pinned_tiers() {
  let reputation = ReputationService::new(store().await);
  reputation.set_contribution_count(1, 5).await.unwrap();
  reputation.set_tier(1, Tier::Gold).await.unwrap();

  let stats = reputation.stats().await.unwrap();
  assert_eq!(stats.gold_count, 1);
  assert_eq!(stats.bronze_count, 0);
}

#[tokio::test]
async fn listing_badges_by_tier_and_contribution() {
  let reputation = ReputationService::new(store().await);
  for (user, count) in [(1, 21), (2, 30), (3, 1)] {
    reputation.set_contribution_count(user, count).await.unwrap();
  }

  let all: Vec<UserId> = reputation
    .all_badges()
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.user_id)
    .collect();
  assert_eq!(all, vec![2, 1, 3]);

  let silver = reputation.badges_by_tier(Tier::Silver).await.unwrap();
  assert_eq!(silver.iter().map(|b| b.user_id).collect::<Vec<_>>(), vec![2, 1]);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
  let reputation = ReputationService::new(store().await);

  let tasks: Vec<_> = (0..60)
    .map(|_| {
      let reputation = reputation.clone();
      tokio::spawn(async move { reputation.increment_contribution(11).await })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let badge = reputation.badge_for(11).await.unwrap().unwrap();
  assert_eq!(badge.contribution_count, 60);
  assert_eq!(badge.tier, Tier::Gold);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_access_creates_one_badge() {
  let s = store().await;
  let reputation = ReputationService::new(s.clone());

  let tasks: Vec<_> = (0..20)
    .map(|_| {
      let reputation = reputation.clone();
      tokio::spawn(async move { reputation.get_or_initialize(12).await })
    })
    .collect();

  let mut seen = Vec::new();
  for task in tasks {
    seen.push(task.await.unwrap().unwrap());
  }

  assert!(seen.windows(2).all(|w| w[0] == w[1]));
  assert_eq!(s.list_all().await.unwrap().len(), 1);
}

// ─── Best-effort contribution ────────────────────────────────────────────────

/// A badge store that is always unavailable.
#[derive(Clone)]
struct OfflineBadges;

fn offline() -> CoreError {
  CoreError::Storage(Box::new(std::io::Error::other("badge store offline")))
}

impl BadgeStore for OfflineBadges {
  type Error = CoreError;

  async fn find_by_user(&self, _: UserId) -> Result<Option<Badge>, CoreError> { Err(offline()) }
  async fn insert_if_absent(&self, _: Badge) -> Result<Badge, CoreError> { Err(offline()) }
  async fn save(&self, _: Badge) -> Result<Badge, CoreError> { Err(offline()) }
  async fn upsert_with<F>(&self, _: UserId, _: F) -> Result<Badge, CoreError>
  where
    F: FnOnce(&mut Badge) + Send + 'static,
  {
    Err(offline())
  }
  async fn delete(&self, _: UserId) -> Result<bool, CoreError> { Err(offline()) }
  async fn list_all(&self) -> Result<Vec<Badge>, CoreError> { Err(offline()) }
  async fn list_by_tier(&self, _: Tier) -> Result<Vec<Badge>, CoreError> { Err(offline()) }
  async fn list_all_ordered_by_contribution(&self) -> Result<Vec<Badge>, CoreError> { Err(offline()) }
}

#[tokio::test]
async fn comment_survives_reputation_failure() {
  let s = store().await;
  let threads = ThreadService::new(s.clone(), ReputationService::new(OfflineBadges));

  let comment = threads.post_comment(1, 100, "still here".into()).await.unwrap();
  let reply = threads
    .post_reply(2, 100, comment.comment_id, "me too".into())
    .await
    .unwrap();

  assert!(s.get(comment.comment_id).await.unwrap().is_some());
  assert!(s.get(reply.comment_id).await.unwrap().is_some());
  assert_eq!(threads.count_for_article(100).await.unwrap(), 2);
  assert_eq!(threads.reputation().stats().await.unwrap_err().kind(), ErrorKind::Storage);
}
