//! Integration tests for user identity and the cooldown slot claim.

use chrono::{Duration, Utc};
use cardpull_core::types::UserRef;
use cardpull_db::repositories::UserRepo;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_get_or_create_is_idempotent(pool: PgPool) {
    let first = UserRepo::get_or_create(&pool, &UserRef::new("42", "Old Name"))
        .await
        .unwrap();
    let second = UserRepo::get_or_create(&pool, &UserRef::new("42", "New Name"))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.display_name, "New Name");
    assert_eq!(second.total_draws, 0);
    assert!(second.last_draw_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_claim_draw_slot_once_per_cooldown(pool: PgPool) {
    let user = UserRepo::get_or_create(&pool, &UserRef::new("42", "Tester"))
        .await
        .unwrap();
    let now = Utc::now();
    let cutoff = now - Duration::seconds(900);

    let claimed = UserRepo::try_claim_draw_slot(&pool, user.id, now, cutoff)
        .await
        .unwrap();
    assert!(claimed.is_some());

    let later = now + Duration::seconds(10);
    let blocked = UserRepo::try_claim_draw_slot(&pool, user.id, later, later - Duration::seconds(900))
        .await
        .unwrap();
    assert!(blocked.is_none());

    let after = now + Duration::seconds(900);
    let reopened = UserRepo::try_claim_draw_slot(&pool, user.id, after, after - Duration::seconds(900))
        .await
        .unwrap();
    assert!(reopened.is_some());
}
