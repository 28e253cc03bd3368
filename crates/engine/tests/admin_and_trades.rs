//! Engine tests for admin gating, trades and read models.

use std::sync::Arc;

use assert_matches::assert_matches;
use cardpull_core::error::GachaError;
use cardpull_core::pools::DuelPool;
use cardpull_core::rarity::RarityTable;
use cardpull_core::trade::TradeStatus;
use cardpull_core::types::UserRef;
use cardpull_db::models::banner::SaveBanner;
use cardpull_db::LedgerError;
use cardpull_engine::{DrawPool, EngineConfig, GachaEngine};
use sqlx::PgPool;
use uuid::Uuid;

fn engine(pool: &PgPool) -> GachaEngine {
    let config = EngineConfig {
        cooldown_secs: 0,
        ..EngineConfig::default()
    };
    GachaEngine::new(pool.clone(), config, RarityTable::default(), Arc::new(DuelPool))
}

fn banner(name: &str) -> SaveBanner {
    SaveBanner {
        name: name.to_string(),
        focus_labels: vec!["Bleach".to_string()],
        bonus_percent: 40,
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_banner_mutations_require_admin(pool: PgPool) {
    let engine = engine(&pool);

    assert_matches!(
        engine.upsert_banner(false, &banner("Soul Society")).await,
        Err(LedgerError::Domain(GachaError::NotAuthorized(_)))
    );
    engine.upsert_banner(true, &banner("Soul Society")).await.unwrap();
    assert_matches!(
        engine.set_active_banner(false, "Soul Society").await,
        Err(LedgerError::Domain(GachaError::NotAuthorized(_)))
    );
    assert_matches!(
        engine.remove_banner(false, "Soul Society").await,
        Err(LedgerError::Domain(GachaError::NotAuthorized(_)))
    );
    assert_matches!(
        engine.admin_reset(false).await,
        Err(LedgerError::Domain(GachaError::NotAuthorized(_)))
    );
    assert_matches!(
        engine.admin_stats(false).await,
        Err(LedgerError::Domain(GachaError::NotAuthorized(_)))
    );
    assert_matches!(
        engine.admin_give(false, &UserRef::new("1", "Alice"), "Blue-Eyes", 3).await,
        Err(LedgerError::Domain(GachaError::NotAuthorized(_)))
    );
    assert_eq!(engine.list_banners().await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_banner_lifecycle(pool: PgPool) {
    let engine = engine(&pool);
    engine.upsert_banner(true, &banner("Zeta")).await.unwrap();
    engine.upsert_banner(true, &banner("Alpha")).await.unwrap();

    let names: Vec<_> = engine
        .list_banners()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, ["Alpha", "Zeta"]);

    assert_matches!(
        engine.set_active_banner(true, "Missing").await,
        Err(LedgerError::Domain(GachaError::UnknownBanner(_)))
    );
    engine.set_active_banner(true, "Zeta").await.unwrap();
    engine.clear_active_banner(true).await.unwrap();
    assert!(engine.active_banner().await.unwrap().is_none());

    engine.set_active_banner(true, "Alpha").await.unwrap();
    assert!(engine.remove_banner(true, "Alpha").await.unwrap());
    assert!(engine.active_banner().await.unwrap().is_none());
    assert!(!engine.remove_banner(true, "Alpha").await.unwrap());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_trade_round_trip(pool: PgPool) {
    let engine = engine(&pool);
    let alice = UserRef::new("1", "Alice");
    let bob = UserRef::new("2", "Bob");

    let offer = engine.start_draw(&alice, DrawPool::Anime).await.unwrap();
    let committed = engine
        .confirm_choice(offer.session_id, &alice, 0)
        .await
        .unwrap();
    let name = committed.item.name.clone();

    let trade = engine
        .propose_trade(&alice, &bob, &name, Some("  "))
        .await
        .unwrap();
    assert!(trade.requested_item_name.is_none());
    let pending = engine.pending_trades(&bob).await.unwrap();
    assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), [trade.id]);
    assert!(engine.pending_trades(&alice).await.unwrap().is_empty());

    assert_matches!(
        engine.cancel_trade(trade.id, &bob).await,
        Err(LedgerError::Domain(GachaError::NotAuthorized(_)))
    );
    let accepted = engine.accept_trade(trade.id, &bob).await.unwrap();
    assert_eq!(accepted.status().unwrap(), TradeStatus::Accepted);

    assert!(engine.pending_trades(&bob).await.unwrap().is_empty());

    let fetched = engine.get_trade(trade.id).await.unwrap();
    assert_eq!(fetched.status().unwrap(), TradeStatus::Accepted);

    assert!(engine.inventory(&alice, None).await.unwrap().is_empty());
    let bob_items = engine.inventory(&bob, None).await.unwrap();
    assert_eq!(bob_items.len(), 1);
    assert_eq!(bob_items[0].name, name);

    assert_matches!(
        engine.get_trade(Uuid::now_v7()).await,
        Err(LedgerError::Domain(GachaError::TradeNotFound(_)))
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_search_and_reset(pool: PgPool) {
    let engine = engine(&pool);
    let alice = UserRef::new("1", "Alice");
    let offer = engine.start_draw(&alice, DrawPool::Duel).await.unwrap();
    let committed = engine
        .confirm_choice(offer.session_id, &alice, 0)
        .await
        .unwrap();

    let fragment: String = committed.item.name.chars().take(3).collect();
    let hits = engine.search_item_names(&fragment).await.unwrap();
    assert!(hits.contains(&committed.item.name));

    engine.start_draw(&alice, DrawPool::Duel).await.unwrap();
    engine.admin_reset(true).await.unwrap();

    assert!(engine.sessions().is_empty().await);
    assert!(engine.search_item_names("").await.unwrap().is_empty());
    let stats = engine.stats(&alice).await.unwrap();
    assert_eq!(stats.total_draws, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_stats_and_give(pool: PgPool) {
    let engine = engine(&pool);
    let alice = UserRef::new("1", "Alice");
    let bob = UserRef::new("2", "Bob");
    let offer = engine.start_draw(&alice, DrawPool::Duel).await.unwrap();
    let committed = engine
        .confirm_choice(offer.session_id, &alice, 0)
        .await
        .unwrap();
    let name = committed.item.name.clone();

    let stats = engine.admin_stats(true).await.unwrap();
    assert_eq!((stats.users, stats.items, stats.ownerships), (1, 1, 1));

    let granted = engine
        .admin_give(true, &bob, &name, 5)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((granted.quantity, granted.quality_tier), (5, 1));
    let stats = engine.admin_stats(true).await.unwrap();
    assert_eq!((stats.users, stats.items, stats.ownerships), (2, 1, 2));

    assert_matches!(
        engine.admin_give(true, &bob, "No Such Card", 1).await,
        Err(LedgerError::Domain(GachaError::UnknownItem(_)))
    );
    assert!(engine.admin_give(true, &bob, &name, 0).await.unwrap().is_none());
    assert!(engine.inventory(&bob, None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_inventory_limit_is_capped(pool: PgPool) {
    let engine = engine(&pool);
    let alice = UserRef::new("1", "Alice");
    let user_id = engine.stats(&alice).await.unwrap().user_id;
    sqlx::query(
        "INSERT INTO items (name, group_label) \
         SELECT 'Card ' || g, 'Deck' FROM generate_series(1, 120) AS g",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO ownerships (user_id, item_id, quantity, quality_tier) \
         SELECT $1, id, 1, 1 FROM items",
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .unwrap();

    assert_eq!(engine.inventory(&alice, None).await.unwrap().len(), 20);
    assert_eq!(engine.inventory(&alice, Some(0)).await.unwrap().len(), 1);
    assert_eq!(engine.inventory(&alice, Some(10_000)).await.unwrap().len(), 100);
}
