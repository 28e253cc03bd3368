//! Integration tests for the ownership ledger: acquire, merge, transfer and
//! the draw commit.

use assert_matches::assert_matches;
use cardpull_core::drawer::Candidate;
use cardpull_core::error::GachaError;
use cardpull_core::pity::PityConfig;
use cardpull_core::rarity::{DisplayClass, Rarity};
use cardpull_core::types::{DbId, UserRef};
use cardpull_db::models::item::{Item, NewItem};
use cardpull_db::repositories::{DrawRepo, ItemRepo, OwnershipRepo, UserRepo};
use cardpull_db::LedgerError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, id: &str) -> DbId {
    UserRepo::get_or_create(pool, &UserRef::new(id, id))
        .await
        .unwrap()
        .id
}

async fn item(pool: &PgPool, name: &str, group: &str) -> Item {
    let mut conn = pool.acquire().await.unwrap();
    ItemRepo::upsert(
        &mut conn,
        &NewItem {
            name,
            group_label: group,
            image_url: None,
        },
    )
    .await
    .unwrap()
}

async fn give(pool: &PgPool, user_id: DbId, item_id: DbId, times: usize) {
    let mut conn = pool.acquire().await.unwrap();
    for _ in 0..times {
        OwnershipRepo::acquire(&mut conn, user_id, item_id)
            .await
            .unwrap();
    }
}

fn candidate(name: &str, rarity: Rarity) -> Candidate {
    Candidate {
        rarity,
        display: DisplayClass::Grey,
        name: name.to_string(),
        group: "Jujutsu Kaisen".to_string(),
        image_url: Some("https://img.example/gojo.png".to_string()),
        form: None,
        stats: None,
        banner_match: false,
        attempts: 1,
    }
}

// ---------------------------------------------------------------------------
// Acquire
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_acquire_inserts_then_increments(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;

    give(&pool, alice, gojo.id, 1).await;
    let row = OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().unwrap();
    assert_eq!((row.quantity, row.quality_tier), (1, 1));

    give(&pool, alice, gojo.id, 1).await;
    let row = OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().unwrap();
    assert_eq!((row.quantity, row.quality_tier), (2, 1));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_item_upsert_returns_existing_row(pool: PgPool) {
    let first = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    let second = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    let other = item(&pool, "Gojo", "Another Show").await;
    assert_eq!(first.id, second.id);
    assert_ne!(first.id, other.id);
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_merge_consumes_two_and_upgrades(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 3).await;
    sqlx::query("UPDATE ownerships SET quality_tier = 2 WHERE user_id = $1")
        .bind(alice)
        .execute(&pool)
        .await
        .unwrap();

    let merged = OwnershipRepo::merge(&pool, alice, "Gojo").await.unwrap();
    assert_eq!((merged.quantity, merged.quality_tier), (1, 3));

    let again = OwnershipRepo::merge(&pool, alice, "Gojo").await;
    assert_matches!(
        again,
        Err(LedgerError::Domain(GachaError::InsufficientQuantity { have: 1, need: 3 }))
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_merges_apply_once(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 3).await;

    let (first, second) = tokio::join!(
        OwnershipRepo::merge(&pool, alice, "Gojo"),
        OwnershipRepo::merge(&pool, alice, "Gojo"),
    );

    let oks = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(oks, 1);
    let failed = if first.is_ok() { second } else { first };
    assert_matches!(
        failed,
        Err(LedgerError::Domain(GachaError::InsufficientQuantity { have: 1, need: 3 }))
    );
    let row = OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().unwrap();
    assert_eq!((row.quantity, row.quality_tier), (1, 2));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_merge_unowned_item(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let result = OwnershipRepo::merge(&pool, alice, "Nobody").await;
    assert_matches!(result, Err(LedgerError::Domain(GachaError::NotOwned(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_merge_at_max_tier_leaves_row_unchanged(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 4).await;
    sqlx::query("UPDATE ownerships SET quality_tier = 5 WHERE user_id = $1")
        .bind(alice)
        .execute(&pool)
        .await
        .unwrap();

    let result = OwnershipRepo::merge(&pool, alice, "Gojo").await;
    assert_matches!(result, Err(LedgerError::Domain(GachaError::MaxTierReached(5))));

    let row = OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().unwrap();
    assert_eq!((row.quantity, row.quality_tier), (4, 5));
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_transfer_last_unit_deletes_source_row(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 1).await;

    OwnershipRepo::transfer(&pool, alice, bob, gojo.id, 1).await.unwrap();

    assert!(OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().is_none());
    let row = OwnershipRepo::find(&pool, bob, gojo.id).await.unwrap().unwrap();
    assert_eq!((row.quantity, row.quality_tier), (1, 1));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transfer_overdraw_changes_nothing(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 1).await;

    let result = OwnershipRepo::transfer(&pool, alice, bob, gojo.id, 2).await;
    assert_matches!(
        result,
        Err(LedgerError::Domain(GachaError::InsufficientQuantity { have: 1, need: 2 }))
    );
    let row = OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().unwrap();
    assert_eq!(row.quantity, 1);
    assert!(OwnershipRepo::find(&pool, bob, gojo.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transfer_keeps_destination_tier(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 2).await;
    give(&pool, bob, gojo.id, 1).await;
    sqlx::query("UPDATE ownerships SET quality_tier = 4 WHERE user_id = $1")
        .bind(bob)
        .execute(&pool)
        .await
        .unwrap();

    OwnershipRepo::transfer(&pool, alice, bob, gojo.id, 1).await.unwrap();

    let row = OwnershipRepo::find(&pool, bob, gojo.id).await.unwrap().unwrap();
    assert_eq!((row.quantity, row.quality_tier), (2, 4));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_opposing_transfers_complete_without_deadlock(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 1).await;
    give(&pool, bob, gojo.id, 1).await;
    sqlx::query("UPDATE ownerships SET quantity = 50 WHERE item_id = $1")
        .bind(gojo.id)
        .execute(&pool)
        .await
        .unwrap();

    for _ in 0..25 {
        let (there, back) = tokio::join!(
            OwnershipRepo::transfer(&pool, alice, bob, gojo.id, 1),
            OwnershipRepo::transfer(&pool, bob, alice, gojo.id, 1),
        );
        there.unwrap();
        back.unwrap();
    }

    let a = OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().unwrap();
    let b = OwnershipRepo::find(&pool, bob, gojo.id).await.unwrap().unwrap();
    assert_eq!((a.quantity, b.quantity), (50, 50));
}

// ---------------------------------------------------------------------------
// Grant
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_grant_overwrites_quantity_and_resets_tier(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 5).await;
    sqlx::query("UPDATE ownerships SET quality_tier = 3 WHERE user_id = $1")
        .bind(alice)
        .execute(&pool)
        .await
        .unwrap();

    let row = OwnershipRepo::grant(&pool, alice, "Gojo", 2).await.unwrap().unwrap();
    assert_eq!((row.quantity, row.quality_tier), (2, 1));

    let bob = user(&pool, "bob").await;
    let row = OwnershipRepo::grant(&pool, bob, "Gojo", 4).await.unwrap().unwrap();
    assert_eq!((row.item_id, row.quantity), (gojo.id, 4));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grant_zero_deletes_row(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let gojo = item(&pool, "Gojo", "Jujutsu Kaisen").await;
    give(&pool, alice, gojo.id, 2).await;

    assert!(OwnershipRepo::grant(&pool, alice, "Gojo", 0).await.unwrap().is_none());
    assert!(OwnershipRepo::find(&pool, alice, gojo.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grant_rejects_unknown_item_and_negative_quantity(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    item(&pool, "Gojo", "Jujutsu Kaisen").await;

    assert_matches!(
        OwnershipRepo::grant(&pool, alice, "Nobody", 1).await,
        Err(LedgerError::Domain(GachaError::UnknownItem(name))) if name == "Nobody"
    );
    assert_matches!(
        OwnershipRepo::grant(&pool, alice, "Gojo", -3).await,
        Err(LedgerError::Domain(GachaError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// Inventory and search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_inventory_orders_by_quantity_then_name(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let a = item(&pool, "Aang", "Avatar").await;
    let b = item(&pool, "Baki", "Baki").await;
    let c = item(&pool, "Chopper", "One Piece").await;
    give(&pool, alice, c.id, 1).await;
    give(&pool, alice, b.id, 1).await;
    give(&pool, alice, a.id, 2).await;

    let inventory = OwnershipRepo::list_inventory(&pool, alice, 20).await.unwrap();
    let names: Vec<_> = inventory.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Aang", "Baki", "Chopper"]);

    let limited = OwnershipRepo::list_inventory(&pool, alice, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    item(&pool, "100% Orange Juice", "Games").await;
    item(&pool, "100 Orange", "Games").await;

    let hits = ItemRepo::search_names(&pool, "100%").await.unwrap();
    assert_eq!(hits, vec!["100% Orange Juice".to_string()]);
}

// ---------------------------------------------------------------------------
// Draw commit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_commit_choice_updates_everything_once(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let config = PityConfig::default();

    let first = DrawRepo::commit_choice(&pool, alice, &candidate("Gojo", Rarity::Common), &config)
        .await
        .unwrap();
    assert_eq!(first.total_draws, 1);
    assert_eq!((first.pity.legendary, first.pity.mythic), (1, 1));
    assert_eq!(first.ownership.quantity, 1);

    let second =
        DrawRepo::commit_choice(&pool, alice, &candidate("Gojo", Rarity::Legendary), &config)
            .await
            .unwrap();
    assert_eq!(second.item.id, first.item.id);
    assert_eq!(second.ownership.quantity, 2);
    assert_eq!((second.pity.legendary, second.pity.mythic), (0, 2));

    let stored = UserRepo::find_by_id(&pool, alice).await.unwrap().unwrap();
    assert_eq!(stored.total_draws, 2);
    assert_eq!(stored.count_for(Rarity::Common), 1);
    assert_eq!(stored.count_for(Rarity::Legendary), 1);
    assert_eq!((stored.pity_legendary, stored.pity_mythic), (0, 2));
}
