//! Decision function tests

mod common;

use collection_authz::{Action, AuthzSettings, Collection, Role, SYSTEM_GUEST, SYSTEM_USER};
use common::{default_fixture, fixture, SECRET};
use proptest::prelude::*;

// ============================================================================
// CAN
// ============================================================================

#[tokio::test]
async fn test_can_read_and_write_granted_collections() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice").with_groups([10]);
    let authz = fx.engine.from_role(Some(&role));

    assert!(authz.can(1, Action::Read).await.unwrap());
    assert!(!authz.can(1, Action::Write).await.unwrap());
    assert!(authz.can(2, Action::Write).await.unwrap());
    assert!(authz.can(3, Action::Write).await.unwrap());
    assert!(!authz.can(42, Action::Read).await.unwrap());
}

#[tokio::test]
async fn test_can_accepts_identifier_forms() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice");
    let authz = fx.engine.from_role(Some(&role));

    assert!(authz.can("3", Action::Read).await.unwrap());
    assert!(authz.can(&Collection::new(3, "Leaks"), Action::Read).await.unwrap());
    assert!(authz.can(Some(3i64), Action::Read).await.unwrap());
}

#[tokio::test]
async fn test_can_denies_invalid_identifiers() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice");
    let authz = fx.engine.from_role(Some(&role));

    assert!(!authz.can("banana", Action::Read).await.unwrap());
    assert!(!authz.can("", Action::Read).await.unwrap());
    assert!(!authz.can(None::<i64>, Action::Read).await.unwrap());
    assert_eq!(fx.store.queries(), 0, "Invalid ids should not reach the store");
}

#[tokio::test]
async fn test_admin_bypasses_grants() {
    let fx = default_fixture().await;
    let role = Role::new(1000, "root").admin();
    let authz = fx.engine.from_role(Some(&role));

    assert!(authz.can("42", Action::Read).await.unwrap());
    assert!(authz.can(777, Action::Write).await.unwrap());
    assert!(authz.can("banana", Action::Read).await.unwrap());
    assert_eq!(fx.store.queries(), 0, "Admins should not query the store");
}

#[tokio::test]
async fn test_write_gate_applies_to_admins() {
    let fx = fixture(AuthzSettings::new(SECRET).with_maintenance(true)).await;
    let admin = Role::new(1000, "root").admin();
    let authz = fx.engine.from_role(Some(&admin));

    assert!(!authz.can(42, Action::Write).await.unwrap());
    assert!(authz.can(42, Action::Read).await.unwrap());
}

#[tokio::test]
async fn test_anonymous_cannot_write() {
    let fx = default_fixture().await;
    let authz = fx.engine.from_role(None);

    assert!(authz.can(4, Action::Read).await.unwrap());
    assert!(!authz.can(4, Action::Write).await.unwrap());

    // Even an admin flag carried by an anonymous context cannot write
    let anon_admin = fx.engine.context(None, [SYSTEM_GUEST], true, None);
    assert!(!anon_admin.can(4, Action::Write).await.unwrap());
}

// ============================================================================
// BULK IMPORT, ROLES, REGISTRATION
// ============================================================================

#[tokio::test]
async fn test_can_bulk_import() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice");

    assert!(fx.engine.from_role(Some(&role)).can_bulk_import());
    assert!(!fx.engine.from_role(None).can_bulk_import());

    let maintenance = fixture(AuthzSettings::new(SECRET).with_maintenance(true)).await;
    assert!(!maintenance.engine.from_role(Some(&role)).can_bulk_import());
}

#[tokio::test]
async fn test_can_write_role() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice").with_groups([10]);
    let authz = fx.engine.from_role(Some(&role));

    assert!(authz.can_write_role(5).await.unwrap());
    assert!(authz.can_write_role("10").await.unwrap());
    assert!(!authz.can_write_role(SYSTEM_GUEST).await.unwrap());
    assert!(!authz.can_write_role(SYSTEM_USER).await.unwrap());
    assert!(!authz.can_write_role(11).await.unwrap());
    assert!(!authz.can_write_role("group-x").await.unwrap());
    assert!(!authz.can_write_role(None::<i64>).await.unwrap());
}

#[tokio::test]
async fn test_can_write_role_admin_and_gate() {
    let fx = default_fixture().await;
    let admin = Role::new(1000, "root").admin();
    assert!(fx.engine.from_role(Some(&admin)).can_write_role(SYSTEM_USER).await.unwrap());
    assert!(!fx.engine.from_role(None).can_write_role(SYSTEM_GUEST).await.unwrap());

    let maintenance = fixture(AuthzSettings::new(SECRET).with_maintenance(true)).await;
    assert!(!maintenance
        .engine
        .from_role(Some(&admin))
        .can_write_role(1000)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_can_read_role() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice").with_groups([10]);
    let authz = fx.engine.from_role(Some(&role));

    assert!(authz.can_read_role(10));
    assert!(authz.can_read_role(SYSTEM_GUEST));
    assert!(authz.can_read_role("5"));
    assert!(!authz.can_read_role(11));
    assert!(!authz.can_read_role("nope"));

    let admin = Role::new(1000, "root").admin();
    assert!(fx.engine.from_role(Some(&admin)).can_read_role(11));
}

#[tokio::test]
async fn test_can_register() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice");

    assert!(fx.engine.from_role(None).can_register());
    assert!(!fx.engine.from_role(Some(&role)).can_register());

    let maintenance = fixture(AuthzSettings::new(SECRET).with_maintenance(true)).await;
    assert!(!maintenance.engine.from_role(None).can_register());

    let no_password = fixture(AuthzSettings::new(SECRET).with_password_login(false)).await;
    assert!(!no_password.engine.from_role(None).can_register());
}

// ============================================================================
// MATCH
// ============================================================================

#[tokio::test]
async fn test_match_roles() {
    let fx = default_fixture().await;
    let role = Role::new(5, "alice").with_groups([10]);
    let authz = fx.engine.from_role(Some(&role));

    assert!(!authz.match_roles(Vec::new()));
    assert!(authz.match_roles([10]));
    assert!(authz.match_roles(vec![99, 98, SYSTEM_GUEST]));
    assert!(!authz.match_roles([99, 98]));
}

proptest! {
    #[test]
    fn prop_match_roles(
        groups in proptest::collection::vec(100i64..200, 0..6),
        others in proptest::collection::vec(200i64..300, 0..6),
    ) {
        let fx = tokio_test::block_on(default_fixture());
        let role = Role::new(5, "alice").with_groups(groups.clone());
        let authz = fx.engine.from_role(Some(&role));

        prop_assert!(!authz.match_roles(Vec::new()));
        prop_assert!(!authz.match_roles(others.clone()));
        if let Some(group) = groups.first() {
            let mut candidates = others.clone();
            candidates.push(*group);
            prop_assert!(authz.match_roles(candidates));
        }
    }
}
