//! Races on the same order: the store's compare-and-swap must admit exactly
//! one winner, and exactly one event per committed transition.

use quickdrop::bus::OrderEvent;
use quickdrop::identity::Directory;
use quickdrop::lifecycle::{DeliverySystem, OrderError};
use quickdrop::model::{OrderDraft, OrderStatus, Role, UserId};

fn directory() -> Directory {
    Directory::new()
        .with_user("alice", [Role::User])
        .with_user("admin_1", [Role::User, Role::Admin])
        .with_user("admin_2", [Role::User, Role::Admin])
}

fn draft() -> OrderDraft {
    OrderDraft {
        description: "K50 for 2L Milk".to_string(),
        location: "Market".to_string(),
        estimated_time: "09:15".to_string(),
        instructions: None,
    }
}

#[tokio::test]
async fn two_admins_racing_the_same_transition_produce_one_winner() {
    let system = DeliverySystem::new(directory());
    let alice = UserId::from("alice");

    let order = system.service.create_order(&alice, draft()).await.unwrap();
    let mut events = system.bus.subscribe();

    let mut handles = vec![];
    for admin in ["admin_1", "admin_2"] {
        let service = system.service.clone();
        let caller = UserId::from(admin);
        let order_id = order.id;
        handles.push(tokio::spawn(async move {
            service
                .advance_status(&caller, order_id, OrderStatus::InProgress)
                .await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(updated) => {
                assert_eq!(updated.status, OrderStatus::InProgress);
                winners += 1;
            }
            Err(OrderError::InvalidTransition { to, .. }) => {
                assert_eq!(to, OrderStatus::InProgress);
                losers += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(winners, 1, "exactly one admin should win the race");
    assert_eq!(losers, 1, "the other should observe a stale transition");

    // Exactly one Updated event was published.
    assert_eq!(
        events.try_recv(),
        Some(OrderEvent::Updated {
            order_id: order.id,
            status: OrderStatus::InProgress,
        })
    );
    assert_eq!(events.try_recv(), None);

    let current = system
        .service
        .orders_for_user(&alice)
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.id == order.id)
        .unwrap();
    assert_eq!(current.status, OrderStatus::InProgress);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn concurrent_cancel_and_advance_admit_one_mutation() {
    let system = DeliverySystem::new(directory());
    let alice = UserId::from("alice");

    let order = system.service.create_order(&alice, draft()).await.unwrap();
    let mut events = system.bus.subscribe();

    let cancel = {
        let service = system.service.clone();
        let caller = alice.clone();
        let order_id = order.id;
        tokio::spawn(async move {
            service
                .advance_status(&caller, order_id, OrderStatus::Cancelled)
                .await
        })
    };
    let advance = {
        let service = system.service.clone();
        let caller = UserId::from("admin_1");
        let order_id = order.id;
        tokio::spawn(async move {
            service
                .advance_status(&caller, order_id, OrderStatus::InProgress)
                .await
        })
    };

    let outcomes = [cancel.await.unwrap(), advance.await.unwrap()];
    let committed: Vec<_> = outcomes.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(committed.len(), 1, "exactly one mutation should commit");
    for outcome in &outcomes {
        if let Err(e) = outcome {
            assert!(
                matches!(e, OrderError::InvalidTransition { .. }),
                "loser should see InvalidTransition, got {e:?}"
            );
        }
    }

    // One committed transition, one event.
    let event = events.try_recv().expect("the winner published one event");
    assert!(matches!(event, OrderEvent::Updated { order_id, .. } if order_id == order.id));
    assert_eq!(events.try_recv(), None);

    system.shutdown().await.unwrap();
}

/// Many creations racing: ids stay unique, every order lands, one event each.
#[tokio::test]
async fn concurrent_creations_get_unique_ids() {
    let system = DeliverySystem::new(directory());
    let mut events = system.bus.subscribe();

    let mut handles = vec![];
    for _ in 0..10 {
        let service = system.service.clone();
        handles.push(tokio::spawn(async move {
            service.create_order(&UserId::from("alice"), draft()).await
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let order = handle.await.unwrap().expect("creation should succeed");
        assert!(ids.insert(order.id), "duplicate id {}", order.id);
    }
    assert_eq!(ids.len(), 10);

    let mut created_events = 0;
    while let Some(event) = events.try_recv() {
        assert!(matches!(event, OrderEvent::Created { .. }));
        created_events += 1;
    }
    assert_eq!(created_events, 10);

    let listed = system
        .service
        .orders_for_user(&UserId::from("alice"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 10);

    system.shutdown().await.unwrap();
}
