//! LAN matchmaking between coordinators sharing one loopback directory.

#![allow(clippy::panic)]

use multiplayer_sessions::domain::{
    JoinResult, LocalPlayerId, OutcomeNotifier, OutcomeSubscription, SessionIntent,
    SessionOutcome, SessionSearchResult,
};
use multiplayer_sessions::gateway::{LanDirectory, LoopbackGateway};
use multiplayer_sessions::service::{
    CoordinatorOptions, MenuFlow, MenuSettings, SessionCoordinator, TravelDirective,
    try_join_session,
};

type Coordinator = SessionCoordinator<LoopbackGateway>;

fn player(directory: &LanDirectory, host_address: &str) -> (Coordinator, OutcomeSubscription) {
    let notifier = OutcomeNotifier::new(64);
    let outcomes = notifier.subscribe_all();
    let gateway = LoopbackGateway::new(directory.clone()).with_host_address(host_address);
    let options = CoordinatorOptions {
        local_player: LocalPlayerId::new(),
        ..CoordinatorOptions::default()
    };
    (SessionCoordinator::new(gateway, notifier, options), outcomes)
}

fn intent(slots: u32, match_type: &str) -> SessionIntent {
    let Ok(intent) = SessionIntent::new(slots, match_type) else {
        panic!("valid intent");
    };
    intent
}

/// Polls once and returns everything published.
fn pump(coordinator: &mut Coordinator, outcomes: &mut OutcomeSubscription) -> Vec<SessionOutcome> {
    coordinator.poll_gateway();
    outcomes.drain()
}

fn search(
    coordinator: &mut Coordinator,
    outcomes: &mut OutcomeSubscription,
) -> Vec<SessionSearchResult> {
    coordinator.find_sessions(100);
    let found = pump(coordinator, outcomes);
    let [SessionOutcome::SessionsFound { results, success: true }] = found.as_slice() else {
        panic!("expected one successful search, got {found:?}");
    };
    results.clone()
}

#[test]
fn client_finds_and_joins_host() {
    let directory = LanDirectory::new();
    let (mut host, mut host_outcomes) = player(&directory, "192.168.0.10:7777");
    let (mut client, mut client_outcomes) = player(&directory, "192.168.0.11:7777");

    host.create_session(intent(2, "FreeForAll"));
    assert_eq!(
        pump(&mut host, &mut host_outcomes),
        vec![SessionOutcome::Created { success: true }]
    );
    assert!(host.is_lan());

    let results = search(&mut client, &mut client_outcomes);
    assert_eq!(results.len(), 1);
    let Some(hosted) = results.first() else {
        panic!("host visible");
    };
    assert_eq!(hosted.match_type(), Some("FreeForAll"));
    assert_eq!(hosted.open_public_slots, 2);

    assert!(try_join_session(&mut client, &results, true, "FreeForAll"));
    assert_eq!(
        pump(&mut client, &mut client_outcomes),
        vec![SessionOutcome::Joined {
            result: JoinResult::Success,
            address: "192.168.0.10:7777".to_string()
        }]
    );
    assert_eq!(directory.open_slots(hosted.session_id), Some(1));

    client.destroy_session();
    assert_eq!(
        pump(&mut client, &mut client_outcomes),
        vec![SessionOutcome::Destroyed { success: true }]
    );
    assert_eq!(directory.open_slots(hosted.session_id), Some(2));
}

#[test]
fn host_does_not_find_itself() {
    let directory = LanDirectory::new();
    let (mut host, mut outcomes) = player(&directory, "10.0.0.1:7777");

    host.create_session(intent(4, "FreeForAll"));
    pump(&mut host, &mut outcomes);

    assert!(search(&mut host, &mut outcomes).is_empty());
}

#[test]
fn full_session_cannot_be_joined() {
    let directory = LanDirectory::new();
    let (mut host, mut host_outcomes) = player(&directory, "10.0.0.1:7777");
    let (mut first, mut first_outcomes) = player(&directory, "10.0.0.2:7777");
    let (mut second, mut second_outcomes) = player(&directory, "10.0.0.3:7777");

    host.create_session(intent(1, "Duel"));
    pump(&mut host, &mut host_outcomes);

    let results = search(&mut first, &mut first_outcomes);
    assert!(try_join_session(&mut first, &results, true, "Duel"));
    pump(&mut first, &mut first_outcomes);

    let results = search(&mut second, &mut second_outcomes);
    assert!(try_join_session(&mut second, &results, true, "Duel"));
    let joined = pump(&mut second, &mut second_outcomes);
    let [SessionOutcome::Joined { result, address }] = joined.as_slice() else {
        panic!("expected one join outcome, got {joined:?}");
    };
    assert!(!result.is_success());
    assert!(address.is_empty());
}

#[test]
fn hosting_again_replaces_the_advertised_session() {
    let directory = LanDirectory::new();
    let (mut host, mut host_outcomes) = player(&directory, "10.0.0.1:7777");
    let (mut client, mut client_outcomes) = player(&directory, "10.0.0.2:7777");

    host.create_session(intent(2, "FreeForAll"));
    pump(&mut host, &mut host_outcomes);

    host.create_session(intent(4, "Ranked"));
    assert!(host.recreate_pending());
    assert_eq!(
        pump(&mut host, &mut host_outcomes),
        vec![SessionOutcome::Destroyed { success: true }]
    );
    assert_eq!(
        pump(&mut host, &mut host_outcomes),
        vec![SessionOutcome::Created { success: true }]
    );
    assert_eq!(directory.len(), 1);

    let results = search(&mut client, &mut client_outcomes);
    let [only] = results.as_slice() else {
        panic!("expected one advertised session, got {results:?}");
    };
    assert_eq!(only.match_type(), Some("Ranked"));
    assert_eq!(only.max_public_slots, 4);
}

#[test]
fn menu_flows_travel_both_sides() {
    let directory = LanDirectory::new();
    let (mut host, mut host_outcomes) = player(&directory, "10.0.0.1:7777");
    let (mut client, mut client_outcomes) = player(&directory, "10.0.0.2:7777");
    let Ok(mut host_menu) = MenuFlow::new(MenuSettings::default()) else {
        panic!("default menu");
    };
    let Ok(mut client_menu) = MenuFlow::new(MenuSettings::default()) else {
        panic!("default menu");
    };

    assert!(host_menu.host(&mut host));
    let mut host_travel = None;
    for outcome in pump(&mut host, &mut host_outcomes) {
        host_travel = host_travel.or(host_menu.on_outcome(&outcome, &mut host));
    }
    assert_eq!(
        host_travel,
        Some(TravelDirective::ServerTravel {
            url: "/Game/Maps/Lobby?listen".to_string()
        })
    );

    assert!(client_menu.join(&mut client));
    let mut client_travel = None;
    // Search, then join.
    for _ in 0..2 {
        for outcome in pump(&mut client, &mut client_outcomes) {
            client_travel = client_travel.or(client_menu.on_outcome(&outcome, &mut client));
        }
    }
    assert_eq!(
        client_travel,
        Some(TravelDirective::ClientTravel {
            address: "10.0.0.1:7777".to_string()
        })
    );
    assert!(!client_menu.join_enabled());
}
