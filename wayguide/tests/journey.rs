//! End-to-end journey: onboarding, guidance, interruption, restore and arrival.

use std::sync::Arc;

use geodesy::{distance_meters, encode_path, Coordinate};
use tokio_stream::StreamExt;
use wayguide::{
    GuidanceProviders, GuidanceSession, GuidanceUpdate, NavigationPhase, NavigationStateMachine,
    RouteStatus, SessionEventKind, WayguideConfig,
};
use wayguide_providers::mock::{MockDirections, MockDirectory, MockPlaces};
use wayguide_providers::{
    Destination, FileStore, LandmarkCategory, Maneuver, ManeuverModifier, ManeuverType,
    PlaceCandidate, RouteResponse, RouteStep,
};

const START: Coordinate = Coordinate::new(0.0, 0.0);
const CORNER: Coordinate = Coordinate::new(0.0, 0.0018);
const MARKET: Coordinate = Coordinate::new(0.0018, 0.0018);

fn walking_route() -> RouteResponse {
    let leg = |start: Coordinate, end: Coordinate, maneuver: Maneuver, cumulative: f64| RouteStep {
        start,
        end,
        distance_m: distance_meters(&start, &end),
        duration_s: 140.0,
        maneuver: Some(maneuver),
        cumulative_distance_m: cumulative,
    };
    RouteResponse {
        steps: vec![
            leg(START, CORNER, Maneuver::new(ManeuverType::Straight), 200.0),
            leg(CORNER, MARKET, Maneuver::turn(ManeuverModifier::Right), 280.0),
            leg(MARKET, MARKET, Maneuver::new(ManeuverType::Arrive), 400.0),
        ],
        encoded_path: encode_path(&[START, CORNER, MARKET]),
    }
}

fn providers() -> GuidanceProviders {
    GuidanceProviders {
        directions: Arc::new(MockDirections::new().with_route(walking_route())),
        places: Arc::new(
            MockPlaces::new()
                .with_place(
                    LandmarkCategory::Mosque,
                    PlaceCandidate::new("Central Mosque", Coordinate::new(0.0017, 0.0019)),
                )
                .with_failure(LandmarkCategory::School),
        ),
        directory: Arc::new(MockDirectory::new().with_destination(
            "MKT-07",
            Destination::new("Oja Market", MARKET).with_address("12 Market Road"),
        )),
    }
}

#[tokio::test]
async fn test_complete_journey() {
    let machine = Arc::new(NavigationStateMachine::new());
    let mut changes = Box::pin(machine.changes());
    let session = GuidanceSession::new(machine.clone(), providers());

    // Onboarding
    assert!(machine.transition_to(NavigationPhase::LocationPermission).await);
    assert!(machine.grant_location_permission().await);
    assert!(machine.select_language("es").await);
    assert!(machine.set_voice_preference(true).await);
    assert!(machine.submit_destination_code("MKT-07").await);
    assert!(session.resolve_destination().await.unwrap());
    assert_eq!(machine.phase().await, NavigationPhase::Navigating);

    // Every step above produced exactly one transition event, in order
    let mut phases = Vec::new();
    for _ in 0..6 {
        let event = changes.next().await.unwrap();
        assert_eq!(event.kind, SessionEventKind::Transition);
        phases.push(event.to);
    }
    assert_eq!(
        phases,
        vec![
            NavigationPhase::LocationPermission,
            NavigationPhase::LanguageSelection,
            NavigationPhase::VoiceConsent,
            NavigationPhase::DestinationInput,
            NavigationPhase::DestinationValidation,
            NavigationPhase::Navigating,
        ]
    );

    // Route and landmarks
    let status = session.start(START).await.unwrap();
    assert_eq!(status, RouteStatus::Loaded { steps: 3, path_points: 3 });
    let landmarks = session.landmarks().await;
    assert_eq!(landmarks.len(), 1);
    assert_eq!(landmarks[0].name, "Central Mosque");

    // Approaching the corner: the right turn is 80 m ahead
    match session.handle_position(CORNER).await.unwrap() {
        GuidanceUpdate::Instruction {
            instruction,
            announcement,
        } => {
            assert_eq!(instruction.text, "En 80 metros, gire a la derecha");
            assert!(instruction.upcoming);
            assert!(announcement.is_some());
        }
        other => panic!("unexpected update: {other:?}"),
    }

    // Arrival
    match session.handle_position(Coordinate::new(0.0018, 0.00185)).await.unwrap() {
        GuidanceUpdate::Arrived { text } => assert_eq!(text, "Ha llegado a Oja Market"),
        other => panic!("unexpected update: {other:?}"),
    }
    assert_eq!(machine.phase().await, NavigationPhase::Arrived);

    // Next journey keeps preferences
    assert!(machine.transition_to(NavigationPhase::Welcome).await);
    let ctx = machine.context().await;
    assert!(ctx.destination.is_none());
    assert!(ctx.voice_enabled);
    assert!(ctx.location_permission_granted);
}

#[tokio::test]
async fn test_interrupted_journey_resumes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    let machine = Arc::new(NavigationStateMachine::new());
    let session = GuidanceSession::new(machine.clone(), providers());
    machine.transition_to(NavigationPhase::LocationPermission).await;
    machine.grant_location_permission().await;
    machine.select_language("fr").await;
    machine.set_voice_preference(false).await;
    machine.submit_destination_code("MKT-07").await;
    session.resolve_destination().await.unwrap();
    session.handle_position(START).await.unwrap();
    machine.persist(&store).await.unwrap();

    // Reopened with the same code: the journey continues
    let resumed = Arc::new(NavigationStateMachine::new());
    let phase = resumed.restore(&store, Some("MKT-07")).await.unwrap();
    assert_eq!(phase, NavigationPhase::Navigating);
    assert_eq!(resumed.context().await, machine.context().await);

    let session = GuidanceSession::new(resumed.clone(), providers());
    session.start(START).await.unwrap();
    assert!(matches!(
        session.handle_position(START).await.unwrap(),
        GuidanceUpdate::Instruction { .. }
    ));

    // Reopened without a code: start over, keeping French
    let fresh = NavigationStateMachine::new();
    assert_eq!(
        fresh.restore(&store, None).await.unwrap(),
        NavigationPhase::Welcome
    );
    let ctx = fresh.context().await;
    assert!(ctx.destination_code.is_none());
    assert_eq!(ctx.language.code(), "fr");
}

#[tokio::test]
async fn test_denied_location_uses_static_narration() {
    let machine = Arc::new(NavigationStateMachine::new());
    let session = GuidanceSession::new(machine.clone(), providers());

    machine.transition_to(NavigationPhase::LocationPermission).await;
    assert!(machine.deny_location_permission().await);
    machine.select_language("en").await;
    machine.set_voice_preference(true).await;
    machine.submit_destination_code("MKT-07").await;
    assert!(session.resolve_destination().await.unwrap());

    // Validated but waiting for permission
    assert_eq!(machine.phase().await, NavigationPhase::DestinationValidation);
    assert_eq!(
        session.handle_position(START).await.unwrap(),
        GuidanceUpdate::Idle
    );

    let update = session.handle_location_unavailable().await.unwrap();
    assert_eq!(
        update,
        GuidanceUpdate::Static {
            text: "Live location is unavailable. Your destination is Oja Market, 12 Market Road."
                .to_string()
        }
    );
}

#[tokio::test]
async fn test_config_from_yaml_drives_session() {
    let config = WayguideConfig::from_yaml(
        "guidance:\n  arrival_radius_m: 40.0\nsession:\n  default_language: fr\n",
    )
    .unwrap();
    let machine = Arc::new(NavigationStateMachine::with_config(config));
    assert_eq!(machine.language().await.code(), "fr");

    let session = GuidanceSession::new(machine.clone(), providers());
    machine.transition_to(NavigationPhase::LocationPermission).await;
    machine.grant_location_permission().await;
    machine.select_language("fr").await;
    machine.set_voice_preference(true).await;
    machine.submit_destination_code("MKT-07").await;
    session.resolve_destination().await.unwrap();

    // ~33 m away counts as arrived with the wider radius
    match session.handle_position(Coordinate::new(0.0018, 0.0015)).await.unwrap() {
        GuidanceUpdate::Arrived { text } => assert_eq!(text, "Vous êtes arrivé à Oja Market"),
        other => panic!("unexpected update: {other:?}"),
    }
}
