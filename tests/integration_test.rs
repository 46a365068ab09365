use neonquiz::protocol::{ClientMessage, ServerMessage};
use neonquiz::questions::QuestionBank;
use neonquiz::state::AppState;
use neonquiz::types::{Question, RoomConfig, RoomStatus};
use neonquiz::ws::handlers::{handle_message, Session};
use std::sync::Arc;
use std::time::Duration;

fn fast_state() -> Arc<AppState> {
    Arc::new(AppState::with_config(
        QuestionBank::default(),
        RoomConfig {
            countdown: Duration::from_millis(50),
            // Long window so any advance is attributable to all-answered
            question_window: Duration::from_secs(60),
        },
    ))
}

async fn create_room(
    state: &Arc<AppState>,
    session: &mut Session,
    name: &str,
    max_players: usize,
) -> String {
    let result = handle_message(
        ClientMessage::CreateRoom {
            name: name.to_string(),
            is_private: false,
            category: "science".to_string(),
            max_players,
            username: "QuizMaster".to_string(),
        },
        session,
        state,
    )
    .await;

    match result {
        Some(ServerMessage::RoomCreated {
            room_code,
            snapshot,
            ..
        }) => {
            assert_eq!(snapshot.status, RoomStatus::Waiting);
            room_code
        }
        other => panic!("Expected RoomCreated, got {:?}", other),
    }
}

async fn active_question(state: &Arc<AppState>, code: &str) -> Question {
    let handle = state.get_room(code).await.expect("room should exist");
    let room = handle.room.lock().await;
    room.current_question().cloned().expect("active question")
}

/// End-to-end flow: create, join, start, answer every question, complete
#[tokio::test]
async fn test_full_game_flow() {
    let state = fast_state();
    let mut host_session = Session::new();
    let mut guest_session = Session::new();

    // 1. Host creates a science room
    let room_code = create_room(&state, &mut host_session, "Science Trivia", 4).await;
    assert_eq!(room_code.len(), 6);

    // Host is the sole member and joins ready
    let snapshot = state
        .get_room(&room_code)
        .await
        .expect("room registered")
        .snapshot()
        .await;
    assert_eq!(snapshot.player_count, 1);
    assert!(snapshot.players[0].is_ready);

    // 2. A second player joins unready with zero score
    let join = handle_message(
        ClientMessage::JoinRoom {
            room_code: room_code.clone(),
            username: "Guest1".to_string(),
        },
        &mut guest_session,
        &state,
    )
    .await;
    let guest_id = match join {
        Some(ServerMessage::RoomJoined {
            player_id,
            snapshot,
        }) => {
            assert_eq!(snapshot.player_count, 2);
            let guest = snapshot
                .players
                .iter()
                .find(|p| p.id == player_id)
                .expect("joined player in snapshot");
            assert!(!guest.is_ready);
            assert_eq!(guest.score, 0);
            player_id
        }
        other => panic!("Expected RoomJoined, got {:?}", other),
    };

    // 3. Non-host start attempt is rejected and changes nothing
    let rejected = handle_message(ClientMessage::StartGame, &mut guest_session, &state).await;
    match rejected {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NOT_HOST"),
        other => panic!("Expected Error, got {:?}", other),
    }
    let handle = state.get_room(&room_code).await.unwrap();
    assert_eq!(handle.snapshot().await.status, RoomStatus::Waiting);

    // 4. Guest readies up
    handle_message(
        ClientMessage::SetReady { is_ready: true },
        &mut guest_session,
        &state,
    )
    .await;

    // 5. Host starts: status goes starting, then in-progress after countdown
    let started = handle_message(ClientMessage::StartGame, &mut host_session, &state).await;
    assert!(started.is_none(), "start is observed via snapshots");
    assert_eq!(handle.snapshot().await.status, RoomStatus::Starting);

    tokio::time::sleep(Duration::from_millis(80)).await;
    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.status, RoomStatus::InProgress);
    assert_eq!(snapshot.question_index, Some(0));
    assert!(snapshot.current_question.is_some());
    assert!(snapshot.question_deadline.is_some());

    // 6. Both players answer every question correctly; each question
    //    auto-advances on the last answer, well before the 60s window
    let total = snapshot.question_total;
    for i in 0..total {
        let q = active_question(&state, &room_code).await;
        assert_eq!(handle.snapshot().await.question_index, Some(i));

        for session in [&mut host_session, &mut guest_session] {
            let result = handle_message(
                ClientMessage::SubmitAnswer {
                    question_id: q.id.clone(),
                    option_index: q.correct_option,
                },
                session,
                &state,
            )
            .await;
            match result {
                Some(ServerMessage::AnswerResult {
                    correct,
                    points_awarded,
                    correct_option,
                    ..
                }) => {
                    assert!(correct);
                    assert!(points_awarded > 0);
                    assert_eq!(correct_option, q.correct_option);
                }
                other => panic!("Expected AnswerResult, got {:?}", other),
            }
        }
    }

    // 7. Game is complete; scores accumulated; no further answers accepted
    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.status, RoomStatus::Completed);
    assert_eq!(snapshot.question_index, Some(total - 1));
    for player in &snapshot.players {
        assert!(player.score > 0);
    }
    assert!(snapshot.players.iter().any(|p| p.id == guest_id));

    let last_question_id = {
        let room = handle.room.lock().await;
        room.questions[total - 1].id.clone()
    };
    let late = handle_message(
        ClientMessage::SubmitAnswer {
            question_id: last_question_id,
            option_index: 0,
        },
        &mut guest_session,
        &state,
    )
    .await;
    match late {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "CONFLICT"),
        other => panic!("Expected Error, got {:?}", other),
    }

    // The answer log recorded both players for every question
    let room = handle.room.lock().await;
    assert_eq!(room.answer_log.len(), total * 2);
}

/// Timer-driven and all-answered-driven question endings converge on the
/// same resulting state
#[tokio::test]
async fn test_timeout_and_all_answered_paths_agree() {
    let state = Arc::new(AppState::with_config(
        QuestionBank::default(),
        RoomConfig {
            countdown: Duration::from_millis(20),
            question_window: Duration::from_millis(150),
        },
    ));

    // Room A: nobody answers, the window expires
    let (room_a, host_a) = state
        .create_room("Timeout Room", false, "science", 4, "HostA")
        .await
        .unwrap();
    state.start_game(&room_a.code, &host_a.id).await.unwrap();

    // Room B: the only member answers immediately
    let (room_b, host_b) = state
        .create_room("Fast Room", false, "science", 4, "HostB")
        .await
        .unwrap();
    state.start_game(&room_b.code, &host_b.id).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    let q = room_b
        .room
        .lock()
        .await
        .current_question()
        .cloned()
        .unwrap();
    state
        .submit_answer(&room_b.code, &host_b.id, &q.id, q.correct_option)
        .await
        .unwrap();

    // B advanced immediately via all-answered
    {
        let room = room_b.room.lock().await;
        assert_eq!(room.status, RoomStatus::InProgress);
        assert_eq!(room.current_question_index, 1);
        assert!(room.players.values().all(|p| !p.answered_current));
    }

    // A advances via the window timer
    tokio::time::sleep(Duration::from_millis(200)).await;
    {
        let room = room_a.room.lock().await;
        assert_eq!(room.status, RoomStatus::InProgress);
        assert_eq!(room.current_question_index, 1);
        assert!(room.players.values().all(|p| !p.answered_current));
    }
}

/// Members receive a fresh snapshot broadcast after every state change
#[tokio::test]
async fn test_snapshot_broadcast_on_state_changes() {
    let state = fast_state();
    let (handle, _host) = state
        .create_room("Broadcast Room", false, "science", 4, "Host")
        .await
        .unwrap();

    let mut rx = handle.subscribe();
    let (_, guest) = state.join_room(&handle.code, "Guest").await.unwrap();

    // Join broadcast
    match rx.recv().await.unwrap() {
        ServerMessage::RoomState { snapshot } => {
            assert_eq!(snapshot.player_count, 2);
        }
        other => panic!("Expected RoomState, got {:?}", other),
    }

    // Ready-toggle broadcast
    state
        .set_ready(&handle.code, &guest.id, true)
        .await
        .unwrap();
    match rx.recv().await.unwrap() {
        ServerMessage::RoomState { snapshot } => {
            let p = snapshot.players.iter().find(|p| p.id == guest.id).unwrap();
            assert!(p.is_ready);
        }
        other => panic!("Expected RoomState, got {:?}", other),
    }
}

/// Host leaving the lobby tears the room down and notifies members
#[tokio::test]
async fn test_host_leave_closes_room() {
    let state = fast_state();
    let mut host_session = Session::new();
    let mut guest_session = Session::new();

    let room_code = create_room(&state, &mut host_session, "Doomed Room", 4).await;
    handle_message(
        ClientMessage::JoinRoom {
            room_code: room_code.clone(),
            username: "Guest1".to_string(),
        },
        &mut guest_session,
        &state,
    )
    .await;

    let handle = state.get_room(&room_code).await.unwrap();
    let mut rx = handle.subscribe();

    let left = handle_message(ClientMessage::LeaveRoom, &mut host_session, &state).await;
    assert!(matches!(left, Some(ServerMessage::LeftRoom)));
    assert!(host_session.room_code.is_none());

    // The room is gone from the registry and the listing
    assert!(state.get_room(&room_code).await.is_none());
    let listing = handle_message(ClientMessage::ListRooms, &mut guest_session, &state).await;
    match listing {
        Some(ServerMessage::RoomList { rooms }) => assert!(rooms.is_empty()),
        other => panic!("Expected RoomList, got {:?}", other),
    }

    // Members got the teardown broadcast
    loop {
        match rx.recv().await.unwrap() {
            ServerMessage::RoomClosed { room_code: code, .. } => {
                assert_eq!(code, room_code);
                break;
            }
            ServerMessage::RoomState { .. } => continue,
            other => panic!("Expected RoomClosed, got {:?}", other),
        }
    }
}

/// Joining a full room fails visibly and joining a started room conflicts
#[tokio::test]
async fn test_join_rejections() {
    let state = fast_state();
    let mut host_session = Session::new();

    let room_code = create_room(&state, &mut host_session, "Tiny Room", 2).await;

    let mut s1 = Session::new();
    handle_message(
        ClientMessage::JoinRoom {
            room_code: room_code.clone(),
            username: "Guest1".to_string(),
        },
        &mut s1,
        &state,
    )
    .await;

    // Third player bounces off capacity
    let mut s2 = Session::new();
    let full = handle_message(
        ClientMessage::JoinRoom {
            room_code: room_code.clone(),
            username: "Guest2".to_string(),
        },
        &mut s2,
        &state,
    )
    .await;
    match full {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "ROOM_FULL"),
        other => panic!("Expected Error, got {:?}", other),
    }
    assert!(s2.room_code.is_none());

    // Once started, joining conflicts
    handle_message(ClientMessage::StartGame, &mut host_session, &state).await;
    let started = handle_message(
        ClientMessage::JoinRoom {
            room_code: room_code.clone(),
            username: "Guest3".to_string(),
        },
        &mut s2,
        &state,
    )
    .await;
    match started {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "CONFLICT"),
        other => panic!("Expected Error, got {:?}", other),
    }
}

/// Intents that require membership are rejected before touching any room
#[tokio::test]
async fn test_intents_without_membership() {
    let state = fast_state();
    let mut session = Session::new();

    for msg in [
        ClientMessage::StartGame,
        ClientMessage::SetReady { is_ready: true },
        ClientMessage::SubmitAnswer {
            question_id: "sci-001".to_string(),
            option_index: 0,
        },
    ] {
        let result = handle_message(msg, &mut session, &state).await;
        match result {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NOT_IN_ROOM"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    // Leaving without a room is a harmless no-op
    let left = handle_message(ClientMessage::LeaveRoom, &mut session, &state).await;
    assert!(matches!(left, Some(ServerMessage::LeftRoom)));
}
