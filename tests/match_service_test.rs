//! Tests for the rules engine and the match ledger it drives.

use std::sync::{Arc, Mutex};

use game_of_three::{
    Action, Match, MatchError, MatchId, MatchOptions, MatchService, MatchState, MatchStateRecord,
    MatchStatus, Observer, Outcome, Player, PlayerId, Seat, evaluate,
};

/// Collects every state it is notified of.
#[derive(Default)]
struct Recorder {
    states: Mutex<Vec<MatchStateRecord>>,
}

impl Recorder {
    fn states(&self) -> Vec<MatchStateRecord> {
        self.states.lock().expect("recorder poisoned").clone()
    }
}

impl Observer<MatchStateRecord> for Recorder {
    fn update(&self, state: &MatchStateRecord) {
        self.states.lock().expect("recorder poisoned").push(state.clone());
    }
}

fn humans() -> (Arc<Player>, Arc<Player>) {
    (
        Arc::new(Player::human("a", "Alice")),
        Arc::new(Player::human("b", "Bob")),
    )
}

fn service_with_seed(seed: i64) -> (Arc<MatchService>, Arc<Player>, Arc<Player>, Arc<Recorder>) {
    let (a, b) = humans();
    let recorder = Arc::new(Recorder::default());
    let options = MatchOptions::new()
        .with_seed(seed)
        .with_id_generator(|| "match-1".to_string())
        .with_observer(recorder.clone());
    let service = MatchService::new([a.clone(), b.clone()], options).expect("Failed to create service");
    (service, a, b, recorder)
}

#[test]
fn test_start_state() {
    let (service, a, _b, recorder) = service_with_seed(100);

    assert_eq!(service.id(), "match-1");
    let states = recorder.states();
    assert_eq!(states.len(), 1);
    assert_eq!(
        states[0],
        MatchStateRecord::Start {
            output_number: 100,
            next_turn: a.id().clone(),
            turn_number: 0,
        }
    );
    assert_eq!(service.current_player().expect("initialized").id(), a.id());
    assert!(!service.is_over());
    assert!(service.winner().is_none());
}

#[test]
fn test_winning_game() {
    let (service, a, b, recorder) = service_with_seed(100);

    let state = service.make_move(&a, Action::Decrement).expect("A moves");
    assert_eq!(state.status(), MatchStatus::Playing);
    assert_eq!(state.output_number(), 33);
    assert_eq!(state.next_turn(), Some(b.id()));

    let state = service.make_move(&b, Action::Keep).expect("B moves");
    assert_eq!(state.output_number(), 11);
    assert_eq!(state.next_turn(), Some(a.id()));

    let state = service.make_move(&a, Action::Increment).expect("A moves");
    assert_eq!(state.output_number(), 4);

    let state = service.make_move(&b, Action::Decrement).expect("B moves");
    assert_eq!(
        state,
        MatchStateRecord::Stop {
            action: Action::Decrement,
            current_turn: b.id().clone(),
            input_number: 4,
            output_number: 1,
            turn_number: 4,
            winning_player: b.id().clone(),
        }
    );

    assert_eq!(recorder.states().len(), 5);
    assert!(service.is_over());
    assert_eq!(service.winner().expect("match over").id(), b.id());
}

#[test]
fn test_losing_move_ends_match() {
    let (service, a, b, recorder) = service_with_seed(100);

    service.make_move(&a, Action::Decrement).expect("A moves");
    let state = service.make_move(&b, Action::Increment).expect("B moves");

    assert!(state.is_stopped());
    assert_eq!(state.winning_player(), Some(a.id()));
    assert_eq!(state.output_number(), 34);
    assert_eq!(recorder.states().len(), 3);
}

#[test]
fn test_move_out_of_turn_rejected() {
    let (service, _a, b, recorder) = service_with_seed(100);

    let err = service.make_move(&b, Action::Keep).expect_err("B is not due");
    assert_eq!(
        err,
        MatchError::NotPlayerTurn {
            player: b.id().clone()
        }
    );
    assert_eq!(service.history().expect("initialized").len(), 1);
    assert_eq!(recorder.states().len(), 1);
}

#[test]
fn test_move_after_stop_rejected() {
    let (service, a, b, recorder) = service_with_seed(100);
    service.make_move(&a, Action::Decrement).expect("A moves");
    service.make_move(&b, Action::Increment).expect("B loses");

    for player in [&a, &b] {
        let err = service.make_move(player, Action::Keep).expect_err("match is over");
        assert!(matches!(err, MatchError::MatchEnded { .. }));
    }
    assert_eq!(service.history().expect("initialized").len(), 3);
    assert_eq!(recorder.states().len(), 3);
}

#[test]
fn test_make_move_by_id() {
    let (service, a, _b, _recorder) = service_with_seed(9);

    let state = service
        .make_move_by_id(a.id(), Action::Keep)
        .expect("A moves");
    assert_eq!(state.output_number(), 3);

    let stranger = PlayerId::new("stranger");
    let err = service
        .make_move_by_id(&stranger, Action::Keep)
        .expect_err("unknown player");
    assert_eq!(err, MatchError::NotPlayerTurn { player: stranger });
}

#[test]
fn test_evaluate_outcomes() {
    for input in 2..=300_i64 {
        for action in Action::ALL {
            let sum = input + action.value();
            let expected = if sum % 3 != 0 {
                Outcome::Invalid(Some(sum))
            } else if sum / 3 == 1 {
                Outcome::Reached
            } else {
                Outcome::Continue(sum / 3)
            };
            assert_eq!(evaluate(input, action), expected, "input {input}, action {action}");
        }
    }
}

#[test]
fn test_evaluate_rejects_non_positive_quotients() {
    assert_eq!(evaluate(1, Action::Decrement), Outcome::Invalid(Some(0)));
    assert_eq!(evaluate(-2, Action::Decrement), Outcome::Invalid(Some(-3)));
    assert_eq!(evaluate(i64::MAX, Action::Increment), Outcome::Invalid(None));
}

#[test]
fn test_every_single_move_follows_the_rules() {
    for seed in 2..=120_i64 {
        for action in Action::ALL {
            let (service, a, b, _recorder) = service_with_seed(seed);
            let state = service.make_move(&a, action).expect("A moves");
            let sum = seed + action.value();

            if sum % 3 == 0 && sum / 3 > 1 {
                assert!(state.is_playing(), "seed {seed}, action {action}");
                assert_eq!(state.output_number(), sum / 3);
                assert_eq!(service.current_player().expect("initialized").id(), b.id());
            } else if sum % 3 == 0 && sum / 3 == 1 {
                assert!(state.is_stopped());
                assert_eq!(state.winning_player(), Some(a.id()));
            } else {
                assert!(state.is_stopped());
                assert_eq!(state.winning_player(), Some(b.id()));
            }
        }
    }
}

#[test]
fn test_turns_alternate_and_history_grows() {
    let (service, a, b, _recorder) = service_with_seed(3_i64.pow(12));
    let mut mover = a.clone();
    let mut waiting = b.clone();

    for n in 1..=10_u32 {
        let before = service.history().expect("initialized").len();
        let state = service.make_move(&mover, Action::Keep).expect("move accepted");
        assert!(state.is_playing());
        assert_eq!(state.turn_number(), n);

        let history = service.history().expect("initialized");
        assert_eq!(history.len(), before + 1);
        assert_eq!(history[0].status(), MatchStatus::Start);
        assert_eq!(history.last(), Some(&state));

        std::mem::swap(&mut mover, &mut waiting);
        assert_eq!(service.current_player().expect("initialized").id(), mover.id());
    }
}

#[test]
fn test_match_fan_out_to_every_observer() {
    let (a, b) = humans();
    let mut game = Match::new("m".to_string(), [a.clone(), b.clone()], Arc::new(|| 27_i64));
    let recorders: Vec<Arc<Recorder>> = (0..4).map(|_| Arc::new(Recorder::default())).collect();
    for recorder in &recorders {
        game.register_observer(recorder.clone());
    }

    game.init().expect("init");
    game.commit(MatchState::Playing {
        action: Action::Keep,
        current_turn: a.clone(),
        input_number: 27,
        output_number: 9,
        next_turn: b.clone(),
        turn_number: 1,
    })
    .expect("commit");

    let expected = game
        .state_history()
        .expect("initialized")
        .iter()
        .map(MatchState::serialize)
        .collect::<Vec<_>>();
    for recorder in &recorders {
        assert_eq!(recorder.states(), expected);
    }
    assert_eq!(game.turn().expect("initialized").id(), b.id());
    assert_eq!(game.turn_number().expect("initialized"), 2);
}

#[test]
fn test_match_lifecycle_errors() {
    let (a, b) = humans();
    let mut game = Match::new("m".to_string(), [a.clone(), b.clone()], Arc::new(|| 10_i64));

    assert_eq!(game.state().expect_err("not started"), MatchError::NotInitialized("Match"));
    assert!(game.turn().is_err());
    assert!(game.state_history().is_err());

    game.init().expect("init");
    assert_eq!(game.init().expect_err("twice"), MatchError::AlreadyInitialized("Match"));
    assert_eq!(game.player(Seat::Second).id(), b.id());

    let skipped = MatchState::Playing {
        action: Action::Decrement,
        current_turn: a.clone(),
        input_number: 10,
        output_number: 3,
        next_turn: b.clone(),
        turn_number: 2,
    };
    assert_eq!(
        game.commit(skipped).expect_err("turn 2 before turn 1"),
        MatchError::OutOfSequence { expected: 1, found: 2 }
    );

    game.commit(MatchState::Stop {
        action: Action::Keep,
        current_turn: a.clone(),
        input_number: 10,
        output_number: 10,
        turn_number: 1,
        winning_player: b.clone(),
    })
    .expect("commit stop");
    assert!(game.is_over());

    let late = MatchState::Playing {
        action: Action::Decrement,
        current_turn: b.clone(),
        input_number: 10,
        output_number: 3,
        next_turn: a.clone(),
        turn_number: 2,
    };
    assert!(matches!(game.commit(late), Err(MatchError::MatchEnded { .. })));
    assert_eq!(game.state_history().expect("initialized").len(), 2);
}

#[test]
fn test_removed_observer_is_not_notified() {
    let (service, a, _b, first) = service_with_seed(100);
    let second = Arc::new(Recorder::default());
    let id = service.register_observer(second.clone());

    service.make_move(&a, Action::Decrement).expect("A moves");
    assert!(service.remove_observer(id));
    assert!(!service.remove_observer(id));

    service.make_move(&a, Action::Keep).expect_err("not A's turn");
    let b = service.players()[1].clone();
    service.make_move(&b, Action::Keep).expect("B moves");

    assert_eq!(first.states().len(), 3);
    assert_eq!(second.states().len(), 1);
}

#[test]
fn test_match_removes_observer_by_instance() {
    let (a, b) = humans();
    let mut game = Match::new("m".to_string(), [a, b], Arc::new(|| 12_i64));
    let recorder = Arc::new(Recorder::default());
    let observer: Arc<dyn Observer<MatchStateRecord>> = recorder.clone();
    let bystander = Arc::new(Recorder::default());

    game.register_observer(observer.clone());
    game.register_observer(observer.clone());
    game.register_observer(bystander.clone());
    assert_eq!(game.observer_count(), 3);

    assert!(game.remove_observer_instance(&observer));
    assert_eq!(game.observer_count(), 2);

    game.init().expect("init");
    assert_eq!(recorder.states().len(), 1);
    assert_eq!(bystander.states().len(), 1);

    assert!(game.remove_observer_instance(&observer));
    let stranger: Arc<dyn Observer<MatchStateRecord>> = Arc::new(Recorder::default());
    assert!(!game.remove_observer_instance(&stranger));
    assert!(!game.remove_observer_instance(&observer));
    assert_eq!(game.observer_count(), 1);
}

#[test]
fn test_match_ended_error_names_the_match() {
    let (service, a, b, _recorder) = service_with_seed(100);
    service.make_move(&a, Action::Decrement).expect("A moves");
    service.make_move(&b, Action::Increment).expect("B loses");

    let match_id: MatchId = service.id().clone();
    let err = service.make_move(&a, Action::Keep).expect_err("match is over");
    assert_eq!(err, MatchError::MatchEnded { match_id });
    assert_eq!(err.to_string(), "Match match-1 has already ended");
}
