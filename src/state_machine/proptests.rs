//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::directory::UserId;
use crate::runtime::testing::StaticLookup;
use crate::vocab::{Audience, Category};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn arb_audience() -> impl Strategy<Value = Audience> {
    prop::sample::select(Audience::ALL.to_vec())
}

fn arb_verified_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Idle),
        Just(ConvState::AwaitingCategory),
        arb_category().prop_map(|category| ConvState::AwaitingAudience { category }),
        (arb_category(), arb_audience())
            .prop_map(|(category, audience)| ConvState::AwaitingBody { category, audience }),
    ]
}

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![Just(ConvState::Unverified), arb_verified_state()]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,40}",
        "[0-9]{1,3}",
        Just("/spill".to_string()),
        Just("/start".to_string()),
        "/reply MSG[0-9]{1,2}",
        "/reply[ a-zA-Z0-9]{0,10}",
    ]
}

/// Anything that is not a plain digit string in 1..=4
fn arb_bad_selection() -> impl Strategy<Value = String> {
    prop_oneof![
        "[5-9]",
        "[1-9][0-9]{1,4}",
        Just("0".to_string()),
        "[a-z]{1,8}",
        "-[1-4]",
    ]
}

fn lookup() -> StaticLookup {
    StaticLookup::with_messages(&["MSG1", "MSG2"])
}

const USER: UserId = UserId(7);

fn run(state: &ConvState, lookup: &StaticLookup, text: String) -> TransitionResult {
    transition(state, &ConvContext::new(USER, lookup), Event::from_text(text))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Verified users never fall back to Unverified
    #[test]
    fn prop_verified_stays_verified(state in arb_verified_state(), text in arb_text()) {
        let result = run(&state, &lookup(), text);
        prop_assert!(result.new_state.is_verified(), "Got {:?}", result.new_state);
        prop_assert!(
            !result.effects.iter().any(|e| matches!(e, Effect::Verify { .. })),
            "Verified user re-verified"
        );
    }

    // Invariant 2: Any non-start text verifies an unverified user
    #[test]
    fn prop_unverified_verifies_on_first_text(text in "[a-zA-Z0-9 ]{1,30}") {
        let result = run(&ConvState::Unverified, &lookup(), text.clone());
        prop_assert_eq!(result.new_state, ConvState::Idle);
        prop_assert_eq!(&result.effects[0], &Effect::Verify { group: text.clone() });
        prop_assert_eq!(&result.effects[1], &Effect::reply(verified_reply(&text)));
    }

    // Invariant 3: Bad selections never advance a menu state
    #[test]
    fn prop_bad_selection_keeps_menu_state(
        category in arb_category(),
        text in arb_bad_selection()
    ) {
        for state in [ConvState::AwaitingCategory, ConvState::AwaitingAudience { category }] {
            let result = run(&state, &StaticLookup::default(), text.clone());
            prop_assert_eq!(&result.new_state, &state);
            prop_assert_eq!(result.effects.len(), 1);
            let reprompted = matches!(
                &result.effects[0],
                Effect::Reply { text } if text.starts_with(PICK_FROM_LIST)
            );
            prop_assert!(reprompted, "expected a re-prompt, got {:?}", result.effects);
        }
    }

    // Invariant 4: Valid selections always advance
    #[test]
    fn prop_valid_selection_advances(n in 1usize..=4, category in arb_category()) {
        let text = n.to_string();
        let result = run(&ConvState::AwaitingCategory, &lookup(), text.clone());
        prop_assert_eq!(
            result.new_state,
            ConvState::AwaitingAudience { category: Category::ALL[n - 1] }
        );

        let result = run(&ConvState::AwaitingAudience { category }, &lookup(), text);
        prop_assert_eq!(
            result.new_state,
            ConvState::AwaitingBody { category, audience: Audience::ALL[n - 1] }
        );
    }

    // Invariant 5: A post is only ever published with an accepted body
    #[test]
    fn prop_published_bodies_pass_filter(state in arb_state(), text in arb_text()) {
        let result = run(&state, &lookup(), text);
        for effect in &result.effects {
            if let Effect::PublishPost { body, .. } = effect {
                prop_assert!(crate::filter::is_acceptable(body));
                prop_assert_eq!(&result.new_state, &ConvState::Idle);
            }
        }
    }

    // Invariant 6: Reply slots only open on messages that exist
    #[test]
    fn prop_reply_slot_requires_known_message(state in arb_verified_state(), n in 1u32..100) {
        let result = run(&state, &lookup(), format!("/reply MSG{n}"));
        for effect in &result.effects {
            if let Effect::OpenReplySlot { message_id } = effect {
                prop_assert!(n <= 2, "Opened slot on unknown {message_id}");
            }
        }
    }

    // Invariant 7: Every event yields at most one reply to the sender
    #[test]
    fn prop_at_most_one_reply(state in arb_state(), text in arb_text()) {
        let result = run(&state, &lookup().pending(USER, "MSG1"), text);
        let replies = result.effects.iter().filter(|e| matches!(e, Effect::Reply { .. })).count();
        prop_assert!(replies <= 1, "{replies} replies");
    }

    // Invariant 8: Start never changes state
    #[test]
    fn prop_start_is_inert(state in arb_state()) {
        let result = transition(&state, &ConvContext::new(USER, &lookup()), Event::Start);
        prop_assert_eq!(result.new_state, state);
        prop_assert_eq!(result.effects, vec![Effect::reply(WELCOME)]);
    }
}
