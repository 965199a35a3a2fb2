//! Pure state transition function
//!
//! Rule order for one inbound text:
//! 1. `/start` greets and changes nothing
//! 2. an unverified user is verified under the text
//! 3. the post command restarts the posting flow
//! 4. menu selections and the body are consumed by their states
//! 5. the reply command opens a reply slot (checked before 6)
//! 6. a pending reply is filled
//! 7. anything left re-prompts inside a menu and is ignored when idle

use super::{ConvContext, ConvState, Effect, Event};
use crate::filter::{self, Verdict};
use crate::router::MessageId;
use crate::vocab::{self, numbered_menu, Audience, Category, REPLY_COMMAND};

pub const WELCOME: &str = "Welcome to FlexTea 🍵\nPlease reply with your Office/Store/Team name.";
pub const ASK_BODY: &str = "Type your message now:";
pub const REPHRASE: &str = "⚠️ Please rephrase respectfully.";
pub const POSTED: &str = "✅ Your message was posted anonymously.";
pub const ASK_REPLY: &str = "✏️ Type your anonymous reply now:";
pub const REPLY_SENT: &str = "✅ Your reply was sent anonymously.";
pub const INVALID_REPLY: &str = "❌ Invalid format. Use /reply MSG1";
pub const PICK_FROM_LIST: &str = "Please pick a number from the list.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the event produced nothing at all
    pub fn is_ignored(&self, previous: &ConvState) -> bool {
        self.effects.is_empty() && &self.new_state == previous
    }
}

pub fn verified_reply(group: &str) -> String {
    format!("✅ You’re verified under: {group}")
}

pub fn category_menu() -> String {
    format!("What would you like to post?\n{}", numbered_menu(&Category::ALL))
}

pub fn audience_menu() -> String {
    format!("Who should see this message?\n{}", numbered_menu(&Audience::ALL))
}

/// Pure transition function: same inputs, same outputs, no I/O
pub fn transition(state: &ConvState, context: &ConvContext<'_>, event: Event) -> TransitionResult {
    let text = match event {
        Event::Start => {
            return TransitionResult::new(state.clone()).with_effect(Effect::reply(WELCOME));
        }
        Event::Text { text } => text,
    };

    match state {
        ConvState::Unverified => {
            return TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::Verify { group: text.clone() })
                .with_effect(Effect::reply(verified_reply(&text)));
        }

        _ if vocab::is_post_command(&text) => {
            return TransitionResult::new(ConvState::AwaitingCategory)
                .with_effect(Effect::reply(category_menu()));
        }

        ConvState::AwaitingCategory => {
            if let Some(category) = Category::from_selection(&text) {
                return TransitionResult::new(ConvState::AwaitingAudience { category })
                    .with_effect(Effect::reply(audience_menu()));
            }
        }

        ConvState::AwaitingAudience { category } => {
            if let Some(audience) = Audience::from_selection(&text) {
                return TransitionResult::new(ConvState::AwaitingBody {
                    category: *category,
                    audience,
                })
                .with_effect(Effect::reply(ASK_BODY));
            }
        }

        ConvState::AwaitingBody { category, audience } => {
            return match filter::check(&text) {
                Verdict::Accepted => TransitionResult::new(ConvState::Idle)
                    .with_effect(Effect::PublishPost {
                        category: *category,
                        audience: *audience,
                        body: text,
                    })
                    .with_effect(Effect::reply(POSTED)),
                verdict => {
                    tracing::debug!(user = %context.user, ?verdict, "Post body rejected");
                    TransitionResult::new(state.clone()).with_effect(Effect::reply(REPHRASE))
                }
            };
        }

        ConvState::Idle => {}
    }

    fall_through(state, context, text)
}

/// Reply handling shared by every verified state that did not consume
/// the text
fn fall_through(state: &ConvState, context: &ConvContext<'_>, text: String) -> TransitionResult {
    let unchanged = TransitionResult::new(state.clone());

    if vocab::is_reply_command(&text) {
        return match reply_target(&text).filter(|id| context.message_exists(*id)) {
            Some(message_id) => unchanged
                .with_effect(Effect::OpenReplySlot { message_id })
                .with_effect(Effect::reply(ASK_REPLY)),
            None => unchanged.with_effect(Effect::reply(INVALID_REPLY)),
        };
    }

    if let Some(message_id) = context.pending_reply() {
        return unchanged
            .with_effect(Effect::DeliverReply {
                message_id,
                body: text,
            })
            .with_effect(Effect::reply(REPLY_SENT));
    }

    match state {
        ConvState::AwaitingCategory => {
            unchanged.with_effect(Effect::reply(format!("{PICK_FROM_LIST}\n{}", category_menu())))
        }
        ConvState::AwaitingAudience { .. } => {
            unchanged.with_effect(Effect::reply(format!("{PICK_FROM_LIST}\n{}", audience_menu())))
        }
        _ => unchanged,
    }
}

/// `/reply MSG<n>` with exactly one argument
fn reply_target(text: &str) -> Option<MessageId> {
    let mut parts = text.split_whitespace();
    if parts.next()? != REPLY_COMMAND {
        return None;
    }
    let id = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some(id)
}
