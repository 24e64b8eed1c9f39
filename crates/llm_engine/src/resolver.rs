//! The move resolution pipeline: ask the model, extract, validate, and fall
//! back to a random legal move when anything goes wrong.

use game_core::{AiMeta, FallbackReason};
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

use crate::client::{ApiError, ChatClient, ChatMessage};
use crate::extract::extract_move_token;
use crate::prompt;

const MOVE_MAX_TOKENS: u32 = 500;
const MOVE_TEMPERATURE: f32 = 0.7;

/// A resolved move for Black, ready to be applied by the game.
#[derive(Debug, Clone)]
pub struct MoveResolution {
    /// Bare SAN, guaranteed to be a member of the legal list it was
    /// resolved against.
    pub san: String,
    /// FEN of the position the resolution targets. The caller must discard
    /// the resolution if the live position no longer matches (e.g. the game
    /// was reset while the request was in flight).
    pub target_fen: String,
    /// Diagnostics to attach to the move record.
    pub meta: AiMeta,
}

/// Pick the move the reply proposes: the first move-shaped token of the
/// first line, accepted only if it is an exact member of `legal_sans`.
pub fn select_reply_move(reply: &str, legal_sans: &[String]) -> Result<String, FallbackReason> {
    let token = extract_move_token(reply).ok_or(FallbackReason::NoMoveFound)?;
    if legal_sans.iter().any(|s| *s == token) {
        Ok(token)
    } else {
        Err(FallbackReason::NotLegalMove)
    }
}

/// Turn an API outcome into a resolution. Never fails while `legal_sans` is
/// non-empty: on any parse, validation or API failure a uniformly random
/// legal move is chosen and tagged as a fallback.
///
/// Returns `None` only when there is no legal move at all, which a caller
/// checking for terminal states should never hit.
pub fn resolve_outcome<R: Rng + ?Sized>(
    outcome: Result<String, ApiError>,
    legal_sans: &[String],
    target_fen: String,
    request: Option<String>,
    rng: &mut R,
) -> Option<MoveResolution> {
    let random = |rng: &mut R| legal_sans.choose(rng).cloned();

    match outcome {
        Ok(reply) => match select_reply_move(&reply, legal_sans) {
            Ok(san) => Some(MoveResolution {
                san,
                target_fen,
                meta: AiMeta {
                    raw_reply: Some(reply),
                    fallback: false,
                    fallback_reason: None,
                    request,
                },
            }),
            Err(reason) => {
                log::warn!("unusable model reply ({reason}), picking a random move: {reply:?}");
                Some(MoveResolution {
                    san: random(rng)?,
                    target_fen,
                    meta: AiMeta {
                        raw_reply: Some(reply),
                        fallback: true,
                        fallback_reason: Some(reason),
                        request,
                    },
                })
            }
        },
        Err(err) => {
            log::warn!("chat API call failed, picking a random move: {err}");
            Some(MoveResolution {
                san: random(rng)?,
                target_fen,
                meta: AiMeta {
                    raw_reply: None,
                    fallback: true,
                    fallback_reason: None,
                    request,
                },
            })
        }
    }
}

/// Ask the model for Black's move. The legal list and target FEN must be
/// snapshots of the position the caller wants a move for; they are not
/// re-derived after the call returns.
pub async fn request_move(
    client: &ChatClient,
    history_sans: &[String],
    legal_sans: &[String],
    target_fen: String,
) -> Option<MoveResolution> {
    if legal_sans.is_empty() {
        return None;
    }

    let messages = vec![
        ChatMessage::system(prompt::move_system_prompt()),
        ChatMessage::user(prompt::move_user_prompt(history_sans)),
    ];
    let request = client.chat_request(messages, MOVE_MAX_TOKENS, MOVE_TEMPERATURE);
    let echo = serde_json::to_string_pretty(&request).ok();

    let outcome = client.send(&request).await;
    resolve_outcome(outcome, legal_sans, target_fen, echo, &mut thread_rng())
}
