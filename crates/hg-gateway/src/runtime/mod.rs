//! The gateway's runtime: the FC orchestrator state machine, the Turn
//! Controller that composes it with sessions/rate-limiting/TTS, one-shot
//! language detection, and per-turn cancellation.

pub mod cancel;
pub mod language;
pub mod orchestrator;
pub mod turn;

pub use turn::TurnController;

use hg_domain::session::{HistoryRole, Session};
use hg_domain::tool::Message;

const SYSTEM_PROMPT_TEMPLATE: &str = "You are the concierge assistant for a hotel. \
You help guests with rooms, reservations, the restaurant menu, and table bookings using the \
tools available to you. Always reply to the guest in {language}. Be concise and concrete; when \
you are unsure of a date or a count, ask the guest rather than guessing.";

pub(crate) fn build_system_instruction(language: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE.replace("{language}", language)
}

/// Map persisted history onto the model's role vocabulary. Tool-call and
/// tool-response records never appear here — they live only inside one
/// turn's orchestration.
pub(crate) fn history_to_messages(session: &Session) -> Vec<Message> {
    session
        .messages
        .iter()
        .map(|m| match m.role {
            HistoryRole::User => Message::user(m.content.clone()),
            HistoryRole::Assistant => Message::assistant(m.content.clone()),
        })
        .collect()
}

/// A constant, locale-appropriate apology used only on `ABORT` (exceeding
/// `MAX_FC_ROUNDS`). Covers the languages the reference deployment serves;
/// anything else falls back to English rather than failing the turn.
pub(crate) fn apology_for(language: &str) -> &'static str {
    let base = language.split('-').next().unwrap_or(language);
    match base {
        "pl" => "Przepraszam, nie udało mi się tego załatwić. Spróbuj, proszę, sformułować to inaczej.",
        "es" => "Lo siento, no he podido completar esta solicitud. ¿Podrías intentarlo de otra manera?",
        "de" => "Entschuldigung, das konnte ich leider nicht erledigen. Könnten Sie es anders formulieren?",
        "fr" => "Désolé, je n'ai pas pu traiter cette demande. Pourriez-vous la reformuler ?",
        _ => "Sorry, I wasn't able to complete that request. Could you try rephrasing it?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_embeds_language() {
        let instr = build_system_instruction("pl-PL");
        assert!(instr.contains("pl-PL"));
    }

    #[test]
    fn apology_falls_back_to_english_for_unknown_language() {
        assert!(apology_for("ja-JP").starts_with("Sorry"));
    }

    #[test]
    fn apology_matches_base_language_ignoring_region() {
        assert!(apology_for("pl-PL").starts_with("Przepraszam"));
        assert!(apology_for("pl").starts_with("Przepraszam"));
    }

    #[test]
    fn history_to_messages_preserves_order_and_roles() {
        let mut session = Session::new(chrono::Utc::now());
        session.append_turn("hi", "hello", chrono::Utc::now(), 20);
        let messages = history_to_messages(&session);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content.text(), Some("hi"));
        assert_eq!(messages[1].content.text(), Some("hello"));
    }
}
