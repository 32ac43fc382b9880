//! Builds the text sent to the LLM from a persona, the seat's [`View`], and
//! the math sub-contracts (equity, pot odds, EV, SPR, board texture).

use crate::math::{self, BoardTexture, Texture};
use crate::persona::{Persona, Style};
use rand::Rng;
use rbp_core::{Chips, Probability};
use rbp_gameplay::View;

/// Everything computed for one prompt, kept around so the debug tap can log
/// it alongside the rendered text.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub equity: Probability,
    pub pot_odds: Probability,
    pub ev_call: Probability,
    pub spr: Option<Probability>,
    pub effective_stack_bb: Probability,
    pub texture: Option<BoardTexture>,
    pub made_hand: Option<(rbp_cards::Ranking, String)>,
    pub rng_value: u8,
}

impl Analysis {
    pub fn compute(view: &View, big_blind: Chips, iterations: usize, rng: &mut impl Rng) -> Self {
        let active_opponents = view.opponents.iter().filter(|o| o.state.is_active()).count();
        let equity = math::equity(view.hole, view.board, active_opponents, iterations, rng);
        let pot_odds = math::pot_odds(view.pot, view.to_call);
        let ev_call = math::ev_call(equity, view.pot, view.to_call);

        let effective_stack = view
            .opponents
            .iter()
            .filter(|o| o.state.is_active())
            .map(|o| o.stack)
            .chain(std::iter::once(view.stack))
            .min()
            .unwrap_or(view.stack);

        let spr = math::spr(effective_stack, view.pot);
        let effective_stack_bb = math::effective_stack_bb(effective_stack, big_blind);

        let (texture, made_hand) = if view.board.is_empty() {
            (None, None)
        } else {
            (Some(math::board_texture(&view.board)), Some(math::made_hand_description(view.hole, &view.board)))
        };

        let rng_value = rng.random_range(0..=100u8);

        Self { equity, pot_odds, ev_call, spr, effective_stack_bb, texture, made_hand, rng_value }
    }
}

/// Which prompt shape to render, selected by persona in [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Standard,
    Harrington,
}

/// Renders the full prompt text sent to the LLM as the user message.
///
/// TAG/LAG personas get the richer Harrington shape (stack depth, SPR, board
/// texture, a sampled `rng_value` for mixed strategies); any other persona
/// falls back to the plain equity/pot-odds/EV shape.
pub fn render(persona: &Persona, view: &View, analysis: &Analysis) -> (Shape, String) {
    let shape = match persona.style {
        Style::Tag | Style::Lag => Shape::Harrington,
    };

    let legal = describe_legal(view);
    let mut out = format!(
        "You are {}, a poker bot. {}\n\n\
         Street: {}\n\
         Board: {}\n\
         Your hole cards: {}\n\
         Pot: {}\n\
         Amount to call: {}\n\
         Legal actions: {}\n\n\
         Equity: {:.1}%\n\
         Pot odds: {:.1}%\n\
         EV(call): {:.1}\n",
        persona.name,
        persona.description,
        view.street,
        view.board,
        view.hole,
        view.pot,
        view.to_call,
        legal,
        analysis.equity * 100.0,
        analysis.pot_odds * 100.0,
        analysis.ev_call,
    );

    if shape == Shape::Harrington {
        let spr_text = analysis.spr.map(|v| format!("{v:.2}")).unwrap_or_else(|| "N/A".to_string());
        out.push_str(&format!(
            "Effective stack: {:.1} BB\nSPR: {}\n",
            analysis.effective_stack_bb, spr_text,
        ));
        if let Some(texture) = analysis.texture {
            out.push_str(&format!("Board texture: {}{}\n", texture.texture, texture_flags(&texture)));
        }
        if let Some((_, description)) = &analysis.made_hand {
            out.push_str(&format!("Your made hand: {description}\n"));
        }
        out.push_str(&format!(
            "rng_value: {} (use this to execute mixed strategies consistently)\n",
            analysis.rng_value,
        ));
    }

    out.push_str(
        "\nRespond with a single JSON object: {\"action\": \"fold\"|\"check\"|\"call\"|\"raise\"|\"all_in\", \
         \"amount\": <integer, only for raise>}.",
    );

    (shape, out)
}

fn texture_flags(t: &BoardTexture) -> String {
    let mut flags = Vec::new();
    if t.paired {
        flags.push("paired");
    }
    if t.flush_possible {
        flags.push("flush possible");
    } else if t.flush_draw {
        flags.push("flush draw");
    }
    if t.straight_possible {
        flags.push("straight possible");
    } else if t.straight_draw {
        flags.push("straight draw");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    }
}

fn describe_legal(view: &View) -> String {
    let mut parts = Vec::new();
    if view.legal.may_fold {
        parts.push("fold".to_string());
    }
    if view.legal.may_check {
        parts.push("check".to_string());
    }
    if view.legal.may_call {
        parts.push(format!("call {}", view.legal.to_call));
    }
    if view.legal.may_raise {
        parts.push(format!("raise [{}, {}]", view.legal.min_raise, view.legal.max_raise));
    }
    parts.join(", ")
}
