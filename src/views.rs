//! Presentation-only projections derived from canonical match state.
//!
//! Everything here is a pure function recomputed on demand — nothing is
//! cached and invalidated, so a projection can never disagree with the state
//! it was derived from.

use crate::protocol::PlayerInfo;

/// Players sorted by score descending, stable under ties: players with equal
/// scores keep their relative order from the authoritative player list.
pub fn leaderboard(players: &[PlayerInfo]) -> Vec<PlayerInfo> {
    let mut rows = players.to_vec();
    // `sort_by` is a stable sort, which is exactly the tie rule we need.
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows
}

/// Overlay the locally typed guess onto the masked display pattern.
///
/// The pattern is whitespace-separated tokens; the first and last tokens
/// delimit it and are never overwritten. The typed guess maps positionally
/// onto the interior tokens: an alphabetic character replaces the token at
/// its position (upper-cased), a non-alphabetic character is ignored and the
/// underlying mask token stays untouched. Purely cosmetic — the preview is
/// never transmitted and never affects scoring.
pub fn guess_preview(display: &str, typed: &str) -> String {
    let mut tokens: Vec<String> = display.split_whitespace().map(str::to_string).collect();
    if tokens.len() < 3 {
        // No interior slots to overlay.
        return tokens.join(" ");
    }
    let interior = tokens.len() - 2;
    for (i, ch) in typed.chars().take(interior).enumerate() {
        if !ch.is_alphabetic() {
            continue;
        }
        if let Some(slot) = tokens.get_mut(i + 1) {
            *slot = ch.to_uppercase().to_string();
        }
    }
    tokens.join(" ")
}

/// Shareable invite reference: the access origin plus the room code.
/// Empty until a room code is known.
pub fn invite_link(origin: &str, room_code: Option<&str>) -> String {
    match room_code {
        Some(code) if !code.is_empty() => {
            format!("{}/?room={}", origin.trim_end_matches('/'), code)
        }
        _ => String::new(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(n: u128, nickname: &str, score: u32) -> PlayerInfo {
        PlayerInfo {
            id: Uuid::from_u128(n),
            nickname: nickname.into(),
            score,
            connected: true,
            is_host: false,
        }
    }

    #[test]
    fn leaderboard_sorts_by_score_descending() {
        let players = vec![player(1, "Ann", 3), player(2, "Bo", 9), player(3, "Cy", 5)];
        let board = leaderboard(&players);
        let scores: Vec<u32> = board.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![9, 5, 3]);
    }

    #[test]
    fn leaderboard_is_stable_on_ties() {
        let players = vec![
            player(1, "Ann", 5),
            player(2, "Bo", 7),
            player(3, "Cy", 5),
            player(4, "Di", 5),
        ];
        let board = leaderboard(&players);
        let names: Vec<&str> = board.iter().map(|p| p.nickname.as_str()).collect();
        // Tied players keep their original relative order.
        assert_eq!(names, vec!["Bo", "Ann", "Cy", "Di"]);
    }

    #[test]
    fn leaderboard_ordering_is_non_increasing() {
        let players = vec![
            player(1, "a", 0),
            player(2, "b", 10),
            player(3, "c", 10),
            player(4, "d", 2),
        ];
        let board = leaderboard(&players);
        for pair in board.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn leaderboard_does_not_mutate_input() {
        let players = vec![player(1, "Ann", 1), player(2, "Bo", 2)];
        let _ = leaderboard(&players);
        assert_eq!(players[0].nickname, "Ann");
    }

    #[test]
    fn preview_overlays_interior_tokens_only() {
        // Five tokens, first/last are delimiters, three interior slots.
        assert_eq!(guess_preview("_ _ _ _ _", "cat"), "_ C A T _");
    }

    #[test]
    fn preview_never_touches_delimiters() {
        // A guess longer than the interior cannot spill into the last token.
        assert_eq!(guess_preview("_ _ _ _ _", "horses"), "_ H O R _");
    }

    #[test]
    fn preview_ignores_non_alphabetic_characters() {
        // '7' is ignored and its mask token stays untouched.
        assert_eq!(guess_preview("_ a b c _", "x7z"), "_ X b Z _");
        assert_eq!(guess_preview("_ W O R D _", "w1rd"), "_ W O R D _");
    }

    #[test]
    fn preview_uppercases_typed_letters() {
        assert_eq!(guess_preview("_ . . _", "ok"), "_ O K _");
    }

    #[test]
    fn preview_with_short_guess_keeps_remaining_mask() {
        assert_eq!(guess_preview("_ W O R D _", "so"), "_ S O R D _");
    }

    #[test]
    fn preview_without_interior_slots_is_identity() {
        assert_eq!(guess_preview("_ _", "abc"), "_ _");
        assert_eq!(guess_preview("", "abc"), "");
    }

    #[test]
    fn invite_link_empty_until_room_known() {
        assert_eq!(invite_link("https://play.wordrush.io", None), "");
        assert_eq!(invite_link("https://play.wordrush.io", Some("")), "");
    }

    #[test]
    fn invite_link_combines_origin_and_code() {
        assert_eq!(
            invite_link("https://play.wordrush.io", Some("XKCD42")),
            "https://play.wordrush.io/?room=XKCD42"
        );
        // Trailing slash on the origin does not double up.
        assert_eq!(
            invite_link("https://play.wordrush.io/", Some("XKCD42")),
            "https://play.wordrush.io/?room=XKCD42"
        );
    }
}
