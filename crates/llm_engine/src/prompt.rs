//! Prompt construction for the opponent and the assistant.

/// Format a SAN history as numbered move pairs: "1. e4 e5 2. Nf3 Nc6".
pub fn format_move_history(sans: &[String]) -> String {
    let mut out = String::new();
    for (i, pair) in sans.chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{}. {}", i + 1, pair[0]));
        if let Some(black) = pair.get(1) {
            out.push(' ');
            out.push_str(black);
        }
    }
    out
}

/// System prompt for the opponent: move first, explanation after.
pub fn move_system_prompt() -> String {
    "You are a chess expert playing as Black. You must suggest the best move for Black \
in algebraic notation (e.g., \"e5\" or \"Nf6\") and explain your reasoning.\n\n\
IMPORTANT: Start your response with the move in algebraic notation on its own line, \
then provide your explanation."
        .to_string()
}

/// User prompt for the opponent, carrying the game so far.
pub fn move_user_prompt(sans: &[String]) -> String {
    format!(
        "I am playing as Black in a chess game.\n\
Move history: {}\n\
Please suggest the best move for Black in algebraic notation (e.g., \"e5\" or \"Nf6\") \
and explain your reasoning.",
        format_move_history(sans)
    )
}

/// System prompt for the assistant panel, carrying the full game context.
pub fn assistant_system_prompt(fen: &str, turn: &str, status: &str, sans: &[String]) -> String {
    format!(
        "You are a chess expert and coach. You're analyzing a chess game and should \
provide helpful analysis, strategic advice, and suggest specific moves.\n\n\
Current game state:\n\
- FEN: {fen}\n\
- Turn: {turn}\n\
- Status: {status}\n\
- Move history: {history}\n\n\
CRITICAL RESPONSE FORMAT:\n\
When suggesting a move, ALWAYS start your response with the move in algebraic \
notation on its own line, then provide your explanation on the next line.\n\n\
IMPORTANT INSTRUCTIONS:\n\
1. When asked about the best move, suggest a specific move in algebraic notation \
(e.g., \"e4\", \"Nf3\", \"O-O\")\n\
2. Always explain your reasoning for suggested moves\n\
3. Analyze the current position and provide strategic insights\n\
4. If the game is over, explain why and what led to the result\n\
5. Be encouraging and educational in your responses\n\n\
Keep responses concise but informative.",
        history = sans.join(", "),
    )
}
