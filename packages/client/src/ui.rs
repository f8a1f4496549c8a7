//! UI utilities for the client.

use std::io::Write;

pub const PROMPT: &str = "atrium> ";

/// Print output from a background task, then redraw the prompt
pub fn print_above_prompt(text: &str) {
    print!("{}", text);
    redisplay_prompt();
}

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
