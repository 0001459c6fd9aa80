use std::io::{BufRead, IsTerminal, Write};

use scatter_core::UserChoice;
use scatter_provisioner::{FallbackDecider, FixedChoice, Tier};

/// Asks on the terminal what to do about a missing resource.
pub struct StdinDecider;

impl FallbackDecider for StdinDecider {
    fn on_missing(&self, tier: Tier, name: &str) -> UserChoice {
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();
        loop {
            let _ = write!(
                stderr,
                "{tier} '{name}' was not found. [c]reate it, [u]se existing, or [q]uit? "
            );
            let _ = stderr.flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                // EOF or unreadable input declines.
                Ok(0) | Err(_) => return UserChoice::Cancel,
                Ok(_) => {}
            }
            if let Some(choice) = parse_choice(&line) {
                return choice;
            }
        }
    }
}

pub fn parse_choice(input: &str) -> Option<UserChoice> {
    match input.trim().to_ascii_lowercase().as_str() {
        "c" | "create" | "y" | "yes" => Some(UserChoice::CreateNew),
        "u" | "use" | "use existing" => Some(UserChoice::UseExisting),
        "q" | "quit" | "n" | "no" | "cancel" => Some(UserChoice::Cancel),
        _ => None,
    }
}

/// `--yes` creates, `--non-interactive` (or no terminal) declines, otherwise
/// prompt.
pub fn decider(yes: bool, non_interactive: bool) -> Box<dyn FallbackDecider> {
    if yes {
        Box::new(FixedChoice(UserChoice::CreateNew))
    } else if non_interactive || !std::io::stdin().is_terminal() {
        Box::new(FixedChoice(UserChoice::Cancel))
    } else {
        Box::new(StdinDecider)
    }
}
