//! Scripted bot personas
//!
//! Thin drivers that periodically feed canned lines into the client,
//! standing in for a human at the prompt. Each persona introduces
//! itself by name, then repeats its greeting.

use std::time::Duration;

use parley_net::{ChatClient, ConnectionState};

/// Pause between submissions
const CADENCE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Persona {
    Sasha,
    Misha,
}

impl Persona {
    fn name(self) -> &'static str {
        match self {
            Persona::Sasha => "Sasha",
            Persona::Misha => "Misha",
        }
    }

    fn greeting(self) -> String {
        format!("Nice to meet you I'm {}", self.name())
    }
}

/// Drive the client with the persona's canned lines until the
/// connection dies.
pub async fn run(client: &ChatClient, persona: Persona) {
    let mut line = persona.name().to_string();

    loop {
        tokio::time::sleep(CADENCE).await;

        if client.state() == ConnectionState::Closed {
            tracing::info!(persona = persona.name(), "Connection closed, bot exiting");
            break;
        }

        println!("{line}");
        client.submit_message(line.clone());
        line = persona.greeting();
    }
}
