//! Built-in assistant personas.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub key: &'static str,
    pub description: &'static str,
}

pub const BUILTIN_PERSONAS: &[Persona] = &[
    Persona {
        key: "friendly",
        description: "Cheerful and encouraging AI. Responds in an upbeat tone. 😊",
    },
    Persona {
        key: "witty",
        description: "AI with sarcastic and witty remarks. 😏",
    },
    Persona {
        key: "concise",
        description: "AI that gives short, to-the-point answers. ⚡",
    },
];

pub fn default_persona() -> Persona {
    BUILTIN_PERSONAS[0]
}

/// Find a persona by key (case-insensitive) or 1-based number.
pub fn find_persona(choice: &str) -> Option<Persona> {
    let choice = choice.trim();
    if let Ok(number) = choice.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|idx| BUILTIN_PERSONAS.get(idx))
            .copied();
    }
    BUILTIN_PERSONAS
        .iter()
        .find(|persona| persona.key.eq_ignore_ascii_case(choice))
        .copied()
}

/// Like [`find_persona`], but falls back to the first persona.
pub fn resolve_persona(choice: &str) -> Persona {
    find_persona(choice).unwrap_or_else(default_persona)
}
