// src/persona/codec.rs
// Cookie-safe encoding of a persona: base64 over UTF-8 JSON

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::Persona;

pub fn encode_persona(persona: &Persona) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(persona)?;
    Ok(STANDARD.encode(json))
}

/// `None` for anything that isn't a valid persona, so a broken or edited
/// cookie just means a fresh persona.
pub fn decode_persona(value: &str) -> Option<Persona> {
    let bytes = STANDARD.decode(value.trim()).ok()?;
    let persona: Persona = serde_json::from_slice(&bytes).ok()?;
    persona.is_valid().then_some(persona)
}
