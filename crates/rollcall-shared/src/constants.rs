/// Maximum length of a command argument, in characters
pub const MAX_ARGUMENT_LENGTH: usize = 50;

/// Default roster size limit per chat
pub const DEFAULT_MAX_PARTICIPANTS: usize = 100;

/// Key derivation context for participant keys (BLAKE3)
pub const KDF_CONTEXT_PARTICIPANT_KEY: &str = "rollcall-participant-key-v1";
