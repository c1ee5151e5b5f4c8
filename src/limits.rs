/// Maximum length of a room identifier, in bytes.
pub const MAX_ROOM_ID_LEN: usize = 256;
