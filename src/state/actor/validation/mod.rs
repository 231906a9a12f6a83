//! Room name rules.

/// Characters a room name may never contain.
const FORBIDDEN: [char; 8] = ['\0', '\x07', '\n', '\r', ' ', ',', ':', '/'];

/// Longest name accepted, not counting the leading `#`.
pub const MAX_ROOM_NAME_LEN: usize = 200;

/// A valid name is `#` followed by 1 to 200 characters, none of them
/// NUL, BEL, CR, LF, space, comma, colon or slash.
pub fn room_name_valid(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('#') else {
        return false;
    };
    let len = rest.chars().count();
    (1..=MAX_ROOM_NAME_LEN).contains(&len) && !rest.contains(FORBIDDEN)
}
