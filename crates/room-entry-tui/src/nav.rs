// room routes + navigation seam

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

// RFC 3986 unreserved characters stay readable; everything else is escaped so
// a room id is always exactly one path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn room_path(room_id: &str) -> String {
    format!("/room/{}", utf8_percent_encode(room_id, SEGMENT))
}

/// Joins a route onto an optional base like `https://host/app/`.
pub fn resolve(base_url: Option<&str>, route: &str) -> String {
    match base_url {
        Some(base) if !base.is_empty() => format!("{}{}", base.trim_end_matches('/'), route),
        _ => route.to_string(),
    }
}

pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Holds the route chosen on the form until the terminal is released.
#[derive(Debug, Default)]
pub struct PendingRoute {
    route: Option<String>,
}

impl PendingRoute {
    pub fn take(self) -> Option<String> {
        self.route
    }
}

impl Navigator for PendingRoute {
    fn navigate(&mut self, path: &str) {
        debug!(path, "route pending");
        self.route = Some(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ids_pass_through() {
        assert_eq!(room_path("42"), "/room/42");
        assert_eq!(room_path("lobby-2_x.y~z"), "/room/lobby-2_x.y~z");
    }

    #[test]
    fn reserved_chars_are_escaped() {
        assert_eq!(room_path("a/b"), "/room/a%2Fb");
        assert_eq!(room_path("q?x=1#top"), "/room/q%3Fx%3D1%23top");
        assert_eq!(room_path("100% fun"), "/room/100%25%20fun");
        assert_eq!(room_path("café"), "/room/caf%C3%A9");
    }

    #[test]
    fn resolve_joins_base() {
        assert_eq!(resolve(None, "/room/42"), "/room/42");
        assert_eq!(resolve(Some(""), "/room/42"), "/room/42");
        assert_eq!(
            resolve(Some("https://chat.example/"), "/room/42"),
            "https://chat.example/room/42"
        );
    }

    #[test]
    fn pending_route_keeps_last() {
        let mut nav = PendingRoute::default();
        nav.navigate("/room/1");
        nav.navigate("/room/2");
        assert_eq!(nav.take(), Some("/room/2".into()));
        assert_eq!(PendingRoute::default().take(), None);
    }
}
