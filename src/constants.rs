// Page wiring for the web front-end.

// Background canvas lookup; the element may be injected after the module loads
pub const CANVAS_ELEMENT_ID: &str = "bg-canvas";
pub const CANVAS_RETRY_ATTEMPTS: u32 = 50; // 50 x 100 ms = 5 s
pub const CANVAS_RETRY_INTERVAL_MS: u64 = 100;
pub const CANVAS_RETRY_LOG_EVERY: u32 = 10;

// Playback is "active" while the sticky player carries this class
pub const PLAYER_ELEMENT_ID: &str = "stickyPlayer";
pub const PLAYER_ACTIVE_CLASS: &str = "active";
