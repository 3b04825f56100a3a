pub mod game;
pub mod model;

/// Program identity shared by every front end.
pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "spades"
    }

    pub const fn description() -> &'static str {
        "Spades scorekeeper"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
