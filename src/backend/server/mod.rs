//! Server Module
//!
//! Server bootstrap: configuration loading, the shared `AppState`, and
//! `create_app`, which wires adapters and services into a router.
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports
//! ├── state.rs        - AppState shared by every handler
//! ├── config.rs       - AppConfig (.env, TOML file, environment)
//! └── init.rs         - Adapter selection and app creation
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::AppConfig;
pub use init::create_app;
pub use state::AppState;
