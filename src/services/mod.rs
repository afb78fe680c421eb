// Val Browser services
// Services provide stateless or self-contained functionality: request filtering, settings, themes, scheduling, updates.

pub mod dark_mode_scheduler;
pub mod request_filter;
pub mod settings_engine;
pub mod theme_engine;
pub mod update_manager;
