// Coral agent platform integration.
// Registration runs once at startup and only when CORAL_SERVER_URL and CORAL_API_KEY are set.
// Registered ids are cached locally so restarts do not re-register.

pub mod client;
pub mod handlers;
pub mod registry;
