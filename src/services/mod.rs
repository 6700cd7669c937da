pub mod alternatives;
pub mod curation;
pub mod custom_events;
pub mod open_hours;
pub mod operation_schema;
pub mod preference_inference;
pub mod scheduler;
pub mod segments;
pub mod themes;
pub mod travel_time;
