/// Backend primary keys (family members, accounts) are integers.
pub type DbId = i64;

/// Timezone used when a person record carries none.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
