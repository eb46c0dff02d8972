/// Path record field names shared across crates
pub const STORE_ID: &str = "store_id";
pub const ENTITY_ID: &str = "entity_id";
pub const ENTITY_TYPE: &str = "entity_type";
pub const REQUEST_PATH: &str = "request_path";

/// Scope-id field used by extensible entities.
pub const EXTENSIBLE_SCOPE_ID: &str = "scope_id";

/// Scope type passed to config lookups for per-store values.
pub const SCOPE_TYPE_STORE: &str = "store";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Length of the uniqueness token appended on collision.
pub const TOKEN_LENGTH: usize = 4;

/// Separator placed between a candidate and its uniqueness token.
pub const TOKEN_SEPARATOR: char = '-';
