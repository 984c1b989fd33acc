/// Directory (relative to the server working dir) holding subscription files
pub const SUBSCRIPTIONS_DIR: &str = "subscriptions";

/// Extension of every stored subscription file
pub const SUBSCRIPTION_FILE_EXT: &str = "txt";

/// Route prefix under which stored subscriptions are served
pub const SUB_ROUTE_PREFIX: &str = "/api/sub/";

/// Upload endpoint path
pub const UPLOAD_ROUTE: &str = "/api/upload";

/// Length of a freshly generated file ID
pub const FILE_ID_LEN: usize = 13;

/// Longest file ID accepted from callers
pub const MAX_FILE_ID_LEN: usize = 32;

/// Key of the saved-subscription array in the local store
pub const STORAGE_KEY: &str = "saved-subscriptions";

/// Default converter backend offered when none is configured
pub const DEFAULT_BACKEND: &str = "http://127.0.0.1:25500/sub?";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Maximum subscription content size in bytes (10 MiB)
pub const MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024;

/// Upload response codes
pub const CODE_FAILURE: u8 = 0;
pub const CODE_SUCCESS: u8 = 1;
