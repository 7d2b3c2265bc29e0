pub const PATH_AUTH_NEXTAUTH: &str = "/auth/nextauth";
pub const PATH_AUTH_ME: &str = "/auth/me";
pub const PATH_ONBOARDING_STATUS: &str = "/onboarding/status";
pub const PATH_ONBOARDING_PILLARS: &str = "/onboarding/pillars";
pub const PATH_PILLARS: &str = "/pillars";
pub const PATH_MEMORIES: &str = "/memories";
pub const PATH_MEMORIES_RECENT: &str = "/memories/recent";
pub const PATH_MEMORIES_SEARCH: &str = "/memories/search";
pub const PATH_MEMORIES_CLUSTERS: &str = "/memories/clusters";
pub const PATH_HEALTH: &str = "/health";

pub const MULTIPART_CONTENT_FIELD: &str = "content";
pub const MULTIPART_PHOTO_FIELD: &str = "photos";
