// Root-only administration: cross-tenant company management.
// Guarded by require_root_middleware on top of the standard JWT + tenant
// validation stack.
pub mod companies;
