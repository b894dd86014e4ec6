// handlers/mod.rs - two security tiers
//
// Public (no credentials needed) and Protected (bearer token required).
// Menu routes mix both tiers on one path, so protected menu handlers take an
// `AuthUser` extractor; `/dishes/*` is wrapped whole in `require_auth`.
pub mod protected;
pub mod public;
