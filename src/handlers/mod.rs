// Two security tiers: public (no auth) and protected (JWT auth, /api/*).

pub mod multipart;
pub mod protected;
pub mod public;
