// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT auth + stored user) → Elevated (admin role)
pub mod elevated;  // Tier 3: admin role required (/api/v1/cats/admin/*)
pub mod protected; // Tier 2: JWT authentication required
pub mod public;    // Tier 1: No authentication required
