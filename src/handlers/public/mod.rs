// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read-only listings, the area query and account registration.
//
// Security Level: None (completely public access)
// Middleware: None

pub mod cats;
pub mod users;
