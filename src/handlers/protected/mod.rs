// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Middleware: jwt_auth_middleware → validate_user_middleware
//
// Every handler here receives the `Principal` injected by
// validate_user_middleware, built from the stored user rather than the token.

pub mod cats;
pub mod users;
