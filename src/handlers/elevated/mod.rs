// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Security Level: JWT Authentication + admin role
// Middleware: jwt_auth_middleware → validate_user_middleware → require_admin_middleware

pub mod cats;
