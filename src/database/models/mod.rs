pub mod cat;
pub mod point;
pub mod user;

pub use cat::{Cat, CatOutput, CatUpdate, NewCat, OwnerRef};
pub use point::{GeoPoint, PointKind};
pub use user::{NewUser, NewUserRecord, Role, UnknownRole, User, UserChanges, UserOutput, UserUpdate};
