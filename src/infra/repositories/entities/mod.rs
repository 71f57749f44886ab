//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod remember_token;
pub mod user;

#[allow(unused_imports)]
pub use remember_token::{Entity as RememberTokenEntity, Model as RememberTokenModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
