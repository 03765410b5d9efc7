//! Domain models shared between the repository layer and the HTTP surface.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::CartItem;
pub use order::{Order, OrderLine};
pub use product::Product;
pub use user::User;
