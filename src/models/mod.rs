pub mod cart;
pub mod receipt;

pub use cart::{Cart, CartLine, CartProduct};
pub use receipt::{Receipt, ReceiptLine};
