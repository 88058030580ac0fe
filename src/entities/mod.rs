pub mod coffee_item;
pub mod coffee_type;
pub mod order;
pub mod order_line;
pub mod order_status;
