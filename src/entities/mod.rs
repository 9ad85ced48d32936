pub mod access_level;
pub mod address;
pub mod cart_item;
pub mod order;
pub mod order_product_detail;
pub mod product;
pub mod store_settings;
pub mod user;
