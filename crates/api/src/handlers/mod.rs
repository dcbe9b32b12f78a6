pub mod locks;
pub mod media_items;
