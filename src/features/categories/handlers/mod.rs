pub mod admin_category_handler;
pub mod category_handler;

pub use admin_category_handler::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use category_handler::list_category_tree;
