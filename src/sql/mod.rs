pub mod builder;
pub mod params;

pub use builder::{
    count, delete, insert, select_by_column, select_by_id, select_page, toggle_status, update,
    QueryBuf,
};
pub use params::PgBindValue;
